use serde::Deserialize;

use scm::User;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WireUser {
    pub name: String,
    pub slug: String,
    pub display_name: String,
    pub email_address: String,
}

/// The slug is the login; accounts without one fall back to `name`.
pub(crate) fn convert_user(from: WireUser) -> User {
    let login = if from.slug.is_empty() {
        from.name
    } else {
        from.slug
    };
    User {
        login,
        name: from.display_name,
        email: from.email_address,
        avatar: String::new(),
    }
}
