use serde::Deserialize;

use scm::{Label, User};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireUser {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireLabel {
    pub url: String,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

pub(crate) fn convert_user(from: WireUser) -> User {
    User {
        login: from.login,
        name: from.name.unwrap_or_default(),
        email: from.email.unwrap_or_default(),
        avatar: from.avatar_url,
    }
}

pub(crate) fn convert_users(from: Vec<WireUser>) -> Vec<User> {
    from.into_iter().map(convert_user).collect()
}

pub(crate) fn convert_label(from: WireLabel) -> Label {
    Label {
        name: from.name,
        color: from.color,
        description: from.description.unwrap_or_default(),
        url: from.url,
    }
}

pub(crate) fn convert_labels(from: Vec<WireLabel>) -> Vec<Label> {
    from.into_iter().map(convert_label).collect()
}
