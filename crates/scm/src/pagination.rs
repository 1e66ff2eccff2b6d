//! Pagination normalizer.
//!
//! Providers signal "more results" differently: Stash returns an
//! `isLastPage` flag in the body, GitHub returns an RFC 5988 `Link` header.
//! [`normalize`] reduces both to one [`Page`] cursor attached to the
//! [`Response`](crate::Response). Callers re-issue the list call with
//! `page = response.page.next` until `next` is `None`; [`collect_all`] does
//! exactly that.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{ListOptions, Response, ScmError};

/// Normalized pagination cursor.
///
/// When more results exist, `first == Some(1)` and `next` is the requested
/// page plus one. `None` everywhere means this was the last page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// First page index.
    pub first: Option<u32>,
    /// Next page index.
    pub next: Option<u32>,
    /// Previous page index, when the provider reports one.
    pub prev: Option<u32>,
    /// Last page index, when the provider reports one.
    pub last: Option<u32>,
}

impl Page {
    /// Returns `true` when another page can be requested.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// The raw "is there more" signal a provider attached to a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal<'a> {
    /// Explicit last-page flag from the body. A missing flag is treated as
    /// "last page": the resource is not paged.
    LastPage(Option<bool>),
    /// Value of the `Link` response header, if any.
    Link(Option<&'a str>),
}

/// Computes the [`Page`] cursor for a list response.
///
/// Terminal (all `None`, apart from link-derived `prev`) when the signal says
/// last page or when the provider returned no items; a page beyond the end
/// must never produce a `next` pointer.
pub fn normalize(opts: &ListOptions, signal: PageSignal<'_>, item_count: usize) -> Page {
    let mut page = Page::default();
    let more = match signal {
        PageSignal::LastPage(flag) => !flag.unwrap_or(true),
        PageSignal::Link(header) => {
            let links = header.map(parse_link_header).unwrap_or_default();
            page.prev = links.prev;
            page.last = links.last;
            links.next.is_some()
        }
    };
    if more && item_count > 0 {
        page.first = Some(1);
        page.next = Some(opts.effective_page() + 1);
    } else {
        page.last = None;
    }
    page
}

/// Page numbers extracted from a `Link` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
    /// `rel="first"`
    pub first: Option<u32>,
    /// `rel="next"`
    pub next: Option<u32>,
    /// `rel="prev"`
    pub prev: Option<u32>,
    /// `rel="last"`
    pub last: Option<u32>,
}

/// Parses an RFC 5988 `Link` header, reading the `page` query parameter of
/// each relation.
///
/// Entries that are malformed or carry no `page` parameter are skipped.
pub fn parse_link_header(header: &str) -> Links {
    let mut links = Links::default();
    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let Some(target) = parts.next() else { continue };
        let target = target.trim();
        let Some(target) = target.strip_prefix('<').and_then(|t| t.strip_suffix('>')) else {
            continue;
        };
        let Some(page) = page_param(target) else { continue };
        for param in parts {
            let Some(rels) = param.trim().strip_prefix("rel=") else { continue };
            for rel in rels.trim_matches('"').split_whitespace() {
                match rel {
                    "first" => links.first = Some(page),
                    "next" => links.next = Some(page),
                    "prev" => links.prev = Some(page),
                    "last" => links.last = Some(page),
                    _ => {}
                }
            }
        }
    }
    links
}

fn page_param(target: &str) -> Option<u32> {
    let url = url::Url::parse(target).ok()?;
    let page = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok());
    page
}

/// Follows `next` cursors from `opts`, accumulating every item.
///
/// Stops when a response has no `next`, or when `next` does not move forward,
/// so a misbehaving provider cannot cause an endless loop.
pub async fn collect_all<T, F, Fut>(opts: ListOptions, mut fetch: F) -> Result<Vec<T>, ScmError>
where
    F: FnMut(ListOptions) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Response), ScmError>>,
{
    let mut all = Vec::new();
    let mut current = opts;
    loop {
        let (items, response) = fetch(current).await?;
        all.extend(items);
        match response.page.next {
            Some(next) if next > current.effective_page() => current = current.with_page(next),
            _ => return Ok(all),
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
