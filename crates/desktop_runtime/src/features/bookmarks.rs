//! Bookmark list with URL normalization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Durable storage key for the bookmark list.
pub const BOOKMARKS_KEY: &str = "cozydesk.bookmarks.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookmarkError {
    #[error("bookmark url is empty")]
    EmptyUrl,
    #[error("unsupported url scheme `{0}`; only http and https are allowed")]
    UnsupportedScheme(String),
    #[error("bookmark url `{0}` has no host")]
    MissingHost(String),
}

/// Normalizes user input into an absolute http(s) URL, defaulting to https.
pub fn normalize_bookmark_url(raw: &str) -> Result<String, BookmarkError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BookmarkError::EmptyUrl);
    }
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => ("https".to_string(), trimmed),
    };
    if scheme != "http" && scheme != "https" {
        return Err(BookmarkError::UnsupportedScheme(scheme));
    }
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(BookmarkError::MissingHost(trimmed.to_string()));
    }
    Ok(format!("{scheme}://{rest}"))
}

fn next_bookmark_id(bookmarks: &[Bookmark]) -> String {
    let max = bookmarks
        .iter()
        .filter_map(|bookmark| bookmark.id.strip_prefix("bm-")?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("bm-{}", max + 1)
}

/// Appends a bookmark. An empty title falls back to the normalized URL.
pub fn add_bookmark(
    bookmarks: &[Bookmark],
    title: &str,
    url: &str,
) -> Result<Vec<Bookmark>, BookmarkError> {
    let url = normalize_bookmark_url(url)?;
    let title = match title.trim() {
        "" => url.clone(),
        title => title.to_string(),
    };
    let mut next = bookmarks.to_vec();
    next.push(Bookmark {
        id: next_bookmark_id(bookmarks),
        title,
        url,
    });
    Ok(next)
}

pub fn remove_bookmark(bookmarks: &[Bookmark], id: &str) -> Vec<Bookmark> {
    bookmarks
        .iter()
        .filter(|bookmark| bookmark.id != id)
        .cloned()
        .collect()
}

pub fn rename_bookmark(bookmarks: &[Bookmark], id: &str, title: &str) -> Vec<Bookmark> {
    let title = title.trim();
    bookmarks
        .iter()
        .map(|bookmark| {
            if bookmark.id == id && !title.is_empty() {
                Bookmark {
                    title: title.to_string(),
                    ..bookmark.clone()
                }
            } else {
                bookmark.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalization_defaults_to_https_and_rejects_other_schemes() {
        assert_eq!(
            normalize_bookmark_url(" example.com/docs ").as_deref(),
            Ok("https://example.com/docs")
        );
        assert_eq!(
            normalize_bookmark_url("HTTP://example.com").as_deref(),
            Ok("http://example.com")
        );
        assert_eq!(
            normalize_bookmark_url("javascript://alert(1)"),
            Err(BookmarkError::UnsupportedScheme("javascript".to_string()))
        );
        assert_eq!(normalize_bookmark_url("  "), Err(BookmarkError::EmptyUrl));
        assert!(matches!(
            normalize_bookmark_url("https:///path"),
            Err(BookmarkError::MissingHost(_))
        ));
    }

    #[test]
    fn add_remove_rename_keep_insertion_order() {
        let list = add_bookmark(&[], "Docs", "docs.rs").expect("add docs");
        let list = add_bookmark(&list, "", "crates.io").expect("add crates");
        assert_eq!(list[1].title, "https://crates.io");
        assert_eq!(list[1].id, "bm-2");

        let list = rename_bookmark(&list, "bm-2", "Crates");
        let list = remove_bookmark(&list, "bm-1");
        assert_eq!(
            list,
            vec![Bookmark {
                id: "bm-2".to_string(),
                title: "Crates".to_string(),
                url: "https://crates.io".to_string(),
            }]
        );
        let list = add_bookmark(&list, "Rust", "rust-lang.org").expect("add rust");
        assert_eq!(list[1].id, "bm-3");
    }
}
