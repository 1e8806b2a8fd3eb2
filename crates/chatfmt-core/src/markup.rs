//! Fixed HTML vocabulary of the formatter output. Styling and click handling in host
//! applications bind to these exact names.

pub const ATTR_MENTION: &str = "data-mention";
pub const ATTR_HASHTAG: &str = "data-hashtag";

pub const CLASS_LINK: &str = "theme";
pub const CLASS_MENTION_LINK: &str = "mention-link";
pub const CLASS_SEARCH_HIGHLIGHT: &str = "search-highlight";
pub const CLASS_MENTION_HIGHLIGHT: &str = "mention-highlight";

pub(crate) fn link_anchor(href: &str, label: &str) -> String {
    format!(
        "<a class='{}' target='_blank' href='{}'>{}</a>",
        CLASS_LINK, href, label
    )
}

pub(crate) fn mention_anchor(username: &str, label: &str) -> String {
    format!(
        "<a class='{}' href='#' {}='{}'>{}</a>",
        CLASS_MENTION_LINK, ATTR_MENTION, username, label
    )
}

pub(crate) fn hashtag_anchor(hashtag: &str, label: &str) -> String {
    format!(
        "<a class='{}' href='#' {}='{}'>{}</a>",
        CLASS_MENTION_LINK, ATTR_HASHTAG, hashtag, label
    )
}

pub(crate) fn highlight_span(class: &str, inner: &str) -> String {
    format!("<span class='{}'>{}</span>", class, inner)
}
