mod click;
mod directory;
mod error;
mod format;
mod hashtag;
mod highlight;
mod link;
mod markdown;
mod markup;
mod mention;
mod pass;
mod sanitize;
mod token;

pub use click::{ElementAttributes, click_search_term, dispatch_click};
pub use directory::{MentionKeySource, UserDirectory};
pub use error::FormatError;
pub use format::{FormatOptions, Formatter, FormatterBuilder, format_text};
pub use markdown::{MarkdownRenderer, PulldownRenderer, RenderPolicy};
pub use markup::{
    ATTR_HASHTAG, ATTR_MENTION, CLASS_LINK, CLASS_MENTION_HIGHLIGHT, CLASS_MENTION_LINK,
    CLASS_SEARCH_HIGHLIGHT,
};
pub use mention::SPECIAL_MENTIONS;
pub use sanitize::{sanitize_html, singleline};
pub use token::{Category, Token, TokenStore};
