use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::markup::hashtag_anchor;
use crate::pass::{PassContext, wrap_existing};
use crate::token::{Category, TokenStore};

// `&` is excluded from the leading boundary so numeric entities such as `&#39;` in
// escaped text are not taken for hashtags.
static HASHTAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\w&])(#[\p{L}\p{N}._\-]+)\b").expect("valid hashtag pattern")
});

pub(crate) fn autolink_hashtags(text: &str, store: &mut TokenStore, ctx: PassContext) -> String {
    let before = store.len();

    // Tokens that were themselves hashtags (e.g. a link whose text starts with `#`).
    let output = wrap_existing(
        text,
        store,
        Category::Hashtag,
        |token| token.original_text.starts_with('#'),
        |alias, token| hashtag_anchor(&ctx.value_text(&token.original_text), alias),
    );

    let marker = store.marker().to_string();
    let output = HASHTAG
        .replace_all(&output, |caps: &Captures<'_>| {
            let hashtag = &caps[2];
            // `#` directly in front of a placeholder, as in `#example.com`.
            if hashtag.contains(&marker) {
                return caps[0].to_string();
            }
            let tag = ctx.value_text(hashtag);
            let alias = store.register(Category::Hashtag, hashtag_anchor(&tag, &tag), hashtag);
            format!("{}{}", &caps[1], alias)
        })
        .into_owned();

    debug!(hashtags = store.len() - before, "autolinked hashtags");
    output
}
