use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::directory::UserDirectory;
use crate::markup::mention_anchor;
use crate::pass::PassContext;
use crate::token::{Category, TokenStore};

/// Mention keywords that address a whole channel rather than one user.
pub const SPECIAL_MENTIONS: &[&str] = &["all", "channel", "here"];

static AT_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\s)(@([\p{L}\p{N}._\-]*[\p{L}\p{N}]))").expect("valid mention pattern")
});

/// Replaces every `@name` that names a known user or a special keyword with a mention
/// token. Anything else is left as literal text.
pub(crate) fn autolink_mentions(
    text: &str,
    store: &mut TokenStore,
    users: &dyn UserDirectory,
    ctx: PassContext,
) -> String {
    let before = store.len();
    let marker = store.marker().to_string();
    let output = AT_MENTION
        .replace_all(text, |caps: &Captures<'_>| {
            let boundary = &caps[1];
            let mention = &caps[2];
            let username = caps[3].to_lowercase();
            if mention.contains(&marker) || !is_mentionable(&username, users) {
                return caps[0].to_string();
            }
            let value = mention_anchor(&ctx.value_text(&username), &ctx.value_text(mention));
            let alias = store.register(Category::Mention, value, mention);
            format!("{}{}", boundary, alias)
        })
        .into_owned();
    debug!(mentions = store.len() - before, "autolinked mentions");
    output
}

fn is_mentionable(username: &str, users: &dyn UserDirectory) -> bool {
    SPECIAL_MENTIONS.contains(&username) || users.has_user(username)
}
