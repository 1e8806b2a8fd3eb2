use linkify::{LinkFinder, LinkKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::markup::link_anchor;
use crate::pass::PassContext;
use crate::token::{Category, Shield, TokenStore};

// `](target)` tails and `[label]: target` reference definitions.
static MARKDOWN_LINK_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\]\([^)]*\)|(?m:^ {0,3}\[[^\]\n]+\]:[^\n]*)")
        .expect("valid markdown link pattern")
});

fn link_finder() -> LinkFinder {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url, LinkKind::Email]);
    finder.url_must_have_scheme(false);
    finder
}

/// Replaces every URL and email address with a link token.
///
/// In markdown mode the text must already have its link targets hidden by
/// [`shield_markdown_links`], or the target of `[text](http://x.io)` would be autolinked.
/// With that `shield` given, URLs in the label of such a link are left for the renderer,
/// since an anchor cannot nest inside another.
pub(crate) fn autolink_urls(
    text: &str,
    store: &mut TokenStore,
    ctx: PassContext,
    shield: Option<&Shield>,
) -> String {
    let before = store.len();
    let finder = link_finder();
    let target_opening = shield.map(Shield::opening);
    let mut output = String::with_capacity(text.len());
    let mut last = 0usize;
    for link in finder.links(text) {
        if let Some(opening) = &target_opening {
            if inside_link_label(text, link.start(), link.end(), opening) {
                continue;
            }
        }
        let end = if ctx.markdown {
            link.end()
        } else {
            entity_safe_end(text, link.start(), link.end())
        };
        if end <= link.start() {
            continue;
        }
        let matched = &text[link.start()..end];
        let href = match link.kind() {
            LinkKind::Email => format!("mailto:{}", matched),
            _ => normalize_url(matched),
        };
        let value = link_anchor(&ctx.value_text(&href), &ctx.value_text(matched));
        let alias = store.register(Category::Link, value, matched);
        output.push_str(&text[last..link.start()]);
        output.push_str(&alias);
        last = end;
    }
    output.push_str(&text[last..]);

    debug!(links = store.len() - before, "autolinked urls");
    output
}

/// Hides markdown link targets behind private placeholders. They stay hidden from every
/// token pass and are restored just before rendering, so neither the link finder nor the
/// hashtag and highlight passes rewrite a URL that markdown will put in an `href`.
pub(crate) fn shield_markdown_links(text: &str, shield: &mut Shield) -> String {
    MARKDOWN_LINK_TARGET
        .replace_all(text, |caps: &regex::Captures<'_>| shield.hide(&caps[0]))
        .into_owned()
}

// `[label<shielded target>`: the `]` went into the shield with the target.
fn inside_link_label(text: &str, start: usize, end: usize, target_opening: &str) -> bool {
    let is_bracket = |ch: char| matches!(ch, '[' | ']' | '\n');
    let opened = text[..start]
        .rfind(is_bracket)
        .is_some_and(|idx| text[idx..].starts_with('['));
    if !opened {
        return false;
    }
    let rest = &text[end..];
    match (rest.find(target_opening), rest.find(is_bracket)) {
        (Some(target), Some(bracket)) => target < bracket,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// In escaped text every `&` opens an entity. The link finder may drop an entity's
/// closing `;` as trailing punctuation, so a match never ends inside one.
fn entity_safe_end(text: &str, start: usize, end: usize) -> usize {
    let matched = &text[start..end];
    match matched.rfind('&') {
        Some(amp) if !matched[amp..].contains(';') => start + amp,
        _ => end,
    }
}

fn normalize_url(url: &str) -> String {
    if url.contains("://") || has_scheme(url) {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    matches!(scheme.to_ascii_lowercase().as_str(), "mailto" | "tel")
}
