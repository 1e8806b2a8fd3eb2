use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::sanitize::sanitize_html;
use crate::token::{Category, Token, TokenStore};

// Compiled search patterns are capped well below the regex default.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("entity regex")
});

/// Per-call facts every tokenizing pass needs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PassContext {
    /// Markdown enabled: the working text is raw, and token values are spliced in after
    /// rendering, so anything taken from the text must be escaped on its way into a value.
    /// Markdown disabled: the working text is already escaped.
    pub markdown: bool,
}

impl PassContext {
    pub fn value_text<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        if self.markdown {
            Cow::Owned(sanitize_html(raw))
        } else {
            Cow::Borrowed(raw)
        }
    }

    /// A caller-supplied literal in the same escaping state as the working text.
    pub fn needle<'a>(&self, literal: &'a str) -> Cow<'a, str> {
        if self.markdown {
            Cow::Borrowed(literal)
        } else {
            Cow::Owned(sanitize_html(literal))
        }
    }
}

/// Phase (a) of the wrapping passes: every live token accepted by `accept` is wrapped in
/// a new token of `category`, and the new alias replaces the old one in the text. The old
/// alias stays in the store and resolves from inside the new token's value.
pub(crate) fn wrap_existing<A, W>(
    text: &str,
    store: &mut TokenStore,
    category: Category,
    mut accept: A,
    mut wrap: W,
) -> String
where
    A: FnMut(&Token) -> bool,
    W: FnMut(&str, &Token) -> String,
{
    let candidates = store.find(|alias, token| text.contains(alias) && accept(token));
    let mut output = text.to_string();
    for (alias, token) in candidates {
        let value = wrap(&alias, &token);
        let new_alias = store.register(category, value, token.original_text);
        output = output.replacen(&alias, &new_alias, 1);
    }
    output
}

/// Case-insensitive whole-word matcher for a literal term.
///
/// A match may not be preceded or followed by a word character, so terms that begin or
/// end with punctuation (`@here`, `#general`) behave like words too.
#[derive(Debug)]
pub(crate) struct WordMatcher {
    pattern: Regex,
}

impl WordMatcher {
    pub fn new(term: &str) -> Option<Self> {
        if term.is_empty() {
            return None;
        }
        let pattern = match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
        {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!(%err, "highlight term not usable as a pattern");
                return None;
            }
        };
        Some(Self { pattern })
    }

    /// Rewrites every whole-word match with `wrap`. Matches that would swallow part of a
    /// placeholder (anything containing `marker`) are skipped.
    pub fn replace_all<W>(&self, text: &str, marker: &str, mut wrap: W) -> String
    where
        W: FnMut(&str) -> String,
    {
        let entities: Vec<(usize, usize)> = ENTITY
            .find_iter(text)
            .map(|entity| (entity.start(), entity.end()))
            .collect();
        let mut out = String::with_capacity(text.len());
        let mut last = 0usize;
        let mut pos = 0usize;
        while pos <= text.len() {
            let Some(found) = self.pattern.find_at(text, pos) else {
                break;
            };
            if found.is_empty() {
                break;
            }
            if is_whole_word(text, found.start(), found.end())
                && !splits_entity(&entities, found.start(), found.end())
                && !found.as_str().contains(marker)
            {
                out.push_str(&text[last..found.start()]);
                out.push_str(&wrap(found.as_str()));
                last = found.end();
                pos = found.end();
            } else {
                let step = text[found.start()..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                pos = found.start() + step;
            }
        }
        out.push_str(&text[last..]);
        out
    }
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

// A match may cover whole entities but never part of one: `amp` in `&amp;` or `lt;`
// in `&lt;` must stay intact.
fn splits_entity(entities: &[(usize, usize)], start: usize, end: usize) -> bool {
    entities
        .iter()
        .any(|&(from, to)| from < end && start < to && !(start <= from && to <= end))
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
