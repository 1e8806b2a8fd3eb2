use std::borrow::Cow;

use ammonia::Builder;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, html};
use regex::{Captures, Regex};

use crate::token::Shield;

/// How the markdown renderer must treat its input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderPolicy {
    /// Raw HTML in the source is shown as text and the output is reduced to an allow-list.
    pub sanitize: bool,
    /// Single newlines become line breaks, as chat users expect.
    pub hard_breaks: bool,
}

impl RenderPolicy {
    pub fn chat() -> Self {
        Self {
            sanitize: true,
            hard_breaks: true,
        }
    }
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::chat()
    }
}

/// Renders placeholder-safe markdown to HTML.
pub trait MarkdownRenderer {
    fn render(&self, text: &str, policy: &RenderPolicy) -> String;
}

/// Default renderer: pulldown-cmark for parsing, ammonia for the sanitizing allow-list.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulldownRenderer;

impl MarkdownRenderer for PulldownRenderer {
    fn render(&self, text: &str, policy: &RenderPolicy) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);

        let events = Parser::new_ext(text, options).map(|event| match event {
            Event::SoftBreak if policy.hard_breaks => Event::HardBreak,
            Event::Html(raw) | Event::InlineHtml(raw) if policy.sanitize => Event::Text(raw),
            other => other,
        });
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events);

        if policy.sanitize {
            sanitize_rendered(&out)
        } else {
            out
        }
    }
}

fn sanitize_rendered(raw_html: &str) -> String {
    let mut builder = Builder::default();
    builder
        .add_tag_attributes("code", &["class"])
        .set_tag_attribute_value("a", "target", "_blank");
    builder.clean(raw_html).to_string()
}

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^ {0,3}(?:```[^\n]*\n(?s:.*?)^ {0,3}```|~~~[^\n]*\n(?s:.*?)^ {0,3}~~~)[ \t]*$",
    )
    .expect("valid fenced code pattern")
});

static INLINE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"``[^\n]+?``|`[^`\n]+`").expect("valid inline code pattern")
});

static NUMERIC_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("valid reference pattern")
});

/// The text as the renderer will emit it once numeric character references are decoded.
/// Named references never decode to ASCII letters or digits, so they are left alone.
pub(crate) fn decode_numeric_references(text: &str) -> Cow<'_, str> {
    NUMERIC_REFERENCE.replace_all(text, |caps: &Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            (None, None) => None,
        };
        match code.and_then(char::from_u32) {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Hides fenced code blocks and inline code spans from the tokenizing passes; code is
/// rendered verbatim.
pub(crate) fn shield_code(text: &str, shield: &mut Shield) -> String {
    let fenced = FENCED_CODE
        .replace_all(text, |caps: &Captures<'_>| shield.hide(&caps[0]))
        .into_owned();
    INLINE_CODE
        .replace_all(&fenced, |caps: &Captures<'_>| shield.hide(&caps[0]))
        .into_owned()
}
