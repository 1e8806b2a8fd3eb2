use tracing::debug;

use crate::directory::{MentionKeySource, UserDirectory};
use crate::error::FormatError;
use crate::hashtag::autolink_hashtags;
use crate::highlight::{highlight_current_mentions, highlight_search_term};
use crate::link::{autolink_urls, shield_markdown_links};
use crate::markdown::{
    MarkdownRenderer, PulldownRenderer, RenderPolicy, decode_numeric_references, shield_code,
};
use crate::mention::autolink_mentions;
use crate::pass::PassContext;
use crate::sanitize::{newlines_to_breaks, sanitize_html, singleline};
use crate::token::{Shield, TokenStore};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormatOptions {
    pub search_term: Option<String>,
    pub mention_highlight: bool,
    pub singleline: bool,
    pub markdown: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            search_term: None,
            mention_highlight: true,
            singleline: false,
            markdown: true,
        }
    }
}

/// Turns chat text into an HTML fragment. Built once with its collaborators and reused for
/// any number of calls; every call owns its own token store.
pub struct Formatter<'a> {
    users: &'a dyn UserDirectory,
    mention_keys: &'a dyn MentionKeySource,
    renderer: Box<dyn MarkdownRenderer + 'a>,
}

#[derive(Default)]
pub struct FormatterBuilder<'a> {
    users: Option<&'a dyn UserDirectory>,
    mention_keys: Option<&'a dyn MentionKeySource>,
    renderer: Option<Box<dyn MarkdownRenderer + 'a>>,
}

impl<'a> FormatterBuilder<'a> {
    pub fn users(mut self, users: &'a dyn UserDirectory) -> Self {
        self.users = Some(users);
        self
    }

    pub fn mention_keys(mut self, mention_keys: &'a dyn MentionKeySource) -> Self {
        self.mention_keys = Some(mention_keys);
        self
    }

    pub fn renderer(mut self, renderer: impl MarkdownRenderer + 'a) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn build(self) -> Result<Formatter<'a>, FormatError> {
        let users = self
            .users
            .ok_or(FormatError::MissingCollaborator("user directory"))?;
        let mention_keys = self
            .mention_keys
            .ok_or(FormatError::MissingCollaborator("mention key source"))?;
        Ok(Formatter {
            users,
            mention_keys,
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(PulldownRenderer)),
        })
    }
}

impl<'a> Formatter<'a> {
    pub fn builder() -> FormatterBuilder<'a> {
        FormatterBuilder::default()
    }

    pub fn format_text(&self, text: &str, options: &FormatOptions) -> String {
        let ctx = PassContext {
            markdown: options.markdown,
        };
        let mut output = if options.markdown {
            text.to_string()
        } else {
            sanitize_html(text)
        };

        // The renderer decodes `&#90;` and friends, so the marker must be absent from the
        // decoded text as well or a user could spell out a live alias.
        let mut store = if options.markdown {
            let decoded = decode_numeric_references(&output);
            TokenStore::for_inputs(&[output.as_str(), decoded.as_ref()])
        } else {
            TokenStore::for_input(&output)
        };
        let shield = if options.markdown {
            let mut shield = Shield::new(&store, "MD");
            output = shield_code(&output, &mut shield);
            output = shield_markdown_links(&output, &mut shield);
            Some(shield)
        } else {
            None
        };

        output = autolink_urls(&output, &mut store, ctx, shield.as_ref());
        output = autolink_mentions(&output, &mut store, self.users, ctx);
        output = autolink_hashtags(&output, &mut store, ctx);

        if let Some(term) = options
            .search_term
            .as_deref()
            .filter(|term| !term.trim().is_empty())
        {
            output = highlight_search_term(&output, &mut store, term, ctx);
        }
        if options.mention_highlight {
            let keys = self.mention_keys.mention_keys();
            output = highlight_current_mentions(&output, &mut store, &keys, ctx);
        }

        if let Some(shield) = shield {
            output = shield.restore(&output);
            let policy = RenderPolicy {
                hard_breaks: !options.singleline,
                ..RenderPolicy::chat()
            };
            output = self.renderer.render(&output, &policy);
        }

        output = store.resolve(&output);
        debug!(tokens = store.len(), "resolved tokens");

        if options.singleline {
            singleline(&output)
        } else if options.markdown {
            output
        } else {
            newlines_to_breaks(&output)
        }
    }
}

/// One-shot formatting with the default markdown renderer.
pub fn format_text(
    text: &str,
    options: &FormatOptions,
    users: &dyn UserDirectory,
    mention_keys: &dyn MentionKeySource,
) -> String {
    Formatter {
        users,
        mention_keys,
        renderer: Box::new(PulldownRenderer),
    }
    .format_text(text, options)
}
