use tracing::debug;

use crate::markup::{CLASS_MENTION_HIGHLIGHT, CLASS_SEARCH_HIGHLIGHT, highlight_span};
use crate::pass::{PassContext, WordMatcher, wrap_existing};
use crate::token::{Category, TokenStore};

/// Wraps tokens whose original text is exactly `term`, then every remaining whole-word,
/// case-insensitive occurrence of `term`.
pub(crate) fn highlight_search_term(
    text: &str,
    store: &mut TokenStore,
    term: &str,
    ctx: PassContext,
) -> String {
    let before = store.len();
    let output = highlight_literal(
        text,
        store,
        term,
        Category::SearchTerm,
        CLASS_SEARCH_HIGHLIGHT,
        ctx,
    );
    debug!(highlights = store.len() - before, "highlighted search term");
    output
}

/// Same as [`highlight_search_term`] for each of the viewer's mention keys. Keys are plain
/// literals; broadcast keys like `@channel` get no special treatment here.
pub(crate) fn highlight_current_mentions(
    text: &str,
    store: &mut TokenStore,
    mention_keys: &[String],
    ctx: PassContext,
) -> String {
    let before = store.len();
    let mut output = text.to_string();
    for key in mention_keys {
        output = highlight_literal(
            &output,
            store,
            key,
            Category::SelfMention,
            CLASS_MENTION_HIGHLIGHT,
            ctx,
        );
    }
    debug!(
        keys = mention_keys.len(),
        highlights = store.len() - before,
        "highlighted mentions of the viewer"
    );
    output
}

fn highlight_literal(
    text: &str,
    store: &mut TokenStore,
    term: &str,
    category: Category,
    class: &str,
    ctx: PassContext,
) -> String {
    if term.is_empty() {
        return text.to_string();
    }

    let needle = ctx.needle(term);
    let output = wrap_existing(
        text,
        store,
        category,
        |token| token.original_text == needle,
        |alias, _| highlight_span(class, alias),
    );

    let Some(matcher) = WordMatcher::new(&needle) else {
        return output;
    };
    let marker = store.marker().to_string();
    matcher.replace_all(&output, &marker, |word| {
        let value = highlight_span(class, &ctx.value_text(word));
        store.register(category, value, word)
    })
}

#[cfg(test)]
mod tests {
    use super::{highlight_current_mentions, highlight_search_term};
    use crate::pass::PassContext;
    use crate::token::{Category, TokenStore};

    const PLAIN: PassContext = PassContext { markdown: false };
    const MARKDOWN: PassContext = PassContext { markdown: true };

    #[test]
    fn search_term_matches_whole_words_case_insensitively() {
        let text = "Rust is rusty, rust!";
        let mut store = TokenStore::for_input(text);
        let output = highlight_search_term(text, &mut store, "rust", PLAIN);
        assert_eq!(
            store.resolve(&output),
            "<span class='search-highlight'>Rust</span> is rusty, \
             <span class='search-highlight'>rust</span>!"
        );
    }

    #[test]
    fn search_term_wraps_matching_tokens_exactly() {
        let mut store = TokenStore::for_input("");
        let tag = store.register(Category::Hashtag, "<a>#rust</a>", "#rust");
        let other = store.register(Category::Hashtag, "<a>#Rust</a>", "#Rust");
        let text = format!("{} {}", tag, other);
        let output = highlight_search_term(&text, &mut store, "#rust", PLAIN);
        assert_eq!(
            store.resolve(&output),
            "<span class='search-highlight'><a>#rust</a></span> <a>#Rust</a>"
        );
    }

    #[test]
    fn mention_keys_are_each_highlighted() {
        let text = "hey Alice, @channel meeting";
        let keys = vec!["alice".to_string(), "@channel".to_string()];
        let mut store = TokenStore::for_input(text);
        let output = highlight_current_mentions(text, &mut store, &keys, PLAIN);
        assert_eq!(
            store.resolve(&output),
            "hey <span class='mention-highlight'>Alice</span>, \
             <span class='mention-highlight'>@channel</span> meeting"
        );
    }

    #[test]
    fn empty_keys_are_ignored() {
        let text = "nothing";
        let keys = vec![String::new()];
        let mut store = TokenStore::for_input(text);
        assert_eq!(
            highlight_current_mentions(text, &mut store, &keys, PLAIN),
            text
        );
        assert!(store.is_empty());
    }

    #[test]
    fn markdown_mode_escapes_highlighted_words() {
        let text = "a <b> c";
        let mut store = TokenStore::for_input(text);
        let output = highlight_search_term(text, &mut store, "<b>", MARKDOWN);
        assert_eq!(
            store.resolve(&output),
            "a <span class='search-highlight'>&lt;b&gt;</span> c"
        );
    }
}
