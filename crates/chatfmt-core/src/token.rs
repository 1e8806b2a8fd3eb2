//! Placeholder tokens and the per-call store that resolves them.

const MARKER_HEAD: char = 'Q';
const MARKER_FILL: char = 'Z';
const MIN_FILL: usize = 2;
const TERMINATOR: char = 'X';

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Category {
    Link,
    Mention,
    Hashtag,
    SearchTerm,
    SelfMention,
}

impl Category {
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Link => "LINK",
            Category::Mention => "MENTION",
            Category::Hashtag => "HASHTAG",
            Category::SearchTerm => "SEARCHTERM",
            Category::SelfMention => "SELFMENTION",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub value: String,
    pub original_text: String,
}

/// Generates aliases that cannot occur in the text they are spliced into.
///
/// An alias looks like `QZZ<PREFIX><index>X`. The marker `QZZ..` is lengthened until it
/// occurs in none of the given views of the input. `Q` appears nowhere else in an alias,
/// so any occurrence of the marker in the working text is the start of a real alias.
#[derive(Clone, Debug)]
pub struct AliasGenerator {
    marker: String,
    next_index: usize,
}

impl AliasGenerator {
    pub fn for_input(input: &str) -> Self {
        Self::for_inputs(&[input])
    }

    /// Picks a marker absent from every one of `inputs`, e.g. the raw text and the text a
    /// renderer will see after decoding character references.
    pub fn for_inputs(inputs: &[&str]) -> Self {
        let mut fill = MIN_FILL;
        let marker = loop {
            let mut candidate = String::with_capacity(fill + 1);
            candidate.push(MARKER_HEAD);
            for _ in 0..fill {
                candidate.push(MARKER_FILL);
            }
            if !inputs.iter().any(|input| input.contains(&candidate)) {
                break candidate;
            }
            fill += 1;
        };
        Self {
            marker,
            next_index: 0,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn next(&mut self, prefix: &str) -> String {
        let index = self.next_index;
        self.next_index += 1;
        format!("{}{}{}{}", self.marker, prefix, index, TERMINATOR)
    }
}

/// Ordered, append-only map from alias to [`Token`].
///
/// Registration order is load-bearing: [`TokenStore::resolve`] walks it backwards so a token
/// that wraps an older alias is expanded before the alias it embeds.
#[derive(Clone, Debug)]
pub struct TokenStore {
    aliases: AliasGenerator,
    entries: Vec<(String, Token)>,
}

impl TokenStore {
    pub fn for_input(input: &str) -> Self {
        Self::for_inputs(&[input])
    }

    pub fn for_inputs(inputs: &[&str]) -> Self {
        Self {
            aliases: AliasGenerator::for_inputs(inputs),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn marker(&self) -> &str {
        self.aliases.marker()
    }

    pub fn register(
        &mut self,
        category: Category,
        value: impl Into<String>,
        original_text: impl Into<String>,
    ) -> String {
        let alias = self.aliases.next(category.prefix());
        self.entries.push((
            alias.clone(),
            Token {
                value: value.into(),
                original_text: original_text.into(),
            },
        ));
        alias
    }

    pub fn get(&self, alias: &str) -> Option<&Token> {
        self.entries
            .iter()
            .find(|(key, _)| key == alias)
            .map(|(_, token)| token)
    }

    pub fn find<F>(&self, mut predicate: F) -> Vec<(String, Token)>
    where
        F: FnMut(&str, &Token) -> bool,
    {
        self.entries
            .iter()
            .filter(|(alias, token)| predicate(alias, token))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.entries
            .iter()
            .map(|(alias, token)| (alias.as_str(), token))
    }

    pub fn resolve(&self, text: &str) -> String {
        let mut output = text.to_string();
        for (alias, token) in self.entries.iter().rev() {
            if output.contains(alias.as_str()) {
                output = output.replace(alias.as_str(), &token.value);
            }
        }
        output
    }
}

/// Call-scoped placeholders that hide a span from one or more passes and are restored
/// verbatim afterwards. They never enter the shared [`TokenStore`].
///
/// Shield aliases are bracketed (`<QZZZMD0X>`) so that link detection cannot run a
/// domain into them. They must be restored before the text reaches the markdown renderer.
#[derive(Debug)]
pub struct Shield {
    label: &'static str,
    aliases: AliasGenerator,
    entries: Vec<(String, String)>,
}

impl Shield {
    pub fn new(store: &TokenStore, label: &'static str) -> Self {
        // One fill character longer than the store marker; still absent from the input.
        let mut marker = store.marker().to_string();
        marker.push(MARKER_FILL);
        Self {
            label,
            aliases: AliasGenerator {
                marker,
                next_index: 0,
            },
            entries: Vec::new(),
        }
    }

    /// Text every alias of this shield starts with.
    pub fn opening(&self) -> String {
        format!("<{}{}", self.aliases.marker(), self.label)
    }

    pub fn hide(&mut self, literal: &str) -> String {
        let alias = format!("<{}>", self.aliases.next(self.label));
        self.entries.push((alias.clone(), literal.to_string()));
        alias
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn restore(&self, text: &str) -> String {
        let mut output = text.to_string();
        for (alias, literal) in self.entries.iter().rev() {
            output = output.replace(alias.as_str(), literal);
        }
        output
    }
}
