use std::collections::{BTreeMap, HashMap};

use crate::markup::{ATTR_HASHTAG, ATTR_MENTION};

/// Attribute access on a clicked element of the rendered output.
pub trait ElementAttributes {
    fn attribute(&self, name: &str) -> Option<String>;
}

impl ElementAttributes for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl ElementAttributes for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// The term a click on `target` should search for. `data-mention` wins over
/// `data-hashtag`.
pub fn click_search_term(target: &dyn ElementAttributes) -> Option<String> {
    target
        .attribute(ATTR_MENTION)
        .or_else(|| target.attribute(ATTR_HASHTAG))
        .filter(|term| !term.is_empty())
}

/// Runs `search` for the clicked term, if any. Returns whether the click was handled.
pub fn dispatch_click<S>(target: &dyn ElementAttributes, mut search: S) -> bool
where
    S: FnMut(&str),
{
    match click_search_term(target) {
        Some(term) => {
            search(&term);
            true
        }
        None => false,
    }
}
