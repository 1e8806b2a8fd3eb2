//! Read-only lookups the formatter is built with.

use std::collections::{BTreeSet, HashSet};

/// Answers whether a lower-cased username belongs to a real user.
pub trait UserDirectory {
    fn has_user(&self, username: &str) -> bool;
}

/// Supplies the viewer's current mention keys, e.g. `@alice`, `alice`, `@channel`.
///
/// Queried once per formatting call so the keys are always current.
pub trait MentionKeySource {
    fn mention_keys(&self) -> Vec<String>;
}

impl UserDirectory for HashSet<String> {
    fn has_user(&self, username: &str) -> bool {
        self.contains(username)
    }
}

impl UserDirectory for BTreeSet<String> {
    fn has_user(&self, username: &str) -> bool {
        self.contains(username)
    }
}

impl UserDirectory for [String] {
    fn has_user(&self, username: &str) -> bool {
        self.iter().any(|name| name == username)
    }
}

impl UserDirectory for Vec<String> {
    fn has_user(&self, username: &str) -> bool {
        self.as_slice().has_user(username)
    }
}

impl MentionKeySource for [String] {
    fn mention_keys(&self) -> Vec<String> {
        self.to_vec()
    }
}

impl MentionKeySource for Vec<String> {
    fn mention_keys(&self) -> Vec<String> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{MentionKeySource, UserDirectory};

    #[test]
    fn sets_answer_membership() {
        let directory: BTreeSet<String> = ["bot1".to_string()].into_iter().collect();
        assert!(directory.has_user("bot1"));
        assert!(!directory.has_user("alice"));
    }

    #[test]
    fn vec_sources_return_their_keys() {
        let keys = vec!["@alice".to_string(), "@channel".to_string()];
        assert_eq!(keys.mention_keys(), keys);
        assert!(vec!["alice".to_string()].has_user("alice"));
    }
}
