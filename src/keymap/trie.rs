use crate::action::Action;
use crate::key::KeyDescriptor;
use std::collections::HashMap;

/// Result of looking up a key sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<'a> {
    /// Exact match found
    Exact(&'a Action),
    /// Sequence is a valid prefix of longer bindings but has no action itself
    Prefix,
    /// Sequence is a valid prefix AND has an action itself
    Ambiguous(&'a Action),
    /// No match found
    None,
}

/// A node in the key sequence trie
#[derive(Debug, Default, Clone)]
pub struct TrieNode {
    /// Children nodes mapped by key
    children: HashMap<KeyDescriptor, TrieNode>,
    /// Action associated with this sequence (if any)
    action: Option<Action>,
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sequence into the trie
    pub fn insert(&mut self, keys: &[KeyDescriptor], action: Action) {
        let Some((first, rest)) = keys.split_first() else {
            self.action = Some(action);
            return;
        };

        self.children
            .entry(*first)
            .or_default()
            .insert(rest, action);
    }

    /// Look up a sequence
    pub fn lookup<'a>(&'a self, keys: &[KeyDescriptor]) -> MatchResult<'a> {
        let Some((first, rest)) = keys.split_first() else {
            // End of input: an action with children left is ambiguous and
            // resolves on timeout; children alone form a prefix.
            return match (&self.action, self.children.is_empty()) {
                (Some(action), true) => MatchResult::Exact(action),
                (Some(action), false) => MatchResult::Ambiguous(action),
                (None, false) => MatchResult::Prefix,
                (None, true) => MatchResult::None,
            };
        };

        match self.children.get(first) {
            Some(child) => child.lookup(rest),
            None => MatchResult::None,
        }
    }

    /// Number of bound sequences below this node
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.action.is_some()) + self.children.values().map(TrieNode::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
