pub mod defaults;
pub mod trie;

pub use self::trie::{MatchResult, TrieNode};
use crate::action::Action;
use crate::error::WeftError;
use crate::key::KeyDescriptor;
use crate::mode::Mode;
use std::collections::HashMap;
use std::str::FromStr;

/// Context where input occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyContext {
    /// Bindings active in every mode
    Global,
    Normal,
    Insert,
    Visual,
    OperatorPending,
}

impl From<Mode> for KeyContext {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Normal => KeyContext::Normal,
            Mode::Insert => KeyContext::Insert,
            Mode::Visual => KeyContext::Visual,
            Mode::OperatorPending => KeyContext::OperatorPending,
        }
    }
}

/// KeyMap stores mappings from (Context, Key Sequence) -> Action
#[derive(Debug, Clone)]
pub struct KeyMap {
    mappings: HashMap<KeyContext, TrieNode>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Register a new single-key binding
    pub fn register(&mut self, context: KeyContext, key: KeyDescriptor, action: Action) {
        self.register_sequence(context, vec![key], action);
    }

    /// Register a sequence binding
    pub fn register_sequence(&mut self, context: KeyContext, keys: Vec<KeyDescriptor>, action: Action) {
        self.mappings
            .entry(context)
            .or_default()
            .insert(&keys, action);
    }

    /// Register a binding written in key notation with an action string,
    /// e.g. `("gg", "editor:move_file_start")`
    pub fn register_from_str(
        &mut self,
        context: KeyContext,
        keys: &str,
        action_str: &str,
    ) -> Result<(), WeftError> {
        let keys = KeyDescriptor::parse_sequence(keys)?;
        let action = Action::from_str(action_str)?;
        self.register_sequence(context, keys, action);
        Ok(())
    }

    /// Look up a key sequence
    pub fn lookup<'a>(&'a self, context: KeyContext, keys: &[KeyDescriptor]) -> MatchResult<'a> {
        // First try specific context
        if let Some(trie) = self.mappings.get(&context) {
            match trie.lookup(keys) {
                MatchResult::None => {} // Continue to fallback
                match_result => return match_result,
            }
        }

        // Fallback to Global context if not found in specific context
        if context != KeyContext::Global {
            if let Some(trie) = self.mappings.get(&KeyContext::Global) {
                return trie.lookup(keys);
            }
        }

        MatchResult::None
    }

    /// Single-key convenience (returns Action only if the key alone resolves to one)
    pub fn get_action(&self, context: KeyContext, key: KeyDescriptor) -> Option<&Action> {
        match self.lookup(context, &[key]) {
            MatchResult::Exact(action) | MatchResult::Ambiguous(action) => Some(action),
            _ => None,
        }
    }

    /// Number of bindings registered for a context (excluding the global fallback)
    #[must_use]
    pub fn binding_count(&self, context: KeyContext) -> usize {
        self.mappings.get(&context).map_or(0, TrieNode::len)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}
