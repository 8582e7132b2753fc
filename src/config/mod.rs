//! Session configuration
//!
//! Loaded from a JSON file; every field is optional:
//!
//! ```json
//! {
//!   "key_timeout_ms": 300,
//!   "tab_size": 2,
//!   "word_wrap": true,
//!   "bindings": [{ "mode": "normal", "keys": "<C-d>", "action": "editor:move_down" }]
//! }
//! ```

pub mod settings;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{errors, limits, timing};
use crate::error::{ErrorType, WeftError};
use crate::keymap::{defaults, KeyContext, KeyMap};
use crate::mode::Mode;

/// A user key binding layered over the defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// `global`, `normal`, `insert`, `visual` or `operator_pending`
    pub mode: String,
    /// Key notation, e.g. `"gg"` or `"<C-r>"`
    pub keys: String,
    /// Action string, e.g. `"editor:move_down"` or `"host:save"`
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a pending key sequence waits for its next key
    pub key_timeout_ms: u32,
    pub tab_size: usize,
    pub translate_tabs_to_spaces: bool,
    /// Maximum number of undo groups
    pub undo_limit: usize,
    /// Mode a new session starts in
    pub default_mode: Mode,
    /// Soft-wrap lines to the viewport width
    pub word_wrap: bool,
    /// Marker `toggle_comment` adds and removes
    pub comment_token: String,
    pub bindings: Vec<BindingConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key_timeout_ms: timing::KEY_TIMEOUT_MILLIS,
            tab_size: limits::DEFAULT_TAB_SIZE,
            translate_tabs_to_spaces: true,
            undo_limit: limits::DEFAULT_UNDO_LIMIT,
            default_mode: Mode::default(),
            word_wrap: false,
            comment_token: limits::DEFAULT_COMMENT_TOKEN.to_string(),
            bindings: Vec::new(),
        }
    }
}

fn load_failed(message: String) -> WeftError {
    WeftError::new(ErrorType::Config, errors::CONFIG_LOAD_FAILED, message)
}

fn parse_context(mode: &str) -> Result<KeyContext, WeftError> {
    match mode {
        "global" => Ok(KeyContext::Global),
        other => other.parse::<Mode>().map(KeyContext::from),
    }
}

impl SessionConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WeftError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| load_failed(format!("Cannot read {}: {e}", path.display())))?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), bindings = config.bindings.len(), "config loaded");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, WeftError> {
        let config: SessionConfig =
            serde_json::from_str(text).map_err(|e| load_failed(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check bounds the setting descriptors enforce at runtime
    pub fn validate(&self) -> Result<(), WeftError> {
        let invalid = |msg: String| {
            WeftError::new(ErrorType::Config, errors::SETTING_VALIDATION_ERROR, msg)
        };
        if self.key_timeout_ms == 0 || self.key_timeout_ms as usize > limits::MAX_KEY_TIMEOUT_MILLIS {
            return Err(invalid(format!(
                "key_timeout_ms must be between 1 and {}",
                limits::MAX_KEY_TIMEOUT_MILLIS
            )));
        }
        if self.tab_size == 0 || self.tab_size > limits::MAX_TAB_SIZE {
            return Err(invalid(format!(
                "tab_size must be between 1 and {}",
                limits::MAX_TAB_SIZE
            )));
        }
        if self.undo_limit > limits::MAX_UNDO_LIMIT {
            return Err(invalid(format!(
                "undo_limit must be at most {}",
                limits::MAX_UNDO_LIMIT
            )));
        }
        if self.comment_token.trim().is_empty() {
            return Err(invalid("comment_token must not be blank".to_string()));
        }
        Ok(())
    }

    /// Default keymap with the configured bindings layered on top
    pub fn build_keymap(&self) -> Result<KeyMap, WeftError> {
        let mut keymap = defaults::default_keymap();
        for binding in &self.bindings {
            let context = parse_context(&binding.mode)?;
            keymap.register_from_str(context, &binding.keys, &binding.action)?;
        }
        Ok(keymap)
    }

    /// Text inserted for a tab at `col`
    pub fn tab_text(&self, col: usize) -> String {
        if self.translate_tabs_to_spaces {
            let size = self.tab_size.max(1);
            " ".repeat(size - col % size)
        } else {
            "\t".to_string()
        }
    }
}
