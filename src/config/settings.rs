//! Runtime settings
//! Declarative registry of the options `set_option` can change

use std::fmt;

use serde_json::Value;

use super::SessionConfig;
use crate::constants::{errors, limits};
use crate::error::{ErrorType, WeftError};
use crate::mode::Mode;

/// Typed value after parsing and validation
/// Setters receive this, never raw JSON
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Integer(usize),
    /// Canonical enum variant
    Enum(String),
}

/// Setting type definition for parsing and validation
#[derive(Debug, Clone)]
pub enum SettingType {
    /// Boolean setting (true/false, on/off, yes/no, 1/0)
    Boolean,
    /// Integer setting with optional min/max bounds
    Integer {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Enum setting with static variant list
    Enum {
        variants: &'static [&'static str],
    },
}

/// Structured error for setting operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    /// Failed to parse value
    ParseError(String),
    /// Value failed validation (out of range, etc.)
    ValidationError(String),
    /// Unknown option name
    UnknownOption(String),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            SettingError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            SettingError::UnknownOption(name) => write!(f, "Unknown option: {name}"),
        }
    }
}

impl From<SettingError> for WeftError {
    fn from(err: SettingError) -> Self {
        let code = match err {
            SettingError::ParseError(_) => errors::SETTING_PARSE_ERROR,
            SettingError::ValidationError(_) => errors::SETTING_VALIDATION_ERROR,
            SettingError::UnknownOption(_) => errors::UNKNOWN_SETTING,
        };
        WeftError::new(ErrorType::Config, code, err.to_string())
    }
}

/// Setter function signature. Receives a parsed and validated value.
pub type SettingSetter = fn(&mut SessionConfig, SettingValue) -> Result<(), SettingError>;

/// Setting descriptor: name, aliases, type, and setter
#[derive(Debug, Clone)]
pub struct SettingDescriptor {
    /// Canonical setting name, the same as the config file key
    pub name: &'static str,
    /// Short aliases (e.g., &["et"])
    pub aliases: &'static [&'static str],
    pub ty: SettingType,
    pub set: SettingSetter,
}

impl SettingDescriptor {
    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

// Setter functions for each setting

fn set_key_timeout(config: &mut SessionConfig, value: SettingValue) -> Result<(), SettingError> {
    match value {
        SettingValue::Integer(n) => {
            config.key_timeout_ms = u32::try_from(n)
                .map_err(|_| SettingError::ValidationError(format!("Timeout too large: {n}")))?;
            Ok(())
        }
        _ => Err(SettingError::ValidationError("Expected integer".to_string())),
    }
}

fn set_tab_size(config: &mut SessionConfig, value: SettingValue) -> Result<(), SettingError> {
    match value {
        SettingValue::Integer(n) => {
            config.tab_size = n;
            Ok(())
        }
        _ => Err(SettingError::ValidationError("Expected integer".to_string())),
    }
}

fn set_translate_tabs(config: &mut SessionConfig, value: SettingValue) -> Result<(), SettingError> {
    match value {
        SettingValue::Bool(b) => {
            config.translate_tabs_to_spaces = b;
            Ok(())
        }
        _ => Err(SettingError::ValidationError("Expected boolean".to_string())),
    }
}

fn set_undo_limit(config: &mut SessionConfig, value: SettingValue) -> Result<(), SettingError> {
    match value {
        SettingValue::Integer(n) => {
            config.undo_limit = n;
            Ok(())
        }
        _ => Err(SettingError::ValidationError("Expected integer".to_string())),
    }
}

fn set_word_wrap(config: &mut SessionConfig, value: SettingValue) -> Result<(), SettingError> {
    match value {
        SettingValue::Bool(b) => {
            config.word_wrap = b;
            Ok(())
        }
        _ => Err(SettingError::ValidationError("Expected boolean".to_string())),
    }
}

fn set_default_mode(config: &mut SessionConfig, value: SettingValue) -> Result<(), SettingError> {
    match value {
        SettingValue::Enum(name) => {
            config.default_mode = name
                .parse::<Mode>()
                .map_err(|e| SettingError::ValidationError(e.message))?;
            Ok(())
        }
        _ => Err(SettingError::ValidationError("Expected enum".to_string())),
    }
}

/// All settings `set_option` accepts
pub const SETTINGS: &[SettingDescriptor] = &[
    SettingDescriptor {
        name: "key_timeout_ms",
        aliases: &["timeoutlen", "tm"],
        ty: SettingType::Integer {
            min: Some(1),
            max: Some(limits::MAX_KEY_TIMEOUT_MILLIS),
        },
        set: set_key_timeout,
    },
    SettingDescriptor {
        name: "tab_size",
        aliases: &["tabstop", "ts"],
        ty: SettingType::Integer {
            min: Some(1),
            max: Some(limits::MAX_TAB_SIZE),
        },
        set: set_tab_size,
    },
    SettingDescriptor {
        name: "translate_tabs_to_spaces",
        aliases: &["expandtab", "et"],
        ty: SettingType::Boolean,
        set: set_translate_tabs,
    },
    SettingDescriptor {
        name: "undo_limit",
        aliases: &["undolevels", "ul"],
        ty: SettingType::Integer {
            min: Some(0),
            max: Some(limits::MAX_UNDO_LIMIT),
        },
        set: set_undo_limit,
    },
    SettingDescriptor {
        name: "word_wrap",
        aliases: &["wrap"],
        ty: SettingType::Boolean,
        set: set_word_wrap,
    },
    SettingDescriptor {
        name: "default_mode",
        aliases: &[],
        ty: SettingType::Enum {
            variants: &["normal", "insert"],
        },
        set: set_default_mode,
    },
];

/// Settings registry
#[derive(Clone, Copy)]
pub struct SettingsRegistry {
    settings: &'static [SettingDescriptor],
}

impl SettingsRegistry {
    #[must_use]
    pub const fn new(descriptors: &'static [SettingDescriptor]) -> Self {
        SettingsRegistry {
            settings: descriptors,
        }
    }

    pub fn find(&self, name: &str) -> Option<&'static SettingDescriptor> {
        self.settings.iter().find(|d| d.matches(name))
    }

    /// Parse a JSON value into a `SettingValue` according to its type.
    /// Strings are accepted for every type.
    pub(crate) fn parse_value(ty: &SettingType, value: &Value) -> Result<SettingValue, SettingError> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(SettingError::ParseError(format!(
                    "Unsupported value: {other}"
                )))
            }
        };

        match ty {
            SettingType::Boolean => match text.to_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(SettingValue::Bool(true)),
                "false" | "0" | "off" | "no" => Ok(SettingValue::Bool(false)),
                _ => Err(SettingError::ParseError(format!(
                    "Invalid boolean value: {text}"
                ))),
            },
            SettingType::Integer { min, max } => {
                let val = text.parse::<usize>().map_err(|_| {
                    SettingError::ParseError(format!("Invalid integer value: {text}"))
                })?;

                if let Some(min_val) = min {
                    if val < *min_val {
                        return Err(SettingError::ValidationError(format!(
                            "Value {val} is below minimum {min_val}"
                        )));
                    }
                }
                if let Some(max_val) = max {
                    if val > *max_val {
                        return Err(SettingError::ValidationError(format!(
                            "Value {val} is above maximum {max_val}"
                        )));
                    }
                }
                Ok(SettingValue::Integer(val))
            }
            SettingType::Enum { variants } => {
                let val_lower = text.to_lowercase();
                if let Some(canonical) = variants.iter().find(|v| v.to_lowercase() == val_lower) {
                    Ok(SettingValue::Enum(canonical.to_string()))
                } else {
                    Err(SettingError::ParseError(format!(
                        "Invalid enum value: {text}. Valid values: {variants:?}"
                    )))
                }
            }
        }
    }

    /// Resolve `name`, parse `value`, and apply it to `config`.
    /// Returns the canonical name of the setting that changed.
    pub fn apply(
        &self,
        name: &str,
        value: &Value,
        config: &mut SessionConfig,
    ) -> Result<&'static str, SettingError> {
        let desc = self
            .find(name)
            .ok_or_else(|| SettingError::UnknownOption(name.to_string()))?;
        let typed_value = Self::parse_value(&desc.ty, value)?;
        (desc.set)(config, typed_value)?;
        Ok(desc.name)
    }
}

/// Registry over [`SETTINGS`]
pub fn create_settings_registry() -> SettingsRegistry {
    SettingsRegistry::new(SETTINGS)
}
