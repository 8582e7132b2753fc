//! Input mode definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::errors;
use crate::error::{ErrorType, WeftError};

/// Interpretation context for key input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Normal mode (motions, operators, counts)
    Normal,
    /// Insert mode (text entry); the default
    #[default]
    Insert,
    /// Visual mode (motions extend the selection)
    Visual,
    /// Operator pending mode (e.g. after pressing 'd')
    OperatorPending,
}

impl Mode {
    /// Name reported to the host in `mode_change`
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::Visual => "visual",
            Mode::OperatorPending => "operator_pending",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" | "command" => Ok(Mode::Normal),
            "insert" => Ok(Mode::Insert),
            "visual" => Ok(Mode::Visual),
            "operator_pending" => Ok(Mode::OperatorPending),
            other => Err(WeftError::new(
                ErrorType::Config,
                errors::SETTING_VALIDATION_ERROR,
                format!("Unknown mode: {other}"),
            )),
        }
    }
}
