//! Editor actions, including movements and operations
//!
//! Actions are what key sequences resolve to. Most act on the line store;
//! [`Action::Host`] carries an opaque name the engine hands to the host
//! without interpreting it.

use crate::constants::errors;
use crate::error::{ErrorType, WeftError};
use crate::mode::Mode;
use std::str::FromStr;

/// Represents a motion in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Move left by one character
    Left,
    /// Move right by one character
    Right,
    /// Move up by one line
    Up,
    /// Move down by one line
    Down,
    /// Move to the start of the next word
    NextWord,
    /// Move to the start of the previous word
    PreviousWord,
    /// Move to the start of the line
    StartOfLine,
    /// Move to the end of the line
    EndOfLine,
    /// Move to the start of the document
    StartOfFile,
    /// Move to the end of the document
    EndOfFile,
}

impl Motion {
    /// Operators applied over this motion act on whole lines (`dj`, `dG`)
    #[must_use]
    pub fn is_linewise(&self) -> bool {
        matches!(
            self,
            Motion::Up | Motion::Down | Motion::StartOfFile | Motion::EndOfFile
        )
    }
}

/// Operators wait for a motion and act on the text it spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Yank,
}

/// Ways of entering insert mode from normal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertEntry {
    /// Insert before the cursor (`i`)
    Before,
    /// Insert after the cursor (`a`)
    After,
    /// Insert at the end of the line (`A`)
    EndOfLine,
    /// Open a new line below (`o`)
    OpenBelow,
    /// Open a new line above (`O`)
    OpenAbove,
}

/// Direct buffer edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    InsertNewline,
    InsertTab,
    DeleteBackward,
    DeleteForward,
    /// Delete back to the start of the previous word
    DeleteWordBackward,
    DeleteSelection,
    YankSelection,
    /// Swap the characters around the caret
    Transpose,
    /// Comment or uncomment the covered lines
    ToggleComment,
}

/// Represents an action in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Move the cursor (extends the selection in visual mode)
    Move(Motion),
    /// Edit the buffer
    Edit(EditCommand),
    /// Start an operator and wait for its motion
    Operator(Operator),
    /// Apply the pending operator to whole lines (`dd`, `yy`)
    Linewise,
    /// Enter insert mode
    Insert(InsertEntry),
    /// Switch to another mode
    EnterMode(Mode),
    /// Named action handed to the host
    Host(String),
    /// No action
    Noop,
}

impl Action {
    pub fn host(name: impl Into<String>) -> Self {
        Action::Host(name.into())
    }
}

impl FromStr for Action {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("host:") {
            if name.is_empty() {
                return Err(invalid_action(s));
            }
            return Ok(Action::host(name));
        }

        match s {
            // Movement
            "editor:move_left" => Ok(Action::Move(Motion::Left)),
            "editor:move_right" => Ok(Action::Move(Motion::Right)),
            "editor:move_up" => Ok(Action::Move(Motion::Up)),
            "editor:move_down" => Ok(Action::Move(Motion::Down)),
            "editor:move_next_word" => Ok(Action::Move(Motion::NextWord)),
            "editor:move_previous_word" => Ok(Action::Move(Motion::PreviousWord)),
            "editor:move_line_start" => Ok(Action::Move(Motion::StartOfLine)),
            "editor:move_line_end" => Ok(Action::Move(Motion::EndOfLine)),
            "editor:move_file_start" => Ok(Action::Move(Motion::StartOfFile)),
            "editor:move_file_end" => Ok(Action::Move(Motion::EndOfFile)),

            // Edits
            "edit:insert_newline" => Ok(Action::Edit(EditCommand::InsertNewline)),
            "edit:insert_tab" => Ok(Action::Edit(EditCommand::InsertTab)),
            "edit:delete_backward" => Ok(Action::Edit(EditCommand::DeleteBackward)),
            "edit:delete_forward" => Ok(Action::Edit(EditCommand::DeleteForward)),
            "edit:delete_word_backward" => Ok(Action::Edit(EditCommand::DeleteWordBackward)),
            "edit:delete_selection" => Ok(Action::Edit(EditCommand::DeleteSelection)),
            "edit:yank_selection" => Ok(Action::Edit(EditCommand::YankSelection)),
            "edit:transpose" => Ok(Action::Edit(EditCommand::Transpose)),
            "edit:toggle_comment" => Ok(Action::Edit(EditCommand::ToggleComment)),

            // Operators
            "operator:delete" => Ok(Action::Operator(Operator::Delete)),
            "operator:yank" => Ok(Action::Operator(Operator::Yank)),
            "operator:linewise" => Ok(Action::Linewise),

            // Insert entries
            "insert:before" => Ok(Action::Insert(InsertEntry::Before)),
            "insert:after" => Ok(Action::Insert(InsertEntry::After)),
            "insert:end_of_line" => Ok(Action::Insert(InsertEntry::EndOfLine)),
            "insert:open_below" => Ok(Action::Insert(InsertEntry::OpenBelow)),
            "insert:open_above" => Ok(Action::Insert(InsertEntry::OpenAbove)),

            // Modes
            "mode:normal" => Ok(Action::EnterMode(Mode::Normal)),
            "mode:visual" => Ok(Action::EnterMode(Mode::Visual)),

            "noop" => Ok(Action::Noop),
            _ => Err(invalid_action(s)),
        }
    }
}

fn invalid_action(s: &str) -> WeftError {
    WeftError::new(
        ErrorType::Config,
        errors::INVALID_ACTION,
        format!("Unknown action: {s}"),
    )
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
