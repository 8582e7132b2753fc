//! Protocol envelopes
//!
//! Inbound messages are JSON objects `{"method", "params", "id"?}`. A message
//! with an `id` is a request and gets exactly one reply; one without is a
//! notification. Outbound traffic uses the same shapes.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::action::Motion;
use crate::constants::{errors, notifications};
use crate::error::WeftError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcMessage {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcMessage {
    pub fn parse(json: &str) -> Result<Self, WeftError> {
        serde_json::from_str(json).map_err(|e| {
            WeftError::protocol(errors::MALFORMED_MESSAGE, format!("Malformed message: {e}"))
        })
    }

    /// Decode the params into the shape `method` expects
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, WeftError> {
        serde_json::from_value(self.params.clone()).map_err(|e| {
            WeftError::protocol(
                errors::INVALID_PARAMS,
                format!("Invalid params for {}: {e}", self.method),
            )
        })
    }

    pub fn is_request(&self) -> bool {
        self.id.is_some()
    }
}

/// Best-effort recovery of a request id from a message that failed to parse
pub fn request_id(json: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(json).ok()?;
    value.get("id").filter(|id| !id.is_null()).cloned()
}

pub fn notification(method: &str, params: Value) -> String {
    json!({ "method": method, "params": params }).to_string()
}

pub fn response(id: &Value, result: Value) -> String {
    json!({ "id": id, "result": result }).to_string()
}

/// Error reply for a request, or an `error` notification when there is no id
pub fn error_response(id: Option<&Value>, err: &WeftError) -> String {
    let error = json!({ "code": err.code, "message": err.message });
    match id {
        Some(id) => json!({ "id": id, "error": error }).to_string(),
        None => notification(notifications::ERROR, error),
    }
}

/// Motion named by a `move_*` method (without the `_and_modify_selection` suffix)
pub fn motion_for_method(method: &str) -> Option<Motion> {
    let motion = match method {
        "move_left" => Motion::Left,
        "move_right" => Motion::Right,
        "move_up" => Motion::Up,
        "move_down" => Motion::Down,
        "move_word_left" => Motion::PreviousWord,
        "move_word_right" => Motion::NextWord,
        "move_to_beginning_of_line" => Motion::StartOfLine,
        "move_to_end_of_line" => Motion::EndOfLine,
        "move_to_beginning_of_document" => Motion::StartOfFile,
        "move_to_end_of_document" => Motion::EndOfFile,
        _ => return None,
    };
    Some(motion)
}

/// Direction of a `page_*` method (without the `_and_modify_selection` suffix)
pub fn page_motion_for_method(method: &str) -> Option<Motion> {
    match method {
        "page_up" => Some(Motion::Up),
        "page_down" => Some(Motion::Down),
        _ => None,
    }
}

// --- Params ---

#[derive(Debug, Clone, Deserialize)]
pub struct InsertParams {
    pub chars: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTextParams {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureType {
    /// Place the caret
    PointSelect,
    /// Extend the selection to the point
    RangeSelect,
    WordSelect,
    LineSelect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GestureParams {
    pub line: usize,
    pub col: usize,
    pub ty: GestureType,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewportParams {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetOptionParams {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetModeParams {
    pub mode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetLineParams {
    pub index: usize,
}
