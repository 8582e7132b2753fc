//! Task runner collaborator
//!
//! Building and running code belongs to an external task runner. The engine
//! never executes anything itself: it hands the runner a task description and
//! decodes the JSON envelope that comes back, `{"result": ...}` on success or
//! `{"error": {"code", "message"}}` on failure. Runner failures are passed to
//! the caller unchanged.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::errors;
use crate::error::{ErrorType, WeftError};

/// Suffix of toolchains built for the native target
pub const NATIVE_TOOLCHAIN_SUFFIX: &str = "-apple-darwin";

/// The external component that lists toolchains and executes tasks.
///
/// Both calls return the runner's raw response envelope. Stderr output of a
/// running task is streamed line by line through `on_stderr_line` before the
/// call returns.
pub trait TaskRunner {
    fn toolchains(&mut self) -> String;

    fn execute_task(
        &mut self,
        path: &Path,
        task_json: &str,
        on_stderr_line: &mut dyn FnMut(&str),
    ) -> String;
}

/// Failure reported by the runner itself
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExternError {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Display for ExternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "task runner error {}: {}", self.code, message),
            None => write!(f, "task runner error {}", self.code),
        }
    }
}

impl std::error::Error for ExternError {}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskError {
    /// The runner reported a failure
    Runner(ExternError),
    /// The task could not be encoded for the runner
    InvalidRequest(String),
    /// The runner answered with something that is not a response envelope
    MalformedResponse(String),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runner(err) => err.fmt(f),
            Self::InvalidRequest(detail) => write!(f, "invalid task: {detail}"),
            Self::MalformedResponse(detail) => write!(f, "malformed task runner response: {detail}"),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<ExternError> for TaskError {
    fn from(err: ExternError) -> Self {
        Self::Runner(err)
    }
}

impl From<TaskError> for WeftError {
    fn from(err: TaskError) -> Self {
        match err {
            // The runner's numeric code becomes the error code
            TaskError::Runner(extern_err) => WeftError::new(
                ErrorType::Collaborator,
                extern_err.code.to_string(),
                extern_err
                    .message
                    .unwrap_or_else(|| "task runner failed".to_string()),
            ),
            TaskError::InvalidRequest(detail) => WeftError::new(
                ErrorType::Collaborator,
                errors::INVALID_PARAMS,
                format!("Invalid task: {detail}"),
            ),
            TaskError::MalformedResponse(detail) => WeftError::new(
                ErrorType::Collaborator,
                errors::MALFORMED_RESPONSE,
                format!("Malformed task runner response: {detail}"),
            ),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    result: Option<Value>,
    error: Option<ExternError>,
}

/// Decode a runner response envelope
pub fn decode_response(json: &str) -> Result<Value, TaskError> {
    let envelope: Envelope =
        serde_json::from_str(json).map_err(|e| TaskError::MalformedResponse(e.to_string()))?;
    match envelope {
        Envelope {
            error: Some(err), ..
        } => Err(TaskError::Runner(err)),
        Envelope {
            result: Some(result),
            ..
        } => Ok(result),
        _ => Err(TaskError::MalformedResponse(
            "neither result nor error present".to_string(),
        )),
    }
}

fn decode_as<T: DeserializeOwned>(json: &str) -> Result<T, TaskError> {
    let value = decode_response(json)?;
    serde_json::from_value(value).map_err(|e| TaskError::MalformedResponse(e.to_string()))
}

// =============================================================================
// Payloads
// =============================================================================

/// An installed toolchain, e.g. `nightly-2019-01-26-x86_64-apple-darwin`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainInfo {
    pub name: String,
    /// stable / beta / nightly
    pub channel: String,
    pub date: Option<String>,
}

impl ToolchainInfo {
    /// Split a toolchain name into channel and the rest
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name
            .trim_end_matches(NATIVE_TOOLCHAIN_SUFFIX)
            .trim_end_matches('-');
        let (channel, date) = match trimmed.split_once('-') {
            Some((channel, rest)) => (channel.to_string(), Some(rest.to_string())),
            None => (trimmed.to_string(), None),
        };
        Self {
            name,
            channel,
            date,
        }
    }

    /// Name for menus: `Nightly (2019-01-26)`
    pub fn display_name(&self) -> String {
        let mut chars = self.channel.chars();
        let mut base: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        if let Some(date) = &self.date {
            base.push_str(&format!(" ({date})"));
        }
        base
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Run,
    Check,
    Test,
    Clean,
}

/// What the runner should do with a piece of code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub toolchain: String,
    pub code: String,
    pub task_type: TaskType,
    pub backtrace: bool,
    pub release: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// The produced binary, if any
    pub executable: Option<PathBuf>,
}

// =============================================================================
// Client
// =============================================================================

/// Typed access to a [`TaskRunner`]
pub struct TaskClient<R: TaskRunner> {
    runner: R,
}

impl<R: TaskRunner> TaskClient<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Installed toolchains for the native target
    pub fn list_toolchains(&mut self) -> Result<Vec<ToolchainInfo>, TaskError> {
        let response = self.runner.toolchains();
        let toolchains: Vec<ToolchainInfo> = decode_as(&response).inspect_err(|err| {
            tracing::warn!(%err, "listing toolchains failed");
        })?;
        tracing::debug!(count = toolchains.len(), "toolchains listed");
        Ok(toolchains)
    }

    /// Run `task` in `dir`, streaming stderr lines to `on_stderr_line`
    pub fn execute(
        &mut self,
        dir: &Path,
        task: &TaskRequest,
        on_stderr_line: &mut dyn FnMut(&str),
    ) -> Result<TaskResult, TaskError> {
        let task_json =
            serde_json::to_string(task).map_err(|e| TaskError::InvalidRequest(e.to_string()))?;
        tracing::debug!(dir = %dir.display(), task_type = ?task.task_type, "executing task");

        let response = self.runner.execute_task(dir, &task_json, on_stderr_line);
        let result: TaskResult = decode_as(&response).inspect_err(|err| {
            tracing::warn!(%err, "task failed");
        })?;
        tracing::debug!(success = result.success, "task finished");
        Ok(result)
    }
}
