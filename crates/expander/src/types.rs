//! Type definitions shared by the supervisor and its front ends.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where a log line came from and how it should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Status lines written by the application itself
    Info,
    /// A line the tool wrote to standard output
    Output,
    /// A line the tool wrote to standard error
    Warning,
    /// The run finished successfully
    Success,
    /// The run failed after validation
    Error,
}

/// One whole line in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub level: LogLevel,
    pub text: String,
}

impl LogLine {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, text)
    }
}

/// Terminal outcome of a run that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RunOutcome {
    /// The tool exited with code 0
    Succeeded { destination: PathBuf },

    /// The tool exited with a non-zero code
    Failed { code: i32 },

    /// The tool ended without an exit code (killed by a signal)
    Terminated,

    /// The tool could not be started
    LaunchFailed { message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }
}

/// Summary of one finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unique id of the run
    pub run_id: String,

    /// Package that was expanded
    pub input: PathBuf,

    /// Folder the tool was asked to create
    pub destination: PathBuf,

    pub outcome: RunOutcome,

    /// Wall time from launch to outcome (in seconds)
    #[serde(with = "duration_serde")]
    pub duration: Duration,

    /// Lines received on standard output
    pub stdout_lines: u64,

    /// Lines received on standard error
    pub stderr_lines: u64,
}

// Helper module for Duration serialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
