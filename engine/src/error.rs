//! Error types surfaced to the user as dialogs.

use std::any::Any;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A sub-application could not be brought up.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{app} could not start: {reason}")]
    Failed { app: String, reason: String },
    #[error("{app} crashed while starting: {message}")]
    Panicked { app: String, message: String },
}

impl LaunchError {
    pub fn failed(app: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            app: app.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of the file-open or command-execution collaborators. Never fatal.
#[derive(Debug, Error)]
pub enum ExternalCommandError {
    #[error("command is empty")]
    Empty,
    #[error("`{command}` failed ({status}): {stderr}")]
    NonZeroExit {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("command not found: {program}")]
    NotFound { program: String },
    #[error("the specified file was not found: {}", path.display())]
    PathNotFound { path: PathBuf },
    #[error("no program available to open files (`{handler}` is not installed)")]
    HandlerMissing { handler: String },
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl ExternalCommandError {
    /// Dialog title for this failure.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::PathNotFound { .. } => "File Not Found",
            Self::HandlerMissing { .. } => "Open file",
            Self::Empty | Self::NonZeroExit { .. } | Self::NotFound { .. } | Self::Spawn { .. } => {
                "Error"
            }
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
