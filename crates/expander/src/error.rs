//! Error types for package expansion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an extraction run before the external tool is launched.
///
/// Failures that happen after launch are not errors from the caller's point
/// of view: they are reported as a [`RunOutcome`](crate::RunOutcome) and
/// recorded in the log.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// Another extraction is still in progress.
    #[error("An extraction is already running")]
    AlreadyRunning,

    /// The package or the output folder has not been chosen.
    #[error("Select both a package and an output folder first")]
    MissingSelection,

    /// The package file no longer exists.
    #[error("Package not found: {0}")]
    InputNotFound(PathBuf),

    /// The package path has no file name to derive a folder name from.
    #[error("Cannot derive a folder name from: {0}")]
    InvalidInputName(PathBuf),

    /// Something already occupies the computed destination.
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// The output folder could not be created.
    #[error("Failed to create output folder {path}: {source}")]
    OutputDirCreateFailed {
        /// Folder that could not be created
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl ExpandError {
    /// A hint telling the user how to get past the error, if there is one.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ExpandError::AlreadyRunning => {
                Some("Wait for the current extraction to finish.".to_string())
            }
            ExpandError::MissingSelection => None,
            ExpandError::InputNotFound(_) => {
                Some("The file may have been moved or deleted. Select it again.".to_string())
            }
            ExpandError::InvalidInputName(_) => Some("Select a package file.".to_string()),
            ExpandError::DestinationExists(path) => Some(format!(
                "Choose a different output folder or remove {} first.",
                path.display()
            )),
            ExpandError::OutputDirCreateFailed { .. } => {
                Some("Check that you have write permission for that location.".to_string())
            }
        }
    }
}
