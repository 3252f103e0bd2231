//! # Expander
//!
//! Supervised expansion of macOS installer packages.
//!
//! This library wraps the system package utility (`pkgutil --expand-full`)
//! behind a small orchestration layer: it validates the chosen package and
//! output folder, derives a destination folder that must not exist yet,
//! launches the tool, streams its output into a shared log line by line, and
//! reports how the run ended.
//!
//! Process creation goes through the [`Launcher`] trait so callers (and
//! tests) can substitute their own.
//!
//! ## Example
//!
//! ```rust,no_run
//! use expander::{ExpanderConfig, SelectionState, Supervisor};
//!
//! # async fn run() -> Result<(), expander::ExpandError> {
//! let config = ExpanderConfig::default();
//! let state = SelectionState::new(config.clone());
//! state.set_input("/tmp/App.pkg");
//! state.set_output("/tmp/out");
//!
//! let supervisor = Supervisor::new(config);
//! let report = state.extract(&supervisor).await?;
//! println!("{:?} in {:?}", report.outcome, report.duration);
//!
//! for line in state.log().snapshot() {
//!     println!("{:?}: {}", line.level, line.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod launcher;
pub mod log;
pub mod plan;
pub mod reveal;
pub mod selection;
pub mod supervisor;
pub mod types;

// Re-export main types
pub use config::ExpanderConfig;
pub use error::ExpandError;
pub use launcher::{Invocation, LaunchedProcess, Launcher, SystemLauncher};
pub use log::LogBuffer;
pub use plan::ExpansionPlan;
pub use reveal::{NoReveal, Revealer, SystemRevealer};
pub use selection::{RunGate, Selection, SelectionState};
pub use supervisor::Supervisor;
pub use types::{LogLevel, LogLine, RunOutcome, RunReport};

use std::path::Path;

/// Check a package and output folder without creating or launching anything.
///
/// Returns the destination the tool would be asked to create.
///
/// # Errors
///
/// Returns an error if:
/// - Either path is empty
/// - The package does not exist
/// - The package path has no usable file name
/// - Something already exists at the destination
pub fn plan(input: &Path, output_dir: &Path) -> Result<ExpansionPlan, ExpandError> {
    plan::check(input, output_dir)
}
