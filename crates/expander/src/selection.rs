//! The user's current choices and the single-run gate.

use crate::config::ExpanderConfig;
use crate::error::ExpandError;
use crate::launcher::Launcher;
use crate::log::LogBuffer;
use crate::supervisor::Supervisor;
use crate::types::{LogLevel, RunReport};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag that is set while an extraction run is in progress.
///
/// Clones share the flag.
#[derive(Debug, Default, Clone)]
pub struct RunGate {
    running: Arc<AtomicBool>,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark a run as started, unless one already is.
    ///
    /// The flag stays set until the returned guard is dropped.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunGuard {
                running: self.running.clone(),
            })
    }
}

/// Clears the owning [`RunGate`] when dropped.
#[derive(Debug)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// The chosen package and output folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Selection, log and run gate for one window (or one CLI invocation).
pub struct SelectionState {
    selection: Mutex<Selection>,
    log: LogBuffer,
    gate: RunGate,
    config: ExpanderConfig,
}

impl SelectionState {
    pub fn new(config: ExpanderConfig) -> Self {
        Self::with_log(config, LogBuffer::new())
    }

    /// Use an existing log buffer, e.g. one with an observer attached.
    pub fn with_log(config: ExpanderConfig, log: LogBuffer) -> Self {
        Self {
            selection: Mutex::new(Selection::default()),
            log,
            gate: RunGate::new(),
            config,
        }
    }

    pub fn set_input(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.config.is_package_file(&path) {
            tracing::warn!("{} does not look like an installer package", path.display());
        }
        self.log
            .append(LogLevel::Info, format!("Selected package: {}", path.display()));
        self.selection.lock().input = Some(path);
    }

    pub fn set_output(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.log
            .append(LogLevel::Info, format!("Selected output folder: {}", path.display()));
        self.selection.lock().output = Some(path);
    }

    pub fn selection(&self) -> Selection {
        self.selection.lock().clone()
    }

    /// Both paths chosen and nothing running.
    pub fn is_ready(&self) -> bool {
        let selection = self.selection.lock();
        selection.input.is_some() && selection.output.is_some() && !self.gate.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn gate(&self) -> &RunGate {
        &self.gate
    }

    /// Run `supervisor` on the current selection.
    ///
    /// A missing path is passed on as empty, which the supervisor rejects
    /// with [`ExpandError::MissingSelection`].
    pub async fn extract<L: Launcher>(
        &self,
        supervisor: &Supervisor<L>,
    ) -> Result<RunReport, ExpandError> {
        let Selection { input, output } = self.selection();
        let input = input.unwrap_or_default();
        let output = output.unwrap_or_default();
        supervisor
            .run_extraction(&input, &output, &self.log, &self.gate)
            .await
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(ExpanderConfig::default())
    }
}
