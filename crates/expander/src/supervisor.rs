//! Orchestration of one expansion run.
//!
//! A run validates its paths, launches the tool through a [`Launcher`],
//! streams both output pipes into the [`LogBuffer`] and records the outcome.
//! The two pipe readers are separate tasks feeding a single channel; the run
//! itself is the only consumer and the only writer of tool lines to the log.
//! Lines from one pipe keep their order, but stdout and stderr lines may
//! interleave arbitrarily.

use crate::config::ExpanderConfig;
use crate::error::ExpandError;
use crate::launcher::{expand_args, Invocation, Launcher, OutputStream, SystemLauncher};
use crate::log::LogBuffer;
use crate::plan;
use crate::reveal::{Revealer, SystemRevealer};
use crate::selection::RunGate;
use crate::types::{LogLevel, LogLine, RunOutcome, RunReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Which pipe a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipe {
    Stdout,
    Stderr,
}

/// Runs the expansion tool and reports on it.
pub struct Supervisor<L: Launcher = SystemLauncher> {
    launcher: L,
    config: ExpanderConfig,
    revealer: Arc<dyn Revealer>,
}

impl Supervisor<SystemLauncher> {
    /// Supervisor that spawns real processes and reveals in the real file browser.
    pub fn new(config: ExpanderConfig) -> Self {
        Self::with_launcher(SystemLauncher, config)
    }
}

impl<L: Launcher> Supervisor<L> {
    pub fn with_launcher(launcher: L, config: ExpanderConfig) -> Self {
        Self {
            launcher,
            config,
            revealer: Arc::new(SystemRevealer),
        }
    }

    /// Replace the revealer used after a successful run.
    pub fn with_revealer(mut self, revealer: impl Revealer + 'static) -> Self {
        self.revealer = Arc::new(revealer);
        self
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Expand `input` into `output_dir / stem(input)`.
    ///
    /// Validation failures return an error before anything is launched,
    /// leave `log` untouched and leave `gate` clear. Once validation passes the log is
    /// reset, the gate is held until the outcome is recorded, and the result
    /// is always `Ok` with the outcome inside the report.
    pub async fn run_extraction(
        &self,
        input: &Path,
        output_dir: &Path,
        log: &LogBuffer,
        gate: &RunGate,
    ) -> Result<RunReport, ExpandError> {
        if gate.is_running() {
            return Err(ExpandError::AlreadyRunning);
        }

        let plan = plan::check(input, output_dir)?;
        // Held from here on; dropped by `?` if the output folder cannot be made
        let guard = gate.try_acquire().ok_or(ExpandError::AlreadyRunning)?;
        plan::create_output_dir(&plan)?;

        let run_id = Uuid::new_v4().to_string();
        log.clear();
        log.append(
            LogLevel::Info,
            format!("Expanding package: {}", plan.input.display()),
        );
        log.append(
            LogLevel::Info,
            format!("Destination: {}", plan.destination.display()),
        );

        let invocation = Invocation {
            program: self.config.tool.clone(),
            args: expand_args(&plan.input, &plan.destination),
        };
        tracing::debug!(run_id = %run_id, command = %invocation, "launching expansion tool");

        let started = Instant::now();
        let (outcome, stdout_lines, stderr_lines) =
            match self.launcher.launch(&invocation.program, &invocation.args) {
                Ok(process) => {
                    let ((stdout_lines, stderr_lines), exit) = tokio::join!(
                        stream_output(process.stdout, process.stderr, log),
                        process.exit,
                    );
                    (
                        self.record_exit(exit, &plan.destination, log),
                        stdout_lines,
                        stderr_lines,
                    )
                }
                Err(e) => {
                    let message = e.to_string();
                    log.append(
                        LogLevel::Error,
                        format!(
                            "Failed to start {}: {}",
                            invocation.program.display(),
                            message
                        ),
                    );
                    (RunOutcome::LaunchFailed { message }, 0, 0)
                }
            };
        let duration = started.elapsed();
        drop(guard);

        tracing::info!(run_id = %run_id, ?outcome, "expansion finished");

        if outcome.is_success() && self.config.reveal_on_success {
            self.reveal(plan.destination.clone()).await;
        }

        Ok(RunReport {
            run_id,
            input: plan.input,
            destination: plan.destination,
            outcome,
            duration,
            stdout_lines,
            stderr_lines,
        })
    }

    fn record_exit(
        &self,
        exit: std::io::Result<Option<i32>>,
        destination: &Path,
        log: &LogBuffer,
    ) -> RunOutcome {
        let tool = self.config.tool.display();
        match exit {
            Ok(Some(0)) => {
                log.append(
                    LogLevel::Success,
                    format!("Expanded successfully to {}", destination.display()),
                );
                RunOutcome::Succeeded {
                    destination: destination.to_path_buf(),
                }
            }
            Ok(Some(code)) => {
                log.append(
                    LogLevel::Error,
                    format!("Expansion failed: {} exited with code {}", tool, code),
                );
                RunOutcome::Failed { code }
            }
            Ok(None) => {
                log.append(
                    LogLevel::Error,
                    format!("Expansion failed: {} was terminated without an exit code", tool),
                );
                RunOutcome::Terminated
            }
            Err(e) => {
                log.append(
                    LogLevel::Error,
                    format!("Expansion failed: could not wait for {}: {}", tool, e),
                );
                RunOutcome::Terminated
            }
        }
    }

    async fn reveal(&self, destination: PathBuf) {
        let revealer = self.revealer.clone();
        let result = tokio::task::spawn_blocking(move || revealer.reveal(&destination)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Could not reveal destination: {}", e),
            Err(join_err) => tracing::warn!("Reveal task failed: {}", join_err),
        }
    }
}

/// Drain both pipes into `log`, returning how many lines each produced.
async fn stream_output(
    stdout: OutputStream,
    stderr: OutputStream,
    log: &LogBuffer,
) -> (u64, u64) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let stdout_task = tokio::spawn(read_lines(stdout, Pipe::Stdout, tx.clone()));
    let stderr_task = tokio::spawn(read_lines(stderr, Pipe::Stderr, tx));

    let mut stdout_lines = 0;
    let mut stderr_lines = 0;
    // Ends once both readers have dropped their senders
    while let Some((pipe, line)) = rx.recv().await {
        match pipe {
            Pipe::Stdout => stdout_lines += 1,
            Pipe::Stderr => stderr_lines += 1,
        }
        log.push(line);
    }

    for task in [stdout_task, stderr_task] {
        if let Err(join_err) = task.await {
            tracing::warn!("Output reader task failed: {}", join_err);
        }
    }

    (stdout_lines, stderr_lines)
}

async fn read_lines(stream: OutputStream, pipe: Pipe, tx: mpsc::UnboundedSender<(Pipe, LogLine)>) {
    let level = match pipe {
        Pipe::Stdout => LogLevel::Output,
        Pipe::Stderr => LogLevel::Warning,
    };
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = LogLine::new(level, decode_line(&buf));
                if tx.send((pipe, line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(?pipe, "Failed to read tool output: {}", e);
                let line = LogLine::new(
                    LogLevel::Warning,
                    format!("Stopped reading tool output: {}", e),
                );
                let _ = tx.send((pipe, line));
                break;
            }
        }
    }
}

/// Strip the line terminator and decode, replacing invalid UTF-8.
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
