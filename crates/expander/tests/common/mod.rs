//! Shared fixtures for supervisor integration tests.

#![allow(dead_code)]

use expander::launcher::{ExitFuture, LaunchedProcess, OutputStream};
use expander::{Invocation, Launcher, Revealer, RunGate};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// What the fake tool does once launched.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Write the given output and exit with `code` (`None` = killed)
    Exit {
        stdout: &'static [u8],
        stderr: &'static [u8],
        code: Option<i32>,
    },
    /// Refuse to start
    FailToLaunch(io::ErrorKind),
}

impl Behaviour {
    pub fn exit(code: i32) -> Self {
        Behaviour::Exit {
            stdout: b"",
            stderr: b"",
            code: Some(code),
        }
    }
}

/// What the fake tool observed when it was launched.
#[derive(Debug, Clone)]
pub struct LaunchRecord {
    pub invocation: Invocation,
    pub running_at_launch: bool,
    pub destination_existed: bool,
}

/// Launcher that never spawns anything and records every call.
pub struct MockLauncher {
    behaviour: Behaviour,
    gate: Option<RunGate>,
    records: Arc<Mutex<Vec<LaunchRecord>>>,
    running_at_exit: Arc<Mutex<Vec<bool>>>,
}

impl MockLauncher {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            gate: None,
            records: Arc::new(Mutex::new(Vec::new())),
            running_at_exit: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Observe `gate` at launch and exit time.
    pub fn watching(mut self, gate: &RunGate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    pub fn records(&self) -> Vec<LaunchRecord> {
        self.records.lock().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.records.lock().len()
    }

    pub fn running_at_exit(&self) -> Vec<bool> {
        self.running_at_exit.lock().clone()
    }
}

impl Launcher for MockLauncher {
    fn launch(&self, program: &Path, args: &[OsString]) -> io::Result<LaunchedProcess> {
        let running = self.gate.as_ref().is_some_and(|g| g.is_running());
        let destination_existed = args
            .get(2)
            .map(|dest| Path::new(dest).exists())
            .unwrap_or(false);
        self.records.lock().push(LaunchRecord {
            invocation: Invocation {
                program: program.to_path_buf(),
                args: args.to_vec(),
            },
            running_at_launch: running,
            destination_existed,
        });

        match &self.behaviour {
            Behaviour::FailToLaunch(kind) => Err(io::Error::new(*kind, "mock tool is missing")),
            Behaviour::Exit {
                stdout,
                stderr,
                code,
            } => {
                let gate = self.gate.clone();
                let running_at_exit = self.running_at_exit.clone();
                let code = *code;
                let exit: ExitFuture = Box::pin(async move {
                    if let Some(gate) = gate {
                        running_at_exit.lock().push(gate.is_running());
                    }
                    Ok(code)
                });
                let stdout: OutputStream = Box::new(*stdout);
                let stderr: OutputStream = Box::new(*stderr);
                Ok(LaunchedProcess {
                    stdout,
                    stderr,
                    exit,
                })
            }
        }
    }
}

/// Revealer that remembers what it was asked to show.
#[derive(Clone, Default)]
pub struct RecordingRevealer {
    pub revealed: Arc<Mutex<Vec<PathBuf>>>,
    pub fail: bool,
}

impl Revealer for RecordingRevealer {
    fn reveal(&self, path: &Path) -> io::Result<()> {
        self.revealed.lock().push(path.to_path_buf());
        if self.fail {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no file browser"))
        } else {
            Ok(())
        }
    }
}

/// Temporary directory containing a fake package named `name`.
pub fn setup_package(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let package = dir.path().join(name);
    fs::write(&package, b"xar!\x00\x1c").expect("Failed to write package");
    (dir, package)
}
