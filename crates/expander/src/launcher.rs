//! Process launch abstraction.
//!
//! The supervisor never spawns processes directly. It asks a [`Launcher`] for
//! a [`LaunchedProcess`], which hands over the two output pipes and a future
//! resolving to the exit code. Tests substitute a launcher that records the
//! invocation and replays canned output.

use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::AsyncRead;

/// Readable end of one of the child's output pipes.
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Future resolving to the child's exit code, or `None` when it had none.
pub type ExitFuture = Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send>>;

/// A started child process.
pub struct LaunchedProcess {
    pub stdout: OutputStream,
    pub stderr: OutputStream,
    pub exit: ExitFuture,
}

/// Starts external programs.
pub trait Launcher: Send + Sync {
    /// Start `program` with `args`, capturing both output streams.
    ///
    /// An error means the program could not be started at all.
    fn launch(&self, program: &Path, args: &[OsString]) -> io::Result<LaunchedProcess>;
}

/// Arguments for expanding `input` into `destination`.
pub fn expand_args(input: &Path, destination: &Path) -> Vec<OsString> {
    vec![
        OsString::from("--expand-full"),
        input.as_os_str().to_os_string(),
        destination.as_os_str().to_os_string(),
    ]
}

/// Launcher backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, program: &Path, args: &[OsString]) -> io::Result<LaunchedProcess> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr was not captured"))?;

        let exit = Box::pin(async move {
            let status = child.wait().await?;
            Ok(status.code())
        });

        Ok(LaunchedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit,
        })
    }
}

/// A program and the arguments it is launched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

impl Invocation {
    /// Arguments as lossy strings, for assertions and display.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}
