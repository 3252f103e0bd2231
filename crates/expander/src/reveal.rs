//! Highlighting a finished destination in the host file browser.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Asks the desktop environment to show a path.
pub trait Revealer: Send + Sync {
    fn reveal(&self, path: &Path) -> io::Result<()>;
}

/// Reveals paths with the platform's file browser.
///
/// - macOS: `open -R <path>` selects the item in Finder
/// - Windows: `explorer /select,<path>`
/// - Linux and BSDs: `xdg-open <parent>` opens the containing folder
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRevealer;

impl Revealer for SystemRevealer {
    fn reveal(&self, path: &Path) -> io::Result<()> {
        let mut command = reveal_command(path)?;
        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        // explorer.exe reports 1 even when it opened the window
        if status.success() || cfg!(target_os = "windows") {
            Ok(())
        } else {
            Err(io::Error::other(format!("file browser exited with {}", status)))
        }
    }
}

#[cfg(target_os = "macos")]
fn reveal_command(path: &Path) -> io::Result<Command> {
    let mut command = Command::new("open");
    command.arg("-R").arg(path);
    Ok(command)
}

#[cfg(target_os = "windows")]
fn reveal_command(path: &Path) -> io::Result<Command> {
    let mut select = std::ffi::OsString::from("/select,");
    select.push(path.as_os_str());
    let mut command = Command::new("explorer");
    command.arg(select);
    Ok(command)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn reveal_command(path: &Path) -> io::Result<Command> {
    let folder = path.parent().unwrap_or(path);
    let mut command = Command::new("xdg-open");
    command.arg(folder);
    Ok(command)
}

#[cfg(not(any(unix, target_os = "windows")))]
fn reveal_command(_path: &Path) -> io::Result<Command> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "revealing files is not supported on this platform",
    ))
}

/// Revealer that does nothing, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReveal;

impl Revealer for NoReveal {
    fn reveal(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}
