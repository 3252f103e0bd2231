//! Settings for the expansion tool and their persistence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the package expansion utility.
pub const DEFAULT_TOOL: &str = "/usr/sbin/pkgutil";

/// Runtime configuration for a [`Supervisor`](crate::Supervisor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpanderConfig {
    /// Program invoked as `<tool> --expand-full <package> <destination>`
    pub tool: PathBuf,

    /// Whether to highlight the destination in the file browser on success
    pub reveal_on_success: bool,

    /// Extensions (lowercase, without dot) the package picker accepts
    pub package_extensions: Vec<String>,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            tool: PathBuf::from(DEFAULT_TOOL),
            reveal_on_success: true,
            package_extensions: vec!["pkg".to_string(), "mpkg".to_string()],
        }
    }
}

impl ExpanderConfig {
    /// Whether `path` carries one of the accepted package extensions.
    pub fn is_package_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.package_extensions.iter().any(|e| *e == ext))
    }
}

/// Default settings file: `<config dir>/pkg-expander/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pkg-expander").join("settings.json"))
}

/// Load settings from `path`.
///
/// A missing file yields the defaults. A file that cannot be read or parsed
/// is reported with a warning and also yields the defaults.
pub fn load_settings(path: &Path) -> ExpanderConfig {
    if !path.exists() {
        return ExpanderConfig::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read settings file {}: {}. Using defaults.",
                path.display(),
                e
            );
            return ExpanderConfig::default();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse settings file {}: {}. Using defaults.",
            path.display(),
            e
        );
        ExpanderConfig::default()
    })
}
