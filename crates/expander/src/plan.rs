//! Pre-launch validation and destination derivation.

use crate::error::ExpandError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A validated request: the package and the folder the tool will create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionPlan {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub destination: PathBuf,
}

/// `output_dir / stem(input)`.
pub fn derive_destination(input: &Path, output_dir: &Path) -> Result<PathBuf, ExpandError> {
    let stem = input
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| ExpandError::InvalidInputName(input.to_path_buf()))?;
    Ok(output_dir.join(stem))
}

/// Whether anything, including a dangling symlink, sits at `path`.
fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Run the checks that do not touch the filesystem beyond reading it.
///
/// In order: both paths present, package exists, destination free.
pub fn check(input: &Path, output_dir: &Path) -> Result<ExpansionPlan, ExpandError> {
    if input.as_os_str().is_empty() || output_dir.as_os_str().is_empty() {
        return Err(ExpandError::MissingSelection);
    }

    if !input.exists() {
        return Err(ExpandError::InputNotFound(input.to_path_buf()));
    }

    let destination = derive_destination(input, output_dir)?;
    if entry_exists(&destination) {
        return Err(ExpandError::DestinationExists(destination));
    }

    Ok(ExpansionPlan {
        input: input.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        destination,
    })
}

/// Create the plan's output folder and any missing parents.
///
/// The destination itself is left for the tool to create.
pub fn create_output_dir(plan: &ExpansionPlan) -> Result<(), ExpandError> {
    std::fs::create_dir_all(&plan.output_dir).map_err(|source| {
        ExpandError::OutputDirCreateFailed {
            path: plan.output_dir.clone(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn package(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"xar!").unwrap();
        path
    }

    #[test]
    fn test_derive_destination_strips_extension() {
        let dest = derive_destination(Path::new("/tmp/App.pkg"), Path::new("/tmp/out")).unwrap();
        assert_eq!(dest, PathBuf::from("/tmp/out/App"));

        // Only the last extension goes
        let dest =
            derive_destination(Path::new("/tmp/App.v2.pkg"), Path::new("/tmp/out")).unwrap();
        assert_eq!(dest, PathBuf::from("/tmp/out/App.v2"));

        let dest = derive_destination(Path::new("/tmp/README"), Path::new("/tmp/out")).unwrap();
        assert_eq!(dest, PathBuf::from("/tmp/out/README"));
    }

    #[test]
    fn test_derive_destination_without_stem() {
        let result = derive_destination(Path::new("/"), Path::new("/tmp/out"));
        assert!(matches!(result, Err(ExpandError::InvalidInputName(_))));
    }

    #[test]
    fn test_check_order_missing_selection_first() {
        // Empty output wins even though the input does not exist either
        let result = check(Path::new("/definitely/not/here.pkg"), Path::new(""));
        assert!(matches!(result, Err(ExpandError::MissingSelection)));

        let result = check(Path::new(""), Path::new("/tmp"));
        assert!(matches!(result, Err(ExpandError::MissingSelection)));
    }

    #[test]
    fn test_check_input_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("Gone.pkg");
        let result = check(&missing, dir.path());
        assert!(matches!(result, Err(ExpandError::InputNotFound(p)) if p == missing));
    }

    #[test]
    fn test_check_destination_directory_conflict() {
        let dir = TempDir::new().unwrap();
        let input = package(&dir, "App.pkg");
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("App")).unwrap();

        let result = check(&input, &out);
        assert!(matches!(result, Err(ExpandError::DestinationExists(p)) if p == out.join("App")));
    }

    #[test]
    fn test_check_destination_file_conflict() {
        let dir = TempDir::new().unwrap();
        let input = package(&dir, "App.pkg");
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("App"), b"not a folder").unwrap();

        assert!(matches!(
            check(&input, &out),
            Err(ExpandError::DestinationExists(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_dangling_symlink_conflict() {
        let dir = TempDir::new().unwrap();
        let input = package(&dir, "App.pkg");
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), out.join("App")).unwrap();

        assert!(matches!(
            check(&input, &out),
            Err(ExpandError::DestinationExists(_))
        ));
    }

    #[test]
    fn test_check_does_not_create_output_dir() {
        let dir = TempDir::new().unwrap();
        let input = package(&dir, "App.pkg");
        let out = dir.path().join("out");

        let plan = check(&input, &out).unwrap();
        assert_eq!(plan.destination, out.join("App"));
        assert!(!out.exists());
    }

    #[test]
    fn test_create_output_dir_nested_without_destination() {
        let dir = TempDir::new().unwrap();
        let input = package(&dir, "App.pkg");
        let out = dir.path().join("a").join("b").join("out");

        let plan = check(&input, &out).unwrap();
        create_output_dir(&plan).unwrap();
        assert!(out.is_dir());
        assert!(!plan.destination.exists());
    }

    #[test]
    fn test_create_output_dir_failure() {
        let dir = TempDir::new().unwrap();
        let input = package(&dir, "App.pkg");
        // A regular file where a parent folder is needed
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let out = blocker.join("out");

        let plan = check(&input, &out).unwrap();
        let result = create_output_dir(&plan);
        assert!(matches!(
            result,
            Err(ExpandError::OutputDirCreateFailed { path, .. }) if path == out
        ));
    }
}
