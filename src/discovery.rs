//! Suite discovery and loading.
//!
//! Suites are authored as YAML or JSON records (see [`crate::config`] for
//! the shape). Discovery walks a directory tree for suite files; loading
//! deserializes one file and checks the data-model invariants before the
//! suite reaches the runner.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::TestSuite;
use crate::error::HarnessError;

/// Recursively scans a directory for suite files (`.yaml`, `.yml`, `.json`).
///
/// The returned list is sorted to ensure deterministic execution order.
pub fn discover_suite_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, HarnessError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| HarnessError::Suite {
            path: root.display().to_string(),
            message: format!("failed to walk directory: {}", e),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if !is_suite_file(entry.path()) {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// Loads and validates a single suite file, dispatching on extension.
pub fn load_suite(path: &Path) -> Result<TestSuite, HarnessError> {
    let content = fs::read_to_string(path).map_err(|e| suite_error(path, e))?;

    let suite: TestSuite = if has_extension(path, &["json"]) {
        serde_json::from_str(&content).map_err(|e| suite_error(path, e))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| suite_error(path, e))?
    };

    suite.validate()?;
    Ok(suite)
}

fn suite_error(path: &Path, error: impl std::fmt::Display) -> HarnessError {
    HarnessError::Suite {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn is_suite_file(path: &Path) -> bool {
    has_extension(path, &["yaml", "yml", "json"])
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}
