// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Working directories for system-test runs.
// Purpose: Keep run outputs under a configurable root or a temp dir.
// Dependencies: system-tests config, tempfile
// ============================================================================

//! Per-test working directories.

use std::path::Path;
use std::path::PathBuf;

use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

/// A directory for one test's files.
///
/// Under `SCHOOLSPHERE_SYSTEM_TEST_RUN_ROOT` the directory is kept for
/// inspection; otherwise it is a temp dir removed on drop.
pub struct RunDir {
    path: PathBuf,
    _temp: Option<TempDir>,
}

impl RunDir {
    /// Creates the directory for `label`.
    pub fn new(label: &str) -> Result<Self, String> {
        let config = SystemTestConfig::load()?;
        if let Some(root) = config.run_root {
            let path = root.join(label);
            std::fs::create_dir_all(&path).map_err(|err| format!("create {}: {err}", path.display()))?;
            return Ok(Self {
                path,
                _temp: None,
            });
        }
        let temp = tempfile::Builder::new()
            .prefix(&format!("schoolsphere-{label}-"))
            .tempdir()
            .map_err(|err| format!("create temp dir: {err}"))?;
        Ok(Self {
            path: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }

    /// Returns the directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
