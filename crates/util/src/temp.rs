// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped temporary files for test inputs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

const PREFIX: &str = "clinch-";

/// Write `content` to a new uniquely named file in the system temp dir.
///
/// `extension` may be given with or without the leading dot; empty means none.
/// The file is not removed automatically; pass it to [`cleanup_temp_files`]
/// or allocate through [`TempFiles`].
pub fn create_temp_file(content: impl AsRef<[u8]>, extension: &str) -> io::Result<PathBuf> {
    create_temp_file_in(&std::env::temp_dir(), content, extension)
}

/// [`create_temp_file`] inside a specific directory.
pub fn create_temp_file_in(
    dir: &Path,
    content: impl AsRef<[u8]>,
    extension: &str,
) -> io::Result<PathBuf> {
    let suffix = match extension.trim_start_matches('.') {
        "" => String::new(),
        ext => format!(".{}", ext),
    };
    let mut file = tempfile::Builder::new().prefix(PREFIX).suffix(&suffix).tempfile_in(dir)?;
    file.write_all(content.as_ref())?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), "created temp file");
    Ok(path)
}

/// Outcome of [`cleanup_temp_files`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    /// Files already gone count as removed; anything else lands here.
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Remove every path, attempting each independently of the others.
pub fn cleanup_temp_files<I, P>(paths: I) -> CleanupReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = CleanupReport::default();
    for path in paths {
        let path = path.as_ref().to_path_buf();
        match std::fs::remove_file(&path) {
            Ok(()) => report.removed.push(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => report.removed.push(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
                report.failed.push((path, e));
            }
        }
    }
    report
}

/// Temp files owned by a scope; whatever is left is removed on drop.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, content: impl AsRef<[u8]>, extension: &str) -> io::Result<PathBuf> {
        let path = create_temp_file(content, extension)?;
        self.paths.push(path.clone());
        Ok(path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove all files now instead of at drop.
    pub fn cleanup(&mut self) -> CleanupReport {
        cleanup_temp_files(std::mem::take(&mut self.paths))
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            let _ = self.cleanup();
        }
    }
}

#[cfg(test)]
#[path = "temp_tests.rs"]
mod tests;
