//! Directory scanning: find manifests and classify each one.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ApplyError;

use super::Manifest;
use super::header::{Classification, SkipReason, classify_file};

/// A manifest that was found but left out of every bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedManifest {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Absolute path of the scanned directory
    pub directory: PathBuf,
    pub manifests: Vec<Manifest>,
    pub skipped: Vec<SkippedManifest>,
}

/// True for `.yaml` and `.yml` files. The match is case-sensitive.
pub fn is_manifest_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Scan `dir` (non-recursively) and classify every manifest in it.
///
/// Entries are visited in file-name order. Files with other extensions are
/// ignored without a trace; manifests that cannot be classified are returned
/// in `skipped` and logged.
pub fn scan_directory(dir: &Path, header_lines: usize) -> Result<ScanResult, ApplyError> {
    let dir = absolute_dir(dir)?;

    let entries = std::fs::read_dir(&dir).map_err(|e| ApplyError::Directory {
        path: dir.clone(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ApplyError::Directory {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_file() && is_manifest_path(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut result = ScanResult {
        directory: dir.clone(),
        ..ScanResult::default()
    };
    for path in paths {
        let (header, classification) = classify_file(&path, header_lines);
        match classification {
            Classification::Classified(kind) => {
                tracing::debug!(path = %path.display(), %kind, "Classified manifest");
                result.manifests.push(Manifest::new(path, kind, header));
            }
            Classification::Unclassified(reason) => {
                tracing::warn!(path = %path.display(), %reason, "Skipping manifest");
                result.skipped.push(SkippedManifest { path, reason });
            }
        }
    }

    Ok(result)
}

/// Resolve `dir` to an absolute path and check it is a readable directory.
pub fn absolute_dir(dir: &Path) -> Result<PathBuf, ApplyError> {
    let metadata = std::fs::metadata(dir).map_err(|e| ApplyError::Directory {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(ApplyError::Directory {
            path: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    std::path::absolute(dir).map_err(|e| ApplyError::Directory {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}
