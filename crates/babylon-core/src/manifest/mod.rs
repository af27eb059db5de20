//! Deployment manifests: discovery, header classification and documents.

pub mod document;
pub mod header;
pub mod scan;

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::types::ResourceKind;

pub use document::{ManifestDocument, ManifestSpec};
pub use header::{Classification, SkipReason, classify_file, parse_kind, read_header};
pub use scan::{ScanResult, SkippedManifest, is_manifest_path, scan_directory};

/// A classified manifest. The body is read only when it is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
    kind: ResourceKind,
    header: String,
}

impl Manifest {
    pub fn new(path: PathBuf, kind: ResourceKind, header: String) -> Self {
        Self { path, kind, header }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The lines the manifest was classified from.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Read the full file.
    pub fn content(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read manifest: {}", self.path.display()))
    }
}
