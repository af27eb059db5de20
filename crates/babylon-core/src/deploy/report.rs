//! Per-file outcomes of an apply run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::manifest::SkippedManifest;
use crate::types::ResourceKind;

use super::DeployAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Deployed {
        id: Option<String>,
        action: DeployAction,
    },
    Failed {
        error: String,
    },
    /// An earlier failure stopped the run before this file.
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub directory: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per classified manifest, in dispatch order
    pub outcomes: Vec<FileOutcome>,
    /// Manifests left out of every bucket
    pub skipped: Vec<SkippedManifest>,
}

impl ApplyReport {
    pub fn deployed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Deployed { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
    }

    pub fn not_attempted(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::NotAttempted)
    }

    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.status, OutcomeStatus::Deployed { .. }))
    }
}
