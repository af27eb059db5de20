//! Sequential dispatch of a deployment batch to a [`Deployer`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;

use crate::manifest::{Manifest, SkippedManifest};
use crate::types::ResourceKind;

use super::report::{ApplyReport, FileOutcome, OutcomeStatus};
use super::{DeployedResource, Deployer, DeploymentBatch};

/// What to do with the rest of the batch after a deploy fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure; remaining files are not attempted.
    #[default]
    Abort,
    /// Attempt every file and record each outcome.
    Continue,
}

pub struct Dispatcher<D> {
    deployer: D,
    policy: FailurePolicy,
}

impl<D: Deployer> Dispatcher<D> {
    pub fn new(deployer: D, policy: FailurePolicy) -> Self {
        Self { deployer, policy }
    }

    /// Deploy every manifest in `batch`, bucket by bucket.
    ///
    /// `directory` is handed to the deploy calls that resolve files relative
    /// to the deployment directory. `skipped` is carried into the report.
    pub fn dispatch(
        &mut self,
        batch: &DeploymentBatch,
        directory: &Path,
        skipped: Vec<SkippedManifest>,
    ) -> ApplyReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(batch.len());
        let mut halted = false;

        for (kind, bucket) in batch.iter() {
            if !bucket.is_empty() {
                tracing::info!(%kind, count = bucket.len(), "Deploying bucket");
            }
            for manifest in bucket {
                if halted {
                    outcomes.push(outcome(manifest, OutcomeStatus::NotAttempted));
                    continue;
                }

                let status = self.dispatch_one(kind, manifest, directory);
                if matches!(status, OutcomeStatus::Failed { .. })
                    && self.policy == FailurePolicy::Abort
                {
                    halted = true;
                }
                outcomes.push(outcome(manifest, status));
            }
        }

        ApplyReport {
            directory: directory.to_path_buf(),
            started_at,
            finished_at: Utc::now(),
            outcomes,
            skipped,
        }
    }

    fn dispatch_one(
        &mut self,
        kind: ResourceKind,
        manifest: &Manifest,
        directory: &Path,
    ) -> OutcomeStatus {
        let path = manifest.path();
        tracing::debug!(path = %path.display(), %kind, "Starting deploy");
        let start = Instant::now();

        let result = manifest
            .content()
            .and_then(|content| self.call(kind, manifest, &content, directory));
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(DeployedResource { id, action, .. }) => {
                tracing::info!(
                    path = %path.display(),
                    %kind,
                    id = id.as_deref().unwrap_or("-"),
                    elapsed_ms,
                    "Deployed"
                );
                OutcomeStatus::Deployed { id, action }
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    %kind,
                    elapsed_ms,
                    error = %format!("{e:#}"),
                    "Deploy failed"
                );
                OutcomeStatus::Failed {
                    error: format!("{e:#}"),
                }
            }
        }
    }

    fn call(
        &mut self,
        kind: ResourceKind,
        manifest: &Manifest,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource> {
        match kind {
            ResourceKind::Organization => self
                .deployer
                .deploy_organization(manifest.header(), content),
            ResourceKind::Solution => self.deployer.deploy_solution(content, directory),
            ResourceKind::Workspace => self.deployer.deploy_workspace(content, directory),
            ResourceKind::WebApp => self.deployer.deploy_webapp(content),
            ResourceKind::Dataset => self.deployer.deploy_dataset(content),
        }
    }
}

fn outcome(manifest: &Manifest, status: OutcomeStatus) -> FileOutcome {
    FileOutcome {
        path: PathBuf::from(manifest.path()),
        kind: manifest.kind(),
        status,
    }
}
