//! Apply command implementation.
//!
//! Scans a deployment directory, classifies its manifests by `kind` and
//! deploys them in the fixed order Organization, Solution, Workspace, WebApp,
//! Dataset.

use std::path::PathBuf;

use crate::deploy::{ApplyReport, Deployer, DeploymentBatch, Dispatcher, FailurePolicy};
use crate::manifest::{SkippedManifest, scan_directory};

use super::context::ApplyContext;

/// Options for the apply command
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Directory holding the manifests
    pub directory: PathBuf,
    /// Keep deploying after a failure (also enabled by `apply.keep_going`)
    pub keep_going: bool,
}

impl ApplyOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            keep_going: false,
        }
    }

    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }
}

/// What an apply run would deploy, without deploying it.
#[derive(Debug, Clone)]
pub struct ApplyPlan {
    /// Absolute deployment directory
    pub directory: PathBuf,
    pub batch: DeploymentBatch,
    pub skipped: Vec<SkippedManifest>,
}

#[derive(Debug, Clone)]
pub struct ApplyCommand {
    context: ApplyContext,
}

impl ApplyCommand {
    pub fn new(context: ApplyContext) -> Self {
        Self { context }
    }

    /// Create an apply command from the process environment and config file.
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(ApplyContext::with_defaults()?))
    }

    pub fn context(&self) -> &ApplyContext {
        &self.context
    }

    /// Scan and classify without deploying.
    pub fn plan(&self, options: &ApplyOptions) -> anyhow::Result<ApplyPlan> {
        let header_lines = self.context.config().apply.header_lines;
        let scan = scan_directory(&options.directory, header_lines)?;

        tracing::info!(
            directory = %scan.directory.display(),
            manifests = scan.manifests.len(),
            skipped = scan.skipped.len(),
            "Scanned deployment directory"
        );

        Ok(ApplyPlan {
            directory: scan.directory,
            batch: DeploymentBatch::from_manifests(scan.manifests),
            skipped: scan.skipped,
        })
    }

    /// Deploy every classified manifest with `deployer`.
    pub fn execute<D: Deployer>(
        &self,
        options: &ApplyOptions,
        deployer: D,
    ) -> anyhow::Result<ApplyReport> {
        let plan = self.plan(options)?;

        let policy = if options.keep_going || self.context.config().apply.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        };

        let mut dispatcher = Dispatcher::new(deployer, policy);
        let report = dispatcher.dispatch(&plan.batch, &plan.directory, plan.skipped);

        tracing::info!(
            deployed = report.deployed().count(),
            failed = report.failed().count(),
            skipped = report.skipped.len(),
            "Apply finished"
        );
        Ok(report)
    }
}
