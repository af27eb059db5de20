//! Deploy coordination: batching manifests by kind and dispatching them.

pub mod api;
pub mod batch;
pub mod dispatcher;
pub mod report;

use std::path::Path;

use serde::Serialize;

use crate::types::ResourceKind;

pub use api::ApiDeployer;
pub use batch::DeploymentBatch;
pub use dispatcher::{Dispatcher, FailurePolicy};
pub use report::{ApplyReport, FileOutcome, OutcomeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployAction {
    Created,
    Updated,
}

/// What a deploy call produced on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedResource {
    pub kind: ResourceKind,
    pub id: Option<String>,
    pub action: DeployAction,
}

impl DeployedResource {
    pub fn created(kind: ResourceKind, id: Option<String>) -> Self {
        Self {
            kind,
            id,
            action: DeployAction::Created,
        }
    }

    pub fn updated(kind: ResourceKind, id: Option<String>) -> Self {
        Self {
            kind,
            id,
            action: DeployAction::Updated,
        }
    }
}

/// One deploy operation per resource kind.
///
/// The dispatcher calls these strictly in [`ResourceKind::DEPLOY_ORDER`], one
/// manifest at a time, so implementations may carry ids from earlier calls
/// into later ones.
pub trait Deployer {
    /// `header` is the classification window of the manifest.
    fn deploy_organization(
        &mut self,
        header: &str,
        content: &str,
    ) -> anyhow::Result<DeployedResource>;

    /// `directory` is the deployment directory, for payload files.
    fn deploy_solution(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource>;

    /// `directory` is the deployment directory, for payload files.
    fn deploy_workspace(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource>;

    fn deploy_webapp(&mut self, content: &str) -> anyhow::Result<DeployedResource>;

    fn deploy_dataset(&mut self, content: &str) -> anyhow::Result<DeployedResource>;
}

impl<D: Deployer + ?Sized> Deployer for &mut D {
    fn deploy_organization(
        &mut self,
        header: &str,
        content: &str,
    ) -> anyhow::Result<DeployedResource> {
        (**self).deploy_organization(header, content)
    }

    fn deploy_solution(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource> {
        (**self).deploy_solution(content, directory)
    }

    fn deploy_workspace(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource> {
        (**self).deploy_workspace(content, directory)
    }

    fn deploy_webapp(&mut self, content: &str) -> anyhow::Result<DeployedResource> {
        (**self).deploy_webapp(content)
    }

    fn deploy_dataset(&mut self, content: &str) -> anyhow::Result<DeployedResource> {
        (**self).deploy_dataset(content)
    }
}
