//! Shared fixtures for babylon-core integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use babylon_core::commands::{ApplyCommand, ApplyContext};
use babylon_core::config::{BabylonConfig, PlatformEnv};
use babylon_core::deploy::{DeployedResource, Deployer};
use babylon_core::types::ResourceKind;
use tempfile::TempDir;
use url::Url;

/// One recorded deploy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: ResourceKind,
    pub content: String,
    pub header: Option<String>,
    pub directory: Option<PathBuf>,
}

/// Deployer double that records every call and fails on request.
#[derive(Debug, Default)]
pub struct RecordingDeployer {
    pub calls: Vec<Call>,
    /// Calls whose content contains this marker return an error
    pub fail_marker: Option<String>,
}

impl RecordingDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            calls: Vec::new(),
            fail_marker: Some(marker.to_string()),
        }
    }

    pub fn kinds(&self) -> Vec<ResourceKind> {
        self.calls.iter().map(|c| c.kind).collect()
    }

    fn record(
        &mut self,
        kind: ResourceKind,
        content: &str,
        header: Option<&str>,
        directory: Option<&Path>,
    ) -> anyhow::Result<DeployedResource> {
        self.calls.push(Call {
            kind,
            content: content.to_string(),
            header: header.map(String::from),
            directory: directory.map(Path::to_path_buf),
        });
        if let Some(marker) = &self.fail_marker
            && content.contains(marker.as_str())
        {
            anyhow::bail!("{} deploy rejected", kind);
        }
        Ok(DeployedResource::created(
            kind,
            Some(format!("{}-{}", kind.as_str().to_lowercase(), self.calls.len())),
        ))
    }
}

impl Deployer for RecordingDeployer {
    fn deploy_organization(
        &mut self,
        header: &str,
        content: &str,
    ) -> anyhow::Result<DeployedResource> {
        self.record(ResourceKind::Organization, content, Some(header), None)
    }

    fn deploy_solution(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource> {
        self.record(ResourceKind::Solution, content, None, Some(directory))
    }

    fn deploy_workspace(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource> {
        self.record(ResourceKind::Workspace, content, None, Some(directory))
    }

    fn deploy_webapp(&mut self, content: &str) -> anyhow::Result<DeployedResource> {
        self.record(ResourceKind::WebApp, content, None, None)
    }

    fn deploy_dataset(&mut self, content: &str) -> anyhow::Result<DeployedResource> {
        self.record(ResourceKind::Dataset, content, None, None)
    }
}

pub fn test_env() -> PlatformEnv {
    PlatformEnv::new(
        Url::parse("https://api.example.com/v3/").unwrap(),
        "token",
        "cosmo",
    )
}

pub fn apply_command() -> ApplyCommand {
    ApplyCommand::new(ApplyContext::new(test_env(), BabylonConfig::default()))
}

pub fn apply_command_with(config: BabylonConfig) -> ApplyCommand {
    ApplyCommand::new(ApplyContext::new(test_env(), config))
}

/// Temp directory holding a deployment directory at `<temp>/deploy`.
pub fn deploy_dir() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path().join("deploy");
    std::fs::create_dir_all(&dir).expect("Failed to create deploy dir");
    (temp, dir)
}

pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Minimal manifest of `kind` with a recognisable body line.
pub fn manifest(kind: &str, body: &str) -> String {
    format!("kind: {kind}\nnamespace:\n  remote: false\nspec:\n  payload:\n    name: {body}\n")
}
