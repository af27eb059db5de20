//! Deployer backed by the platform REST API and Azure Resource Manager.
//!
//! Organizations, solutions, workspaces and datasets are created with `POST`
//! on their collection, or updated with `PATCH` when the payload carries an
//! `id`. Web apps are Azure static sites, written with `PUT` through ARM and
//! authenticated with the separate ARM token.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::config::{AZURE_TOKEN_VAR, AzureSettings, BabylonConfig, PlatformEnv};
use crate::manifest::ManifestDocument;
use crate::types::ResourceKind;

use super::{DeployedResource, Deployer};

/// Ids produced earlier in the run, used to link later resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentState {
    pub organization_id: Option<String>,
    pub solution_id: Option<String>,
}

pub struct ApiDeployer {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    service: Url,
    token: String,
    org_name: String,
    azure: AzureSettings,
    azure_token: Option<String>,
    state: DeploymentState,
}

impl ApiDeployer {
    pub fn new(env: &PlatformEnv, config: &BabylonConfig) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;
        let mut builder = reqwest::Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(Duration::from_secs(config.http.timeout_secs));
        if !config.http.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            runtime,
            client,
            service: env.service().clone(),
            token: env.token().to_string(),
            org_name: env.org_name().to_string(),
            azure: config.azure.clone(),
            azure_token: env.azure_token().map(String::from),
            state: DeploymentState::default(),
        })
    }

    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Create or update a platform resource under `segments`.
    fn upsert(
        &self,
        kind: ResourceKind,
        segments: &[&str],
        payload: Value,
    ) -> anyhow::Result<DeployedResource> {
        let collection = resource_url(&self.service, segments)?;
        let (method, url) = match existing_id(&payload) {
            Some(id) => (Method::PATCH, resource_url(&collection, &[id])?),
            None => (Method::POST, collection),
        };

        tracing::debug!(%kind, %method, %url, "Sending platform request");
        let response = self.send(method.clone(), url, &self.token, &payload)?;
        let id = response_id(&response).or_else(|| existing_id(&payload).map(String::from));

        Ok(if method == Method::PATCH {
            DeployedResource::updated(kind, id)
        } else {
            DeployedResource::created(kind, id)
        })
    }

    fn send(&self, method: Method, url: Url, token: &str, body: &Value) -> anyhow::Result<Value> {
        self.runtime
            .block_on(send_json(&self.client, method, url, token, body))
    }

    /// Organization for child resources: explicit in the manifest, else the
    /// one deployed earlier in this run.
    fn organization_for(&self, doc: &ManifestDocument) -> anyhow::Result<String> {
        doc.spec
            .organization_id
            .clone()
            .or_else(|| self.state.organization_id.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No organization id: set spec.organization_id or deploy an Organization manifest first"
                )
            })
    }
}

impl Deployer for ApiDeployer {
    fn deploy_organization(
        &mut self,
        header: &str,
        content: &str,
    ) -> anyhow::Result<DeployedResource> {
        tracing::debug!(header, "Organization manifest header");
        let doc = ManifestDocument::parse_as(content, ResourceKind::Organization)?;
        let mut payload = doc.inline_payload()?;
        if payload.get("name").is_none() {
            payload["name"] = Value::String(self.org_name.clone());
        }

        let deployed = self.upsert(ResourceKind::Organization, &["organizations"], payload)?;
        self.state.organization_id = deployed.id.clone();
        Ok(deployed)
    }

    fn deploy_solution(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource> {
        let doc = ManifestDocument::parse_as(content, ResourceKind::Solution)?;
        let organization_id = self.organization_for(&doc)?;
        let payload = doc.payload_in(directory)?;

        let deployed = self.upsert(
            ResourceKind::Solution,
            &["organizations", &organization_id, "solutions"],
            payload,
        )?;
        self.state.solution_id = deployed.id.clone();
        Ok(deployed)
    }

    fn deploy_workspace(
        &mut self,
        content: &str,
        directory: &Path,
    ) -> anyhow::Result<DeployedResource> {
        let doc = ManifestDocument::parse_as(content, ResourceKind::Workspace)?;
        let organization_id = self.organization_for(&doc)?;
        let mut payload = doc.payload_in(directory)?;
        if let Some(solution_id) = &self.state.solution_id {
            link_solution(&mut payload, solution_id);
        }

        self.upsert(
            ResourceKind::Workspace,
            &["organizations", &organization_id, "workspaces"],
            payload,
        )
    }

    fn deploy_webapp(&mut self, content: &str) -> anyhow::Result<DeployedResource> {
        let doc = ManifestDocument::parse_as(content, ResourceKind::WebApp)?;
        let azure_token = self.azure_token.as_deref().ok_or_else(|| {
            anyhow::anyhow!("WebApp deploy requires {} to be set", AZURE_TOKEN_VAR)
        })?;
        let payload = doc.inline_payload()?;
        let url = static_site_url(&self.azure, &doc)?;

        tracing::debug!(%url, "Sending static web app request");
        let response = self.send(Method::PUT, url, azure_token, &payload)?;
        Ok(DeployedResource::created(
            ResourceKind::WebApp,
            response_id(&response),
        ))
    }

    fn deploy_dataset(&mut self, content: &str) -> anyhow::Result<DeployedResource> {
        let doc = ManifestDocument::parse_as(content, ResourceKind::Dataset)?;
        let organization_id = self.organization_for(&doc)?;
        let payload = doc.inline_payload()?;

        self.upsert(
            ResourceKind::Dataset,
            &["organizations", &organization_id, "datasets"],
            payload,
        )
    }
}

async fn send_json(
    client: &reqwest::Client,
    method: Method,
    url: Url,
    token: &str,
    body: &Value,
) -> anyhow::Result<Value> {
    let response = client
        .request(method.clone(), url.clone())
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .with_context(|| format!("Failed to send {} {}", method, url))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .with_context(|| format!("Failed to read response from {}", url))?;

    if !status.is_success() {
        anyhow::bail!("HTTP {} from {} {}: {}", status, method, url, text.trim());
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON response from {}", url))
}

/// Append path segments to `base`, percent-encoding each one.
pub fn resource_url(base: &Url, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Cannot append a path to {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Non-empty `id` in a payload marks an update of an existing resource.
pub fn existing_id(payload: &Value) -> Option<&str> {
    payload
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
}

fn response_id(response: &Value) -> Option<String> {
    response.get("id").and_then(Value::as_str).map(String::from)
}

/// Fill `solution.solutionId` unless the payload already names a solution.
pub fn link_solution(payload: &mut Value, solution_id: &str) {
    let Some(object) = payload.as_object_mut() else {
        return;
    };
    let solution = object
        .entry("solution")
        .or_insert_with(|| Value::Object(Default::default()));
    if let Some(solution) = solution.as_object_mut() {
        let missing = solution
            .get("solutionId")
            .and_then(Value::as_str)
            .is_none_or(|s| s.is_empty());
        if missing {
            solution.insert(
                "solutionId".to_string(),
                Value::String(solution_id.to_string()),
            );
        }
    }
}

pub fn static_site_url(azure: &AzureSettings, doc: &ManifestDocument) -> anyhow::Result<Url> {
    let require = |value: &Option<String>, key: &str| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(String::from)
            .ok_or_else(|| anyhow::anyhow!("WebApp manifest is missing spec.{}", key))
    };
    let subscription = require(&doc.spec.subscription_id, "subscription_id")?;
    let resource_group = require(&doc.spec.resource_group_name, "resource_group_name")?;
    let name = require(&doc.spec.webapp_name, "webapp_name")?;

    let base = Url::parse(&azure.arm_endpoint)
        .with_context(|| format!("Invalid ARM endpoint: {}", azure.arm_endpoint))?;
    let mut url = resource_url(
        &base,
        &[
            "subscriptions",
            &subscription,
            "resourceGroups",
            &resource_group,
            "providers",
            "Microsoft.Web",
            "staticSites",
            &name,
        ],
    )?;
    url.query_pairs_mut()
        .append_pair("api-version", &azure.static_sites_api_version);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_url_appends_and_encodes() {
        let base = Url::parse("https://api.example.com/v3/").unwrap();
        let url = resource_url(&base, &["organizations", "o 1", "solutions"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v3/organizations/o%201/solutions"
        );
    }

    #[test]
    fn existing_id_ignores_blank() {
        assert_eq!(existing_id(&json!({"id": "o-1"})), Some("o-1"));
        assert_eq!(existing_id(&json!({"id": ""})), None);
        assert_eq!(existing_id(&json!({"name": "x"})), None);
    }

    #[test]
    fn link_solution_fills_missing_id_only() {
        let mut payload = json!({"key": "ws"});
        link_solution(&mut payload, "sol-1");
        assert_eq!(payload["solution"]["solutionId"], "sol-1");

        let mut payload = json!({"solution": {"solutionId": "sol-keep"}});
        link_solution(&mut payload, "sol-1");
        assert_eq!(payload["solution"]["solutionId"], "sol-keep");
    }

    #[test]
    fn static_site_url_requires_routing() {
        let azure = AzureSettings::default();
        let doc = ManifestDocument::parse(
            "kind: WebApp\nspec:\n  subscription_id: sub\n  resource_group_name: rg\n  webapp_name: app\n",
        )
        .unwrap();
        let url = static_site_url(&azure, &doc).unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Web/staticSites/app?api-version=2022-03-01"
        );

        let doc = ManifestDocument::parse("kind: WebApp\nspec:\n  subscription_id: sub\n").unwrap();
        let err = static_site_url(&azure, &doc).unwrap_err();
        assert!(err.to_string().contains("resource_group_name"));
    }
}
