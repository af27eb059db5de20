//! Full manifest document, parsed at deploy time.
//!
//! ```yaml
//! kind: Workspace
//! namespace:
//!   remote: false
//! spec:
//!   organization_id: o-123        # optional
//!   payload_file: workspace.json  # optional, Solution/Workspace only
//!   payload:
//!     key: demo
//!     name: Demo workspace
//! ```

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::types::ResourceKind;

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestDocument {
    pub kind: ResourceKind,

    #[serde(default)]
    pub spec: ManifestSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestSpec {
    /// Request body sent to the platform
    #[serde(default)]
    pub payload: Option<serde_yaml::Value>,

    /// Body stored in a separate file, relative to the deployment directory
    #[serde(default)]
    pub payload_file: Option<PathBuf>,

    /// Explicit parent organization
    #[serde(default)]
    pub organization_id: Option<String>,

    // WebApp routing
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub resource_group_name: Option<String>,
    #[serde(default)]
    pub webapp_name: Option<String>,
}

impl ManifestDocument {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse manifest document")
    }

    /// Parse and check the document declares `expected`.
    pub fn parse_as(content: &str, expected: ResourceKind) -> anyhow::Result<Self> {
        let doc = Self::parse(content)?;
        if doc.kind != expected {
            anyhow::bail!(
                "Manifest declares kind '{}' but was dispatched as '{}'",
                doc.kind,
                expected
            );
        }
        Ok(doc)
    }

    /// Inline payload as JSON. An absent payload is an empty object.
    pub fn inline_payload(&self) -> anyhow::Result<Value> {
        match &self.spec.payload {
            None | Some(serde_yaml::Value::Null) => Ok(Value::Object(Default::default())),
            Some(yaml) => yaml_to_json(yaml),
        }
    }

    /// Payload as JSON, loading `payload_file` from `directory` when set.
    pub fn payload_in(&self, directory: &Path) -> anyhow::Result<Value> {
        let Some(relative) = &self.spec.payload_file else {
            return self.inline_payload();
        };
        let path = resolve_payload_path(directory, relative)?;
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read payload file: {}", path.display()))?;
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse payload file: {}", path.display()))?;
        yaml_to_json(&yaml)
    }
}

fn yaml_to_json(yaml: &serde_yaml::Value) -> anyhow::Result<Value> {
    let json = serde_json::to_value(yaml).context("Payload cannot be represented as JSON")?;
    if !json.is_object() {
        anyhow::bail!("Payload must be a mapping");
    }
    Ok(json)
}

fn resolve_payload_path(directory: &Path, relative: &Path) -> anyhow::Result<PathBuf> {
    if relative.is_absolute() {
        anyhow::bail!("Absolute paths not allowed for payload_file");
    }
    for component in relative.components() {
        if let Component::ParentDir = component {
            anyhow::bail!("Path traversal not allowed for payload_file");
        }
    }
    Ok(directory.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_inline_payload() {
        let doc = ManifestDocument::parse(
            "kind: Organization\nspec:\n  payload:\n    name: Cosmo\n    security:\n      default: viewer\n",
        )
        .unwrap();
        assert_eq!(doc.kind, ResourceKind::Organization);
        let payload = doc.inline_payload().unwrap();
        assert_eq!(payload["name"], "Cosmo");
        assert_eq!(payload["security"]["default"], "viewer");
    }

    #[test]
    fn missing_payload_is_empty_object() {
        let doc = ManifestDocument::parse("kind: Dataset\n").unwrap();
        assert_eq!(doc.inline_payload().unwrap(), serde_json::json!({}));
    }

    #[test]
    fn scalar_payload_rejected() {
        let doc = ManifestDocument::parse("kind: Dataset\nspec:\n  payload: hello\n").unwrap();
        assert!(doc.inline_payload().is_err());
    }

    #[test]
    fn namespace_block_is_ignored() {
        let doc = ManifestDocument::parse(
            "kind: Solution\nnamespace: null\nspec:\n  payload:\n    key: brewery\n",
        )
        .unwrap();
        assert_eq!(doc.inline_payload().unwrap()["key"], "brewery");

        let doc = ManifestDocument::parse("kind: Solution\nnamespace:\n  remote: false\n").unwrap();
        assert_eq!(doc.kind, ResourceKind::Solution);
    }

    #[test]
    fn parse_as_checks_kind() {
        let err = ManifestDocument::parse_as("kind: Dataset\n", ResourceKind::Solution).unwrap_err();
        assert!(err.to_string().contains("Dataset"));
    }

    #[test]
    fn payload_file_is_resolved_against_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("solution.json"),
            r#"{"key": "brewery", "name": "Brewery"}"#,
        )
        .unwrap();
        let doc = ManifestDocument::parse(
            "kind: Solution\nspec:\n  payload_file: solution.json\n  payload:\n    ignored: true\n",
        )
        .unwrap();

        let payload = doc.payload_in(temp.path()).unwrap();
        assert_eq!(payload["key"], "brewery");
        assert!(payload.get("ignored").is_none());
    }

    #[test]
    fn payload_file_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        let doc =
            ManifestDocument::parse("kind: Solution\nspec:\n  payload_file: ../secret.json\n")
                .unwrap();
        let err = doc.payload_in(temp.path()).unwrap_err();
        assert!(err.to_string().contains("traversal"));
    }
}
