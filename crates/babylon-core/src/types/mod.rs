//! Shared core types used across manifest and deploy layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resource kinds a manifest can declare, in the order they are deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Organization,
    Solution,
    Workspace,
    WebApp,
    Dataset,
}

impl ResourceKind {
    /// Dispatch order. Later kinds may reference ids created by earlier ones.
    pub const DEPLOY_ORDER: [ResourceKind; 5] = [
        ResourceKind::Organization,
        ResourceKind::Solution,
        ResourceKind::Workspace,
        ResourceKind::WebApp,
        ResourceKind::Dataset,
    ];

    /// Spelling used in the `kind` field of a manifest.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Organization => "Organization",
            ResourceKind::Solution => "Solution",
            ResourceKind::Workspace => "Workspace",
            ResourceKind::WebApp => "WebApp",
            ResourceKind::Dataset => "Dataset",
        }
    }

    /// Position in [`ResourceKind::DEPLOY_ORDER`].
    pub fn order(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::DEPLOY_ORDER
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A `kind` value that names no known resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind '{0}'")]
pub struct UnknownKind(pub String);
