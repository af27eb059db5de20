//! Platform prerequisites read from the environment.

use url::Url;

use crate::error::ApplyError;

pub const SERVICE_VAR: &str = "BABYLON_SERVICE";
pub const TOKEN_VAR: &str = "BABYLON_TOKEN";
pub const ORG_NAME_VAR: &str = "BABYLON_ORG_NAME";
/// Azure Resource Manager access token, only needed to deploy web apps.
pub const AZURE_TOKEN_VAR: &str = "BABYLON_AZURE_TOKEN";

/// Platform endpoint, credentials and organization for one run.
#[derive(Clone)]
pub struct PlatformEnv {
    service: Url,
    token: String,
    org_name: String,
    azure_token: Option<String>,
}

impl PlatformEnv {
    pub fn new(service: Url, token: impl Into<String>, org_name: impl Into<String>) -> Self {
        Self {
            service,
            token: token.into(),
            org_name: org_name.into(),
            azure_token: None,
        }
    }

    pub fn with_azure_token(mut self, token: impl Into<String>) -> Self {
        self.azure_token = Some(token.into());
        self
    }

    /// Read the required variables from the process environment.
    pub fn from_env() -> Result<Self, ApplyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the required variables through `lookup`.
    ///
    /// Every missing (or empty) variable is reported in a single error.
    /// `BABYLON_AZURE_TOKEN` is optional here; web app deploys fail without it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApplyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |name: &str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(name.to_string());
            }
            value.unwrap_or_default()
        };
        let service = require(SERVICE_VAR);
        let token = require(TOKEN_VAR);
        let org_name = require(ORG_NAME_VAR);

        if !missing.is_empty() {
            return Err(ApplyError::MissingEnvironment { names: missing });
        }

        let service = parse_service(&service)?;
        let azure_token = lookup(AZURE_TOKEN_VAR).filter(|v| !v.trim().is_empty());
        Ok(Self {
            azure_token,
            ..Self::new(service, token, org_name)
        })
    }

    pub fn service(&self) -> &Url {
        &self.service
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    /// Bearer token for Azure Resource Manager, never the platform token.
    pub fn azure_token(&self) -> Option<&str> {
        self.azure_token.as_deref()
    }
}

impl std::fmt::Debug for PlatformEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformEnv")
            .field("service", &self.service.as_str())
            .field("token", &"<redacted>")
            .field(
                "azure_token",
                &self.azure_token.as_ref().map(|_| "<redacted>"),
            )
            .field("org_name", &self.org_name)
            .finish()
    }
}

/// Parse the service endpoint, normalising it to end with `/` so relative
/// joins append instead of replacing the last path segment.
fn parse_service(raw: &str) -> Result<Url, ApplyError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| ApplyError::InvalidService {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApplyError::InvalidService {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_all_required_vars() {
        let env = PlatformEnv::from_lookup(lookup_from(&[
            (SERVICE_VAR, "https://api.example.com/v3"),
            (TOKEN_VAR, "secret"),
            (ORG_NAME_VAR, "cosmo"),
        ]))
        .unwrap();

        assert_eq!(env.service().as_str(), "https://api.example.com/v3/");
        assert_eq!(env.token(), "secret");
        assert_eq!(env.org_name(), "cosmo");
    }

    #[test]
    fn reports_every_missing_var() {
        let err = PlatformEnv::from_lookup(lookup_from(&[(TOKEN_VAR, "secret")])).unwrap_err();
        match err {
            ApplyError::MissingEnvironment { names } => {
                assert_eq!(names, vec![SERVICE_VAR.to_string(), ORG_NAME_VAR.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = PlatformEnv::from_lookup(lookup_from(&[
            (SERVICE_VAR, "https://api.example.com"),
            (TOKEN_VAR, "  "),
            (ORG_NAME_VAR, "cosmo"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApplyError::MissingEnvironment { ref names } if names == &[TOKEN_VAR]));
    }

    #[test]
    fn rejects_non_http_service() {
        let err = PlatformEnv::from_lookup(lookup_from(&[
            (SERVICE_VAR, "ftp://api.example.com"),
            (TOKEN_VAR, "secret"),
            (ORG_NAME_VAR, "cosmo"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApplyError::InvalidService { .. }));
    }

    #[test]
    fn debug_redacts_token() {
        let env = PlatformEnv::new(
            Url::parse("https://api.example.com/").unwrap(),
            "secret",
            "cosmo",
        )
        .with_azure_token("arm-secret");
        let rendered = format!("{env:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn azure_token_is_optional() {
        let base = [
            (SERVICE_VAR, "https://api.example.com"),
            (TOKEN_VAR, "secret"),
            (ORG_NAME_VAR, "cosmo"),
        ];
        let env = PlatformEnv::from_lookup(lookup_from(&base)).unwrap();
        assert_eq!(env.azure_token(), None);

        let mut with_azure = base.to_vec();
        with_azure.push((AZURE_TOKEN_VAR, "arm-token"));
        let env = PlatformEnv::from_lookup(lookup_from(&with_azure)).unwrap();
        assert_eq!(env.azure_token(), Some("arm-token"));
        assert_eq!(env.token(), "secret");
    }
}
