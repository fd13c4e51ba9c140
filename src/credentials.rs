use anyhow::{Context, Result};
use serde::Deserialize;
use std::process::Command;

use crate::error::ReportError;

/// Source of bearer tokens for the metrics backend. Passed into the fetcher
/// at construction so tests can substitute a stub.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String>;
}

/// Acquires tokens from the ambient `az` CLI login, the same identity chain
/// the deployment environment provides.
pub struct AzureCliCredential {
    resource: String,
}

#[derive(Debug, Deserialize)]
struct CliTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

impl AzureCliCredential {
    /// `endpoint` is the resource manager base URL the token must be scoped
    /// to, e.g. `https://management.azure.com`.
    pub fn new(endpoint: &str) -> Self {
        Self {
            resource: format!("{}/", endpoint.trim_end_matches('/')),
        }
    }
}

impl CredentialProvider for AzureCliCredential {
    fn bearer_token(&self) -> Result<String> {
        let output = Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                &self.resource,
                "--output",
                "json",
            ])
            .output()
            .context("Failed to run `az account get-access-token`")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::MetricsQueryFailed {
                detail: format!("az credential error: {}", stderr.trim()),
            }
            .into());
        }

        let parsed: CliTokenResponse = serde_json::from_slice(&output.stdout)
            .context("Unexpected output from `az account get-access-token`")?;
        Ok(parsed.access_token)
    }
}

/// Fixed-token provider for tests and stub backends.
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new<T: Into<String>>(token: T) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CredentialProvider for StaticCredential {
    fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
