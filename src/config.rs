use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ReportError;
use crate::types::Config;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    // Setting names match the original Azure Function app settings.
    let server_id = require(env, "serverId")?;
    let teams_channel_uri = require(env, "TeamsChannelUri")?;

    let lookback_hours: i64 = env
        .get_var("LOOKBACK_HOURS")
        .unwrap_or_else(|| "24".to_string())
        .parse()
        .context("Invalid LOOKBACK_HOURS")?;

    let top_n: usize = env
        .get_var("TOP_N")
        .unwrap_or_else(|| "10".to_string())
        .parse()
        .context("Invalid TOP_N")?;

    let report_interval_minutes: u64 = env
        .get_var("REPORT_INTERVAL_MINUTES")
        .unwrap_or_else(|| "60".to_string())
        .parse()
        .unwrap_or(60);

    let http_timeout_seconds: u64 = env
        .get_var("HTTP_TIMEOUT_SECONDS")
        .unwrap_or_else(|| "30".to_string())
        .parse()
        .unwrap_or(30);

    let template_path = PathBuf::from(
        env.get_var("TEMPLATE_PATH")
            .unwrap_or_else(|| "templates/adaptive_card.json".to_string()),
    );

    let metrics_endpoint = env
        .get_var("METRICS_ENDPOINT")
        .unwrap_or_else(|| "https://management.azure.com".to_string())
        .trim_end_matches('/')
        .to_string();

    Ok(Config {
        server_id,
        teams_channel_uri,
        lookback_hours,
        top_n,
        report_interval_minutes,
        template_path,
        metrics_endpoint,
        http_timeout_seconds,
    })
}

fn require<E: EnvironmentProvider>(env: &E, key: &str) -> Result<String> {
    env.get_var(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ReportError::ConfigurationMissing {
                key: key.to_string(),
            }
            .into()
        })
}
