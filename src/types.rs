use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_id: String,
    pub teams_channel_uri: String,
    pub lookback_hours: i64,
    pub top_n: usize,
    pub report_interval_minutes: u64,
    pub template_path: PathBuf,
    pub metrics_endpoint: String,
    pub http_timeout_seconds: u64,
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

/// One per-minute average-CPU reading as returned by the metrics backend.
/// `value` is None for minutes where the backend reported no data.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Data model handed to the card template. `data` holds at most `top_n`
/// samples, sorted descending by value.
#[derive(Debug, Clone)]
pub struct CardPayload {
    pub title: String,
    pub message: String,
    pub data: Vec<MetricSample>,
}
