use anyhow::{ensure, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::credentials::CredentialProvider;
use crate::error::ReportError;
use crate::types::MetricSample;

const METRICS_API_VERSION: &str = "2018-01-01";
const METRIC_NAME: &str = "Percentage CPU";

// Wire shape of the Azure Monitor metrics response:
// metric -> timeseries -> per-minute data points.
#[derive(Debug, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub value: Vec<MetricEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MetricEntry {
    #[serde(default)]
    pub timeseries: Vec<TimeSeriesEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TimeSeriesEntry {
    #[serde(default)]
    pub data: Vec<MetricPoint>,
}

#[derive(Debug, Deserialize)]
pub struct MetricPoint {
    #[serde(rename = "timeStamp")]
    pub time_stamp: DateTime<Utc>,
    pub average: Option<f64>,
}

/// Queries average-CPU samples from the Azure Monitor REST API.
pub struct MetricsFetcher<'a> {
    base_url: String,
    credentials: &'a dyn CredentialProvider,
    client: reqwest::Client,
}

impl<'a> MetricsFetcher<'a> {
    pub fn new(
        base_url: &str,
        credentials: &'a dyn CredentialProvider,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build metrics HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client,
        })
    }

    /// One query for per-minute "Percentage CPU" averages over [from, to),
    /// flattened into backend order. Transport, auth, and throttling
    /// failures all propagate unrecovered.
    pub async fn fetch(
        &self,
        resource_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MetricSample>> {
        ensure!(from < to, "metrics time range is empty: {} >= {}", from, to);

        let token = self.credentials.bearer_token()?;
        let url = format!(
            "{}{}/providers/Microsoft.Insights/metrics",
            self.base_url, resource_id
        );
        let timespan = format!(
            "{}/{}",
            from.to_rfc3339_opts(SecondsFormat::Secs, true),
            to.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        debug!("querying {} for {}", url, timespan);

        let res = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("api-version", METRICS_API_VERSION),
                ("metricnames", METRIC_NAME),
                ("aggregation", "Average"),
                ("interval", "PT1M"),
                ("timespan", timespan.as_str()),
            ])
            .send()
            .await
            .context("Failed to send metrics query")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ReportError::MetricsQueryFailed {
                detail: format!("{} - {}", status, body),
            }
            .into());
        }

        let response: MetricsResponse = res
            .json()
            .await
            .context("Failed to parse metrics response")?;
        Ok(flatten_response(response))
    }
}

/// Flattens metric -> timeseries -> points into one sequence, preserving
/// the chronological order the backend returned.
pub fn flatten_response(response: MetricsResponse) -> Vec<MetricSample> {
    let mut samples = Vec::new();
    for metric in response.value {
        for series in metric.timeseries {
            for point in series.data {
                samples.push(MetricSample {
                    timestamp: point.time_stamp,
                    value: point.average,
                });
            }
        }
    }
    samples
}
