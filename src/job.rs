use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::info;

use crate::azure::MetricsFetcher;
use crate::card::{format_timestamp, load_template, render_card, wrap_in_envelope};
use crate::credentials::CredentialProvider;
use crate::selection::select_top;
use crate::teams::post_to_teams;
use crate::types::{CardPayload, Config};

/// One report invocation: fetch -> select -> render -> post, strictly
/// sequential, stateless end to end. Any step failing aborts the run.
pub struct ReportJob<'a> {
    config: &'a Config,
    credentials: &'a dyn CredentialProvider,
}

impl<'a> ReportJob<'a> {
    pub fn new(config: &'a Config, credentials: &'a dyn CredentialProvider) -> Self {
        Self {
            config,
            credentials,
        }
    }

    pub async fn run_once(&self) -> Result<()> {
        let to = Utc::now();
        let from = to - Duration::hours(self.config.lookback_hours);

        // Load the template before touching the network so a missing bundle
        // fails without wasting a metrics query.
        let template = load_template(&self.config.template_path)?;

        let fetcher = MetricsFetcher::new(
            &self.config.metrics_endpoint,
            self.credentials,
            self.config.http_timeout(),
        )?;
        let samples = fetcher.fetch(&self.config.server_id, from, to).await?;
        info!("fetched {} samples for {}", samples.len(), self.config.server_id);

        let top = select_top(&samples, self.config.top_n);
        info!("selected top {} of {} samples", top.len(), samples.len());

        let payload = CardPayload {
            title: format!(
                "VM Metrics between {} and {}",
                format_timestamp(from),
                format_timestamp(to)
            ),
            message: "Below are the top CPU minutes for the last 24 hours.".to_string(),
            data: top,
        };

        let card = render_card(&template, &payload)?;
        let envelope = wrap_in_envelope(card);

        let client = reqwest::Client::builder()
            .timeout(self.config.http_timeout())
            .build()
            .context("Failed to build webhook HTTP client")?;
        post_to_teams(&client, &self.config.teams_channel_uri, &envelope).await
    }
}
