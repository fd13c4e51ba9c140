use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info};

use crate::error::ReportError;

/// Posts the message envelope to the Teams incoming webhook.
///
/// The webhook signals acceptance with HTTP success AND a response body that
/// is literally `"1"`. Anything else (including `"0"` on a 200) is a
/// rejection; do not relax this check.
pub async fn post_to_teams(
    client: &reqwest::Client,
    webhook_url: &str,
    envelope: &Value,
) -> Result<()> {
    let res = client
        .post(webhook_url)
        .json(envelope)
        .send()
        .await
        .context("Failed to send Teams request")?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        error!("Teams webhook failed: {} - {}", status, body);
        return Err(ReportError::NotificationFailed {
            detail: format!("{}", status),
        }
        .into());
    }

    let body = res
        .text()
        .await
        .context("Failed to read Teams response body")?;
    if body != "1" {
        return Err(ReportError::NotificationFailed { detail: body }.into());
    }

    info!("Response from teams: {}", body);
    Ok(())
}
