use anyhow::Result;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

mod azure;
mod card;
mod config;
mod credentials;
mod error;
mod job;
mod selection;
mod teams;
mod types;

use config::load_config;
use credentials::AzureCliCredential;
use job::ReportJob;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    info!(
        "reporting on {} every {} minutes",
        cfg.server_id, cfg.report_interval_minutes
    );

    let credentials = AzureCliCredential::new(&cfg.metrics_endpoint);
    let job = ReportJob::new(&cfg, &credentials);

    // The first tick completes immediately, giving the run-on-startup
    // behavior. Ticks are awaited sequentially, so a slow run cannot
    // overlap the next one; a missed tick is skipped rather than queued.
    let mut ticker = interval(Duration::from_secs(cfg.report_interval_minutes.max(1) * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        info!("report tick started");
        match job.run_once().await {
            Ok(()) => info!("report tick completed"),
            Err(err) => error!("report tick failed: {:#}", err),
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
