use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for a single report invocation. None of these are
/// recovered locally; every one terminates the current tick and is logged.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("missing required setting `{key}`")]
    ConfigurationMissing { key: String },

    #[error("card template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    #[error("metrics query failed: {detail}")]
    MetricsQueryFailed { detail: String },

    #[error("failed to post to teams: {detail}")]
    NotificationFailed { detail: String },
}
