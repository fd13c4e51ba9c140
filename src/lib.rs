// Public modules
pub mod azure;
pub mod card;
pub mod config;
pub mod credentials;
pub mod error;
pub mod job;
pub mod selection;
pub mod teams;
pub mod types;

// Re-export commonly used items
pub use azure::{flatten_response, MetricsFetcher, MetricsResponse};
pub use card::{load_template, render_card, wrap_in_envelope};
pub use config::{
    load_config, load_config_with_env, EnvironmentProvider, MockEnvironment, SystemEnvironment,
};
pub use credentials::{AzureCliCredential, CredentialProvider, StaticCredential};
pub use error::ReportError;
pub use job::ReportJob;
pub use selection::select_top;
pub use teams::post_to_teams;
pub use types::{CardPayload, Config, MetricSample};
