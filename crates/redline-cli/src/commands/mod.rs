pub mod completions;
pub mod health;
pub mod patterns;
pub mod rules;
pub mod scan;

use anyhow::Result;
use redline_client::RedactionClient;
use redline_config::Config;
use std::time::Duration;

/// HTTP client for the configured API base
pub fn client(config: &Config) -> Result<RedactionClient> {
    Ok(RedactionClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?)
}
