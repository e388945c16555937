use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::config::Config;

/// Shared HTTP client for the REST store. The timeout bounds every store
/// request so a hung connection surfaces as a transport error.
pub fn create_client(config: &Config) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .pool_max_idle_per_host(6)
        .build()
}
