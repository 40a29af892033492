//! OpenAI client configuration.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use backoff::ExponentialBackoff;
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Read the API key from the environment, treating an empty value as absent.
pub fn api_key_from_env() -> Option<String> {
    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Create an OpenAI client with the default timeout.
pub fn create_client(api_key: Option<&str>) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_key, None, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout and optional API base URL.
///
/// Requests are never retried: a rate limit or server error goes straight
/// back to the caller.
pub fn create_client_with_timeout(
    api_key: Option<&str>,
    api_base: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::new();
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry()))
}

/// Backoff policy that gives up after the first attempt.
fn no_retry() -> ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoff::backoff::Backoff;

    #[test]
    fn test_backoff_never_retries() {
        let mut policy = no_retry();
        policy.reset();
        std::thread::sleep(Duration::from_millis(1));
        assert_eq!(policy.next_backoff(), None);
    }
}
