//! HTTP plumbing shared by the remote providers.

use std::time::Duration;

use anyhow::Context;
use reqwest::header::HeaderMap;

use alvorada_core::error::ProviderError;

/// Default 429 back-off hint when the server sends no `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

pub(crate) fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Classify a transport-level failure.
pub(crate) fn transport_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

/// `retry-after` header in milliseconds.
pub(crate) fn retry_after_ms(headers: &HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
        * 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn retry_after_defaults_and_parses() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_ms(&headers), 5000);
        headers.insert("retry-after", HeaderValue::from_static("12"));
        assert_eq!(retry_after_ms(&headers), 12_000);
        headers.insert("retry-after", HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after_ms(&headers), 5000);
    }
}
