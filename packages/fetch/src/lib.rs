#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gradesheet document download client.
//!
//! Every download goes through [`DocumentFetcher`], which wraps a shared
//! [`reqwest::Client`] with a per-request timeout and bounded retry with
//! exponential backoff for transient failures (timeouts, connection
//! resets, HTTP 429, server errors). Client errors other than 429 are
//! permanent and fail immediately.

use std::time::Duration;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s) the total wait before giving up
/// is 14 seconds, on top of the per-request timeout.
const MAX_RETRIES: u32 = 3;

/// Per-request timeout, covering connect through body read.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while downloading a document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status {
        /// The response status code.
        status: reqwest::StatusCode,
    },
}

/// Downloads gradesheet documents over HTTP.
///
/// Cheap to clone — the underlying client is reference-counted and safe
/// to share across request handlers.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
}

impl DocumentFetcher {
    /// Creates a fetcher with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the TLS backend fails to
    /// initialize.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Downloads the document at `url`, returning the raw body bytes.
    ///
    /// Retries up to [`MAX_RETRIES`] times with exponential backoff on
    /// transport errors, HTTP 429, and HTTP 5xx. Any other non-success
    /// status fails immediately.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request keeps failing after all
    /// retries or the host answers with a non-success status.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                log::warn!("Retry {attempt}/{MAX_RETRIES} for {url} in {delay:?}...");
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url).send().await {
                Err(e) => {
                    if is_transient(&e) && attempt < MAX_RETRIES {
                        log::warn!("Transient error fetching {url}: {e}");
                        attempt += 1;
                        continue;
                    }
                    return Err(FetchError::Http(e));
                }
                Ok(response) => {
                    let status = response.status();

                    if retryable_status(status) {
                        if attempt < MAX_RETRIES {
                            log::warn!("HTTP {status} from {url}");
                            attempt += 1;
                            continue;
                        }
                        return Err(FetchError::Status { status });
                    }
                    if !status.is_success() {
                        return Err(FetchError::Status { status });
                    }

                    let bytes = response.bytes().await?;
                    log::debug!("Downloaded {} bytes from {url}", bytes.len());
                    return Ok(bytes.to_vec());
                }
            }
        }
    }
}

/// Backoff before the given retry attempt (1-based): 2s, 4s, 8s.
const fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}

/// Returns `true` for statuses that warrant a retry (429 and 5xx).
fn retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
