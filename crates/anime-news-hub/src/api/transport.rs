//! Shared HTTP transport with rate limiting and retry logic.

use super::error::SourceError;
use super::rate_limiter::RateLimiter;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::config::RateLimitConfig;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("anime-news-hub/", env!("CARGO_PKG_VERSION"));

/// Retry policy for one upstream
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub retry_delay_ms: u64,
}

impl RetryPolicy {
    /// Backoff before retry number `attempt + 1`
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(2u64.saturating_pow(attempt)))
    }
}

/// Rate-limited, retrying JSON transport for a single upstream
pub struct Transport {
    /// Name used in logs and errors
    source_name: &'static str,
    /// HTTP client
    client: Client,
    /// Request pacing shared by concurrent callers
    rate_limiter: Mutex<RateLimiter>,
    retry: RetryPolicy,
}

impl Transport {
    /// Create a new transport
    pub fn new(
        source_name: &'static str,
        rate_limit: &RateLimitConfig,
        retry: RetryPolicy,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| SourceError::Http { source_name, error })?;

        Ok(Self {
            source_name,
            client,
            rate_limiter: Mutex::new(RateLimiter::new(
                rate_limit.requests_per_second,
                rate_limit.requests_per_minute,
            )),
            retry,
        })
    }

    /// Send a request built by `build` and decode the JSON body
    ///
    /// The builder is invoked once per attempt, each attempt paced by the
    /// rate limiter.
    pub async fn send_json<T, F>(&self, build: F) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let build = &build;
        retry_with(self.source_name, self.retry, || async move {
            self.rate_limiter.lock().await.acquire().await;
            self.attempt(build).await
        })
        .await
    }

    async fn attempt<T, F>(&self, build: &F) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let source_name = self.source_name;

        let response = build(&self.client)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| SourceError::Http { source_name, error })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| SourceError::Http { source_name, error })?;

        if !status.is_success() {
            return Err(SourceError::Status {
                source_name,
                status,
                body: truncate_body(&body),
            });
        }

        decode(source_name, status, &body)
    }
}

/// Run `attempt` until it succeeds, fails with a final error, or runs out of retries
///
/// Transport errors, server errors and 429 responses are retried with
/// exponential backoff.
pub async fn retry_with<T, F, Fut>(
    source_name: &'static str,
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut retries = 0;

    loop {
        debug!(source = source_name, attempt = retries + 1, "Making API request");

        match attempt().await {
            Ok(data) => {
                debug!(source = source_name, "Request successful");
                return Ok(data);
            }
            Err(e) if e.is_retryable() && retries < policy.max_retries => {
                let delay = policy.delay(retries);
                warn!(
                    source = source_name,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Request failed, retrying"
                );
                sleep(delay).await;
                retries += 1;
            }
            Err(e) => {
                warn!(source = source_name, error = %e, "Request failed");
                return Err(e);
            }
        }
    }
}

fn decode<T: DeserializeOwned>(
    source_name: &'static str,
    status: StatusCode,
    body: &str,
) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|error| {
        debug!(source = source_name, status = %status, "Undecodable response body");
        SourceError::Decode { source_name, error }
    })
}

fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 300;
    if body.chars().count() > LIMIT {
        let mut cut: String = body.chars().take(LIMIT).collect();
        cut.push_str("...");
        cut
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 2,
            retry_delay_ms: 1000,
        };
        assert_eq!(policy.delay(0), Duration::from_millis(1000));
        assert_eq!(policy.delay(1), Duration::from_millis(2000));
        assert_eq!(policy.delay(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_transport_creation() {
        let transport = Transport::new(
            "AniList",
            &RateLimitConfig {
                requests_per_second: 1.0,
                requests_per_minute: 30,
            },
            RetryPolicy {
                max_retries: 2,
                retry_delay_ms: 1000,
            },
        );
        assert!(transport.is_ok());
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(400);
        let cut = truncate_body(&long);
        assert_eq!(cut.len(), 303);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn test_decode_failure_is_typed() {
        let result: Result<Vec<u32>, _> = decode("MangaDex", StatusCode::OK, "<html>");
        assert!(matches!(result, Err(SourceError::Decode { source_name: "MangaDex", .. })));
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            retry_delay_ms: 1,
        }
    }

    fn status_error(status: StatusCode) -> SourceError {
        SourceError::Status {
            source_name: "AniList",
            status,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with("AniList", fast_policy(2), || {
            calls += 1;
            async { Err(status_error(StatusCode::SERVICE_UNAVAILABLE)) }
        })
        .await;

        assert!(matches!(result, Err(SourceError::Status { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_throttled_request_recovers() {
        let mut calls = 0;
        let result = retry_with("MangaDex", fast_policy(2), || {
            calls += 1;
            let call = calls;
            async move {
                if call == 1 {
                    Err(status_error(StatusCode::TOO_MANY_REQUESTS))
                } else {
                    Ok(call)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_final_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with("AniList", fast_policy(5), || {
            calls += 1;
            async {
                Err(SourceError::GraphQl {
                    source_name: "AniList",
                    message: "Invalid season".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(SourceError::GraphQl { .. })));
        assert_eq!(calls, 1);

        let mut calls = 0;
        let result: Result<(), _> = retry_with("MangaDex", fast_policy(5), || {
            calls += 1;
            async { Err(status_error(StatusCode::BAD_REQUEST)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
