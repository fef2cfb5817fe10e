// Retrying GET transport: transient statuses are retried with bounded
// exponential backoff; cancellation pre-empts requests and backoff sleeps.

use reqwest::StatusCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Status codes retried as transient.
pub const RETRY_STATUS: [StatusCode; 6] = [
    StatusCode::REQUEST_TIMEOUT,         // 408
    StatusCode::TOO_MANY_REQUESTS,       // 429
    StatusCode::INTERNAL_SERVER_ERROR,   // 500
    StatusCode::BAD_GATEWAY,             // 502
    StatusCode::SERVICE_UNAVAILABLE,     // 503
    StatusCode::GATEWAY_TIMEOUT,         // 504
];

/// Backoff bounds and attempt cap for retried requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub wait_min: Duration,
    pub wait_max: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            wait_min: Duration::from_secs(1),
            wait_max: Duration::from_secs(30),
            max_attempts: 4,
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt after `attempt`: wait_min * 2^(attempt-1),
    /// clamped to wait_max.
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.wait_min.saturating_mul(1 << exp).min(self.wait_max)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("status {status} after {attempts} attempt(s)")]
    Status { status: StatusCode, attempts: u32 },
    #[error("request failed after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("decoding response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

enum Failure {
    Status(StatusCode),
    Network(reqwest::Error),
}

/// reqwest wrapper retrying idempotent GETs per the policy. Cheap to share;
/// the inner client pools connections.
#[derive(Debug, Clone)]
pub struct RetryTransport {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl RetryTransport {
    pub fn new(http: reqwest::Client, policy: RetryPolicy) -> Self {
        Self { http, policy }
    }

    /// GET `url`, retrying transient failures. Returns the response on any
    /// 2xx; other statuses and exhausted retries map to `TransportError`.
    /// A cancelled call returns `TransportError::Cancelled` without retrying.
    pub async fn get(
        &self,
        url: Url,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, TransportError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(TransportError::Cancelled);
            }

            let mut request = self.http.get(url.clone());
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                result = request.send() => result,
            };

            let failure = match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if !RETRY_STATUS.contains(&status) {
                        return Err(TransportError::Status {
                            status,
                            attempts: attempt,
                        });
                    }
                    Failure::Status(status)
                }
                Err(source) => Failure::Network(source),
            };

            if attempt >= self.policy.max_attempts {
                return Err(match failure {
                    Failure::Status(status) => TransportError::Status {
                        status,
                        attempts: attempt,
                    },
                    Failure::Network(source) => TransportError::Network {
                        attempts: attempt,
                        source,
                    },
                });
            }

            let wait = self.policy.backoff(attempt);
            match &failure {
                Failure::Status(status) => tracing::warn!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    status = %status,
                    "retrying request"
                ),
                Failure::Network(error) => tracing::warn!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %error,
                    "retrying request"
                ),
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}
