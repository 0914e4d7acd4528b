//! Timeout and retry orchestration for one logical request.
//!
//! The detection service runs on a host that sleeps when idle, so the first
//! request after a pause often sees a 502/503 or a dropped connection while
//! the model loads. Every attempt gets a fixed deadline and the whole request
//! gets a single retry budget shared by all failure classes:
//!
//! | failure                | retry            | once exhausted |
//! |------------------------|------------------|----------------|
//! | HTTP 502 / 503         | after 3 s        | `WAKING_UP`    |
//! | other non-2xx          | no               | `UNKNOWN`      |
//! | deadline exceeded      | immediately      | `TIMEOUT`      |
//! | network failure        | after 2 s        | `OFFLINE`      |
//! | cross-origin rejection | no               | `CORS`         |
//!
//! This is the only place failures are classified.

use std::sync::Arc;
use std::time::Duration;

use participa_core::ErrorKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{ClientConfig, RetryPolicy, join_url};
use crate::endpoint::{EndpointResolver, ResolvedEndpoint};
use crate::error::{ApiError, TransportError};
use crate::transport::{HttpReply, HttpRequest, Method, Transport};

/// What to do about a failed attempt.
struct Verdict {
    kind: ErrorKind,
    message: String,
    /// `None` when retrying cannot help.
    retry_after: Option<Duration>,
}

fn judge_status(status: u16, policy: &RetryPolicy) -> Verdict {
    match status {
        502 | 503 => Verdict {
            kind: ErrorKind::WakingUp,
            message: format!("service starting up (HTTP {status})"),
            retry_after: Some(policy.waking_up_backoff),
        },
        _ => Verdict {
            kind: ErrorKind::Unknown,
            message: format!("HTTP error: {status}"),
            retry_after: None,
        },
    }
}

fn judge_transport(err: TransportError, policy: &RetryPolicy) -> Verdict {
    match err {
        TransportError::Timeout => Verdict {
            kind: ErrorKind::Timeout,
            message: "request timed out".into(),
            retry_after: Some(Duration::ZERO),
        },
        TransportError::Network(detail) => Verdict {
            kind: ErrorKind::Offline,
            message: format!("no connection: {detail}"),
            retry_after: Some(policy.offline_backoff),
        },
        TransportError::CrossOrigin(detail) => Verdict {
            kind: ErrorKind::Cors,
            message: detail,
            retry_after: None,
        },
        TransportError::Other(detail) => Verdict {
            kind: ErrorKind::Unknown,
            message: detail,
            retry_after: None,
        },
    }
}

/// Runs requests against the resolved endpoint with bounded latency and
/// bounded automatic recovery.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    resolver: Arc<EndpointResolver>,
    timeout: Duration,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(
        transport: Arc<dyn Transport>,
        resolver: Arc<EndpointResolver>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            transport,
            resolver,
            timeout: config.request_timeout,
            policy: config.retry,
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Resolve the endpoint if that has not happened yet.
    pub async fn endpoint(&self) -> &ResolvedEndpoint {
        self.resolver.resolve(self.transport.as_ref()).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::Get, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::new(ErrorKind::Unknown, format!("encode request: {e}")))?;
        self.execute(Method::Post, path, Some(body)).await
    }

    /// Perform one logical request, retrying transient failures within the budget.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<T, ApiError> {
        let url = join_url(&self.endpoint().await.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            let request = HttpRequest {
                method,
                url: url.clone(),
                body: body.clone(),
            };
            debug!(%path, attempt, "sending request");

            let verdict = match self.attempt(request).await {
                Ok(reply) if reply.is_success() => return parse_body(path, &reply),
                Ok(reply) => judge_status(reply.status, &self.policy),
                Err(err) => judge_transport(err, &self.policy),
            };

            match verdict.retry_after {
                Some(delay) if attempt < self.policy.max_retries => {
                    warn!(
                        %path,
                        attempt,
                        kind = %verdict.kind,
                        delay_ms = delay.as_millis() as u64,
                        "request failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                _ => {
                    warn!(%path, attempt, kind = %verdict.kind, message = %verdict.message, "request failed");
                    return Err(ApiError::new(verdict.kind, verdict.message));
                }
            }
        }
    }

    async fn attempt(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

fn parse_body<T: DeserializeOwned>(path: &str, reply: &HttpReply) -> Result<T, ApiError> {
    serde_json::from_str(&reply.body).map_err(|e| {
        warn!(%path, error = %e, "unparseable response body");
        ApiError::new(ErrorKind::Unknown, format!("invalid response body: {e}"))
    })
}
