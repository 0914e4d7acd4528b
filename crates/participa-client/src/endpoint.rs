//! Local-vs-remote endpoint selection.
//!
//! A developer running the detection service locally should get it without
//! configuring anything, so the first request probes the local address and
//! falls back to production. The decision is made once per resolver and
//! never revisited.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::info;

use crate::config::{ClientConfig, join_url};
use crate::transport::{HttpRequest, Method, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointTarget {
    Local,
    Remote,
}

impl EndpointTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub target: EndpointTarget,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Uninitialized,
    Resolving,
    Resolved(EndpointTarget),
}

/// Decides, once, which service instance to talk to.
pub struct EndpointResolver {
    local_url: String,
    remote_url: String,
    probe_timeout: Duration,
    resolved: OnceCell<ResolvedEndpoint>,
    resolving: AtomicBool,
}

impl EndpointResolver {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            local_url: config.local_url.clone(),
            remote_url: config.remote_url.clone(),
            probe_timeout: config.probe_timeout,
            resolved: OnceCell::new(),
            resolving: AtomicBool::new(false),
        }
    }

    /// Resolve the endpoint, probing the local instance on the first call.
    ///
    /// Concurrent callers share the single in-flight probe. Probe failures
    /// are routing decisions, never errors.
    pub async fn resolve(&self, transport: &dyn Transport) -> &ResolvedEndpoint {
        self.resolved
            .get_or_init(|| async {
                self.resolving.store(true, Ordering::Release);
                self.probe(transport).await
            })
            .await
    }

    pub fn state(&self) -> ResolverState {
        match self.resolved.get() {
            Some(endpoint) => ResolverState::Resolved(endpoint.target),
            None if self.resolving.load(Ordering::Acquire) => ResolverState::Resolving,
            None => ResolverState::Uninitialized,
        }
    }

    async fn probe(&self, transport: &dyn Transport) -> ResolvedEndpoint {
        let request = HttpRequest {
            method: Method::Get,
            url: join_url(&self.local_url, "/health"),
            body: None,
        };
        let outcome = tokio::time::timeout(self.probe_timeout, transport.send(request)).await;

        match outcome {
            Ok(Ok(reply)) if reply.is_success() => {
                info!(url = %self.local_url, "local backend detected");
                ResolvedEndpoint {
                    target: EndpointTarget::Local,
                    base_url: self.local_url.clone(),
                }
            }
            other => {
                let reason = match other {
                    Ok(Ok(reply)) => format!("status {}", reply.status),
                    Ok(Err(e)) => e.to_string(),
                    Err(_) => "probe timed out".to_string(),
                };
                info!(url = %self.remote_url, %reason, "local backend unavailable, using remote");
                ResolvedEndpoint {
                    target: EndpointTarget::Remote,
                    base_url: self.remote_url.clone(),
                }
            }
        }
    }
}
