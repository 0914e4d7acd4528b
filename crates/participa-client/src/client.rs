//! High-level operations over the [`RequestExecutor`].

use std::sync::Arc;
use std::time::Duration;

use participa_core::normalize;
use participa_core::{
    AnalysisRequest, AnalysisResult, AnalyzeResponse, BatchItemResult, FeedbackRequest,
    FeedbackResponse, TrainingStatus,
};
use serde_json::json;
use tracing::{info, warn};

use crate::config::{ClientConfig, join_url};
use crate::endpoint::{EndpointResolver, ResolvedEndpoint};
use crate::error::ApiError;
use crate::executor::RequestExecutor;
use crate::transport::{HttpRequest, Method, Transport};

pub const ANALYZE_PATH: &str = "/analyze";
pub const FEEDBACK_PATH: &str = "/feedback";
pub const TRAINING_STATUS_PATH: &str = "/training/status";

/// Payload of the connectivity probe.
const PROBE_TEXT: &str = "teste";

/// Reachability of the service, for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    /// The service answered with a 5xx, usually while it is starting.
    WakingUp,
    Offline,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "API Online",
            Self::WakingUp => "API Iniciando",
            Self::Offline => "API Offline",
        }
    }
}

/// Client for the PII classification service.
pub struct ApiClient {
    executor: RequestExecutor,
    connection_check_timeout: Duration,
}

impl ApiClient {
    /// Build a client over the default `reqwest` transport.
    #[cfg(feature = "http")]
    pub fn connect(config: ClientConfig) -> Result<Self, crate::error::TransportError> {
        let transport = crate::http::ReqwestTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let resolver = Arc::new(EndpointResolver::new(&config));
        Self {
            executor: RequestExecutor::new(transport, resolver, &config),
            connection_check_timeout: config.connection_check_timeout,
        }
    }

    pub async fn resolve_endpoint(&self) -> &ResolvedEndpoint {
        self.executor.endpoint().await
    }

    /// Whether the service is answering requests. Never fails.
    ///
    /// A 5xx reply counts as offline; a 4xx validation rejection does not.
    pub async fn check_connection(&self) -> bool {
        self.probe_connection().await == ConnectionStatus::Online
    }

    /// Send a minimal analysis without retries and report how the service reacted.
    ///
    /// Any reply below 500 means the service is up, 4xx validation rejections
    /// included. A 5xx usually means the host is still starting.
    pub async fn probe_connection(&self) -> ConnectionStatus {
        let url = join_url(&self.resolve_endpoint().await.base_url, ANALYZE_PATH);
        let request = HttpRequest {
            method: Method::Post,
            url,
            body: Some(json!({ "text": PROBE_TEXT }).to_string()),
        };
        let send = self.executor.transport().send(request);
        match tokio::time::timeout(self.connection_check_timeout, send).await {
            Ok(Ok(reply)) if reply.status >= 500 => ConnectionStatus::WakingUp,
            Ok(Ok(_)) => ConnectionStatus::Online,
            Ok(Err(e)) => {
                info!(error = %e, "connection check failed");
                ConnectionStatus::Offline
            }
            Err(_) => {
                info!("connection check timed out");
                ConnectionStatus::Offline
            }
        }
    }

    /// Analyze one text and normalize the reply.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, ApiError> {
        let raw: AnalyzeResponse = self
            .executor
            .post(ANALYZE_PATH, &AnalysisRequest::new(text))
            .await?;
        Ok(normalize::analysis(&raw))
    }

    /// Analyze items one after another.
    ///
    /// Always returns one result per item, in input order. A failed item
    /// becomes a degraded result tagged with its failure kind and the batch
    /// moves on. Items without an id get their 1-based position.
    /// `on_progress(current, total)` runs after every item.
    pub async fn analyze_batch<F>(
        &self,
        items: &[AnalysisRequest],
        mut on_progress: F,
    ) -> Vec<BatchItemResult>
    where
        F: FnMut(usize, usize),
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        info!(total, "starting batch analysis");

        for (index, item) in items.iter().enumerate() {
            let id = item
                .id
                .clone()
                .unwrap_or_else(|| (index + 1).to_string());
            let request = AnalysisRequest::with_id(id.as_str(), item.text.as_str());

            let result = match self
                .executor
                .post::<_, AnalyzeResponse>(ANALYZE_PATH, &request)
                .await
            {
                Ok(raw) => normalize::batch_success(&id, &item.text, normalize::analysis(&raw)),
                Err(e) => {
                    warn!(%id, kind = %e.kind, "batch item failed");
                    normalize::batch_failure(&id, &item.text, e.kind)
                }
            };
            results.push(result);
            on_progress(index + 1, total);
        }

        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(total, failed, "batch analysis complete");
        results
    }

    pub async fn submit_feedback(
        &self,
        feedback: &FeedbackRequest,
    ) -> Result<FeedbackResponse, ApiError> {
        let response: FeedbackResponse = self.executor.post(FEEDBACK_PATH, feedback).await?;
        info!(
            entities = feedback.entity_feedbacks.len(),
            accuracy = response.stats.accuracy,
            "feedback submitted"
        );
        Ok(response)
    }

    pub async fn training_status(&self) -> Result<TrainingStatus, ApiError> {
        self.executor.get(TRAINING_STATUS_PATH).await
    }
}
