//! Client layer: endpoint detection, timeout/retry orchestration, and batch analysis
//! against the PII classification service.

mod client;
mod config;
mod endpoint;
mod error;
mod executor;
mod transport;

#[cfg(feature = "http")]
pub mod http;

#[cfg(test)]
mod mock;

pub use client::{ANALYZE_PATH, ApiClient, ConnectionStatus, FEEDBACK_PATH, TRAINING_STATUS_PATH};
pub use config::{ClientConfig, LOCAL_API_URL, PRODUCTION_API_URL, RetryPolicy};
pub use endpoint::{EndpointResolver, EndpointTarget, ResolvedEndpoint, ResolverState};
pub use error::{ApiError, TransportError};
pub use executor::RequestExecutor;
pub use transport::{HttpReply, HttpRequest, Method, Transport};

#[cfg(feature = "http")]
pub use http::ReqwestTransport;
