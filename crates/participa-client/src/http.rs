//! `reqwest`-backed [`Transport`].

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::{Attempt, Policy};
use thiserror::Error;
use tracing::debug;

use crate::error::TransportError;
use crate::transport::{HttpReply, HttpRequest, Method, Transport};

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error)]
#[error("redirect to {0} leaves the original origin")]
struct CrossOriginRedirect(String);

/// HTTP transport for the detection service.
///
/// Redirects are followed only while they stay on the origin of the first
/// request; a redirect to another origin fails the exchange with
/// [`TransportError::CrossOrigin`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::custom(same_origin_redirects))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        let mut builder = builder
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify)?;
        debug!(url = %request.url, status, body_len = body.len(), "reply received");
        Ok(HttpReply { status, body })
    }
}

fn same_origin_redirects(attempt: Attempt) -> reqwest::redirect::Action {
    if attempt.previous().len() >= MAX_REDIRECTS {
        return attempt.stop();
    }
    let crosses = attempt
        .previous()
        .first()
        .is_some_and(|origin| !same_origin(origin, attempt.url()));
    if crosses {
        let target = attempt.url().to_string();
        attempt.error(CrossOriginRedirect(target))
    } else {
        attempt.follow()
    }
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_redirect() {
        TransportError::CrossOrigin(err.to_string())
    } else if err.is_connect() || err.is_request() {
        TransportError::Network(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn same_origin_ignores_path() {
        assert!(same_origin(
            &url("http://localhost:8000/health"),
            &url("http://localhost:8000/other")
        ));
        assert!(same_origin(
            &url("https://example.org/a"),
            &url("https://example.org:443/b")
        ));
    }

    #[test]
    fn different_host_scheme_or_port_is_cross_origin() {
        let base = url("https://example.org/analyze");
        assert!(!same_origin(&base, &url("https://evil.example/analyze")));
        assert!(!same_origin(&base, &url("http://example.org/analyze")));
        assert!(!same_origin(&base, &url("https://example.org:8443/analyze")));
    }

    #[test]
    fn transport_builds() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
