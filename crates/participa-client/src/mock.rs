//! Scripted transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::transport::{HttpReply, HttpRequest, Transport};

pub(crate) enum Step {
    Reply(u16, String),
    Fail(TransportError),
    /// Answers after the given delay.
    Delayed(Duration, u16, String),
    /// Never answers; only a timeout ends the exchange.
    Hang,
}

impl Step {
    pub(crate) fn reply(status: u16, body: &str) -> Self {
        Self::Reply(status, body.to_string())
    }
}

/// Answers each path from its own queue and records every request.
///
/// A path with no route, or whose queue is exhausted, fails with a network
/// error, which is what a missing local backend looks like.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Step>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(self, path: &str, steps: impl IntoIterator<Item = Step>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .extend(steps);
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let step = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|(path, _)| request.url.ends_with(path.as_str()))
                .and_then(|(_, queue)| queue.pop_front())
        };
        match step {
            Some(Step::Reply(status, body)) => Ok(HttpReply { status, body }),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Delayed(delay, status, body)) => {
                tokio::time::sleep(delay).await;
                Ok(HttpReply { status, body })
            }
            Some(Step::Hang) => std::future::pending().await,
            None => Err(TransportError::Network("no route".into())),
        }
    }
}

pub(crate) fn test_config() -> ClientConfig {
    ClientConfig {
        local_url: "http://local.test".into(),
        remote_url: "http://remote.test".into(),
        ..ClientConfig::default()
    }
}

pub(crate) const PUBLIC_REPLY: &str =
    r#"{"classificacao": "PÚBLICO", "risco": "SEGURO", "confianca": 0.97, "detalhes": []}"#;

pub(crate) const RESTRICTED_REPLY: &str = r#"{
    "classificacao": "NÃO PÚBLICO",
    "risco": "alto",
    "confianca": 0.8,
    "detalhes": [{"tipo": "CPF", "valor": "111.111.111-11"}]
}"#;
