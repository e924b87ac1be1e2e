use std::env;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;

use crate::truncate_text;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const ANALYZE_PATH: &str = "/analyze";
pub const APPLY_SUGGESTIONS_PATH: &str = "/apply-suggestions";
pub const HEALTH_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base: &str) -> Self {
        let trimmed = api_base.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            api_base: trimmed.to_string(),
        }
    }

    /// Reads `ADSAGE_API_BASE`, treating blank values as unset.
    pub fn from_env() -> Self {
        env::var("ADSAGE_API_BASE")
            .ok()
            .map(|value| Self::new(&value))
            .unwrap_or_default()
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

/// Raw outcome of one HTTP exchange. Status interpretation is left to callers
/// because the analysis and apply flows treat non-2xx replies differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl TransportReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value, TransportError> {
        serde_json::from_str(&self.body).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },
    #[error("invalid JSON body: {0}")]
    Decode(String),
}

/// Seam between the controllers and the remote analysis service.
pub trait Transport {
    fn post_json(&self, path: &str, body: &Value) -> Result<TransportReply, TransportError>;
    fn get(&self, path: &str) -> Result<TransportReply, TransportError>;
}

pub struct HttpTransport {
    config: ClientConfig,
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        // No client-side deadline: one analysis chains several model calls.
        let http = HttpClient::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn finish(
        &self,
        url: &str,
        sent: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<TransportReply, TransportError> {
        let response = sent.map_err(|err| network_error(url, &err))?;
        let status = response.status();
        let body = response.text().map_err(|err| network_error(url, &err))?;
        log::debug!(
            "{url} -> {} ({} bytes)",
            status.as_u16(),
            body.len()
        );
        Ok(TransportReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, path: &str, body: &Value) -> Result<TransportReply, TransportError> {
        let url = self.config.endpoint(path);
        let sent = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send();
        self.finish(&url, sent)
    }

    fn get(&self, path: &str) -> Result<TransportReply, TransportError> {
        let url = self.config.endpoint(path);
        let sent = self.http.get(&url).send();
        self.finish(&url, sent)
    }
}

fn network_error(url: &str, err: &reqwest::Error) -> TransportError {
    let kind = if err.is_connect() {
        "connection failed"
    } else if err.is_timeout() {
        "timed out"
    } else {
        "request failed"
    };
    TransportError::Network(format!("{kind} ({url}): {}", truncate_text(&err.to_string(), 256)))
}

/// Status line reported by the service's health endpoint.
pub fn health(transport: &dyn Transport) -> anyhow::Result<String> {
    let reply = transport.get(HEALTH_PATH)?;
    if !reply.is_success() {
        anyhow::bail!(TransportError::Status {
            status: reply.status,
            reason: reply.reason,
        });
    }
    let payload = reply.json()?;
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(format!("{status} {message}").trim().to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::Value;

    use super::{Transport, TransportError, TransportReply};

    /// Scripted transport recording every request it sees.
    #[derive(Default)]
    pub struct FakeTransport {
        pub replies: RefCell<VecDeque<Result<TransportReply, TransportError>>>,
        pub requests: RefCell<Vec<(String, Value)>>,
    }

    impl FakeTransport {
        pub fn with_replies(replies: Vec<Result<TransportReply, TransportError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn ok_json(body: Value) -> Result<TransportReply, TransportError> {
            Ok(TransportReply {
                status: 200,
                reason: "OK".to_string(),
                body: body.to_string(),
            })
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        fn next(&self) -> Result<TransportReply, TransportError> {
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".to_string())))
        }
    }

    impl Transport for FakeTransport {
        fn post_json(&self, path: &str, body: &Value) -> Result<TransportReply, TransportError> {
            self.requests
                .borrow_mut()
                .push((path.to_string(), body.clone()));
            self.next()
        }

        fn get(&self, path: &str) -> Result<TransportReply, TransportError> {
            self.requests
                .borrow_mut()
                .push((path.to_string(), Value::Null));
            self.next()
        }
    }
}
