//! HTTP dispatch for GeoServer REST calls
//!
//! Every request carries preemptive basic auth and a fixed content type.
//! Status codes are handed back untouched; deciding what counts as success
//! is left to the caller.

use crate::error::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

/// Content type sent with structured bodies (and with bodiless requests)
pub const JSON_CONTENT_TYPE: &str = "text/json";
/// Content type for SLD uploads
pub const SLD_CONTENT_TYPE: &str = "application/vnd.ogc.sld+xml";
/// Content type for raw text bodies such as file paths
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body for logging
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Request body
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Text {
        content_type: &'static str,
        body: String,
    },
}

impl Payload {
    pub fn sld(body: impl Into<String>) -> Self {
        Self::Text {
            content_type: SLD_CONTENT_TYPE,
            body: body.into(),
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::Text {
            content_type: TEXT_CONTENT_TYPE,
            body: body.into(),
        }
    }
}

/// Status and raw body of a completed call
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn is(&self, status: u16) -> bool {
        self.status == status
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client wrapper for GeoServer REST calls
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    user: String,
    password: String,
}

impl Dispatcher {
    pub fn new(user: &str, password: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gsrest/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    pub async fn get(&self, url: &str) -> Result<RestResponse> {
        self.send(Method::GET, url, None).await
    }

    pub async fn post(&self, url: &str, payload: Payload) -> Result<RestResponse> {
        self.send(Method::POST, url, Some(payload)).await
    }

    pub async fn put(&self, url: &str, payload: Payload) -> Result<RestResponse> {
        self.send(Method::PUT, url, Some(payload)).await
    }

    pub async fn delete(&self, url: &str) -> Result<RestResponse> {
        self.send(Method::DELETE, url, None).await
    }

    async fn send(&self, method: Method, url: &str, payload: Option<Payload>) -> Result<RestResponse> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.user, Some(&self.password));

        request = match payload {
            Some(Payload::Json(value)) => request
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(serde_json::to_vec(&value).map_err(Error::Encode)?),
            Some(Payload::Text { content_type, body }) => {
                request.header(CONTENT_TYPE, content_type).body(body)
            }
            None => request.header(CONTENT_TYPE, JSON_CONTENT_TYPE),
        };

        let response = request.send().await.map_err(|e| transport_error(e, url))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport_error(e, url))?;

        if status >= 400 {
            tracing::debug!(
                "{} {} answered {}: {}",
                method,
                url,
                status,
                sanitize_for_log(&body)
            );
        }

        Ok(RestResponse { status, body })
    }
}

fn transport_error(error: reqwest::Error, url: &str) -> Error {
    if error.is_timeout() {
        tracing::error!("request timed out: {}", url);
        Error::Timeout {
            url: url.to_string(),
        }
    } else {
        tracing::error!("request failed: {} - {}", url, error);
        Error::Transport(error)
    }
}
