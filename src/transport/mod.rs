//! Outbound transport for the messaging provider.
//!
//! Every REST channel goes through the narrow [`ApiTransport`] seam so tests
//! can substitute a recording fake without touching the network. The SMTP
//! path (legacy direct sends) lives in [`smtp`] and talks to the relay via
//! lettre instead.

pub mod email;
pub mod sms;
pub mod smtp;
pub mod whatsapp;

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP method subset the provider API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Delete,
}

/// A single provider API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the provider base URL, e.g. `/smtp/email`.
    pub path: String,
    pub api_key: String,
    pub body: Option<serde_json::Value>,
}

/// Raw provider response: status code plus body text.
///
/// Status interpretation is per-operation (sends accept 200/201, deletes
/// accept 200/204), so it stays with the channel clients.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Narrow seam over the provider HTTP client: one request in, one raw
/// response out. `Err` is reserved for transport-level failures; non-2xx
/// statuses come back as an `Ok` response for the caller to interpret.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Successful delivery report from a channel.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Provider-issued message identifier, when the response carried one.
    pub message_id: Option<String>,
    pub detail: String,
}

/// reqwest-backed transport hitting the real provider API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, req.path);

        let mut builder = match req.method {
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        builder = builder
            .header("api-key", &req.api_key)
            .header("accept", "application/json");
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::Network {
                channel: "provider".into(),
                reason: e.to_string(),
            })?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(%url, status, "Provider API response");

        Ok(ApiResponse { status, body })
    }
}
