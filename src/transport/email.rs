//! Email over the provider's transactional REST API.
//!
//! Canonical send path, reply threading, deferred sends (`scheduledAt` /
//! `batchId`) and cancellation of deferred sends.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde_json::json;

use super::{ApiRequest, ApiResponse, ApiTransport, Delivery, Method};
use crate::config::BrevoConfig;
use crate::error::TransportError;

const CHANNEL: &str = "email";

/// Threading context for a reply. Lives for one call only, never stored.
#[derive(Debug, Clone)]
pub struct Threading {
    /// Identifier of the message being replied to.
    pub message_id: String,
    /// Space-separated chain of prior message identifiers, oldest first.
    pub references: Option<String>,
}

/// One outbound email request.
#[derive(Debug, Clone, Default)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Sender override; falls back to the configured default sender.
    pub from: Option<String>,
    pub threading: Option<Threading>,
    /// ISO-8601 timestamp for a deferred send. The provider enforces its
    /// 72-hour window; the value is passed through untouched.
    pub scheduled_at: Option<String>,
    /// Opaque token grouping deferred sends for bulk cancellation.
    pub batch_id: Option<String>,
}

/// Transactional email client.
pub struct EmailApi {
    config: BrevoConfig,
    transport: Arc<dyn ApiTransport>,
}

impl EmailApi {
    pub fn new(config: BrevoConfig, transport: Arc<dyn ApiTransport>) -> Self {
        Self { config, transport }
    }

    /// Send (or schedule) one email. 200/201 is success; any other status
    /// surfaces as an API error carrying the status and raw response body.
    pub async fn send(&self, msg: &EmailMessage) -> Result<Delivery, TransportError> {
        self.require_key()?;

        let payload = build_payload(msg, &self.config.default_sender);
        let resp = self
            .transport
            .execute(ApiRequest {
                method: Method::Post,
                path: "/smtp/email".into(),
                api_key: self.config.api_key.expose_secret().to_string(),
                body: Some(payload),
            })
            .await?;

        match resp.status {
            200 | 201 => {
                tracing::info!(to = %msg.to, "Email accepted by provider");
                Ok(Delivery {
                    message_id: extract_message_id(&resp.body),
                    detail: format!("Email sent successfully to {}", msg.to),
                })
            }
            status => Err(api_error(status, resp)),
        }
    }

    /// Cancel a scheduled send by message id or batch id. Only affects
    /// messages whose send time has not yet occurred; no local state exists
    /// to update.
    pub async fn delete_scheduled(&self, identifier: &str) -> Result<Delivery, TransportError> {
        self.require_key()?;

        let resp = self
            .transport
            .execute(ApiRequest {
                method: Method::Delete,
                path: format!("/smtp/email/{identifier}"),
                api_key: self.config.api_key.expose_secret().to_string(),
                body: None,
            })
            .await?;

        match resp.status {
            200 | 204 => {
                tracing::info!(%identifier, "Scheduled send cancelled");
                Ok(Delivery {
                    message_id: None,
                    detail: format!("Scheduled email {identifier} cancelled"),
                })
            }
            status => Err(api_error(status, resp)),
        }
    }

    fn require_key(&self) -> Result<(), TransportError> {
        if self.config.has_key() {
            Ok(())
        } else {
            Err(TransportError::MissingCredentials {
                channel: CHANNEL.into(),
            })
        }
    }
}

fn api_error(status: u16, resp: ApiResponse) -> TransportError {
    TransportError::Api {
        channel: CHANNEL.into(),
        status,
        body: resp.body,
    }
}

/// `References` header for a reply: the prior chain with the replied-to id
/// appended, or just that id when there is no prior chain.
pub fn reply_references(prior: Option<&str>, message_id: &str) -> String {
    match prior.map(str::trim) {
        Some(refs) if !refs.is_empty() => format!("{refs} {message_id}"),
        _ => message_id.to_string(),
    }
}

/// HTML part of the message: newlines become `<br>`, nothing else is
/// rewritten. The body is caller input, same trust level as the text part.
pub fn html_content(body: &str) -> String {
    format!("<html><body>{}</body></html>", body.replace('\n', "<br>"))
}

fn build_payload(msg: &EmailMessage, default_sender: &str) -> serde_json::Value {
    let from = msg.from.as_deref().unwrap_or(default_sender);

    let mut payload = json!({
        "sender": { "email": from },
        "to": [{ "email": msg.to }],
        "subject": msg.subject,
        "htmlContent": html_content(&msg.body),
        "textContent": msg.body,
    });

    if let Some(thread) = &msg.threading {
        payload["headers"] = json!({
            "In-Reply-To": thread.message_id,
            "References": reply_references(thread.references.as_deref(), &thread.message_id),
        });
    }
    if let Some(at) = &msg.scheduled_at {
        payload["scheduledAt"] = json!(at);
    }
    if let Some(batch) = &msg.batch_id {
        payload["batchId"] = json!(batch);
    }

    payload
}

fn extract_message_id(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("messageId")?
        .as_str()
        .map(str::to_string)
}
