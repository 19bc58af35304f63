//! SMS over the provider's transactional REST API.
//!
//! No client-side validation of phone-number format, sender-label length or
//! character set: all of that is delegated to the provider and surfaced
//! through non-2xx responses.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use super::{ApiRequest, ApiTransport, Delivery, Method};
use crate::config::BrevoConfig;
use crate::error::TransportError;

const CHANNEL: &str = "sms";

/// Message class understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsKind {
    #[default]
    Transactional,
    Marketing,
}

impl SmsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SmsKind::Transactional => "transactional",
            SmsKind::Marketing => "marketing",
        }
    }
}

/// One outbound SMS request.
#[derive(Debug, Clone)]
pub struct SmsMessage {
    /// Recipient number with country code, e.g. `+33612345678`.
    pub to: String,
    pub content: String,
    /// Optional sender label shown on the handset.
    pub sender: Option<String>,
    pub kind: SmsKind,
}

/// Transactional SMS client.
pub struct SmsApi {
    config: BrevoConfig,
    transport: Arc<dyn ApiTransport>,
}

impl SmsApi {
    pub fn new(config: BrevoConfig, transport: Arc<dyn ApiTransport>) -> Self {
        Self { config, transport }
    }

    pub async fn send(&self, msg: &SmsMessage) -> Result<Delivery, TransportError> {
        if !self.config.has_key() {
            return Err(TransportError::MissingCredentials {
                channel: CHANNEL.into(),
            });
        }

        let mut payload = json!({
            "type": msg.kind.as_str(),
            "recipient": msg.to,
            "content": msg.content,
        });
        if let Some(sender) = &msg.sender {
            payload["sender"] = json!(sender);
        }

        let resp = self
            .transport
            .execute(ApiRequest {
                method: Method::Post,
                path: "/transactionalSMS/sms".into(),
                api_key: self.config.api_key.expose_secret().to_string(),
                body: Some(payload),
            })
            .await?;

        match resp.status {
            200 | 201 => {
                tracing::info!(to = %msg.to, "SMS accepted by provider");
                Ok(Delivery {
                    message_id: extract_sms_id(&resp.body),
                    detail: format!("SMS sent successfully to {}", msg.to),
                })
            }
            status => Err(TransportError::Api {
                channel: CHANNEL.into(),
                status,
                body: resp.body,
            }),
        }
    }
}

/// The SMS endpoint reports a numeric `messageId` plus a string `reference`;
/// prefer the message id, fall back to the reference.
fn extract_sms_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(id) = value.get("messageId") {
        if let Some(n) = id.as_i64() {
            return Some(n.to_string());
        }
        if let Some(s) = id.as_str() {
            return Some(s.to_string());
        }
    }
    value.get("reference")?.as_str().map(str::to_string)
}
