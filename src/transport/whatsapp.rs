//! WhatsApp messages over the provider's REST API.
//!
//! A message needs either a template id or free text; that combination is
//! checked before any network call. The provider's own business rule — the
//! first message to a new contact must be template-based, free text only
//! works after template-initiated contact — is the caller's responsibility
//! and is not checked here.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde_json::json;

use super::{ApiRequest, ApiTransport, Delivery, Method};
use crate::config::BrevoConfig;
use crate::error::TransportError;

const CHANNEL: &str = "whatsapp";

/// One outbound WhatsApp request.
#[derive(Debug, Clone, Default)]
pub struct WhatsAppMessage {
    /// Recipient numbers with country code.
    pub contact_numbers: Vec<String>,
    /// Registered WhatsApp business number doing the sending.
    pub sender_number: String,
    /// Approved template to send.
    pub template_id: Option<i64>,
    /// Free-text body, valid only for previously contacted numbers.
    pub text: Option<String>,
}

/// WhatsApp client.
pub struct WhatsAppApi {
    config: BrevoConfig,
    transport: Arc<dyn ApiTransport>,
}

impl WhatsAppApi {
    pub fn new(config: BrevoConfig, transport: Arc<dyn ApiTransport>) -> Self {
        Self { config, transport }
    }

    pub async fn send(&self, msg: &WhatsAppMessage) -> Result<Delivery, TransportError> {
        if !self.config.has_key() {
            return Err(TransportError::MissingCredentials {
                channel: CHANNEL.into(),
            });
        }
        if msg.template_id.is_none() && msg.text.is_none() {
            return Err(TransportError::InvalidRequest {
                channel: CHANNEL.into(),
                reason: "either template_id or text is required".into(),
            });
        }

        let mut payload = json!({
            "senderNumber": msg.sender_number,
            "contactNumbers": msg.contact_numbers,
        });
        if let Some(template_id) = msg.template_id {
            payload["templateId"] = json!(template_id);
        }
        if let Some(text) = &msg.text {
            payload["text"] = json!(text);
        }

        let resp = self
            .transport
            .execute(ApiRequest {
                method: Method::Post,
                path: "/whatsapp/sendMessage".into(),
                api_key: self.config.api_key.expose_secret().to_string(),
                body: Some(payload),
            })
            .await?;

        match resp.status {
            200 | 201 => {
                tracing::info!(
                    recipients = msg.contact_numbers.len(),
                    "WhatsApp message accepted by provider"
                );
                Ok(Delivery {
                    message_id: extract_message_id(&resp.body),
                    detail: format!(
                        "WhatsApp message sent to {} recipient(s)",
                        msg.contact_numbers.len()
                    ),
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

fn extract_message_id(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("messageId")?
        .as_str()
        .map(str::to_string)
}
