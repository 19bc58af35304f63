//! SMS tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Tool, ToolReply, parse_params};
use crate::transport::sms::{SmsApi, SmsKind, SmsMessage};

#[derive(Debug, Deserialize)]
struct SendSmsParams {
    /// Recipient number with country code, e.g. `+33612345678`.
    phone_number: String,
    content: String,
    #[serde(default)]
    sender: Option<String>,
    #[serde(rename = "type", default)]
    kind: SmsKind,
}

/// Send an SMS through the transactional REST API.
pub struct SendSmsTool {
    api: Arc<SmsApi>,
}

impl SendSmsTool {
    pub fn new(api: Arc<SmsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for SendSmsTool {
    fn name(&self) -> &str {
        "send_sms"
    }

    fn description(&self) -> &str {
        "Send an SMS to a phone number with country code"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "phone_number": { "type": "string", "description": "Recipient phone number with country code" },
                "content": { "type": "string", "description": "Text message content" },
                "sender": { "type": "string", "description": "Sender label shown on the handset" },
                "type": { "type": "string", "enum": ["transactional", "marketing"], "description": "Message class (default transactional)" }
            },
            "required": ["phone_number", "content"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: SendSmsParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };
        let msg = SmsMessage {
            to: p.phone_number,
            content: p.content,
            sender: p.sender,
            kind: p.kind,
        };
        match self.api.send(&msg).await {
            Ok(d) => ToolReply::ok(format!(
                "✅ {} (message id: {})",
                d.detail,
                d.message_id.as_deref().unwrap_or("N/A")
            )),
            Err(e) => ToolReply::err(format!("❌ Failed to send SMS: {e}")),
        }
    }
}
