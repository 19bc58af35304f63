//! WhatsApp tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Tool, ToolReply, parse_params};
use crate::transport::whatsapp::{WhatsAppApi, WhatsAppMessage};

#[derive(Debug, Deserialize)]
struct SendWhatsAppParams {
    contact_numbers: Vec<String>,
    sender_number: String,
    #[serde(default)]
    template_id: Option<i64>,
    #[serde(default)]
    text: Option<String>,
}

/// Send a WhatsApp message. The first message to a new contact must use an
/// approved template; free text only works for contacts the business number
/// has already reached via a template.
pub struct SendWhatsAppTool {
    api: Arc<WhatsAppApi>,
}

impl SendWhatsAppTool {
    pub fn new(api: Arc<WhatsAppApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for SendWhatsAppTool {
    fn name(&self) -> &str {
        "send_whatsapp"
    }

    fn description(&self) -> &str {
        "Send a WhatsApp message using a template id or free text (template required for first contact)"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "contact_numbers": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Recipient numbers with country code"
                },
                "sender_number": { "type": "string", "description": "Registered WhatsApp business number" },
                "template_id": { "type": "integer", "description": "Approved template to send" },
                "text": { "type": "string", "description": "Free-text body (only for previously contacted numbers)" }
            },
            "required": ["contact_numbers", "sender_number"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: SendWhatsAppParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };
        let msg = WhatsAppMessage {
            contact_numbers: p.contact_numbers,
            sender_number: p.sender_number,
            template_id: p.template_id,
            text: p.text,
        };
        match self.api.send(&msg).await {
            Ok(d) => ToolReply::ok(format!(
                "✅ {} (message id: {})",
                d.detail,
                d.message_id.as_deref().unwrap_or("N/A")
            )),
            Err(e) => ToolReply::err(format!("❌ Failed to send WhatsApp message: {e}")),
        }
    }
}
