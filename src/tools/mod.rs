//! Tool abstraction for the RPC surface.

pub mod email;
pub mod registry;
pub mod sms;
pub mod whatsapp;

pub use email::{
    DeleteScheduledEmailTool, ReplyEmailTool, ScheduleEmailTool, SendAiEmailTool,
    SendDirectEmailTool, SendEmailTool,
};
pub use registry::{ToolDefinition, ToolRegistry};
pub use sms::SendSmsTool;
pub use whatsapp::SendWhatsAppTool;

use std::sync::Arc;

use async_trait::async_trait;

use crate::generate::EmailDrafter;
use crate::transport::email::EmailApi;
use crate::transport::sms::SmsApi;
use crate::transport::smtp::SmtpMailer;
use crate::transport::whatsapp::WhatsAppApi;

/// Outcome of a tool call, already formatted for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn err(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// A named operation exposed over the tool-call surface.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;
    /// Execute the tool. Never propagates an error: every failure comes back
    /// as an error reply with a descriptive message.
    async fn call(&self, params: serde_json::Value) -> ToolReply;
}

/// Deserialize tool arguments, mapping failures to an error reply.
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    params: serde_json::Value,
) -> Result<T, ToolReply> {
    serde_json::from_value(params).map_err(|e| ToolReply::err(format!("❌ Invalid parameters: {e}")))
}

/// Shared handles the tool set is built from.
pub struct ToolDeps {
    pub email: Arc<EmailApi>,
    pub sms: Arc<SmsApi>,
    pub whatsapp: Arc<WhatsAppApi>,
    pub mailer: Arc<SmtpMailer>,
    pub drafter: Arc<dyn EmailDrafter>,
}

/// Build the full tool registry for the RPC surface.
pub fn build_registry(deps: ToolDeps) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SendEmailTool::new(Arc::clone(&deps.email))));
    registry.register(Arc::new(ReplyEmailTool::new(Arc::clone(&deps.email))));
    registry.register(Arc::new(ScheduleEmailTool::new(Arc::clone(&deps.email))));
    registry.register(Arc::new(DeleteScheduledEmailTool::new(Arc::clone(
        &deps.email,
    ))));
    registry.register(Arc::new(SendAiEmailTool::new(
        Arc::clone(&deps.email),
        Arc::clone(&deps.drafter),
    )));
    registry.register(Arc::new(SendDirectEmailTool::new(deps.mailer)));
    registry.register(Arc::new(SendSmsTool::new(deps.sms)));
    registry.register(Arc::new(SendWhatsAppTool::new(deps.whatsapp)));
    registry
}
