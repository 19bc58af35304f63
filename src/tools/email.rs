//! Email tools: direct send, reply threading, scheduling, AI drafting and
//! the legacy SMTP path.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Tool, ToolReply, parse_params};
use crate::generate::EmailDrafter;
use crate::transport::Delivery;
use crate::transport::email::{EmailApi, EmailMessage, Threading};
use crate::transport::smtp::SmtpMailer;

fn id_or_na(delivery: &Delivery) -> &str {
    delivery.message_id.as_deref().unwrap_or("N/A")
}

// ── send_email ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SendEmailParams {
    to_email: String,
    subject: String,
    body: String,
    #[serde(default)]
    from_email: Option<String>,
}

/// Send an email through the transactional REST API.
pub struct SendEmailTool {
    api: Arc<EmailApi>,
}

impl SendEmailTool {
    pub fn new(api: Arc<EmailApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email with the provided subject and body"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to_email": { "type": "string", "description": "Recipient email address" },
                "subject": { "type": "string", "description": "Email subject line" },
                "body": { "type": "string", "description": "Complete email body content" },
                "from_email": { "type": "string", "description": "Sender address (defaults to the configured sender)" }
            },
            "required": ["to_email", "subject", "body"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: SendEmailParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };
        let msg = EmailMessage {
            to: p.to_email,
            subject: p.subject,
            body: p.body,
            from: p.from_email,
            ..Default::default()
        };
        match self.api.send(&msg).await {
            Ok(d) => ToolReply::ok(format!("✅ {} (message id: {})", d.detail, id_or_na(&d))),
            Err(e) => ToolReply::err(format!("❌ Failed to send email: {e}")),
        }
    }
}

// ── reply_email ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ReplyEmailParams {
    to_email: String,
    subject: String,
    body: String,
    /// Identifier of the message being replied to.
    message_id: String,
    /// Space-separated chain of prior message identifiers.
    #[serde(default)]
    references: Option<String>,
    #[serde(default)]
    from_email: Option<String>,
}

/// Reply within an email thread. Sets `In-Reply-To` and extends the
/// `References` chain so mail clients group the reply correctly.
pub struct ReplyEmailTool {
    api: Arc<EmailApi>,
}

impl ReplyEmailTool {
    pub fn new(api: Arc<EmailApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ReplyEmailTool {
    fn name(&self) -> &str {
        "reply_email"
    }

    fn description(&self) -> &str {
        "Reply within an email thread, preserving threading headers"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to_email": { "type": "string", "description": "Recipient email address" },
                "subject": { "type": "string", "description": "Email subject line" },
                "body": { "type": "string", "description": "Reply body content" },
                "message_id": { "type": "string", "description": "Message-ID of the email being replied to" },
                "references": { "type": "string", "description": "Space-separated References chain of the thread so far" },
                "from_email": { "type": "string", "description": "Sender address (defaults to the configured sender)" }
            },
            "required": ["to_email", "subject", "body", "message_id"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: ReplyEmailParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };
        let msg = EmailMessage {
            to: p.to_email,
            subject: p.subject,
            body: p.body,
            from: p.from_email,
            threading: Some(Threading {
                message_id: p.message_id,
                references: p.references,
            }),
            ..Default::default()
        };
        match self.api.send(&msg).await {
            Ok(d) => ToolReply::ok(format!(
                "✅ Reply sent successfully to {} (message id: {})",
                msg.to,
                id_or_na(&d)
            )),
            Err(e) => ToolReply::err(format!("❌ Failed to send reply: {e}")),
        }
    }
}

// ── schedule_email ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScheduleEmailParams {
    to_email: String,
    subject: String,
    body: String,
    /// ISO-8601 send time. The provider enforces its 72-hour window.
    scheduled_at: String,
    #[serde(default)]
    batch_id: Option<String>,
    #[serde(default)]
    from_email: Option<String>,
}

/// Schedule an email for a future send time, optionally grouped under a
/// batch id for bulk cancellation.
pub struct ScheduleEmailTool {
    api: Arc<EmailApi>,
}

impl ScheduleEmailTool {
    pub fn new(api: Arc<EmailApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ScheduleEmailTool {
    fn name(&self) -> &str {
        "schedule_email"
    }

    fn description(&self) -> &str {
        "Schedule an email for a future send time (up to 72 hours ahead)"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to_email": { "type": "string", "description": "Recipient email address" },
                "subject": { "type": "string", "description": "Email subject line" },
                "body": { "type": "string", "description": "Complete email body content" },
                "scheduled_at": { "type": "string", "description": "ISO-8601 timestamp for the send, e.g. 2026-09-01T10:00:00Z" },
                "batch_id": { "type": "string", "description": "Optional batch identifier grouping scheduled sends" },
                "from_email": { "type": "string", "description": "Sender address (defaults to the configured sender)" }
            },
            "required": ["to_email", "subject", "body", "scheduled_at"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: ScheduleEmailParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };

        // The timestamp is passed through untouched; an unparseable value
        // will come back as a provider error, but it is worth a heads-up.
        if chrono::DateTime::parse_from_rfc3339(&p.scheduled_at).is_err() {
            tracing::warn!(scheduled_at = %p.scheduled_at, "scheduled_at is not RFC 3339");
        }

        let batch = p.batch_id.clone();
        let msg = EmailMessage {
            to: p.to_email,
            subject: p.subject,
            body: p.body,
            from: p.from_email,
            scheduled_at: Some(p.scheduled_at.clone()),
            batch_id: p.batch_id,
            ..Default::default()
        };
        match self.api.send(&msg).await {
            Ok(d) => ToolReply::ok(format!(
                "✅ Email to {} scheduled for {} (message id: {}, batch id: {})",
                msg.to,
                p.scheduled_at,
                id_or_na(&d),
                batch.as_deref().unwrap_or("N/A")
            )),
            Err(e) => ToolReply::err(format!("❌ Failed to schedule email: {e}")),
        }
    }
}

// ── delete_scheduled_email ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DeleteScheduledParams {
    /// Batch id or single message id of a not-yet-sent email.
    identifier: String,
}

/// Cancel a scheduled email (or a whole batch) before its send time.
pub struct DeleteScheduledEmailTool {
    api: Arc<EmailApi>,
}

impl DeleteScheduledEmailTool {
    pub fn new(api: Arc<EmailApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for DeleteScheduledEmailTool {
    fn name(&self) -> &str {
        "delete_scheduled_email"
    }

    fn description(&self) -> &str {
        "Cancel a scheduled email by message id or batch id"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "identifier": { "type": "string", "description": "Message id or batch id of the scheduled send" }
            },
            "required": ["identifier"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: DeleteScheduledParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };
        match self.api.delete_scheduled(&p.identifier).await {
            Ok(d) => ToolReply::ok(format!("✅ {}", d.detail)),
            Err(e) => ToolReply::err(format!("❌ Failed to cancel scheduled email: {e}")),
        }
    }
}

// ── send_ai_email ───────────────────────────────────────────────────

fn default_tone() -> String {
    "professional".to_string()
}

#[derive(Debug, Deserialize)]
struct SendAiEmailParams {
    to_email: String,
    subject: String,
    /// Context or key points; the drafter generates the full body.
    context: String,
    #[serde(default = "default_tone")]
    tone: String,
    #[serde(default)]
    from_email: Option<String>,
}

/// Draft an email body from context and tone, then send it. A draft failure
/// is reported as its own error and nothing is sent.
pub struct SendAiEmailTool {
    api: Arc<EmailApi>,
    drafter: Arc<dyn EmailDrafter>,
}

impl SendAiEmailTool {
    pub fn new(api: Arc<EmailApi>, drafter: Arc<dyn EmailDrafter>) -> Self {
        Self { api, drafter }
    }
}

#[async_trait]
impl Tool for SendAiEmailTool {
    fn name(&self) -> &str {
        "send_ai_email"
    }

    fn description(&self) -> &str {
        "Generate an email body with AI from context and tone, then send it"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to_email": { "type": "string", "description": "Recipient email address" },
                "subject": { "type": "string", "description": "Email subject line" },
                "context": { "type": "string", "description": "Context or key points for the email" },
                "tone": { "type": "string", "description": "Tone of the email: professional, friendly or formal (default professional)" },
                "from_email": { "type": "string", "description": "Sender address (defaults to the configured sender)" }
            },
            "required": ["to_email", "subject", "context"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: SendAiEmailParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };

        let body = match self.drafter.draft(&p.context, &p.tone).await {
            Ok(body) => body,
            Err(e) => {
                return ToolReply::err(format!("❌ Email not sent — drafting failed: {e}"));
            }
        };

        let msg = EmailMessage {
            to: p.to_email,
            subject: p.subject,
            body: body.clone(),
            from: p.from_email,
            ..Default::default()
        };
        match self.api.send(&msg).await {
            Ok(d) => ToolReply::ok(format!(
                "✅ Email Sent Successfully!\n\nTo: {}\nSubject: {}\n\nGenerated Content:\n{}\n\nStatus: {} (message id: {})",
                msg.to,
                msg.subject,
                body,
                d.detail,
                id_or_na(&d)
            )),
            Err(e) => ToolReply::err(format!(
                "❌ Email Failed to Send\n\nError: {e}\n\nGenerated Content (not sent):\n{body}"
            )),
        }
    }
}

// ── send_direct_email (legacy SMTP path) ────────────────────────────

#[derive(Debug, Deserialize)]
struct SendDirectEmailParams {
    to_email: String,
    subject: String,
    body: String,
    #[serde(default)]
    from_email: Option<String>,
}

/// Send an email through the SMTP relay instead of the REST API.
pub struct SendDirectEmailTool {
    mailer: Arc<SmtpMailer>,
}

impl SendDirectEmailTool {
    pub fn new(mailer: Arc<SmtpMailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Tool for SendDirectEmailTool {
    fn name(&self) -> &str {
        "send_direct_email"
    }

    fn description(&self) -> &str {
        "Send an email directly via the SMTP relay"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to_email": { "type": "string", "description": "Recipient email address" },
                "subject": { "type": "string", "description": "Email subject line" },
                "body": { "type": "string", "description": "Complete email body content" },
                "from_email": { "type": "string", "description": "Sender address (defaults to the configured SMTP sender)" }
            },
            "required": ["to_email", "subject", "body"]
        })
    }

    async fn call(&self, params: serde_json::Value) -> ToolReply {
        let p: SendDirectEmailParams = match parse_params(params) {
            Ok(p) => p,
            Err(reply) => return reply,
        };
        match self
            .mailer
            .send(&p.to_email, &p.subject, &p.body, p.from_email.as_deref())
            .await
        {
            Ok(d) => ToolReply::ok(format!("✅ {}", d.detail)),
            Err(e) => ToolReply::err(format!("❌ Failed to send email: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use secrecy::SecretString;
    use serde_json::json;

    use super::*;
    use crate::config::BrevoConfig;
    use crate::error::{GenerateError, TransportError};
    use crate::transport::{ApiRequest, ApiResponse, ApiTransport};

    struct FakeTransport {
        requests: Mutex<Vec<ApiRequest>>,
        response: ApiResponse,
    }

    impl FakeTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: ApiResponse {
                    status,
                    body: body.to_string(),
                },
            })
        }

        fn count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_body(&self) -> serde_json::Value {
            self.requests
                .lock()
                .unwrap()
                .last()
                .and_then(|r| r.body.clone())
                .unwrap()
        }
    }

    #[async_trait::async_trait]
    impl ApiTransport for FakeTransport {
        async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, TransportError> {
            self.requests.lock().unwrap().push(req);
            Ok(self.response.clone())
        }
    }

    struct StubDrafter {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl EmailDrafter for StubDrafter {
        async fn draft(&self, context: &str, tone: &str) -> Result<String, GenerateError> {
            if self.fail {
                Err(GenerateError::EmptyCompletion)
            } else {
                Ok(format!("Drafted ({tone}): {context}"))
            }
        }
    }

    fn email_api(fake: &Arc<FakeTransport>) -> Arc<EmailApi> {
        let config = BrevoConfig {
            api_key: SecretString::from("key"),
            base_url: "https://api.test".to_string(),
            default_sender: "agent@example.com".to_string(),
        };
        Arc::new(EmailApi::new(config, fake.clone()))
    }

    #[tokio::test]
    async fn send_email_reports_message_id() {
        let fake = FakeTransport::new(201, r#"{"messageId":"<1@relay>"}"#);
        let tool = SendEmailTool::new(email_api(&fake));

        let reply = tool
            .call(json!({
                "to_email": "to@example.com",
                "subject": "Hi",
                "body": "line1\nline2",
            }))
            .await;

        assert!(!reply.is_error);
        assert!(reply.text.starts_with('✅'));
        assert!(reply.text.contains("<1@relay>"));
        assert!(
            fake.last_body()["htmlContent"]
                .as_str()
                .unwrap()
                .contains("line1<br>line2")
        );
    }

    #[tokio::test]
    async fn send_email_reports_na_without_message_id() {
        let fake = FakeTransport::new(200, "{}");
        let tool = SendEmailTool::new(email_api(&fake));

        let reply = tool
            .call(json!({"to_email": "to@example.com", "subject": "Hi", "body": "b"}))
            .await;
        assert!(reply.text.contains("message id: N/A"));
    }

    #[tokio::test]
    async fn invalid_parameters_are_an_error_reply() {
        let fake = FakeTransport::new(201, "{}");
        let tool = SendEmailTool::new(email_api(&fake));

        let reply = tool.call(json!({"subject": "Hi"})).await;
        assert!(reply.is_error);
        assert!(reply.text.contains("Invalid parameters"));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn reply_email_extends_reference_chain() {
        let fake = FakeTransport::new(201, "{}");
        let tool = ReplyEmailTool::new(email_api(&fake));

        let reply = tool
            .call(json!({
                "to_email": "to@example.com",
                "subject": "Re: Hi",
                "body": "thanks",
                "message_id": "C",
                "references": "A B",
            }))
            .await;

        assert!(!reply.is_error);
        let headers = &fake.last_body()["headers"];
        assert_eq!(headers["In-Reply-To"], "C");
        assert_eq!(headers["References"], "A B C");
    }

    #[tokio::test]
    async fn schedule_email_reports_batch_id() {
        let fake = FakeTransport::new(201, r#"{"messageId":"<2@relay>"}"#);
        let tool = ScheduleEmailTool::new(email_api(&fake));

        let reply = tool
            .call(json!({
                "to_email": "to@example.com",
                "subject": "Later",
                "body": "b",
                "scheduled_at": "2026-09-01T10:00:00Z",
                "batch_id": "launch-42",
            }))
            .await;

        assert!(!reply.is_error);
        assert!(reply.text.contains("batch id: launch-42"));
        assert_eq!(fake.last_body()["batchId"], "launch-42");
    }

    #[tokio::test]
    async fn schedule_email_without_batch_reports_na() {
        let fake = FakeTransport::new(201, "{}");
        let tool = ScheduleEmailTool::new(email_api(&fake));

        let reply = tool
            .call(json!({
                "to_email": "to@example.com",
                "subject": "Later",
                "body": "b",
                "scheduled_at": "2026-09-01T10:00:00Z",
            }))
            .await;

        assert!(reply.text.contains("batch id: N/A"));
        assert!(fake.last_body().get("batchId").is_none());
    }

    #[tokio::test]
    async fn delete_scheduled_failure_keeps_status_and_body() {
        let fake = FakeTransport::new(404, r#"{"message":"not found"}"#);
        let tool = DeleteScheduledEmailTool::new(email_api(&fake));

        let reply = tool.call(json!({"identifier": "launch-42"})).await;
        assert!(reply.is_error);
        assert!(reply.text.contains("404"));
        assert!(reply.text.contains("not found"));
    }

    #[tokio::test]
    async fn ai_email_sends_drafted_body() {
        let fake = FakeTransport::new(201, r#"{"messageId":"<3@relay>"}"#);
        let tool = SendAiEmailTool::new(email_api(&fake), Arc::new(StubDrafter { fail: false }));

        let reply = tool
            .call(json!({
                "to_email": "to@example.com",
                "subject": "Update",
                "context": "ship date moved to Friday",
            }))
            .await;

        assert!(!reply.is_error);
        // Default tone applies when the caller leaves it out.
        assert!(reply.text.contains("Drafted (professional): ship date moved to Friday"));
        assert_eq!(
            fake.last_body()["textContent"],
            "Drafted (professional): ship date moved to Friday"
        );
    }

    #[tokio::test]
    async fn ai_email_draft_failure_sends_nothing() {
        let fake = FakeTransport::new(201, "{}");
        let tool = SendAiEmailTool::new(email_api(&fake), Arc::new(StubDrafter { fail: true }));

        let reply = tool
            .call(json!({
                "to_email": "to@example.com",
                "subject": "Update",
                "context": "ctx",
            }))
            .await;

        assert!(reply.is_error);
        assert!(reply.text.contains("drafting failed"));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn ai_email_send_failure_includes_generated_content() {
        let fake = FakeTransport::new(500, "upstream error");
        let tool = SendAiEmailTool::new(email_api(&fake), Arc::new(StubDrafter { fail: false }));

        let reply = tool
            .call(json!({
                "to_email": "to@example.com",
                "subject": "Update",
                "context": "ctx",
                "tone": "formal",
            }))
            .await;

        assert!(reply.is_error);
        assert!(reply.text.contains("Generated Content (not sent):"));
        assert!(reply.text.contains("Drafted (formal): ctx"));
    }

    #[tokio::test]
    async fn direct_email_without_credentials_is_an_error_reply() {
        use crate::config::SmtpConfig;

        let mailer = Arc::new(SmtpMailer::new(SmtpConfig {
            server: "smtp-relay.example.com".to_string(),
            port: 587,
            login: String::new(),
            password: SecretString::from(""),
            from_email: "agent@example.com".to_string(),
        }));
        let tool = SendDirectEmailTool::new(mailer);

        let reply = tool
            .call(json!({"to_email": "to@example.com", "subject": "Hi", "body": "b"}))
            .await;
        assert!(reply.is_error);
        assert!(reply.text.contains("credentials not found"));
    }
}
