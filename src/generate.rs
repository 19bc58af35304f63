//! Email body drafting via a chat-completion endpoint.
//!
//! A draft failure is a real error, distinct from transport errors: the
//! caller decides whether to send anything at all, so error text never ends
//! up inside an email body.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::GroqConfig;
use crate::error::GenerateError;

/// Drafts an email body from a short context string and a tone label.
#[async_trait]
pub trait EmailDrafter: Send + Sync {
    async fn draft(&self, context: &str, tone: &str) -> Result<String, GenerateError>;
}

/// Instruction template sent with every draft request.
pub(crate) fn draft_prompt(context: &str, tone: &str) -> String {
    format!(
        "You are a professional email writer. Generate a well-structured email based on the following context.\n\
         \n\
         Context: {context}\n\
         \n\
         Tone: {tone}\n\
         \n\
         Requirements:\n\
         - Write a complete, professional email\n\
         - Include appropriate greeting and closing\n\
         - Keep it concise and clear\n\
         - Make it engaging and actionable\n\
         - Do NOT include subject line (that will be provided separately)\n\
         \n\
         Generate the email body only:"
    )
}

/// Drafter backed by Groq's OpenAI-compatible chat-completions endpoint.
pub struct GroqDrafter {
    config: GroqConfig,
    client: reqwest::Client,
}

impl GroqDrafter {
    pub fn new(config: GroqConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl EmailDrafter for GroqDrafter {
    async fn draft(&self, context: &str, tone: &str) -> Result<String, GenerateError> {
        if !self.config.has_key() {
            return Err(GenerateError::MissingCredentials);
        }

        let request = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": draft_prompt(context, tone) }],
            "temperature": 0.7,
            "max_tokens": 1024,
            "top_p": 1,
            "stream": false,
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::RequestFailed(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| GenerateError::RequestFailed(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(GenerateError::Api { status, body });
        }

        let completion: Completion = serde_json::from_str(&body)
            .map_err(|e| GenerateError::RequestFailed(format!("unexpected response shape: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GenerateError::EmptyCompletion)
    }
}
