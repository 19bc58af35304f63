//! Legacy email path: STARTTLS SMTP relay via lettre.
//!
//! Kept alongside the REST path for deployments that only hold relay
//! credentials. Builds a multipart/alternative message (plain text plus the
//! same newline-to-`<br>` HTML used by the REST path) and hands it to a
//! blocking lettre transport under `spawn_blocking`.

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use super::Delivery;
use super::email::html_content;
use crate::config::SmtpConfig;
use crate::error::TransportError;

const CHANNEL: &str = "smtp";

/// SMTP relay client.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Send one email through the relay. Missing credentials fail before any
    /// connection is attempted.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        from: Option<&str>,
    ) -> Result<Delivery, TransportError> {
        if !self.config.has_credentials() {
            return Err(TransportError::MissingCredentials {
                channel: CHANNEL.into(),
            });
        }

        let config = self.config.clone();
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();
        let from = from.map(str::to_string);

        tokio::task::spawn_blocking(move || {
            send_blocking(&config, &to, &subject, &body, from.as_deref())
        })
        .await
        .map_err(|e| TransportError::Smtp(format!("send task failed: {e}")))?
    }
}

fn send_blocking(
    config: &SmtpConfig,
    to: &str,
    subject: &str,
    body: &str,
    from: Option<&str>,
) -> Result<Delivery, TransportError> {
    let from_addr = from.unwrap_or(&config.from_email);
    let from_mbox: Mailbox = from_addr
        .parse()
        .map_err(|e| TransportError::Address(format!("invalid from address {from_addr:?}: {e}")))?;
    let to_mbox: Mailbox = to
        .parse()
        .map_err(|e| TransportError::Address(format!("invalid to address {to:?}: {e}")))?;

    let email = Message::builder()
        .from(from_mbox)
        .to(to_mbox)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(
            body.to_string(),
            html_content(body),
        ))
        .map_err(|e| TransportError::Smtp(format!("failed to build message: {e}")))?;

    let transport = SmtpTransport::starttls_relay(&config.server)
        .map_err(|e| TransportError::Smtp(format!("relay setup failed: {e}")))?
        .port(config.port)
        .credentials(Credentials::new(
            config.login.clone(),
            config.password.expose_secret().to_string(),
        ))
        .build();

    transport
        .send(&email)
        .map_err(|e| TransportError::Smtp(format!("send failed: {e}")))?;

    tracing::info!(%to, "Email sent via SMTP relay");
    Ok(Delivery {
        // The relay does not hand back a message identifier.
        message_id: None,
        detail: format!("Email sent successfully to {to}"),
    })
}
