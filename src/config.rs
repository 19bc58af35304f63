//! Configuration objects, built once at startup from the environment and
//! passed by reference into the components that need them.
//!
//! Missing credentials never abort startup: each channel reports a failure
//! outcome at call time instead, so a partially configured server still
//! serves the tools that are usable.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Default relay for the legacy SMTP path.
const DEFAULT_SMTP_SERVER: &str = "smtp-relay.brevo.com";
const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_BREVO_BASE_URL: &str = "https://api.brevo.com/v3";

const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_SERVER_PATH: &str = "/mcp";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_port(key: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a port number, got {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

fn env_secret(key: &str) -> SecretString {
    SecretString::from(std::env::var(key).unwrap_or_default())
}

// ── Messaging provider (REST) ───────────────────────────────────────

/// Credentials and defaults for the provider's transactional REST API.
#[derive(Debug, Clone)]
pub struct BrevoConfig {
    pub api_key: SecretString,
    pub base_url: String,
    /// Sender address used when a call does not override it.
    pub default_sender: String,
}

impl BrevoConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_secret("BREVO_API_KEY"),
            base_url: env_or("BREVO_BASE_URL", DEFAULT_BREVO_BASE_URL),
            default_sender: std::env::var("BREVO_FROM_EMAIL")
                .or_else(|_| std::env::var("SMTP_FROM_EMAIL"))
                .unwrap_or_default(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }
}

// ── SMTP relay (legacy email path) ──────────────────────────────────

/// SMTP relay credentials for the legacy direct-send path.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub login: String,
    pub password: SecretString,
    pub from_email: String,
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: env_or("SMTP_SERVER", DEFAULT_SMTP_SERVER),
            port: env_port("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            login: std::env::var("SMTP_LOGIN").unwrap_or_default(),
            password: env_secret("SMTP_PASSWORD"),
            from_email: std::env::var("SMTP_FROM_EMAIL").unwrap_or_default(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        !self.login.is_empty() && !self.password.expose_secret().is_empty()
    }
}

// ── Content generator ───────────────────────────────────────────────

/// Chat-completion endpoint used for drafting email bodies.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

impl GroqConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_secret("GROQ_API_KEY"),
            base_url: env_or("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL),
            model: env_or("GROQ_MODEL", DEFAULT_GROQ_MODEL),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }
}

// ── RPC surface ─────────────────────────────────────────────────────

/// Listening address for the tool-call server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or("MCP_HOST", DEFAULT_SERVER_HOST),
            port: env_port("MCP_PORT", DEFAULT_SERVER_PORT)?,
            path: env_or("MCP_PATH", DEFAULT_SERVER_PATH),
        })
    }
}

// ── Aggregate ───────────────────────────────────────────────────────

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub brevo: BrevoConfig,
    pub smtp: SmtpConfig,
    pub groq: GroqConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            brevo: BrevoConfig::from_env(),
            smtp: SmtpConfig::from_env()?,
            groq: GroqConfig::from_env(),
            server: ServerConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brevo_has_key_empty() {
        let config = BrevoConfig {
            api_key: SecretString::from(""),
            base_url: DEFAULT_BREVO_BASE_URL.to_string(),
            default_sender: String::new(),
        };
        assert!(!config.has_key());
    }

    #[test]
    fn brevo_has_key_set() {
        let config = BrevoConfig {
            api_key: SecretString::from("xkeysib-test"),
            base_url: DEFAULT_BREVO_BASE_URL.to_string(),
            default_sender: String::new(),
        };
        assert!(config.has_key());
    }

    #[test]
    fn smtp_credentials_require_both_login_and_password() {
        let mut config = SmtpConfig {
            server: DEFAULT_SMTP_SERVER.to_string(),
            port: DEFAULT_SMTP_PORT,
            login: "login".to_string(),
            password: SecretString::from(""),
            from_email: "agent@example.com".to_string(),
        };
        assert!(!config.has_credentials());

        config.password = SecretString::from("secret");
        assert!(config.has_credentials());

        config.login = String::new();
        assert!(!config.has_credentials());
    }

    #[test]
    fn port_parse_failure_is_a_config_error() {
        // SAFETY: var name is unique to this test; nothing reads it concurrently.
        unsafe { std::env::set_var("COURIER_TEST_BAD_PORT", "eight") };
        let err = env_port("COURIER_TEST_BAD_PORT", 8000).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        unsafe { std::env::remove_var("COURIER_TEST_BAD_PORT") };
    }

    #[test]
    fn unset_port_uses_default() {
        assert_eq!(env_port("COURIER_TEST_UNSET_PORT", 8000).unwrap(), 8000);
    }
}
