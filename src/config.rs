//! Configuration management for the relay gateway
//!
//! Everything is read from the process environment. Required values fail
//! startup with [`Error::Config`]; optional ones fall back to defaults.

use std::time::Duration;

use secrecy::SecretString;

use crate::{Error, Result};

/// Default completion model
pub const DEFAULT_MODEL: &str = "compound-beta";

/// Default OpenAI-compatible completion API base URL
pub const DEFAULT_COMPLETION_URL: &str = "https://api.groq.com/openai/v1";

/// Default `WhatsApp` Graph API base URL
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v17.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default number of extracted characters embedded in a summary prompt
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 4000;

/// Default outbound request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Relay gateway configuration
#[derive(Debug)]
pub struct Config {
    /// `WhatsApp` Cloud API settings
    pub whatsapp: WhatsAppConfig,

    /// Completion provider settings
    pub completion: CompletionConfig,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Extracted document text is cut to this many characters before prompting
    pub max_document_chars: usize,

    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
}

/// `WhatsApp` Cloud API configuration
#[derive(Debug)]
pub struct WhatsAppConfig {
    /// Bearer token for the Graph API (`WHATSAPP_TOKEN`)
    pub access_token: SecretString,

    /// Phone number ID used in the send endpoint (`PHONE_NUMBER_ID`)
    pub phone_number_id: String,

    /// Shared secret for the subscription handshake (`WHATSAPP_VERIFY_TOKEN`)
    pub verify_token: SecretString,

    /// App secret for `X-Hub-Signature-256` checks (`WHATSAPP_APP_SECRET`)
    pub app_secret: Option<SecretString>,

    /// Graph API base URL (`WHATSAPP_API_URL`)
    pub api_url: String,
}

/// Completion provider configuration
#[derive(Debug)]
pub struct CompletionConfig {
    /// Bearer token (`GROQ_API_KEY`)
    pub api_key: SecretString,

    /// Model identifier (`GROQ_MODEL`)
    pub model: String,

    /// OpenAI-compatible base URL (`GROQ_API_URL`)
    pub api_url: String,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on (`PORT`)
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| Error::Config(format!("{key} must be set")));

        let phone_number_id = require("PHONE_NUMBER_ID")?;
        if !phone_number_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Config(format!(
                "PHONE_NUMBER_ID must be numeric, got {phone_number_id:?}"
            )));
        }

        let whatsapp = WhatsAppConfig {
            access_token: SecretString::from(require("WHATSAPP_TOKEN")?),
            phone_number_id,
            verify_token: SecretString::from(require("WHATSAPP_VERIFY_TOKEN")?),
            app_secret: get("WHATSAPP_APP_SECRET").map(SecretString::from),
            api_url: trim_base_url(get("WHATSAPP_API_URL").unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string())),
        };

        let completion = CompletionConfig {
            api_key: SecretString::from(require("GROQ_API_KEY")?),
            model: get("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_url: trim_base_url(get("GROQ_API_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string())),
        };

        let api_server = ApiServerConfig {
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
        };

        let max_document_chars = parse_or(
            "RELAY_MAX_DOCUMENT_CHARS",
            get("RELAY_MAX_DOCUMENT_CHARS"),
            DEFAULT_MAX_DOCUMENT_CHARS,
        )?;
        if max_document_chars == 0 {
            return Err(Error::Config(
                "RELAY_MAX_DOCUMENT_CHARS must be greater than zero".to_string(),
            ));
        }

        let timeout_secs = parse_or(
            "RELAY_HTTP_TIMEOUT_SECS",
            get("RELAY_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        if whatsapp.app_secret.is_none() {
            tracing::warn!("WHATSAPP_APP_SECRET not set, webhook signatures will not be verified");
        }

        Ok(Self {
            whatsapp,
            completion,
            api_server,
            max_document_chars,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Parse an optional value, falling back to `default` when absent
fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has invalid value {raw:?}")))
    })
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
