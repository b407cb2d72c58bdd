//! `WhatsApp` channel adapter
//!
//! Uses the `WhatsApp` Business Cloud API for sending messages and fetching
//! media. Inbound events arrive through the webhook in [`crate::api::webhooks`].

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{Error, Result};

/// JSON pointer to the only message the relay looks at
const FIRST_MESSAGE_POINTER: &str = "/entry/0/changes/0/value/messages/0";

/// `WhatsApp` channel adapter
pub struct WhatsAppChannel {
    /// `WhatsApp` Business API access token
    access_token: SecretString,
    /// Phone number ID for sending messages
    phone_number_id: String,
    /// Graph API base URL, without trailing slash
    api_url: String,
    client: Client,
}

impl WhatsAppChannel {
    /// Create a new `WhatsApp` channel adapter
    ///
    /// # Arguments
    ///
    /// * `access_token` - `WhatsApp` Business API access token
    /// * `phone_number_id` - Phone number ID registered with `WhatsApp` Business
    /// * `api_url` - Graph API base URL, e.g. `https://graph.facebook.com/v17.0`
    /// * `timeout` - Per-request timeout for all Graph API calls
    ///
    /// # Errors
    ///
    /// Returns error if the token or phone number ID is empty, or the HTTP
    /// client cannot be built
    pub fn new(
        access_token: SecretString,
        phone_number_id: String,
        api_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        if access_token.expose_secret().is_empty() {
            return Err(Error::Config("WhatsApp access token required".to_string()));
        }
        if phone_number_id.is_empty() {
            return Err(Error::Config("WhatsApp phone number ID required".to_string()));
        }

        Ok(Self {
            access_token,
            phone_number_id,
            api_url,
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Send a text message to a `WhatsApp` number
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or answers with a non-2xx status
    pub async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        let url = format!("{}/{}/messages", self.api_url, self.phone_number_id);

        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": text }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("WhatsApp API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!("WhatsApp API error: {status} - {body}")));
        }

        tracing::debug!(to, len = text.len(), "WhatsApp message sent");
        Ok(())
    }

    /// Download media bytes by media ID
    ///
    /// Resolves the short-lived media URL first, then fetches its content.
    /// Both requests carry the access token.
    ///
    /// # Errors
    ///
    /// Returns error if either request fails, answers non-2xx, or the metadata
    /// carries no URL
    pub async fn download_media(&self, media_id: &str) -> Result<Vec<u8>> {
        let meta_url = format!("{}/{media_id}", self.api_url);

        let response = self
            .client
            .get(&meta_url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| Error::Download(format!("Media lookup failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Download(format!("Media lookup failed: {status} - {body}")));
        }

        let media: MediaInfo = response
            .json()
            .await
            .map_err(|e| Error::Download(format!("Media lookup parse error: {e}")))?;

        tracing::debug!(
            media_id,
            mime_type = ?media.mime_type,
            file_size = ?media.file_size,
            "resolved media URL"
        );

        let response = self
            .client
            .get(&media.url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| Error::Download(format!("Download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Download(format!("Download failed: {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("Read failed: {e}")))?;

        Ok(bytes.to_vec())
    }
}

/// Media metadata returned by `GET /{media-id}`
#[derive(Debug, Deserialize)]
struct MediaInfo {
    url: String,
    mime_type: Option<String>,
    file_size: Option<u64>,
}

/// Reference to an uploaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Media ID used to fetch the bytes
    pub id: String,
    /// Filename as sent by the user (untrusted)
    pub filename: String,
}

/// Message content the relay distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Plain text message
    Text { body: String },
    /// Document attachment
    Document(DocumentRef),
    /// Anything else (image, audio, reaction, ...)
    Unsupported { kind: String },
}

/// First message of a webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Sender phone number, used as the reply recipient
    pub from: String,
    /// Message content
    pub message: InboundMessage,
}

/// Parse a raw webhook body into its first message
///
/// # Errors
///
/// Returns [`Error::MalformedEnvelope`] if the body is not JSON, the message
/// path `entry[0].changes[0].value.messages[0]` is absent, or the message
/// lacks a sender
pub fn parse_envelope(body: &[u8]) -> Result<InboundEvent> {
    let envelope: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| Error::MalformedEnvelope(format!("invalid JSON: {e}")))?;

    let raw = envelope
        .pointer(FIRST_MESSAGE_POINTER)
        .ok_or_else(|| Error::MalformedEnvelope("no message at entry[0].changes[0].value.messages[0]".to_string()))?;

    let message = WhatsAppMessage::deserialize(raw)
        .map_err(|e| Error::MalformedEnvelope(format!("invalid message: {e}")))?;

    Ok(message.into_event())
}

/// `WhatsApp` message as delivered by the Cloud API
#[derive(Debug, Deserialize)]
struct WhatsAppMessage {
    /// Sender phone number
    from: String,
    /// Message type
    #[serde(rename = "type")]
    message_type: Option<String>,
    /// Text content (for text messages)
    text: Option<WhatsAppTextContent>,
    /// Document content
    document: Option<WhatsAppDocument>,
}

/// `WhatsApp` text message content
#[derive(Debug, Deserialize)]
struct WhatsAppTextContent {
    body: String,
}

/// `WhatsApp` document media
#[derive(Debug, Deserialize)]
struct WhatsAppDocument {
    /// Media ID (use to fetch URL)
    id: String,
    filename: Option<String>,
}

impl WhatsAppMessage {
    fn into_event(self) -> InboundEvent {
        // Text wins when both are present
        let message = if let Some(text) = self.text {
            InboundMessage::Text { body: text.body }
        } else if let Some(doc) = self.document {
            InboundMessage::Document(DocumentRef {
                id: doc.id,
                filename: doc.filename.unwrap_or_default(),
            })
        } else {
            InboundMessage::Unsupported {
                kind: self.message_type.unwrap_or_else(|| "unknown".to_string()),
            }
        };

        InboundEvent {
            from: self.from,
            message,
        }
    }
}
