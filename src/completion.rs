//! Chat completion client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (Groq by default).
//! [`CompletionClient::complete`] never fails: provider faults are logged and
//! replaced with [`FALLBACK_REPLY`] so the user always gets an answer.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::{Error, Result};

/// System instruction sent with every request
pub const SYSTEM_PROMPT: &str = "You're a multilingual helpful assistant.";

/// Reply used when the provider cannot produce one
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Completion API client
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

/// A message in the request
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
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

impl CompletionClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: CompletionConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            model: config.model,
            endpoint: format!("{}/chat/completions", config.api_url),
        })
    }

    /// Model identifier used for requests
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request a reply for `prompt`, falling back to [`FALLBACK_REPLY`] on any fault
    pub async fn complete(&self, prompt: &str) -> String {
        match self.try_complete(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, model = %self.model, "completion request failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Request a reply for `prompt`
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-2xx status, an unparsable body
    /// or a response without a first choice
    pub async fn try_complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        tracing::debug!(prompt_len = prompt.len(), model = %self.model, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("API error {status}: {body}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("Parse error: {e}")))?;

        let reply = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Completion("No choices in response".to_string()))?;

        tracing::debug!(reply_len = reply.len(), "completion received");
        Ok(reply)
    }
}
