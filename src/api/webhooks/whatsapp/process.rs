//! `WhatsApp` message processing

use crate::Result;
use crate::api::ApiState;
use crate::channels::{DocumentRef, InboundEvent, InboundMessage};
use crate::documents::{self, DocumentFormat};

/// Sent when a document yields no text
pub const EMPTY_DOCUMENT_REPLY: &str = "The document appears to be empty or unreadable.";

/// Sent when a document cannot be downloaded or parsed
pub const PROCESSING_FAILED_REPLY: &str =
    "Sorry, I couldn't process this document. Please try again.";

/// Sent when the summary comes back blank
pub const EMPTY_SUMMARY_REPLY: &str =
    "Sorry, I couldn't generate a response for this document. Please try again.";

/// Wrap extracted document text in the summary instruction
#[must_use]
pub fn summary_prompt(document_text: &str) -> String {
    format!("Please analyze this document and provide a summary:\n\n{document_text}")
}

/// Dispatch one inbound event
pub(super) async fn process_event(state: &ApiState, event: InboundEvent) {
    let InboundEvent { from, message } = event;

    match message {
        InboundMessage::Text { body } => {
            tracing::info!(from = %from, len = body.len(), "text message received");
            let reply = state.completion.complete(&body).await;
            relay(state, &from, &reply).await;
        }
        InboundMessage::Document(doc) => {
            tracing::info!(from = %from, media_id = %doc.id, filename = %doc.filename, "document received");
            reply_to_document(state, &from, &doc).await;
        }
        InboundMessage::Unsupported { kind } => {
            tracing::debug!(from = %from, kind = %kind, "ignoring unsupported message type");
        }
    }
}

async fn reply_to_document(state: &ApiState, from: &str, doc: &DocumentRef) {
    let text = match fetch_document_text(state, doc).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, filename = %doc.filename, "document processing error");
            relay(state, from, PROCESSING_FAILED_REPLY).await;
            return;
        }
    };

    if text.trim().is_empty() {
        relay(state, from, EMPTY_DOCUMENT_REPLY).await;
        return;
    }

    let excerpt = documents::truncate_chars(&text, state.max_document_chars);
    let reply = state.completion.complete(&summary_prompt(excerpt)).await;

    if reply.trim().is_empty() {
        relay(state, from, EMPTY_SUMMARY_REPLY).await;
    } else {
        relay(state, from, &reply).await;
    }
}

/// Download a document and extract its text
///
/// The format is checked before downloading so unsupported files cost no
/// round trip.
async fn fetch_document_text(state: &ApiState, doc: &DocumentRef) -> Result<String> {
    let format = DocumentFormat::from_filename(&doc.filename)?;
    let data = state.whatsapp.download_media(&doc.id).await?;

    tracing::debug!(%format, bytes = data.len(), "document downloaded");
    documents::extract_text_blocking(data, doc.filename.clone()).await
}

/// Send a reply; failures are logged, the sender is not told
async fn relay(state: &ApiState, to: &str, text: &str) {
    if let Err(e) = state.whatsapp.send_text(to, text).await {
        tracing::warn!(error = %e, to, "failed to relay reply");
    }
}
