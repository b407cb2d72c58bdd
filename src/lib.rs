//! Relay Gateway - `WhatsApp` webhook relay for LLM assistants
//!
//! Receives `WhatsApp` Cloud API events, forwards text (or the extracted text of
//! an uploaded document) to an OpenAI-compatible completion API, and sends the
//! generated reply back to the chat.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              WhatsApp Cloud API (webhook)            │
//! └────────────────────────┬─────────────────────────────┘
//!                          │ GET/POST /webhook
//! ┌────────────────────────▼─────────────────────────────┐
//! │                   Relay Gateway                      │
//! │  Handshake │ Envelope parse │ Download │ Extraction  │
//! └───────────┬──────────────────────────────┬───────────┘
//!             │ chat/completions             │ messages
//! ┌───────────▼───────────┐      ┌───────────▼───────────┐
//! │  Completion provider  │      │     Graph API send    │
//! └───────────────────────┘      └───────────────────────┘
//! ```

pub mod api;
pub mod channels;
pub mod completion;
pub mod config;
pub mod documents;
pub mod error;

pub use api::{ApiServer, ApiState};
pub use channels::{DocumentRef, InboundEvent, InboundMessage, WhatsAppChannel};
pub use completion::CompletionClient;
pub use config::Config;
pub use documents::{DocumentFormat, extract_text};
pub use error::{Error, Result};
