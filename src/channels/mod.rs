//! Messaging channel adapters

mod whatsapp;

pub use whatsapp::{
    DocumentRef, InboundEvent, InboundMessage, WhatsAppChannel, parse_envelope,
};
