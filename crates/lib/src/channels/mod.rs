//! Inbound channels: the WhatsApp telephony webhook (Twilio form posts) and the web chat widget.
//!
//! Each channel's payload type converts into an [`InboundMessage`] for the pipeline.

mod inbound;
mod web;
mod whatsapp;

pub use inbound::{Channel, InboundMessage};
pub use web::WebPayload;
pub use whatsapp::WhatsAppPayload;
