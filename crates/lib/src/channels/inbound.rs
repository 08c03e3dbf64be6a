//! Inbound message from a channel: handed to the pipeline for one reply.

use serde::{Deserialize, Serialize};

/// Transport the message arrived on; decides the reply envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    WhatsApp,
    Web,
}

/// One customer message. Built once per request and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Opaque customer identifier (phone number for WhatsApp, label or id for web).
    pub sender: String,
    /// Raw body; may be empty.
    pub text: String,
    pub channel: Channel,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>, channel: Channel) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            channel,
        }
    }
}
