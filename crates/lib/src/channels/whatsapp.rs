//! WhatsApp via Twilio: the gateway POSTs `application/x-www-form-urlencoded` with `Body` and `From`.

use serde::Deserialize;

use super::{Channel, InboundMessage};

const UNKNOWN_SENDER: &str = "unknown";

/// Fields of the Twilio webhook form that the pipeline consumes. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct WhatsAppPayload {
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
}

impl WhatsAppPayload {
    /// Missing `Body` becomes empty text (menu path); missing `From` becomes "unknown".
    pub fn into_inbound(self) -> InboundMessage {
        let sender = self
            .from
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        InboundMessage::new(sender, self.body.unwrap_or_default(), Channel::WhatsApp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_body_is_empty_text() {
        let msg = WhatsAppPayload {
            body: None,
            from: Some("whatsapp:+966500000000".to_string()),
        }
        .into_inbound();
        assert_eq!(msg.text, "");
        assert_eq!(msg.sender, "whatsapp:+966500000000");
        assert_eq!(msg.channel, Channel::WhatsApp);
    }

    #[test]
    fn missing_from_is_unknown() {
        let msg = WhatsAppPayload::default().into_inbound();
        assert_eq!(msg.sender, "unknown");
    }
}
