//! Web chat widget: JSON `{ "Body": ..., "From": ... }`. The widget's older `message` field is
//! accepted as an alias of `Body`.

use serde::Deserialize;

use super::{Channel, InboundMessage};

#[derive(Debug, Default, Deserialize)]
pub struct WebPayload {
    #[serde(rename = "Body", alias = "message", default)]
    pub body: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
}

impl WebPayload {
    /// `visitor_label` stands in for a missing or blank `From`.
    pub fn into_inbound(self, visitor_label: &str) -> InboundMessage {
        let sender = self
            .from
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| visitor_label.to_string());
        InboundMessage::new(sender, self.body.unwrap_or_default(), Channel::Web)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_alias_is_body() {
        let payload: WebPayload =
            serde_json::from_str(r#"{"message":"كم السعر؟"}"#).unwrap();
        let msg = payload.into_inbound("Web visitor");
        assert_eq!(msg.text, "كم السعر؟");
        assert_eq!(msg.sender, "Web visitor");
        assert_eq!(msg.channel, Channel::Web);
    }

    #[test]
    fn from_is_kept() {
        let payload: WebPayload =
            serde_json::from_str(r#"{"Body":"hello there","From":"visitor-42"}"#).unwrap();
        assert_eq!(payload.into_inbound("Web visitor").sender, "visitor-42");
    }
}
