//! Reply encoding: render the final text in the envelope each channel expects.
//!
//! WhatsApp (Twilio) gets a TwiML `<Response><Message>` document and always HTTP 200; the web
//! widget gets `{"reply": ...}`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::channels::Channel;

pub const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Encoded response: body, media type, status, and for 405 the allowed methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReply {
    pub body: String,
    pub content_type: &'static str,
    pub status: StatusCode,
    pub allow: Option<&'static str>,
}

/// Encode reply text for `channel`.
pub fn encode(text: &str, channel: Channel) -> EncodedReply {
    match channel {
        Channel::WhatsApp => EncodedReply {
            body: format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
                escape_xml(text)
            ),
            content_type: XML_CONTENT_TYPE,
            status: StatusCode::OK,
            allow: None,
        },
        Channel::Web => EncodedReply {
            body: json!({ "reply": text }).to_string(),
            content_type: JSON_CONTENT_TYPE,
            status: StatusCode::OK,
            allow: None,
        },
    }
}

/// Unrecoverable pre-dispatch failure on the web endpoint (e.g. malformed body).
pub fn encode_error(message: &str) -> EncodedReply {
    EncodedReply {
        body: json!({ "error": message }).to_string(),
        content_type: JSON_CONTENT_TYPE,
        status: StatusCode::INTERNAL_SERVER_ERROR,
        allow: None,
    }
}

/// 405 with a short machine-readable body; `allow` lists the accepted methods.
pub fn method_not_allowed(allow: &'static str) -> EncodedReply {
    EncodedReply {
        body: json!({ "error": "method not allowed" }).to_string(),
        content_type: JSON_CONTENT_TYPE,
        status: StatusCode::METHOD_NOT_ALLOWED,
        allow: Some(allow),
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

impl IntoResponse for EncodedReply {
    fn into_response(self) -> Response {
        let mut res = (self.status, self.body).into_response();
        let headers = res.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type),
        );
        if let Some(allow) = self.allow {
            headers.insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        res
    }
}
