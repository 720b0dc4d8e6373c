//! Wire-level request/response descriptions.
//!
//! Request builders produce a [`WireRequest`] and response normalizers
//! consume a [`WireResponse`]; neither touches the network. The dispatch
//! engine owns the actual transport, which keeps every per-provider
//! builder and normalizer unit-testable against fixtures.

use serde_json::Value;

/// HTTP method of an outbound provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMethod {
    Get,
    Post,
}

/// Provider-specific request body shape.
#[derive(Debug, Clone)]
pub enum WireBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Xml(String),
}

/// A fully built outbound request, ready for the transport.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: WireMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: WireBody,
}

impl WireRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: WireMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: WireBody::Empty,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: WireMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: WireBody::Empty,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = WireBody::Json(body);
        self
    }

    pub fn with_form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = WireBody::Form(pairs);
        self
    }

    pub fn with_xml(mut self, envelope: impl Into<String>) -> Self {
        self.body = WireBody::Xml(envelope.into());
        self
    }
}

/// A raw provider response, as received.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Truncated body for diagnostics and logging.
    pub fn excerpt(&self) -> String {
        excerpt(&self.text(), EXCERPT_CHARS)
    }
}

/// How much of a raw response is kept for diagnostics.
pub const EXCERPT_CHARS: usize = 240;

/// Truncate to at most `max_chars` characters, marking the cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders_compose() {
        let request = WireRequest::post("https://uat.example.com/claims")
            .with_header("X-Api-Key", "k")
            .with_json(json!({"policy": "P1"}));
        assert_eq!(request.method, WireMethod::Post);
        assert_eq!(request.headers.len(), 1);
        assert!(matches!(request.body, WireBody::Json(_)));
    }

    #[test]
    fn test_response_text_and_status() {
        let response = WireResponse::new(200, Some("application/json".into()), b"{}".to_vec());
        assert!(response.is_success());
        assert_eq!(response.text(), "{}");

        let response = WireResponse::new(502, None, Vec::new());
        assert!(!response.is_success());
    }

    #[test]
    fn test_excerpt_truncates_and_trims() {
        assert_eq!(excerpt("  short  ", 10), "short");
        let long = "x".repeat(300);
        let cut = excerpt(&long, 240);
        assert_eq!(cut.chars().count(), 243);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_excerpt_is_char_safe() {
        let text = "ठीक है ".repeat(80);
        let cut = excerpt(&text, 100);
        assert!(cut.chars().count() <= 103);
    }
}
