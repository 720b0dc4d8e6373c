//! Named parsing steps shared by the response normalizers.
//!
//! Each quirk of a provider's wire format gets an explicit, named helper
//! here so it can be unit-tested against fixture responses without any
//! network access.

/// Some providers prepend an anti-JSON-hijacking guard to every response
/// body. It must be stripped before parsing.
pub const GUARD_PREFIX: &str = ")]}'";

/// Strip the guard prefix and any following newline, if present.
pub fn strip_guard_prefix(body: &str) -> &str {
    match body.strip_prefix(GUARD_PREFIX) {
        Some(rest) => rest.trim_start_matches(['\r', '\n']),
        None => body,
    }
}

/// Whether a response body is a raw PDF document.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Extract the text content of the first `<tag>...</tag>` pair.
///
/// The XML-speaking providers use fixed, flat envelopes; this is a tag
/// lookup, not an XML parser. Returns `None` when the tag is absent or
/// unterminated.
pub fn xml_tag(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(xml_unescape(body[start..end].trim()))
}

/// Escape a value for embedding in an XML envelope.
pub fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Resolve the pre-provisioned e-card file for a member.
///
/// Providers without a live e-card integration keep per-member PDFs under
/// a per-provider directory, laid out by policy number.
pub fn static_ecard_path(base_dir: &str, policy_number: &str, member_code: &str) -> String {
    let base = base_dir.trim_end_matches('/');
    format!("{base}/{policy_number}/{member_code}.PDF")
}
