//! MIME encoding utilities.
//!
//! Base64 bodies (RFC 2045), RFC 2047 encoded-words for unstructured header
//! text and RFC 2231 extended parameters for non-ASCII parameter values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Maximum encoded line length for base64 bodies, excluding CRLF.
pub const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64 on a single line.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 broken into CRLF-terminated lines of at most
/// [`MAX_LINE_LENGTH`] characters.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);

    // Base64 output is pure ASCII, so byte chunks are valid str slices.
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push_str("\r\n");
    }
    out
}

/// Encodes a header value as an RFC 2047 `B` encoded-word when it is not
/// plain printable ASCII; otherwise returns it unchanged.
///
/// Format: `=?utf-8?B?encoded-text?=`
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if is_plain_ascii(text) && !text.contains("=?") {
        return text.to_string();
    }

    format!("=?utf-8?B?{}?=", encode_base64(text.as_bytes()))
}

/// Formats a header parameter as `key="value"`.
///
/// Values outside printable ASCII use the RFC 2231 extended form
/// `key*=utf-8''percent-encoded`.
#[must_use]
pub fn encode_parameter(key: &str, value: &str) -> String {
    if is_plain_ascii(value) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{key}=\"{escaped}\"")
    } else {
        format!("{key}*=utf-8''{}", urlencoding::encode(value))
    }
}

fn is_plain_ascii(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
}
