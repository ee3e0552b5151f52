//! Header and body transfer encodings
//!
//! - RFC 2047 Q-encoded words for non-ASCII header values
//! - Base64 bodies wrapped at [`LINE_LENGTH`] characters

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Maximum length of a base64 body line, excluding CRLF
pub const LINE_LENGTH: usize = 70;

const CHARSET: &str = "utf-8";

/// Maximum length of a single encoded word (RFC 2047 section 2)
const MAX_ENCODED_WORD_LEN: usize = 75;

/// Room left for encoded text once `=?utf-8?q?` and `?=` are accounted for
const MAX_CONTENT_LEN: usize =
    MAX_ENCODED_WORD_LEN - "=?".len() - CHARSET.len() - "?q?".len() - "?=".len();

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Q-encode a header value if it contains anything but printable ASCII
///
/// Plain values are returned unchanged. Encoded values are split into
/// space-separated encoded words, never splitting a UTF-8 character.
pub fn q_encode(value: &str) -> String {
    if !needs_encoding(value) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() * 3);
    open_word(&mut out);
    let mut current_len = 0;

    for ch in value.chars() {
        let mut utf8 = [0u8; 4];
        let bytes = ch.encode_utf8(&mut utf8).as_bytes();
        let encoded_len: usize = bytes.iter().map(|b| q_len(*b)).sum();

        if current_len + encoded_len > MAX_CONTENT_LEN {
            out.push_str("?=");
            out.push(' ');
            open_word(&mut out);
            current_len = 0;
        }

        for b in bytes {
            write_q_byte(&mut out, *b);
        }
        current_len += encoded_len;
    }

    out.push_str("?=");
    out
}

fn needs_encoding(value: &str) -> bool {
    value
        .bytes()
        .any(|b| (b < b' ' || b > b'~') && b != b'\t')
}

fn open_word(out: &mut String) {
    out.push_str("=?");
    out.push_str(CHARSET);
    out.push_str("?q?");
}

fn is_q_literal(b: u8) -> bool {
    (b'!'..=b'~').contains(&b) && b != b'=' && b != b'?' && b != b'_'
}

fn q_len(b: u8) -> usize {
    if b == b' ' || is_q_literal(b) {
        1
    } else {
        3
    }
}

fn write_q_byte(out: &mut String, b: u8) {
    if b == b' ' {
        out.push('_');
    } else if is_q_literal(b) {
        out.push(b as char);
    } else {
        out.push('=');
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
}

/// Base64-encode `content` and split it into CRLF-separated lines
///
/// The result carries no trailing CRLF; empty input yields an empty string.
pub fn encode_base64_lines(content: &[u8]) -> String {
    let encoded = BASE64.encode(content);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_LENGTH * 2);

    // Base64 output is ASCII, so byte chunks are character chunks
    for (i, chunk) in encoded.as_bytes().chunks(LINE_LENGTH).enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(q_encode("Hello world"), "Hello world");
        assert_eq!(q_encode(""), "");
        assert_eq!(q_encode("tab\tallowed"), "tab\tallowed");
    }

    #[test]
    fn test_non_ascii_encoded() {
        assert_eq!(q_encode("Café"), "=?utf-8?q?Caf=C3=A9?=");
        assert_eq!(q_encode("Grüße an alle"), "=?utf-8?q?Gr=C3=BC=C3=9Fe_an_alle?=");
    }

    #[test]
    fn test_specials_escaped_once_encoding() {
        assert_eq!(q_encode("ä=?_"), "=?utf-8?q?=C3=A4=3D=3F=5F?=");
    }

    #[test]
    fn test_control_chars_trigger_encoding() {
        assert_eq!(q_encode("a\r\nb"), "=?utf-8?q?a=0D=0Ab?=");
    }

    #[test]
    fn test_long_value_split_into_words() {
        let value = "é".repeat(40);
        let encoded = q_encode(&value);
        let words: Vec<&str> = encoded.split(' ').collect();

        assert!(words.len() > 1);
        for word in &words {
            assert!(word.len() <= MAX_ENCODED_WORD_LEN, "word too long: {}", word);
            assert!(word.starts_with("=?utf-8?q?"));
            assert!(word.ends_with("?="));
            // Never split inside a two-byte character
            let body = &word["=?utf-8?q?".len()..word.len() - 2];
            assert_eq!(body.len() % 6, 0);
        }
    }

    #[test]
    fn test_base64_lines() {
        let content = vec![b'x'; 200];
        let wrapped = encode_base64_lines(&content);
        let lines: Vec<&str> = wrapped.split("\r\n").collect();

        assert!(lines.iter().all(|l| l.len() <= LINE_LENGTH));
        assert!(lines[..lines.len() - 1].iter().all(|l| l.len() == LINE_LENGTH));

        let joined: String = lines.concat();
        assert_eq!(BASE64.decode(joined).unwrap(), content);
    }

    #[test]
    fn test_base64_empty() {
        assert_eq!(encode_base64_lines(b""), "");
    }
}
