//! Byte-buffer normalization helpers shared by attribute types and formatters.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::ValueError;

/// Encode bytes as standard (padded) base64.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard base64 into owned bytes.
pub fn decode_base64(raw: &str) -> Result<Vec<u8>, ValueError> {
    STANDARD
        .decode(raw)
        .map_err(|e| ValueError::parse("Binary", raw, e.to_string()))
}

/// View a byte buffer as UTF-8 text.
pub fn text_from_bytes(bytes: &[u8]) -> Result<&str, ValueError> {
    core::str::from_utf8(bytes)
        .map_err(|e| ValueError::constraint(format!("body is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let data = vec![0u8, 1, 2, 254, 255];
        let encoded = encode_base64(&data);
        assert_eq!(decode_base64(&encoded).unwrap(), data);
    }

    #[test]
    fn decode_rejects_non_base64() {
        assert!(decode_base64("not base64!").is_err());
    }

    #[test]
    fn text_from_bytes_rejects_invalid_utf8() {
        assert_eq!(text_from_bytes(b"hello").unwrap(), "hello");
        assert!(text_from_bytes(&[0xff, 0xfe]).is_err());
    }
}
