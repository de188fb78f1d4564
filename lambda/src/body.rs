//! Inbound body decoding and outbound base64 encoding.

use std::borrow::Cow;

use base64::{engine::general_purpose::STANDARD, DecodeError, Engine};
use bytes::Bytes;

/// Turns an event body into bytes, decoding it when the event flags it as base64.
///
/// `None` stays `None`: an absent body is distinct from an empty one.
pub fn decode(body: Option<&str>, base64_encoded: bool) -> Result<Option<Bytes>, DecodeError> {
    match body {
        None => Ok(None),
        Some(body) if base64_encoded => STANDARD.decode(body).map(|b| Some(Bytes::from(b))),
        Some(body) => Ok(Some(Bytes::copy_from_slice(body.as_bytes()))),
    }
}

/// Base64-encodes a reply body.
pub fn encode(body: &[u8]) -> String {
    STANDARD.encode(body)
}

// Keeps reply log lines short; the full body is logged at debug.
pub(crate) fn preview(encoded: &str) -> Cow<'_, str> {
    if encoded.len() > 25 {
        Cow::Owned(format!("{}...", &encoded[..20]))
    } else {
        Cow::Borrowed(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absent_body_stays_absent() {
        assert_eq!(decode(None, true).unwrap(), None);
        assert_eq!(decode(None, false).unwrap(), None);
    }

    #[test]
    fn empty_body_is_present() {
        assert_eq!(decode(Some(""), false).unwrap(), Some(Bytes::new()));
        assert_eq!(decode(Some(""), true).unwrap(), Some(Bytes::new()));
    }

    #[test]
    fn plain_body_passes_through() {
        let body = decode(Some("{\"a\":1}"), false).unwrap().unwrap();
        assert_eq!(&body[..], b"{\"a\":1}");
    }

    #[test]
    fn base64_body_is_decoded() {
        let body = decode(Some("aGVsbG8="), true).unwrap().unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(decode(Some("not base64!"), true).is_err());
    }

    #[test]
    fn preview_truncates_long_bodies() {
        assert_eq!(preview("b2s="), "b2s=");
        let long = "A".repeat(26);
        assert_eq!(preview(&long), format!("{}...", "A".repeat(20)));
        assert_eq!(preview(&"A".repeat(25)), "A".repeat(25));
    }

    proptest! {
        #[test]
        fn encode_then_decode_is_identity(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let encoded = encode(&bytes);
            let decoded = decode(Some(&encoded), true).unwrap().unwrap();
            prop_assert_eq!(&decoded[..], &bytes[..]);
        }
    }
}
