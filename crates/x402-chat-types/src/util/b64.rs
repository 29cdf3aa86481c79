//! Base64 encoding and decoding of payment header payloads.
//!
//! Both the `X-PAYMENT` request header and the `X-PAYMENT-RESPONSE` response header
//! carry JSON documents encoded with the standard, padded base64 alphabet.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use http::HeaderValue;
use http::header::InvalidHeaderValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt::Display;

/// Base64 text held as bytes, borrowed from a header or owned after encoding.
///
/// # Example
///
/// ```rust
/// use x402_chat_types::util::Base64Bytes;
///
/// let encoded = Base64Bytes::encode(b"hello world");
/// assert_eq!(encoded.to_string(), "aGVsbG8gd29ybGQ=");
/// assert_eq!(encoded.decode().unwrap(), b"hello world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Bytes<'a>(pub Cow<'a, [u8]>);

impl Base64Bytes<'_> {
    /// Decodes the base64 text to raw binary data.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        b64.decode(&self.0)
    }

    /// Encodes raw binary data into base64 text.
    pub fn encode<T: AsRef<[u8]>>(input: T) -> Base64Bytes<'static> {
        let encoded = b64.encode(input.as_ref());
        Base64Bytes(Cow::Owned(encoded.into_bytes()))
    }

    /// Serializes `value` to JSON and base64-encodes the result.
    pub fn encode_json<T: Serialize>(value: &T) -> Result<Base64Bytes<'static>, serde_json::Error> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::encode(json))
    }

    /// Decodes the base64 text and parses the bytes as JSON.
    ///
    /// Errors are flattened to strings: callers only need to know why the
    /// header was rejected, not to recover from a specific failure.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, String> {
        let bytes = self.decode().map_err(|e| format!("invalid base64: {e}"))?;
        serde_json::from_slice(&bytes).map_err(|e| format!("invalid json: {e}"))
    }

    /// Converts the base64 text into an HTTP header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_bytes(self.0.as_ref())
    }
}

impl AsRef<[u8]> for Base64Bytes<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<'a> From<&'a [u8]> for Base64Bytes<'a> {
    fn from(slice: &'a [u8]) -> Self {
        Base64Bytes(Cow::Borrowed(slice))
    }
}

impl<'a> From<&'a HeaderValue> for Base64Bytes<'a> {
    fn from(value: &'a HeaderValue) -> Self {
        Base64Bytes(Cow::Borrowed(value.as_bytes()))
    }
}

impl Display for Base64Bytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.0.as_ref()))
    }
}
