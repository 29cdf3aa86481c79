//! Codec errors.

use http::StatusCode;
use std::time::SystemTimeError;

/// Failure to read a payment challenge, receipt or authorization off the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The response is not a `402 Payment Required`.
    #[error("Response status {status} is not a payment challenge")]
    NotAPaymentChallenge { status: StatusCode },
    /// A 402 whose body does not describe a payment this client can make.
    #[error("Malformed payment challenge: {0}")]
    MalformedChallenge(String),
    /// The response carries no `X-PAYMENT-RESPONSE` header.
    #[error("Payment receipt header is missing")]
    MissingReceipt,
    #[error("Malformed payment receipt: {0}")]
    MalformedReceipt(String),
    #[error("Malformed payment authorization: {0}")]
    MalformedAuthorization(String),
    /// The reception time of a challenge could not be read off the system clock.
    #[error("System clock is before the Unix epoch: {0}")]
    Clock(String),
}

impl From<SystemTimeError> for DecodeError {
    fn from(error: SystemTimeError) -> Self {
        DecodeError::Clock(error.to_string())
    }
}

/// Failure to put a payment document on the wire.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Failed to encode payment document to json")]
    Json(#[source] serde_json::Error),
    #[error("Failed to encode payment document to HTTP header")]
    HeaderValue(#[source] http::header::InvalidHeaderValue),
}
