//! Signed, single-use payment authorizations.

use alloy_primitives::Address;
use http::HeaderValue;

use crate::amount::TokenAmount;
use crate::challenge::{ChallengeNonce, PaymentChallenge};
use crate::codec;
use crate::error::EncodeError;
use crate::proto::PaymentPayload;
use crate::timestamp::UnixTimestamp;

/// A signed commitment to pay one [`PaymentChallenge`].
///
/// Deliberately not `Clone`: [`PaymentAuthorization::into_header_value`] consumes
/// it, so one authorization ends up on at most one request.
#[derive(Debug, PartialEq, Eq)]
pub struct PaymentAuthorization {
    challenge_nonce: ChallengeNonce,
    resource: String,
    payload: PaymentPayload,
}

impl PaymentAuthorization {
    /// Wraps a signed payload produced for `challenge`.
    pub fn new(challenge: &PaymentChallenge, payload: PaymentPayload) -> Self {
        Self {
            challenge_nonce: challenge.nonce().clone(),
            resource: challenge.resource().to_string(),
            payload,
        }
    }

    /// Nonce of the challenge this authorization answers.
    pub fn challenge_nonce(&self) -> &ChallengeNonce {
        &self.challenge_nonce
    }

    /// Resource of the challenge this authorization answers.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn signer(&self) -> Address {
        self.payload.payload.authorization.from
    }

    pub fn amount(&self) -> TokenAmount {
        self.payload.payload.authorization.value
    }

    pub fn expires_at(&self) -> UnixTimestamp {
        self.payload.payload.authorization.valid_before
    }

    pub fn payload(&self) -> &PaymentPayload {
        &self.payload
    }

    /// Whether this authorization pays exactly what `challenge` asks for, to whom it asks.
    pub fn satisfies(&self, challenge: &PaymentChallenge) -> bool {
        let authorization = &self.payload.payload.authorization;
        self.challenge_nonce == *challenge.nonce()
            && authorization.nonce == challenge.nonce().as_b256()
            && authorization.value == challenge.amount()
            && authorization.to == challenge.pay_to()
            && self.payload.network == challenge.network()
    }

    /// Serializes the authorization into an `X-PAYMENT` header value, consuming it.
    pub fn into_header_value(self) -> Result<HeaderValue, EncodeError> {
        codec::encode_authorization(&self.payload)
    }
}
