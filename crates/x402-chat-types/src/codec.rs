//! Reading and writing payment documents on HTTP messages.
//!
//! | Document | Where | Encoding |
//! |---|---|---|
//! | challenge | body of a `402` response | JSON [`PaymentRequired`] |
//! | authorization | `X-PAYMENT` request header | base64 JSON [`PaymentPayload`] |
//! | receipt | `X-PAYMENT-RESPONSE` response header | base64 JSON [`PaymentReceipt`] |
//!
//! The encoding must match the serving side bit for bit, so every document goes
//! through the same serde definitions in both directions.

use http::{HeaderMap, HeaderValue, StatusCode};

use crate::challenge::PaymentChallenge;
use crate::error::{DecodeError, EncodeError};
use crate::proto::{PaymentPayload, PaymentRequired};
use crate::receipt::PaymentReceipt;
use crate::selector::{FirstMatch, PaymentSelector};
use crate::timestamp::UnixTimestamp;
use crate::util::Base64Bytes;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

/// Request header carrying the signed authorization.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";
/// Response header carrying the settlement receipt.
pub const PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";
/// Header used by x402 version 2 servers to carry their challenge.
pub const PAYMENT_REQUIRED_V2_HEADER: &str = "Payment-Required";

/// Decodes the challenge of a 402 response and picks the first payable option.
pub fn decode_challenge(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<PaymentChallenge, DecodeError> {
    decode_challenge_with(status, headers, body, &FirstMatch)
}

/// Decodes the challenge of a 402 response and lets `selector` pick the option to pay.
pub fn decode_challenge_with<S: PaymentSelector + ?Sized>(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    selector: &S,
) -> Result<PaymentChallenge, DecodeError> {
    let options = decode_challenge_options(status, headers, body)?;
    selector.select(&options).cloned().ok_or_else(|| {
        DecodeError::MalformedChallenge("no payment option accepted by the selector".to_string())
    })
}

/// Decodes every payable option of a 402 response, in server order.
///
/// Reception time is the current system time; a clock set before the epoch
/// is reported as [`DecodeError::Clock`].
pub fn decode_challenge_options(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Vec<PaymentChallenge>, DecodeError> {
    let received_at = UnixTimestamp::try_now()?;
    decode_challenge_options_at(status, headers, body, received_at)
}

/// Like [`decode_challenge_options`], with an explicit reception time.
///
/// Challenge expiry is computed from `received_at` and each option's
/// `maxTimeoutSeconds`.
#[cfg_attr(feature = "telemetry", instrument(name = "x402.codec.decode_challenge", skip_all, fields(%status), err))]
pub fn decode_challenge_options_at(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    received_at: UnixTimestamp,
) -> Result<Vec<PaymentChallenge>, DecodeError> {
    if status != StatusCode::PAYMENT_REQUIRED {
        return Err(DecodeError::NotAPaymentChallenge { status });
    }
    let payment_required = match serde_json::from_slice::<PaymentRequired>(body) {
        Ok(payment_required) => payment_required,
        Err(_) if headers.contains_key(PAYMENT_REQUIRED_V2_HEADER) => {
            return Err(DecodeError::MalformedChallenge(
                "x402 version 2 challenges are not supported".to_string(),
            ));
        }
        Err(e) => {
            return Err(DecodeError::MalformedChallenge(format!(
                "invalid payment required body: {e}"
            )));
        }
    };
    let mut options = Vec::with_capacity(payment_required.accepts.len());
    for requirements in &payment_required.accepts {
        if let Some(challenge) = PaymentChallenge::from_requirements(requirements, received_at)? {
            options.push(challenge);
        }
    }
    #[cfg(feature = "telemetry")]
    debug!(
        offered = payment_required.accepts.len(),
        payable = options.len(),
        "Decoded payment challenge"
    );
    if options.is_empty() {
        let mut message = format!(
            "no supported payment option among {} offered",
            payment_required.accepts.len()
        );
        if let Some(error) = payment_required.error {
            message.push_str(&format!(" (server said: {error})"));
        }
        return Err(DecodeError::MalformedChallenge(message));
    }
    Ok(options)
}

/// Serializes a 402 body.
pub fn encode_challenge(payment_required: &PaymentRequired) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(payment_required).map_err(EncodeError::Json)
}

/// Reads the `X-PAYMENT-RESPONSE` header.
///
/// Absence is [`DecodeError::MissingReceipt`]; use [`decode_receipt_if_present`] when
/// absence is expected, e.g. on endpoints that were not paid.
pub fn decode_receipt(headers: &HeaderMap) -> Result<PaymentReceipt, DecodeError> {
    decode_receipt_if_present(headers)?.ok_or(DecodeError::MissingReceipt)
}

/// Reads the `X-PAYMENT-RESPONSE` header, treating absence as `Ok(None)`.
pub fn decode_receipt_if_present(
    headers: &HeaderMap,
) -> Result<Option<PaymentReceipt>, DecodeError> {
    let Some(value) = headers.get(PAYMENT_RESPONSE_HEADER) else {
        return Ok(None);
    };
    Base64Bytes::from(value)
        .decode_json::<PaymentReceipt>()
        .map(Some)
        .map_err(DecodeError::MalformedReceipt)
}

/// Serializes a receipt into an `X-PAYMENT-RESPONSE` header value.
pub fn encode_receipt(receipt: &PaymentReceipt) -> Result<HeaderValue, EncodeError> {
    Base64Bytes::encode_json(receipt)
        .map_err(EncodeError::Json)?
        .to_header_value()
        .map_err(EncodeError::HeaderValue)
}

/// Serializes a signed payload into an `X-PAYMENT` header value.
pub fn encode_authorization(payload: &PaymentPayload) -> Result<HeaderValue, EncodeError> {
    Base64Bytes::encode_json(payload)
        .map_err(EncodeError::Json)?
        .to_header_value()
        .map_err(EncodeError::HeaderValue)
}

/// Reads an `X-PAYMENT` header value, as a paid endpoint would.
pub fn decode_authorization(value: &HeaderValue) -> Result<PaymentPayload, DecodeError> {
    Base64Bytes::from(value)
        .decode_json::<PaymentPayload>()
        .map_err(DecodeError::MalformedAuthorization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::TokenAmount;
    use crate::proto::{PaymentRequirements, X402Version1};
    use crate::selector::PreferNetwork;
    use serde_json::json;

    fn requirements(network: &str, amount: &str) -> PaymentRequirements {
        PaymentRequirements {
            scheme: "exact".to_string(),
            network: network.to_string(),
            max_amount_required: amount.to_string(),
            resource: "http://localhost:3000/api/payment/chat".to_string(),
            description: String::new(),
            mime_type: "application/json".to_string(),
            output_schema: None,
            pay_to: "0x209693Bc6afc0C5328bA36FaF03C514EF312287C".to_string(),
            max_timeout_seconds: 60,
            asset: "0x036CbD53842c5426634e7929541eC2318f3dCF7e".to_string(),
            extra: Some(json!({ "name": "USDC", "version": "2" })),
        }
    }

    fn body(accepts: Vec<PaymentRequirements>) -> Vec<u8> {
        encode_challenge(&PaymentRequired {
            x402_version: X402Version1,
            accepts,
            error: Some("X-PAYMENT header is required".to_string()),
        })
        .unwrap()
    }

    #[test]
    fn test_decode_challenge_requires_402() {
        let err = decode_challenge(StatusCode::OK, &HeaderMap::new(), b"{}").unwrap_err();
        assert_eq!(
            err,
            DecodeError::NotAPaymentChallenge {
                status: StatusCode::OK
            }
        );
    }

    #[test]
    fn test_decode_challenge_first_payable_option() {
        let body = body(vec![
            requirements("solana", "5"),
            requirements("base-sepolia", "10000"),
            requirements("base", "20000"),
        ]);
        let challenge =
            decode_challenge(StatusCode::PAYMENT_REQUIRED, &HeaderMap::new(), &body).unwrap();
        assert_eq!(challenge.network(), "base-sepolia");
        assert_eq!(challenge.amount(), TokenAmount::from(10_000u64));
    }

    #[test]
    fn test_decode_challenge_with_preferred_network() {
        let body = body(vec![
            requirements("base-sepolia", "10000"),
            requirements("base", "20000"),
        ]);
        let challenge = decode_challenge_with(
            StatusCode::PAYMENT_REQUIRED,
            &HeaderMap::new(),
            &body,
            &PreferNetwork::new(["base"]),
        )
        .unwrap();
        assert_eq!(challenge.network(), "base");
    }

    #[test]
    fn test_decode_challenge_expiry_from_reception_time() {
        let body = body(vec![requirements("base", "1")]);
        let received_at = UnixTimestamp::from_secs(1_000);
        let options =
            decode_challenge_options_at(StatusCode::PAYMENT_REQUIRED, &HeaderMap::new(), &body, received_at)
                .unwrap();
        assert_eq!(options[0].expires_at(), UnixTimestamp::from_secs(1_060));
    }

    #[test]
    fn test_decode_challenge_expiry_follows_system_clock() {
        let body = body(vec![requirements("base", "1")]);
        let before = UnixTimestamp::try_now().unwrap();
        let options =
            decode_challenge_options(StatusCode::PAYMENT_REQUIRED, &HeaderMap::new(), &body).unwrap();
        let after = UnixTimestamp::try_now().unwrap();
        assert!(options[0].expires_at() >= before + 60);
        assert!(options[0].expires_at() <= after + 60);
    }

    #[test]
    fn test_clock_before_epoch_is_a_decode_error() {
        let skew = std::time::SystemTime::UNIX_EPOCH
            .duration_since(std::time::SystemTime::now())
            .unwrap_err();
        assert!(matches!(DecodeError::from(skew), DecodeError::Clock(_)));
    }

    #[test]
    fn test_decode_challenge_not_json() {
        let err = decode_challenge(StatusCode::PAYMENT_REQUIRED, &HeaderMap::new(), b"nope")
            .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedChallenge(_)));
    }

    #[test]
    fn test_decode_challenge_missing_required_field() {
        let body = json!({
            "x402Version": 1,
            "accepts": [{ "scheme": "exact", "network": "base", "maxAmountRequired": "1" }]
        });
        let err = decode_challenge(
            StatusCode::PAYMENT_REQUIRED,
            &HeaderMap::new(),
            body.to_string().as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedChallenge(_)));
    }

    #[test]
    fn test_decode_challenge_negative_amount() {
        let body = body(vec![requirements("base", "-10")]);
        let err =
            decode_challenge(StatusCode::PAYMENT_REQUIRED, &HeaderMap::new(), &body).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedChallenge(_)));
    }

    #[test]
    fn test_decode_challenge_nothing_payable_mentions_server_error() {
        let body = body(vec![requirements("solana", "5")]);
        let err =
            decode_challenge(StatusCode::PAYMENT_REQUIRED, &HeaderMap::new(), &body).unwrap_err();
        let DecodeError::MalformedChallenge(message) = err else {
            panic!("unexpected error {err:?}");
        };
        assert!(message.contains("no supported payment option among 1 offered"));
        assert!(message.contains("X-PAYMENT header is required"));
    }

    #[test]
    fn test_decode_challenge_v2_header_only() {
        let mut headers = HeaderMap::new();
        headers.insert(PAYMENT_REQUIRED_V2_HEADER, HeaderValue::from_static("e30="));
        let err = decode_challenge(StatusCode::PAYMENT_REQUIRED, &headers, b"").unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedChallenge("x402 version 2 challenges are not supported".to_string())
        );
    }

    #[test]
    fn test_receipt_round_trip() {
        let receipts = [
            PaymentReceipt::settled("0xabc", "base-sepolia", "0x1234"),
            PaymentReceipt::settled("0xdef", "base", "0x5678")
                .with_amount(10_000u64)
                .with_timestamp(UnixTimestamp::from_secs(1_700_000_000)),
        ];
        for receipt in receipts {
            let mut headers = HeaderMap::new();
            headers.insert(PAYMENT_RESPONSE_HEADER, encode_receipt(&receipt).unwrap());
            assert_eq!(decode_receipt(&headers).unwrap(), receipt);
        }
    }

    #[test]
    fn test_receipt_reads_x402_settle_response() {
        let wire = json!({
            "success": true,
            "transaction": "0x5c6f",
            "network": "base-sepolia",
            "payer": "0x857b06519E91e3A54538791bDbb0E22373e36b66"
        });
        let mut headers = HeaderMap::new();
        headers.insert(
            PAYMENT_RESPONSE_HEADER,
            Base64Bytes::encode(wire.to_string()).to_header_value().unwrap(),
        );
        let receipt = decode_receipt(&headers).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.transaction, "0x5c6f");
        assert_eq!(receipt.amount, None);
    }

    #[test]
    fn test_receipt_missing() {
        let headers = HeaderMap::new();
        assert_eq!(decode_receipt(&headers), Err(DecodeError::MissingReceipt));
        assert_eq!(decode_receipt_if_present(&headers), Ok(None));
    }

    #[test]
    fn test_receipt_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(PAYMENT_RESPONSE_HEADER, HeaderValue::from_static("%%%"));
        assert!(matches!(
            decode_receipt(&headers),
            Err(DecodeError::MalformedReceipt(_))
        ));

        headers.insert(
            PAYMENT_RESPONSE_HEADER,
            Base64Bytes::encode(br#"{"success":true}"#).to_header_value().unwrap(),
        );
        assert!(matches!(
            decode_receipt_if_present(&headers),
            Err(DecodeError::MalformedReceipt(_))
        ));
    }

    #[test]
    fn test_decode_authorization_rejects_garbage() {
        let value = Base64Bytes::encode(b"{}").to_header_value().unwrap();
        assert!(matches!(
            decode_authorization(&value),
            Err(DecodeError::MalformedAuthorization(_))
        ));
    }
}
