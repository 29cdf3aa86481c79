//! Turning a challenge into a signed authorization.

use alloy_primitives::{Address, SignatureError};
use alloy_sol_types::SolStruct;
use std::time::SystemTimeError;
use x402_chat_types::proto::{
    ExactEvmPayload, ExactEvmPayloadAuthorization, ExactScheme, PaymentPayload, X402Version1,
};
use x402_chat_types::{
    PaymentAuthorization, PaymentChallenge, SpendingCeiling, TokenAmount, timestamp::UnixTimestamp,
};

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

use crate::signer::PaymentSigner;
use crate::types::{TransferWithAuthorization, asset_domain};

/// Backdating of `validAfter`, absorbing clock skew between client and chain.
const VALID_AFTER_SKEW_SECS: u64 = 10 * 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The challenge asks for more than the caller agreed to spend. Nothing was signed.
    #[error("Payment of {required} exceeds the spending ceiling of {ceiling}")]
    CeilingExceeded {
        required: TokenAmount,
        ceiling: SpendingCeiling,
    },
    /// The challenge is past its expiry. Nothing was signed.
    #[error("Payment challenge expired at {expired_at}")]
    ChallengeExpired { expired_at: UnixTimestamp },
    /// The signer refused or failed.
    #[error("Failed to sign payment authorization: {0}")]
    SigningFailed(#[source] alloy_signer::Error),
    #[error("System clock is before the Unix epoch: {0}")]
    Clock(#[from] SystemTimeError),
}

/// Signs an ERC-3009 authorization paying exactly what `challenge` asks for.
///
/// Checks run in order: the ceiling, then the expiry, then signing. A challenge
/// that fails a check never reaches the signer.
///
/// The authorization moves `challenge.amount()` from the signer's address to
/// `challenge.pay_to()`, is valid until `challenge.expires_at()`, and uses the
/// challenge nonce as its ERC-3009 nonce.
#[cfg_attr(
    feature = "telemetry",
    instrument(
        name = "x402.authorize",
        skip_all,
        fields(network = %challenge.network(), amount = %challenge.amount()),
        err
    )
)]
pub async fn authorize<S: PaymentSigner + ?Sized>(
    challenge: &PaymentChallenge,
    signer: &S,
    ceiling: SpendingCeiling,
) -> Result<PaymentAuthorization, AuthError> {
    let required = challenge.amount();
    if !ceiling.permits(&required) {
        return Err(AuthError::CeilingExceeded { required, ceiling });
    }
    let now = UnixTimestamp::try_now()?;
    if !challenge.is_live_at(now) {
        return Err(AuthError::ChallengeExpired {
            expired_at: challenge.expires_at(),
        });
    }

    let authorization = ExactEvmPayloadAuthorization {
        from: signer.address(),
        to: challenge.pay_to(),
        value: required,
        valid_after: now.saturating_sub(VALID_AFTER_SKEW_SECS),
        valid_before: challenge.expires_at(),
        nonce: challenge.nonce().as_b256(),
    };
    let hash = TransferWithAuthorization::from(&authorization)
        .eip712_signing_hash(&asset_domain(challenge));
    let signature = signer
        .sign_hash(&hash)
        .await
        .map_err(AuthError::SigningFailed)?;

    #[cfg(feature = "telemetry")]
    debug!(from = %authorization.from, to = %authorization.to, "Signed payment authorization");

    let payload = PaymentPayload {
        x402_version: X402Version1,
        scheme: ExactScheme,
        network: challenge.network().to_string(),
        payload: ExactEvmPayload {
            signature: signature.as_bytes().into(),
            authorization,
        },
    };
    Ok(PaymentAuthorization::new(challenge, payload))
}

/// Recovers the address that signed `payload`, assuming it answers `challenge`.
///
/// A serving side uses this to check an `X-PAYMENT` header before settling it.
pub fn recover_signer(
    payload: &PaymentPayload,
    challenge: &PaymentChallenge,
) -> Result<Address, SignatureError> {
    let signature = alloy_primitives::Signature::try_from(payload.payload.signature.as_ref())?;
    let hash = TransferWithAuthorization::from(&payload.payload.authorization)
        .eip712_signing_hash(&asset_domain(challenge));
    signature.recover_address_from_prehash(&hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, Signature, address};
    use alloy_signer_local::PrivateKeySigner;
    use async_trait::async_trait;
    use http::{HeaderMap, StatusCode};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use x402_chat_types::codec;

    const PAY_TO: Address = address!("0x209693Bc6afc0C5328bA36FaF03C514EF312287C");
    const USDC_BASE_SEPOLIA: Address = address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e");

    fn challenge_at(amount: &str, nonce: Option<&str>, received_at: UnixTimestamp) -> PaymentChallenge {
        let mut extra = json!({ "name": "USDC", "version": "2" });
        if let Some(nonce) = nonce {
            extra["nonce"] = json!(nonce);
        }
        let body = json!({
            "x402Version": 1,
            "accepts": [{
                "scheme": "exact",
                "network": "base-sepolia",
                "maxAmountRequired": amount,
                "resource": "http://localhost:3000/api/payment/chat",
                "description": "Chat completion",
                "mimeType": "application/json",
                "payTo": PAY_TO.to_string(),
                "maxTimeoutSeconds": 60,
                "asset": USDC_BASE_SEPOLIA.to_string(),
                "extra": extra,
            }]
        });
        let body = serde_json::to_vec(&body).unwrap();
        let mut options = codec::decode_challenge_options_at(
            StatusCode::PAYMENT_REQUIRED,
            &HeaderMap::new(),
            &body,
            received_at,
        )
        .unwrap();
        options.remove(0)
    }

    fn challenge(amount: &str, nonce: Option<&str>) -> PaymentChallenge {
        challenge_at(amount, nonce, UnixTimestamp::now())
    }

    /// Signs with an inner key and counts how often it was asked to.
    struct CountingSigner {
        inner: PrivateKeySigner,
        calls: AtomicUsize,
    }

    impl CountingSigner {
        fn new() -> Self {
            Self {
                inner: PrivateKeySigner::random(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PaymentSigner for CountingSigner {
        fn address(&self) -> Address {
            PaymentSigner::address(&self.inner)
        }

        async fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            PaymentSigner::sign_hash(&self.inner, hash).await
        }
    }

    struct RefusingSigner(Address);

    #[async_trait]
    impl PaymentSigner for RefusingSigner {
        fn address(&self) -> Address {
            self.0
        }

        async fn sign_hash(&self, _hash: &B256) -> Result<Signature, alloy_signer::Error> {
            Err(alloy_signer::Error::other("user rejected the request"))
        }
    }

    #[tokio::test]
    async fn test_authorize_commits_exact_amount_and_nonce() {
        let challenge = challenge("10000", Some("n1"));
        let signer = PrivateKeySigner::random();
        let ceiling = SpendingCeiling::atomic(10000u64);

        let authorization = authorize(&challenge, &signer, ceiling).await.unwrap();

        assert_eq!(authorization.amount(), TokenAmount::from(10000u64));
        assert_eq!(authorization.signer(), PaymentSigner::address(&signer));
        assert_eq!(authorization.expires_at(), challenge.expires_at());
        assert_eq!(authorization.challenge_nonce(), challenge.nonce());
        assert!(authorization.satisfies(&challenge));

        let evm = &authorization.payload().payload.authorization;
        assert_eq!(evm.to, PAY_TO);
        assert_eq!(evm.nonce, challenge.nonce().as_b256());
        assert!(evm.valid_after < challenge.issued_at());
        assert_eq!(authorization.payload().network, "base-sepolia");
    }

    #[tokio::test]
    async fn test_signature_recovers_to_signer() {
        let challenge = challenge("5000", None);
        let signer = PrivateKeySigner::random();

        let authorization = authorize(&challenge, &signer, SpendingCeiling::atomic(5000u64))
            .await
            .unwrap();

        let recovered = recover_signer(authorization.payload(), &challenge).unwrap();
        assert_eq!(recovered, PaymentSigner::address(&signer));
    }

    #[tokio::test]
    async fn test_tampered_amount_does_not_recover_to_signer() {
        let challenge = challenge("5000", None);
        let signer = PrivateKeySigner::random();
        let authorization = authorize(&challenge, &signer, SpendingCeiling::atomic(5000u64))
            .await
            .unwrap();

        let mut payload = authorization.payload().clone();
        payload.payload.authorization.value = TokenAmount::from(1u64);
        let recovered = recover_signer(&payload, &challenge).unwrap();
        assert_ne!(recovered, PaymentSigner::address(&signer));
    }

    #[tokio::test]
    async fn test_ceiling_exceeded_never_signs() {
        let challenge = challenge("20000", None);
        let signer = CountingSigner::new();
        let ceiling = SpendingCeiling::from_money("0.01", 6).unwrap();

        let err = authorize(&challenge, &signer, ceiling).await.unwrap_err();

        match err {
            AuthError::CeilingExceeded { required, ceiling } => {
                assert_eq!(required, TokenAmount::from(20000u64));
                assert_eq!(ceiling.amount(), TokenAmount::from(10000u64));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ceiling_is_inclusive() {
        let challenge = challenge("10000", None);
        let signer = CountingSigner::new();
        let ceiling = SpendingCeiling::from_money("0.01", 6).unwrap();

        authorize(&challenge, &signer, ceiling).await.unwrap();
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_challenge_never_signs() {
        let received_at = UnixTimestamp::now().saturating_sub(3600);
        let challenge = challenge_at("100", None, received_at);
        let signer = CountingSigner::new();

        let err = authorize(&challenge, &signer, SpendingCeiling::atomic(100u64))
            .await
            .unwrap_err();

        assert!(
            matches!(err, AuthError::ChallengeExpired { expired_at } if expired_at == challenge.expires_at())
        );
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_signer_refusal_is_reported() {
        let challenge = challenge("100", None);
        let signer = RefusingSigner(address!("0x1111111111111111111111111111111111111111"));

        let err = authorize(&challenge, &signer, SpendingCeiling::atomic(100u64))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::SigningFailed(_)));
    }

    #[tokio::test]
    async fn test_authorization_does_not_satisfy_other_challenge() {
        let first = challenge("100", Some("n1"));
        let second = challenge("100", Some("n2"));
        let signer = Arc::new(PrivateKeySigner::random());

        let authorization = authorize(&first, &signer, SpendingCeiling::atomic(100u64))
            .await
            .unwrap();

        assert!(authorization.satisfies(&first));
        assert!(!authorization.satisfies(&second));
    }

    #[tokio::test]
    async fn test_random_nonces_differ_between_challenges() {
        let signer = PrivateKeySigner::random();
        let ceiling = SpendingCeiling::atomic(100u64);
        let a = authorize(&challenge("100", None), &signer, ceiling).await.unwrap();
        let b = authorize(&challenge("100", None), &signer, ceiling).await.unwrap();
        assert_ne!(
            a.payload().payload.authorization.nonce,
            b.payload().payload.authorization.nonce
        );
    }
}
