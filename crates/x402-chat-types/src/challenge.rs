//! Decoded payment challenges.
//!
//! A [`PaymentChallenge`] is one validated payment option from a 402 response: the
//! recipient, asset, network and amount the server asks for, together with the
//! nonce the authorization will be bound to and the moment after which the
//! challenge must not be paid anymore. Challenges are only produced by the codec
//! (see [`crate::codec`]) and never change afterwards.

use alloy_primitives::{Address, B256, hex, keccak256};
use rand::{Rng, rng};
use std::fmt::{Display, Formatter};

use crate::amount::TokenAmount;
use crate::error::DecodeError;
use crate::networks;
use crate::proto::{ExactScheme, PaymentRequirements};
use crate::timestamp::UnixTimestamp;

/// Identifies a single challenge; an authorization is valid for exactly one nonce.
///
/// When the server supplies a nonce in the option's `extra.nonce` it is used verbatim,
/// otherwise a fresh random one is drawn at decode time. The ERC-3009 authorization
/// needs 32 bytes: a `0x`-prefixed 32-byte hex nonce is used as is, anything else
/// is hashed with keccak256.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChallengeNonce {
    value: String,
    bytes: B256,
}

impl ChallengeNonce {
    /// A fresh nonce from 32 random bytes.
    pub fn random() -> Self {
        let bytes: [u8; 32] = rng().random();
        let bytes = B256::from(bytes);
        Self {
            value: hex::encode_prefixed(bytes),
            bytes,
        }
    }

    /// A nonce chosen by the server.
    pub fn from_server(value: &str) -> Self {
        let bytes = if value.len() == 66 && value.starts_with("0x") {
            value.parse::<B256>().unwrap_or_else(|_| keccak256(value))
        } else {
            keccak256(value)
        };
        Self {
            value: value.to_string(),
            bytes,
        }
    }

    /// The nonce as the server or the decoder wrote it.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The 32-byte value placed in the ERC-3009 authorization.
    pub fn as_b256(&self) -> B256 {
        self.bytes
    }
}

impl Display for ChallengeNonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// EIP-712 domain name and version of the asset contract, from the option's `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDomain {
    pub name: String,
    pub version: String,
}

/// A validated payment option from a 402 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentChallenge {
    scheme: ExactScheme,
    network: String,
    chain_id: u64,
    pay_to: Address,
    asset: Address,
    amount: TokenAmount,
    nonce: ChallengeNonce,
    issued_at: UnixTimestamp,
    expires_at: UnixTimestamp,
    resource: String,
    description: String,
    mime_type: String,
    asset_domain: AssetDomain,
}

impl PaymentChallenge {
    /// Validates one payment option received at `received_at`.
    ///
    /// Returns `Ok(None)` for options this client cannot pay (another scheme, or a
    /// network outside [`networks::KNOWN_NETWORKS`]); such options are skipped, not
    /// errors. A payable option with a bad field is a
    /// [`DecodeError::MalformedChallenge`].
    pub fn from_requirements(
        requirements: &PaymentRequirements,
        received_at: UnixTimestamp,
    ) -> Result<Option<Self>, DecodeError> {
        let Ok(scheme) = requirements.scheme.parse::<ExactScheme>() else {
            return Ok(None);
        };
        let Some(chain_id) = networks::eip155_chain_id(&requirements.network) else {
            return Ok(None);
        };
        let amount = requirements
            .max_amount_required
            .parse::<TokenAmount>()
            .map_err(|e| DecodeError::MalformedChallenge(e.to_string()))?;
        let pay_to = parse_address("payTo", &requirements.pay_to)?;
        let asset = parse_address("asset", &requirements.asset)?;
        if requirements.resource.is_empty() {
            return Err(DecodeError::MalformedChallenge(
                "resource must not be empty".to_string(),
            ));
        }
        let extra = requirements.extra.as_ref();
        let extra_str = |key: &str| {
            extra
                .and_then(|e| e.get(key))
                .and_then(|v| v.as_str())
                .map(ToOwned::to_owned)
        };
        let nonce = match extra_str("nonce") {
            Some(nonce) if !nonce.is_empty() => ChallengeNonce::from_server(&nonce),
            _ => ChallengeNonce::random(),
        };
        let asset_domain = AssetDomain {
            name: extra_str("name").unwrap_or_default(),
            version: extra_str("version").unwrap_or_default(),
        };
        Ok(Some(Self {
            scheme,
            network: requirements.network.clone(),
            chain_id,
            pay_to,
            asset,
            amount,
            nonce,
            issued_at: received_at,
            expires_at: received_at + requirements.max_timeout_seconds,
            resource: requirements.resource.clone(),
            description: requirements.description.clone(),
            mime_type: requirements.mime_type.clone(),
            asset_domain,
        }))
    }

    pub fn scheme(&self) -> &str {
        self.scheme.as_ref()
    }

    /// The v1 network name, e.g. "base-sepolia".
    pub fn network(&self) -> &str {
        &self.network
    }

    /// The EIP-155 chain id of [`Self::network`].
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Recipient of the payment.
    pub fn pay_to(&self) -> Address {
        self.pay_to
    }

    /// Token contract of the payment.
    pub fn asset(&self) -> Address {
        self.asset
    }

    /// Required amount in the asset's smallest unit.
    pub fn amount(&self) -> TokenAmount {
        self.amount
    }

    pub fn nonce(&self) -> &ChallengeNonce {
        &self.nonce
    }

    pub fn issued_at(&self) -> UnixTimestamp {
        self.issued_at
    }

    pub fn expires_at(&self) -> UnixTimestamp {
        self.expires_at
    }

    /// Whether the challenge may still be paid at `now`.
    pub fn is_live_at(&self, now: UnixTimestamp) -> bool {
        now < self.expires_at
    }

    /// The resource (usually a URL) being paid for.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn asset_domain(&self) -> &AssetDomain {
        &self.asset_domain
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, DecodeError> {
    value
        .parse::<Address>()
        .map_err(|e| DecodeError::MalformedChallenge(format!("invalid {field} address {value:?}: {e}")))
}
