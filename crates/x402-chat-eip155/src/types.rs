//! EIP-712 typed data for ERC-3009 authorizations.

use alloy_primitives::U256;
use alloy_sol_types::{Eip712Domain, eip712_domain, sol};
use x402_chat_types::PaymentChallenge;
use x402_chat_types::proto::ExactEvmPayloadAuthorization;

sol!(
    /// Solidity-compatible struct definition for ERC-3009 `transferWithAuthorization`.
    ///
    /// Authorizes moving `value` tokens from `from` to `to`, only between
    /// `validAfter` and `validBefore`, identified by a unique `nonce`.
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
);

impl From<&ExactEvmPayloadAuthorization> for TransferWithAuthorization {
    fn from(authorization: &ExactEvmPayloadAuthorization) -> Self {
        // Must mirror the wire authorization field for field: the verifier
        // rebuilds this struct from what it received.
        TransferWithAuthorization {
            from: authorization.from,
            to: authorization.to,
            value: authorization.value.as_u256(),
            validAfter: U256::from(authorization.valid_after.as_secs()),
            validBefore: U256::from(authorization.valid_before.as_secs()),
            nonce: authorization.nonce,
        }
    }
}

/// EIP-712 domain of the asset contract a challenge asks to be paid in.
///
/// Name and version come from the challenge's `extra`; servers that omit them
/// get empty strings, which only verifies against contracts with an empty domain.
pub fn asset_domain(challenge: &PaymentChallenge) -> Eip712Domain {
    let domain = challenge.asset_domain();
    eip712_domain! {
        name: domain.name.clone(),
        version: domain.version.clone(),
        chain_id: challenge.chain_id(),
        verifying_contract: challenge.asset(),
    }
}
