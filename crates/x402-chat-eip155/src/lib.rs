#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Payment authorizer for the x402 `exact` scheme on EVM chains.
//!
//! Given a [`PaymentChallenge`](x402_chat_types::PaymentChallenge), a
//! [`PaymentSigner`] and a [`SpendingCeiling`](x402_chat_types::SpendingCeiling),
//! [`authorize`] produces an ERC-3009 `transferWithAuthorization` for exactly the
//! requested amount, signs it as EIP-712 typed data, and returns it as a
//! [`PaymentAuthorization`](x402_chat_types::PaymentAuthorization) bound to the
//! challenge nonce.
//!
//! ```rust,ignore
//! use alloy_signer_local::PrivateKeySigner;
//! use x402_chat_eip155::authorize;
//! use x402_chat_types::SpendingCeiling;
//!
//! let signer = PrivateKeySigner::random();
//! let ceiling = SpendingCeiling::from_money("0.01", 6)?;
//! let authorization = authorize(&challenge, &signer, ceiling).await?;
//! ```

pub mod authorizer;
pub mod signer;
pub mod types;

pub use authorizer::{AuthError, authorize, recover_signer};
pub use signer::PaymentSigner;
