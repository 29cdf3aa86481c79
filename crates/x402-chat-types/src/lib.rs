#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for pay-per-request HTTP calls over the x402 protocol.
//!
//! A client that hits a paid endpoint first receives `402 Payment Required` together
//! with a machine-readable challenge. It signs a payment authorization for that challenge,
//! retries the request with the authorization attached, and finally reads a settlement
//! receipt from the successful response. This crate holds everything about that exchange
//! that is independent of the HTTP client and of the signing backend:
//!
//! - [`challenge`] - [`PaymentChallenge`], the decoded and validated payment terms
//! - [`authorization`] - [`PaymentAuthorization`], a signed, single-use commitment
//! - [`receipt`] - [`PaymentReceipt`], the settlement proof returned by the server
//! - [`amount`] - [`TokenAmount`] and [`SpendingCeiling`]
//! - [`codec`] - decoding and encoding of the challenge body and the payment headers
//! - [`proto`] - the x402 version 1 wire structures
//! - [`selector`] - picking one payment option when the server offers several
//! - [`networks`] - well-known EVM network names and their chain ids
//! - [`timestamp`] - Unix timestamps as used in authorization windows
//! - [`util`] - base64 and money-amount helpers
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod authorization;
pub mod challenge;
pub mod codec;
pub mod error;
pub mod networks;
pub mod proto;
pub mod receipt;
pub mod selector;
pub mod timestamp;
pub mod util;

pub use amount::{SpendingCeiling, TokenAmount};
pub use authorization::PaymentAuthorization;
pub use challenge::{ChallengeNonce, PaymentChallenge};
pub use codec::*;
pub use error::{DecodeError, EncodeError};
pub use receipt::PaymentReceipt;
pub use selector::{FirstMatch, PaymentSelector, PreferNetwork};
