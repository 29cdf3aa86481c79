#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Payment-aware HTTP calls on top of [`reqwest`].
//!
//! [`PaymentAwareClient`] sends a request, and when the server answers
//! `402 Payment Required` it signs a payment for the challenge (within a
//! [`SpendingCeiling`](x402_chat_types::SpendingCeiling)) and sends the request
//! exactly once more with the `X-PAYMENT` header attached.
//!
//! ```rust,ignore
//! use alloy_signer_local::PrivateKeySigner;
//! use x402_chat_reqwest::{HttpRequest, ReqwestWithPayments, ReqwestWithPaymentsBuild};
//! use x402_chat_types::SpendingCeiling;
//!
//! let signer: PrivateKeySigner = std::env::var("EVM_PRIVATE_KEY")?.parse()?;
//! let client = reqwest::Client::new()
//!     .with_payments(signer, SpendingCeiling::from_money("0.01", 6)?)
//!     .build();
//!
//! let request = HttpRequest::post(url).json(&body)?;
//! let outcome = client.send(request).await?;
//! if let Some(receipt) = outcome.receipt {
//!     println!("settled in {}", receipt.transaction);
//! }
//! ```
//!
//! The transport is pluggable through [`HttpTransport`]; it is implemented for
//! `reqwest::Client` and `reqwest_middleware::ClientWithMiddleware`.
//!
//! ## Features
//!
//! - `telemetry`: emits `tracing` spans and events for each call, including
//!   WARN events for receipt anomalies.

mod builder;
mod client;
mod error;
mod transport;

pub use builder::*;
pub use client::{CallOutcome, PaymentAwareClient};
pub use error::{Attempt, PaymentCallError, PaymentWarning};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
