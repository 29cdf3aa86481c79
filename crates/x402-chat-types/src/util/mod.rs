//! Utility types and functions.
//!
//! - [`b64`] - Base64 encoding/decoding of header payloads
//! - [`lit_str`] - Compile-time string literal types
//! - [`money_amount`] - Human-readable currency amount parsing

pub mod b64;
pub mod lit_str;
pub mod money_amount;

pub use b64::*;
