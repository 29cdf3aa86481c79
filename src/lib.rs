//! Pay-per-message chat over HTTP 402.
//!
//! The `send402chat` binary sends one chat message to an endpoint protected by the
//! [x402 protocol](https://www.x402.org). When the endpoint answers
//! `402 Payment Required`, the payment-aware client from `x402-chat-reqwest` signs an
//! ERC-3009 authorization within the configured ceiling and retries once.
//!
//! # Modules
//!
//! - [`chat`] - request and reply bodies of the chat endpoint
//! - [`config`] - command line and environment configuration
//! - [`run`] - the binary's entrypoint
//! - [`sig_down`] - SIGINT/SIGTERM to cancellation token
//! - [`telemetry`] - tracing subscriber setup

pub mod chat;
pub mod config;
pub mod run;
pub mod sig_down;
pub mod telemetry;
