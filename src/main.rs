//! `send402chat`: send one chat message to an x402 paid endpoint.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `X402_CHAT_URL`, `CHAT_MESSAGE`, `EVM_PRIVATE_KEY`, `X402_MAX_PAYMENT` mirror the CLI flags
//! - `RUST_LOG` controls log verbosity (default `info`)

use std::process;

use x402_chat::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1)
    }
}
