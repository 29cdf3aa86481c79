//! Command-line configuration for `send402chat`.

use alloy_signer_local::{LocalSignerError, PrivateKeySigner};
use clap::Parser;
use std::time::Duration;
use url::Url;
use x402_chat_types::SpendingCeiling;
use x402_chat_types::util::money_amount::MoneyAmountParseError;

pub const DEFAULT_URL: &str = "http://localhost:3000/api/payment/chat";
pub const DEFAULT_MESSAGE: &str = "Hello! Can you help me test the x402 payment integration?";

/// CLI arguments for `send402chat`.
#[derive(Parser, Debug)]
#[command(name = "send402chat")]
#[command(about = "Send one chat message to an x402 paid endpoint, paying if asked")]
struct CliArgs {
    /// Chat endpoint
    #[arg(long, env = "X402_CHAT_URL", default_value = DEFAULT_URL)]
    url: Url,
    /// Message to send
    #[arg(long, env = "CHAT_MESSAGE")]
    message: Option<String>,
    /// Hex-encoded private key of the paying account
    #[arg(long, env = "EVM_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,
    /// Most this call may pay, in whole asset units
    #[arg(long, env = "X402_MAX_PAYMENT", default_value = "0.01")]
    max_payment: String,
    /// Decimals of the payment asset
    #[arg(long, default_value_t = 6)]
    asset_decimals: u32,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid EVM private key: {0}")]
    PrivateKey(#[source] LocalSignerError),
    #[error("Invalid maximum payment: {0}")]
    MaxPayment(#[source] MoneyAmountParseError),
}

#[derive(Debug, Clone)]
pub struct Config {
    url: Url,
    message: String,
    default_message: bool,
    signer: PrivateKeySigner,
    ceiling: SpendingCeiling,
    timeout: Duration,
}

impl Config {
    /// Parses the command line, falling back to the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let signer = args
            .private_key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(ConfigError::PrivateKey)?;
        let ceiling = SpendingCeiling::from_money(&args.max_payment, args.asset_decimals)
            .map_err(ConfigError::MaxPayment)?;
        let message = args
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        Ok(Self {
            url: args.url,
            default_message: message.is_none(),
            message: message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            signer,
            ceiling,
            timeout: Duration::from_secs(args.timeout),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether no message was given and [`DEFAULT_MESSAGE`] is used.
    pub fn is_default_message(&self) -> bool {
        self.default_message
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn ceiling(&self) -> SpendingCeiling {
        self.ceiling
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
