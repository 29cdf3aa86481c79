//! Token amounts in the smallest unit of an asset, and the caller's spending ceiling.

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::util::money_amount::{MoneyAmount, MoneyAmountParseError};

/// An integer amount of an asset in its smallest unit (e.g. 1 USDC = `1000000`).
///
/// Serialized as a base-10 string, which is how x402 peers exchange
/// `maxAmountRequired` and the authorization `value`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(pub U256);

/// Error returned when a string is not a base-10 non-negative integer fitting 256 bits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token amount {0:?}: expected a non-negative base-10 integer")]
pub struct TokenAmountParseError(pub String);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(U256::ZERO);

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl FromStr for TokenAmount {
    type Err = TokenAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `U256::from_str_radix` tolerates `_` separators; the wire format does not.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenAmountParseError(s.to_string()));
        }
        U256::from_str_radix(s, 10)
            .map(TokenAmount)
            .map_err(|_| TokenAmountParseError(s.to_string()))
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        TokenAmount(U256::from(value))
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        TokenAmount(value)
    }
}

impl From<TokenAmount> for U256 {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

/// The most a caller allows to be authorized for a single call, in the smallest unit.
///
/// The ceiling is checked before anything is signed: a challenge asking for more
/// is refused without touching the signer or the network.
///
/// ```
/// use x402_chat_types::{SpendingCeiling, TokenAmount};
///
/// let ceiling = SpendingCeiling::from_money("0.01", 6).unwrap();
/// assert_eq!(ceiling.amount(), TokenAmount::from(10_000u64));
/// assert!(ceiling.permits(&TokenAmount::from(10_000u64)));
/// assert!(!ceiling.permits(&TokenAmount::from(10_001u64)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpendingCeiling(TokenAmount);

impl SpendingCeiling {
    /// A ceiling given directly in the asset's smallest unit.
    pub fn atomic<A: Into<TokenAmount>>(amount: A) -> Self {
        Self(amount.into())
    }

    /// A ceiling given as a human-readable amount of an asset with `decimals` places.
    pub fn from_money(amount: &str, decimals: u32) -> Result<Self, MoneyAmountParseError> {
        let money = MoneyAmount::parse(amount)?;
        Ok(Self(money.as_token_amount(decimals)?))
    }

    pub fn amount(&self) -> TokenAmount {
        self.0
    }

    /// Whether committing to `amount` stays within the ceiling.
    pub fn permits(&self, amount: &TokenAmount) -> bool {
        amount <= &self.0
    }
}

impl Display for SpendingCeiling {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}
