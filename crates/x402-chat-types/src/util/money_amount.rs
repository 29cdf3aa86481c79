//! Human-readable currency amount parsing.
//!
//! Spending limits are usually written by people ("0.01", "$1.50", "1,000")
//! while tokens move in integer smallest units. [`MoneyAmount`] parses the
//! former and converts it into a [`TokenAmount`] for a given number of
//! asset decimals, refusing inputs that would lose precision.
//!
//! ```rust
//! use x402_chat_types::util::money_amount::MoneyAmount;
//!
//! let amount = MoneyAmount::parse("$10.50").unwrap();
//! assert_eq!(amount.scale(), 2);
//! assert_eq!(amount.mantissa(), 1050);
//! assert_eq!(amount.as_token_amount(6).unwrap().to_string(), "10500000");
//! ```

use alloy_primitives::U256;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::amount::TokenAmount;

/// A parsed non-negative monetary amount that keeps the precision of its input.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyAmount(pub Decimal);

impl MoneyAmount {
    /// Number of decimal places in the original input.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// The value as an integer without decimal point, `"12.34"` gives `1234`.
    pub fn mantissa(&self) -> u128 {
        self.0.mantissa().unsigned_abs()
    }

    /// Converts into the smallest unit of an asset with `decimals` places.
    ///
    /// Fails with [`MoneyAmountParseError::WrongPrecision`] when the input has
    /// more decimal places than the asset can represent.
    pub fn as_token_amount(&self, decimals: u32) -> Result<TokenAmount, MoneyAmountParseError> {
        let scale = self.scale();
        if scale > decimals {
            return Err(MoneyAmountParseError::WrongPrecision {
                money: scale,
                token: decimals,
            });
        }
        let multiplier = U256::from(10u8)
            .checked_pow(U256::from(decimals - scale))
            .ok_or(MoneyAmountParseError::OutOfRange)?;
        let value = U256::from(self.mantissa())
            .checked_mul(multiplier)
            .ok_or(MoneyAmountParseError::OutOfRange)?;
        Ok(TokenAmount(value))
    }
}

/// Errors that can occur when parsing a monetary amount.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyAmountParseError {
    #[error("Invalid number format")]
    InvalidFormat,
    #[error(
        "Amount must be between {} and {}",
        constants::MIN_STR,
        constants::MAX_STR
    )]
    OutOfRange,
    #[error("Negative value is not allowed")]
    Negative,
    /// The input has more decimal places than the token supports.
    #[error("Too big of a precision: {money} vs {token} on token")]
    WrongPrecision { money: u32, token: u32 },
}

mod constants {
    use super::*;

    pub const MIN_STR: &str = "0";
    pub const MAX_STR: &str = "999999999";

    pub static MIN: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MIN_STR).expect("valid decimal"));
    pub static MAX: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MAX_STR).expect("valid decimal"));
    pub static STRIP: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\d\.\-]+").expect("valid regex"));
}

impl MoneyAmount {
    /// Parses a human-readable currency string.
    ///
    /// Currency symbols, thousand separators and whitespace are stripped
    /// before parsing. Zero is allowed: a zero ceiling forbids any payment.
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        let cleaned = constants::STRIP.replace_all(input, "");

        let parsed =
            Decimal::from_str(&cleaned).map_err(|_| MoneyAmountParseError::InvalidFormat)?;

        if parsed.is_sign_negative() && !parsed.is_zero() {
            return Err(MoneyAmountParseError::Negative);
        }

        if parsed < *constants::MIN || parsed > *constants::MAX {
            return Err(MoneyAmountParseError::OutOfRange);
        }

        Ok(MoneyAmount(parsed))
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoneyAmount::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_symbol_and_commas() {
        let amount = MoneyAmount::parse("$1,000.50").unwrap();
        assert_eq!(amount.mantissa(), 100050);
        assert_eq!(amount.scale(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            MoneyAmount::parse("abc"),
            Err(MoneyAmountParseError::InvalidFormat)
        );
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(
            MoneyAmount::parse("-1"),
            Err(MoneyAmountParseError::Negative)
        );
    }

    #[test]
    fn test_parse_rejects_too_large() {
        assert_eq!(
            MoneyAmount::parse("1000000000"),
            Err(MoneyAmountParseError::OutOfRange)
        );
    }

    #[test]
    fn test_one_cent_of_usdc() {
        let amount = MoneyAmount::parse("0.01").unwrap();
        assert_eq!(amount.as_token_amount(6).unwrap(), TokenAmount::from(10_000u64));
    }

    #[test]
    fn test_zero_is_zero() {
        let amount = MoneyAmount::parse("0").unwrap();
        assert_eq!(amount.as_token_amount(6).unwrap(), TokenAmount::from(0u64));
    }

    #[test]
    fn test_precision_too_high() {
        let amount = MoneyAmount::parse("1.234").unwrap();
        assert_eq!(
            amount.as_token_amount(2),
            Err(MoneyAmountParseError::WrongPrecision { money: 3, token: 2 })
        );
    }

    #[test]
    fn test_whole_number_with_eighteen_decimals() {
        let amount = MoneyAmount::parse("5").unwrap();
        let expected = U256::from(5u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(amount.as_token_amount(18).unwrap(), TokenAmount(expected));
    }
}
