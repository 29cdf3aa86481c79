//! Settlement receipts returned with a paid response.

use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::timestamp::UnixTimestamp;

/// Decoded `X-PAYMENT-RESPONSE` header: the server's account of the settlement.
///
/// Purely informational to the caller. Servers always send `success`,
/// `transaction`, `network` and `payer`; the remaining fields are optional
/// extensions and are omitted from the encoding when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub success: bool,
    /// Settlement reference, typically the transaction hash.
    pub transaction: String,
    pub network: String,
    pub payer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<TokenAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<UnixTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl PaymentReceipt {
    /// A receipt for a successful settlement.
    pub fn settled<T, N, P>(transaction: T, network: N, payer: P) -> Self
    where
        T: Into<String>,
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            success: true,
            transaction: transaction.into(),
            network: network.into(),
            payer: payer.into(),
            amount: None,
            timestamp: None,
            error_reason: None,
        }
    }

    pub fn with_amount<A: Into<TokenAmount>>(mut self, amount: A) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: UnixTimestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
