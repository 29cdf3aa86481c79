use http::StatusCode;
use std::fmt;
use x402_chat_eip155::AuthError;
use x402_chat_types::{DecodeError, EncodeError, PaymentReceipt};

use crate::transport::TransportError;

/// Which request of a paid call an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// The original request, sent without payment.
    Unauthenticated,
    /// The single retry carrying the payment authorization.
    Authenticated,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attempt::Unauthenticated => write!(f, "unauthenticated"),
            Attempt::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Anomaly on an otherwise successful call. Reported, never escalated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentWarning {
    #[error("Paid response carried no payment receipt")]
    MissingReceipt,
    #[error("Payment receipt could not be decoded: {0}")]
    MalformedReceipt(DecodeError),
}

/// Terminal failure of a payment-aware call.
#[derive(Debug, thiserror::Error)]
pub enum PaymentCallError {
    /// The 402 response did not carry a usable challenge.
    #[error("Invalid payment challenge: {0}")]
    Protocol(#[from] DecodeError),
    #[error(transparent)]
    Authorization(#[from] AuthError),
    #[error("Failed to encode payment header: {0}")]
    HeaderEncoding(#[from] EncodeError),
    /// The paid retry did not succeed. No further retry was made.
    #[error("Payment rejected with status {status}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    PaymentRejected {
        status: StatusCode,
        reason: Option<String>,
        receipt: Option<PaymentReceipt>,
    },
    #[error("Transport failure on {attempt} request: {source}")]
    Transport {
        attempt: Attempt,
        #[source]
        source: TransportError,
    },
    #[error("Call cancelled during {attempt} request")]
    Cancelled {
        attempt: Attempt,
        payment_may_be_sent: bool,
    },
}

impl PaymentCallError {
    /// Whether a payment authorization may have reached the server.
    ///
    /// When true, the funds may be settled regardless of the outcome seen here.
    pub fn payment_sent(&self) -> bool {
        match self {
            PaymentCallError::PaymentRejected { .. } => true,
            PaymentCallError::Transport { attempt, .. } => *attempt == Attempt::Authenticated,
            PaymentCallError::Cancelled {
                payment_may_be_sent,
                ..
            } => *payment_may_be_sent,
            PaymentCallError::Protocol(_)
            | PaymentCallError::Authorization(_)
            | PaymentCallError::HeaderEncoding(_) => false,
        }
    }

    /// Whether the whole call can be issued again from scratch without risking a double payment.
    pub fn is_safe_to_retry(&self) -> bool {
        !self.payment_sent()
    }
}
