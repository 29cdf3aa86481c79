//! The payment-aware request/response cycle.
//!
//! A call sends the request as given. A `402 Payment Required` answer is decoded
//! into a challenge, authorized within the spending ceiling, and the request is sent
//! once more carrying the `X-PAYMENT` header. Whatever the second response is, the
//! call ends there.

use http::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use x402_chat_eip155::{PaymentSigner, authorize};
use x402_chat_types::{FirstMatch, PaymentReceipt, PaymentSelector, SpendingCeiling, codec};

#[cfg(feature = "telemetry")]
use tracing::{debug, info, instrument, warn};

use crate::error::{Attempt, PaymentCallError, PaymentWarning};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Result of a call that reached a final response.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    /// The final response, untouched.
    pub response: HttpResponse,
    /// Settlement receipt, when the final response carried a decodable one.
    pub receipt: Option<PaymentReceipt>,
    /// Advisory anomalies, e.g. a paid response without a receipt.
    pub warnings: Vec<PaymentWarning>,
    /// Requests sent: 1, or 2 when a challenge was answered.
    pub attempts: u8,
    /// Whether the final response answered a paid retry.
    pub paid: bool,
}

/// HTTP client that answers one `402 Payment Required` per call with a signed payment.
///
/// ```rust,ignore
/// use alloy_signer_local::PrivateKeySigner;
/// use x402_chat_reqwest::{HttpRequest, PaymentAwareClient};
/// use x402_chat_types::SpendingCeiling;
///
/// let client = PaymentAwareClient::new(
///     reqwest::Client::new(),
///     PrivateKeySigner::random(),
///     SpendingCeiling::from_money("0.01", 6)?,
/// );
/// let outcome = client.send(HttpRequest::get(url)).await?;
/// ```
///
/// The client holds no per-call state: concurrent calls are independent and each
/// answers its own challenge.
#[derive(Debug, Clone)]
pub struct PaymentAwareClient<T, S, P = FirstMatch> {
    transport: T,
    signer: S,
    selector: P,
    ceiling: SpendingCeiling,
}

impl<T, S> PaymentAwareClient<T, S, FirstMatch> {
    pub fn new(transport: T, signer: S, ceiling: SpendingCeiling) -> Self {
        Self {
            transport,
            signer,
            selector: FirstMatch,
            ceiling,
        }
    }
}

impl<T, S, P> PaymentAwareClient<T, S, P> {
    /// Replaces the strategy used when a challenge offers several payment options.
    pub fn with_selector<Q: PaymentSelector>(self, selector: Q) -> PaymentAwareClient<T, S, Q> {
        PaymentAwareClient {
            transport: self.transport,
            signer: self.signer,
            selector,
            ceiling: self.ceiling,
        }
    }

    pub fn with_ceiling(mut self, ceiling: SpendingCeiling) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Default ceiling applied by [`PaymentAwareClient::send`].
    pub fn ceiling(&self) -> SpendingCeiling {
        self.ceiling
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T, S, P> PaymentAwareClient<T, S, P>
where
    T: HttpTransport,
    S: PaymentSigner,
    P: PaymentSelector,
{
    /// Sends `request`, paying at most the configured ceiling if challenged.
    pub async fn send(&self, request: HttpRequest) -> Result<CallOutcome, PaymentCallError> {
        self.send_with_ceiling(request, self.ceiling).await
    }

    /// Sends `request`, paying at most `ceiling` if challenged.
    pub async fn send_with_ceiling(
        &self,
        request: HttpRequest,
        ceiling: SpendingCeiling,
    ) -> Result<CallOutcome, PaymentCallError> {
        let retry_sent = AtomicBool::new(false);
        self.call(request, ceiling, &retry_sent).await
    }

    /// Like [`PaymentAwareClient::send`], abandoning the call when `cancel` fires.
    ///
    /// Cancellation drops the in-flight request. If the paid retry was already
    /// handed to the transport, the error reports that the payment may have been sent.
    pub async fn send_cancellable(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<CallOutcome, PaymentCallError> {
        self.send_cancellable_with_ceiling(request, self.ceiling, cancel).await
    }

    /// Like [`PaymentAwareClient::send_cancellable`], paying at most `ceiling` if challenged.
    pub async fn send_cancellable_with_ceiling(
        &self,
        request: HttpRequest,
        ceiling: SpendingCeiling,
        cancel: &CancellationToken,
    ) -> Result<CallOutcome, PaymentCallError> {
        let retry_sent = AtomicBool::new(false);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let payment_may_be_sent = retry_sent.load(Ordering::SeqCst);
                let attempt = if payment_may_be_sent {
                    Attempt::Authenticated
                } else {
                    Attempt::Unauthenticated
                };
                Err(PaymentCallError::Cancelled { attempt, payment_may_be_sent })
            }
            result = self.call(request, ceiling, &retry_sent) => result,
        }
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "x402.client.call",
            skip_all,
            fields(method = %request.method, url = %request.url),
            err
        )
    )]
    async fn call(
        &self,
        request: HttpRequest,
        ceiling: SpendingCeiling,
        retry_sent: &AtomicBool,
    ) -> Result<CallOutcome, PaymentCallError> {
        let first = self
            .transport
            .send(request.clone())
            .await
            .map_err(|source| PaymentCallError::Transport {
                attempt: Attempt::Unauthenticated,
                source,
            })?;

        if first.status.is_success() {
            let mut warnings = Vec::new();
            let receipt = match codec::decode_receipt_if_present(&first.headers) {
                Ok(receipt) => receipt,
                Err(e) => {
                    warnings.push(PaymentWarning::MalformedReceipt(e));
                    None
                }
            };
            report(&warnings);
            return Ok(CallOutcome {
                response: first,
                receipt,
                warnings,
                attempts: 1,
                paid: false,
            });
        }
        if first.status != StatusCode::PAYMENT_REQUIRED {
            #[cfg(feature = "telemetry")]
            debug!(status = %first.status, "Unpaid request failed, returning response");
            return Ok(CallOutcome {
                response: first,
                receipt: None,
                warnings: Vec::new(),
                attempts: 1,
                paid: false,
            });
        }

        let challenge =
            codec::decode_challenge_with(first.status, &first.headers, &first.body, &self.selector)?;

        #[cfg(feature = "telemetry")]
        info!(
            network = challenge.network(),
            amount = %challenge.amount(),
            pay_to = %challenge.pay_to(),
            "Received payment challenge"
        );

        let authorization = authorize(&challenge, &self.signer, ceiling).await?;
        let retry = request.with_payment_header(authorization.into_header_value()?);

        retry_sent.store(true, Ordering::SeqCst);
        let second = self
            .transport
            .send(retry)
            .await
            .map_err(|source| PaymentCallError::Transport {
                attempt: Attempt::Authenticated,
                source,
            })?;

        let receipt = codec::decode_receipt_if_present(&second.headers);
        if !second.status.is_success() {
            let receipt = receipt.ok().flatten();
            let reason = rejection_reason(&second, receipt.as_ref());
            return Err(PaymentCallError::PaymentRejected {
                status: second.status,
                reason,
                receipt,
            });
        }

        let mut warnings = Vec::new();
        let receipt = match receipt {
            Ok(Some(receipt)) => Some(receipt),
            Ok(None) => {
                warnings.push(PaymentWarning::MissingReceipt);
                None
            }
            Err(e) => {
                warnings.push(PaymentWarning::MalformedReceipt(e));
                None
            }
        };
        report(&warnings);
        Ok(CallOutcome {
            response: second,
            receipt,
            warnings,
            attempts: 2,
            paid: true,
        })
    }
}

#[cfg(feature = "telemetry")]
fn report(warnings: &[PaymentWarning]) {
    for warning in warnings {
        warn!(%warning, "Payment receipt anomaly");
    }
}

#[cfg(not(feature = "telemetry"))]
fn report(_warnings: &[PaymentWarning]) {}

/// Best-effort explanation of a rejected paid retry.
///
/// Both a fresh 402 body and the business endpoint's error body carry an `error`
/// string; failing that, a failed receipt may carry an `errorReason`.
fn rejection_reason(response: &HttpResponse, receipt: Option<&PaymentReceipt>) -> Option<String> {
    response
        .json::<serde_json::Value>()
        .ok()
        .and_then(|body| body.get("error")?.as_str().map(ToOwned::to_owned))
        .filter(|reason| !reason.is_empty())
        .or_else(|| receipt.and_then(|r| r.error_reason.clone()))
}
