use reqwest::{Client, ClientBuilder};
use reqwest_middleware as rqm;
use x402_chat_types::{FirstMatch, PaymentSelector, SpendingCeiling};

use crate::client::PaymentAwareClient;

/// Turns a reqwest client (or builder) into a [`PaymentAwareClient`].
///
/// ```rust,ignore
/// use x402_chat_reqwest::{ReqwestWithPayments, ReqwestWithPaymentsBuild};
///
/// let client = reqwest::Client::new()
///     .with_payments(signer, SpendingCeiling::from_money("0.01", 6)?)
///     .build();
/// ```
pub trait ReqwestWithPayments<A, S> {
    fn with_payments(self, signer: S, ceiling: SpendingCeiling) -> ReqwestWithPaymentsBuilder<A, S>;
}

impl<S> ReqwestWithPayments<Client, S> for Client {
    fn with_payments(self, signer: S, ceiling: SpendingCeiling) -> ReqwestWithPaymentsBuilder<Client, S> {
        ReqwestWithPaymentsBuilder::new(self, signer, ceiling)
    }
}

impl<S> ReqwestWithPayments<ClientBuilder, S> for ClientBuilder {
    fn with_payments(
        self,
        signer: S,
        ceiling: SpendingCeiling,
    ) -> ReqwestWithPaymentsBuilder<ClientBuilder, S> {
        ReqwestWithPaymentsBuilder::new(self, signer, ceiling)
    }
}

impl<S> ReqwestWithPayments<rqm::ClientWithMiddleware, S> for rqm::ClientWithMiddleware {
    fn with_payments(
        self,
        signer: S,
        ceiling: SpendingCeiling,
    ) -> ReqwestWithPaymentsBuilder<rqm::ClientWithMiddleware, S> {
        ReqwestWithPaymentsBuilder::new(self, signer, ceiling)
    }
}

pub struct ReqwestWithPaymentsBuilder<A, S, P = FirstMatch> {
    inner: A,
    signer: S,
    selector: P,
    ceiling: SpendingCeiling,
}

impl<A, S> ReqwestWithPaymentsBuilder<A, S> {
    fn new(inner: A, signer: S, ceiling: SpendingCeiling) -> Self {
        Self {
            inner,
            signer,
            selector: FirstMatch,
            ceiling,
        }
    }
}

impl<A, S, P> ReqwestWithPaymentsBuilder<A, S, P> {
    pub fn with_selector<Q: PaymentSelector>(self, selector: Q) -> ReqwestWithPaymentsBuilder<A, S, Q> {
        ReqwestWithPaymentsBuilder {
            inner: self.inner,
            signer: self.signer,
            selector,
            ceiling: self.ceiling,
        }
    }
}

pub trait ReqwestWithPaymentsBuild {
    type BuildResult;

    fn build(self) -> Self::BuildResult;
}

impl<S, P: PaymentSelector> ReqwestWithPaymentsBuild for ReqwestWithPaymentsBuilder<Client, S, P> {
    type BuildResult = PaymentAwareClient<Client, S, P>;

    fn build(self) -> Self::BuildResult {
        PaymentAwareClient::new(self.inner, self.signer, self.ceiling).with_selector(self.selector)
    }
}

impl<S, P: PaymentSelector> ReqwestWithPaymentsBuild
    for ReqwestWithPaymentsBuilder<rqm::ClientWithMiddleware, S, P>
{
    type BuildResult = PaymentAwareClient<rqm::ClientWithMiddleware, S, P>;

    fn build(self) -> Self::BuildResult {
        PaymentAwareClient::new(self.inner, self.signer, self.ceiling).with_selector(self.selector)
    }
}

impl<S, P: PaymentSelector> ReqwestWithPaymentsBuild
    for ReqwestWithPaymentsBuilder<ClientBuilder, S, P>
{
    type BuildResult = Result<PaymentAwareClient<Client, S, P>, reqwest::Error>;

    fn build(self) -> Self::BuildResult {
        let client = self.inner.build()?;
        Ok(PaymentAwareClient::new(client, self.signer, self.ceiling).with_selector(self.selector))
    }
}
