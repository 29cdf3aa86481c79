//! Choosing one challenge when a 402 offers several payment options.

use crate::challenge::PaymentChallenge;

/// Picks the challenge to pay among the options this client can handle.
pub trait PaymentSelector: Send + Sync {
    fn select<'a>(&self, challenges: &'a [PaymentChallenge]) -> Option<&'a PaymentChallenge>;
}

/// Default selector: the first payable option, in the server's order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl PaymentSelector for FirstMatch {
    fn select<'a>(&self, challenges: &'a [PaymentChallenge]) -> Option<&'a PaymentChallenge> {
        challenges.first()
    }
}

/// Prefers networks in the given order, falling back to the first payable option.
#[derive(Debug, Clone, Default)]
pub struct PreferNetwork(Vec<String>);

impl PreferNetwork {
    pub fn new<I, N>(networks: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self(networks.into_iter().map(Into::into).collect())
    }
}

impl PaymentSelector for PreferNetwork {
    fn select<'a>(&self, challenges: &'a [PaymentChallenge]) -> Option<&'a PaymentChallenge> {
        self.0
            .iter()
            .find_map(|network| challenges.iter().find(|c| c.network() == network))
            .or_else(|| challenges.first())
    }
}

impl<T: PaymentSelector + ?Sized> PaymentSelector for Box<T> {
    fn select<'a>(&self, challenges: &'a [PaymentChallenge]) -> Option<&'a PaymentChallenge> {
        (**self).select(challenges)
    }
}
