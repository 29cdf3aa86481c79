use alloy_primitives::{Address, B256, Signature};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can sign an EIP-712 hash on behalf of one EVM address.
///
/// Implemented for [`PrivateKeySigner`] and for `Arc`/`Box` of any signer, so the
/// same key can be shared between several clients.
#[async_trait]
pub trait PaymentSigner: Send + Sync {
    /// Address tokens are paid from.
    fn address(&self) -> Address;

    /// Signs a 32-byte EIP-712 signing hash.
    async fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error>;
}

#[async_trait]
impl PaymentSigner for PrivateKeySigner {
    fn address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error> {
        Signer::sign_hash(self, hash).await
    }
}

#[async_trait]
impl<T: PaymentSigner + ?Sized> PaymentSigner for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error> {
        (**self).sign_hash(hash).await
    }
}

#[async_trait]
impl<T: PaymentSigner + ?Sized> PaymentSigner for Box<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error> {
        (**self).sign_hash(hash).await
    }
}
