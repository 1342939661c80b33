//! Bandwidth accounting traits

use apiary_primitives::OverlayAddress;

use crate::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum AccountingError {
    #[error("Insufficient balance for {peer}: requested {requested}, available {available}")]
    InsufficientBalance {
        peer: OverlayAddress,
        requested: u64,
        available: i64,
    },
    #[error("Accounting error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Tracks bandwidth credit between this node and its peers.
///
/// Every successful `reserve` must be balanced by exactly one `release` or
/// one `credit` for the same peer and amount. `credit` consumes the hold
/// and applies the charge, `release` returns the hold unused.
#[async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait Accounting: Send + Sync + 'static {
    /// Put a hold on `amount` of credit towards `peer`, failing if the
    /// resulting exposure would exceed the configured limit.
    async fn reserve(&self, peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError>;

    /// Return a hold taken by `reserve` without applying any charge.
    fn release(&self, peer: &OverlayAddress, amount: u64);

    /// Consume a hold taken by `reserve` and charge `amount` for service
    /// received from `peer`.
    async fn credit(&self, peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError>;

    /// Record `amount` of service provided to `peer`.
    async fn debit(&self, peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError>;
}
