//! Reservation guard over accounting holds.

use std::sync::Arc;

use apiary_api::{Accounting, AccountingError};
use apiary_primitives::OverlayAddress;

/// A hold on bandwidth credit towards one peer.
///
/// Obtained through [`Reservation::reserve`] and resolved exactly once:
/// either by [`Reservation::credit`] when a receipt arrives, or by dropping
/// the guard, which releases the hold unused. Failure paths can therefore
/// bail with `?` without leaking reserved balance.
pub(crate) struct Reservation {
    accounting: Arc<dyn Accounting>,
    peer: OverlayAddress,
    amount: u64,
    resolved: bool,
}

impl Reservation {
    /// Put a hold on `amount` towards `peer`.
    pub(crate) async fn reserve(
        accounting: Arc<dyn Accounting>,
        peer: OverlayAddress,
        amount: u64,
    ) -> Result<Self, AccountingError> {
        accounting.reserve(&peer, amount).await?;
        Ok(Self {
            accounting,
            peer,
            amount,
            resolved: false,
        })
    }

    /// Consume the hold and charge the reserved amount.
    ///
    /// The hold is spent even when crediting fails, so a failed credit is
    /// never retried against the same reservation.
    pub(crate) async fn credit(mut self) -> Result<(), AccountingError> {
        self.resolved = true;
        self.accounting.credit(&self.peer, self.amount).await
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.resolved {
            self.accounting.release(&self.peer, self.amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

    use apiary_api::async_trait;

    #[derive(Default)]
    struct RecordingAccounting {
        reserved: AtomicU64,
        balance: AtomicI64,
    }

    #[async_trait]
    impl Accounting for RecordingAccounting {
        async fn reserve(
            &self,
            _peer: &OverlayAddress,
            amount: u64,
        ) -> Result<(), AccountingError> {
            self.reserved.fetch_add(amount, Ordering::SeqCst);
            Ok(())
        }

        fn release(&self, _peer: &OverlayAddress, amount: u64) {
            self.reserved.fetch_sub(amount, Ordering::SeqCst);
        }

        async fn credit(&self, _peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError> {
            self.reserved.fetch_sub(amount, Ordering::SeqCst);
            self.balance.fetch_sub(amount as i64, Ordering::SeqCst);
            Ok(())
        }

        async fn debit(&self, _peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError> {
            self.balance.fetch_add(amount as i64, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn drop_releases_unresolved_hold() {
        let accounting = Arc::new(RecordingAccounting::default());
        let peer = OverlayAddress::new([1; 32]);

        let reservation = Reservation::reserve(accounting.clone(), peer, 42).await.unwrap();
        assert_eq!(accounting.reserved.load(Ordering::SeqCst), 42);

        drop(reservation);
        assert_eq!(accounting.reserved.load(Ordering::SeqCst), 0);
        assert_eq!(accounting.balance.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn credit_consumes_hold_once() {
        let accounting = Arc::new(RecordingAccounting::default());
        let peer = OverlayAddress::new([1; 32]);

        let reservation = Reservation::reserve(accounting.clone(), peer, 42).await.unwrap();
        reservation.credit().await.unwrap();

        assert_eq!(accounting.reserved.load(Ordering::SeqCst), 0);
        assert_eq!(accounting.balance.load(Ordering::SeqCst), -42);
    }
}
