//! Per-peer accounting ledger.

use std::collections::HashMap;
use std::sync::Arc;

use apiary_api::{Accounting, AccountingError, async_trait};
use apiary_primitives::OverlayAddress;
use parking_lot::RwLock;
use tracing::trace;

use crate::peer::PeerState;

/// Default payment threshold in accounting units.
pub const DEFAULT_PAYMENT_THRESHOLD: u64 = 13_500_000;

/// Default payment tolerance as a percentage.
pub const DEFAULT_PAYMENT_TOLERANCE_PERCENT: u64 = 25;

/// Thresholds for the accounting ledger.
///
/// All values are in accounting units.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Debt level at which settlement is requested from a peer.
    pub payment_threshold: u64,
    /// Tolerance above the payment threshold, as a percentage.
    pub payment_tolerance_percent: u64,
    /// Debt level at which new reservations towards a peer are refused.
    ///
    /// Calculated as: payment_threshold * (100 + tolerance) / 100
    pub disconnect_threshold: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let payment_threshold = DEFAULT_PAYMENT_THRESHOLD;
        let tolerance = DEFAULT_PAYMENT_TOLERANCE_PERCENT;
        let disconnect_threshold = payment_threshold * (100 + tolerance) / 100;

        Self {
            payment_threshold,
            payment_tolerance_percent: tolerance,
            disconnect_threshold,
        }
    }
}

/// Core accounting ledger.
///
/// Tracks one `PeerState` per peer. A reservation holds credit until it is
/// resolved by exactly one release or credit; credit consumes the hold and
/// moves the balance in the same step, so holds never outlive the request
/// they were taken for.
pub struct Ledger {
    config: LedgerConfig,
    peers: RwLock<HashMap<OverlayAddress, Arc<PeerState>>>,
}

impl Ledger {
    /// Create a new ledger with the given configuration.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// The current balance towards `peer`, negative when this node owes.
    pub fn balance(&self, peer: &OverlayAddress) -> i64 {
        self.get_or_create_peer(*peer).balance()
    }

    /// The credit currently held in reservations towards `peer`.
    pub fn reserved(&self, peer: &OverlayAddress) -> u64 {
        self.get_or_create_peer(*peer).reserved_balance()
    }

    fn get_or_create_peer(&self, peer: OverlayAddress) -> Arc<PeerState> {
        {
            let peers = self.peers.read();
            if let Some(state) = peers.get(&peer) {
                return Arc::clone(state);
            }
        }

        let mut peers = self.peers.write();
        peers
            .entry(peer)
            .or_insert_with(|| Arc::new(PeerState::default()))
            .clone()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

#[async_trait]
impl Accounting for Ledger {
    async fn reserve(&self, peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError> {
        let state = self.get_or_create_peer(*peer);

        let balance = state.balance();
        let reserved = state.reserved_balance();
        let projected = balance - (amount as i64) - (reserved as i64);

        let threshold = -(self.config.disconnect_threshold as i64);
        if projected < threshold {
            return Err(AccountingError::InsufficientBalance {
                peer: *peer,
                requested: amount,
                available: balance - (reserved as i64) - threshold,
            });
        }

        state.add_reserved(amount);
        trace!(%peer, amount, "reserved credit");
        Ok(())
    }

    fn release(&self, peer: &OverlayAddress, amount: u64) {
        let state = self.get_or_create_peer(*peer);
        state.sub_reserved(amount);
        trace!(%peer, amount, "released reservation");
    }

    async fn credit(&self, peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError> {
        let state = self.get_or_create_peer(*peer);
        state.sub_reserved(amount);
        state.add_balance(-(amount as i64));
        trace!(%peer, amount, balance = state.balance(), "credited peer");
        Ok(())
    }

    async fn debit(&self, peer: &OverlayAddress, amount: u64) -> Result<(), AccountingError> {
        let state = self.get_or_create_peer(*peer);
        state.add_balance(amount as i64);
        trace!(%peer, amount, balance = state.balance(), "debited peer");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiary_api::Accounting;
    use assert_matches::assert_matches;

    fn peer(byte: u8) -> OverlayAddress {
        OverlayAddress::new([byte; 32])
    }

    #[tokio::test]
    async fn reserve_then_credit_moves_balance() {
        let ledger = Ledger::default();
        let p = peer(1);

        ledger.reserve(&p, 100).await.unwrap();
        assert_eq!(ledger.reserved(&p), 100);
        assert_eq!(ledger.balance(&p), 0);

        ledger.credit(&p, 100).await.unwrap();
        assert_eq!(ledger.reserved(&p), 0);
        assert_eq!(ledger.balance(&p), -100);
    }

    #[tokio::test]
    async fn release_returns_hold_without_charge() {
        let ledger = Ledger::default();
        let p = peer(2);

        ledger.reserve(&p, 100).await.unwrap();
        ledger.release(&p, 100);
        assert_eq!(ledger.reserved(&p), 0);
        assert_eq!(ledger.balance(&p), 0);
    }

    #[tokio::test]
    async fn reserve_fails_past_disconnect_threshold() {
        let config = LedgerConfig {
            payment_threshold: 100,
            payment_tolerance_percent: 0,
            disconnect_threshold: 100,
        };
        let ledger = Ledger::new(config);
        let p = peer(3);

        ledger.reserve(&p, 100).await.unwrap();
        assert_matches!(
            ledger.reserve(&p, 1).await,
            Err(AccountingError::InsufficientBalance { requested: 1, .. })
        );
    }

    #[tokio::test]
    async fn debit_offsets_credit() {
        let ledger = Ledger::default();
        let p = peer(4);

        ledger.reserve(&p, 50).await.unwrap();
        ledger.credit(&p, 50).await.unwrap();
        ledger.debit(&p, 80).await.unwrap();
        assert_eq!(ledger.balance(&p), 30);
    }
}
