//! Atomic per-peer balance tracking.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Accounting state for a single peer.
///
/// Balance is in accounting units, negative when this node owes the peer.
/// Reserved tracks holds taken for requests that are in flight.
#[derive(Debug, Default)]
pub struct PeerState {
    balance: AtomicI64,
    reserved: AtomicU64,
}

impl PeerState {
    pub fn balance(&self) -> i64 {
        self.balance.load(Ordering::Acquire)
    }

    pub fn reserved_balance(&self) -> u64 {
        self.reserved.load(Ordering::Acquire)
    }

    pub fn add_balance(&self, delta: i64) {
        self.balance.fetch_add(delta, Ordering::AcqRel);
    }

    pub fn add_reserved(&self, amount: u64) {
        self.reserved.fetch_add(amount, Ordering::AcqRel);
    }

    pub fn sub_reserved(&self, amount: u64) {
        self.reserved.fetch_sub(amount, Ordering::AcqRel);
    }
}
