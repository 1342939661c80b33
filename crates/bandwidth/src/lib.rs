//! Bandwidth accounting and pricing.
//!
//! Tracks per-peer accounting unit balances and prices chunk traffic by
//! proximity. The `Ledger` implements the `Accounting` trait with the
//! reserve/release/credit discipline, the `FixedPricer` implements `Pricer`
//! with the distance based formula `(MAX_PO - proximity + 1) * base_price`.

mod ledger;
mod peer;
mod pricer;

pub use ledger::{Ledger, LedgerConfig};
pub use peer::PeerState;
pub use pricer::{DEFAULT_BASE_PRICE, FixedPricer, MAX_PO};
