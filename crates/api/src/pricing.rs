//! Pricing traits

use apiary_net_headers::Headers;
use apiary_primitives::{ChunkAddress, OverlayAddress};

/// Prices chunk traffic by peer and target address.
#[auto_impl::auto_impl(&, Arc)]
pub trait Pricer: Send + Sync + 'static {
    /// The price this node charges `peer` for serving `address`.
    fn price_for_peer(&self, peer: &OverlayAddress, address: &ChunkAddress) -> u64;

    /// The price this node expects `peer` to charge for `address`, using
    /// the latest quote observed from that peer if any.
    fn peer_price(&self, peer: &OverlayAddress, address: &ChunkAddress) -> u64;

    /// Record a price quoted by `peer` at price table `index`.
    fn notify_peer_price(&self, peer: &OverlayAddress, price: u64, index: u8);

    /// Answer a pricing header exchange started by `peer`.
    fn price_headler(&self, received: &Headers, peer: &OverlayAddress) -> Headers;
}
