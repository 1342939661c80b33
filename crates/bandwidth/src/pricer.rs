//! Fixed pricing based on proximity.

use std::collections::HashMap;

use apiary_api::Pricer;
use apiary_net_headers::{Headers, make_pricing_response_headers, parse_target_header};
use apiary_primitives::{ChunkAddress, OverlayAddress, proximity};
use parking_lot::RwLock;
use tracing::debug;

/// Maximum proximity order, the bit depth of addresses.
pub const MAX_PO: u8 = 31;

/// Default base price per chunk in accounting units.
pub const DEFAULT_BASE_PRICE: u64 = 10_000;

/// Fixed pricing based on proximity.
///
/// Uses the formula: `price = (MAX_PO - proximity + 1) * base_price`.
/// Prices quoted by peers over stream headers override the formula for
/// subsequent requests to that peer.
#[derive(Debug)]
pub struct FixedPricer {
    base_price: u64,
    observed: RwLock<HashMap<OverlayAddress, u64>>,
}

impl FixedPricer {
    /// Create a new fixed pricer with the given base price.
    pub fn new(base_price: u64) -> Self {
        Self {
            base_price,
            observed: RwLock::new(HashMap::new()),
        }
    }

    /// Get the base price.
    pub fn base_price(&self) -> u64 {
        self.base_price
    }

    /// The price last quoted by `peer`, if any.
    pub fn observed_price(&self, peer: &OverlayAddress) -> Option<u64> {
        self.observed.read().get(peer).copied()
    }

    fn distance_price(&self, peer: &OverlayAddress, address: &ChunkAddress) -> u64 {
        let po = proximity(peer.as_bytes(), address.as_bytes()).min(MAX_PO);
        ((MAX_PO as u64) - (po as u64) + 1) * self.base_price
    }
}

impl Default for FixedPricer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PRICE)
    }
}

impl Pricer for FixedPricer {
    fn price_for_peer(&self, peer: &OverlayAddress, address: &ChunkAddress) -> u64 {
        self.distance_price(peer, address)
    }

    fn peer_price(&self, peer: &OverlayAddress, address: &ChunkAddress) -> u64 {
        if let Some(price) = self.observed_price(peer) {
            return price;
        }
        self.distance_price(peer, address)
    }

    fn notify_peer_price(&self, peer: &OverlayAddress, price: u64, index: u8) {
        debug!(%peer, price, index, "peer price updated");
        self.observed.write().insert(*peer, price);
    }

    fn price_headler(&self, received: &Headers, peer: &OverlayAddress) -> Headers {
        let target = match parse_target_header(received) {
            Ok(target) => target,
            Err(err) => {
                debug!(%peer, %err, "pricing headers without usable target");
                return Headers::default();
            }
        };
        let price = self.price_for_peer(peer, &target);
        let index = proximity(peer.as_bytes(), target.as_bytes()).min(MAX_PO);
        make_pricing_response_headers(price, &target, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiary_net_headers::{make_pricing_headers, parse_pricing_response_headers};

    #[test]
    fn base_price_at_max_proximity() {
        let pricer = FixedPricer::new(10);
        let peer = OverlayAddress::new([0u8; 32]);
        let chunk = ChunkAddress::new([0u8; 32]);
        assert_eq!(pricer.peer_price(&peer, &chunk), 10);
    }

    #[test]
    fn far_peer_pays_full_multiplier() {
        let pricer = FixedPricer::new(10);
        let peer = OverlayAddress::new([0x00; 32]);
        let chunk = ChunkAddress::new([0x80; 32]);
        assert_eq!(pricer.peer_price(&peer, &chunk), 320);
    }

    #[test]
    fn observed_price_overrides_formula() {
        let pricer = FixedPricer::new(10);
        let peer = OverlayAddress::new([0x00; 32]);
        let chunk = ChunkAddress::new([0x80; 32]);

        pricer.notify_peer_price(&peer, 7, 3);
        assert_eq!(pricer.peer_price(&peer, &chunk), 7);
        assert_eq!(pricer.price_for_peer(&peer, &chunk), 320);
    }

    #[test]
    fn headler_quotes_for_target() {
        let pricer = FixedPricer::new(10);
        let peer = OverlayAddress::new([0x00; 32]);
        let target = ChunkAddress::new([0x80; 32]);

        let request = make_pricing_headers(320, &target);
        let response = pricer.price_headler(&request, &peer);
        let (parsed_target, price, index) = parse_pricing_response_headers(&response).unwrap();
        assert_eq!(parsed_target, target);
        assert_eq!(price, 320);
        assert_eq!(index, 0);
    }

    #[test]
    fn headler_tolerates_missing_target() {
        let pricer = FixedPricer::new(10);
        let peer = OverlayAddress::new([0x00; 32]);
        let response = pricer.price_headler(&Headers::default(), &peer);
        assert!(response.is_empty());
    }
}
