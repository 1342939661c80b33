//! Scripted header responders.

use std::sync::Arc;

use apiary_api::Headler;
use apiary_net_headers::{Headers, make_pricing_response_headers, parse_target_header};
use apiary_primitives::OverlayAddress;

/// Headler answering every pricing exchange with a fixed quote.
pub struct QuoteHeadler {
    pub price: u64,
    pub index: u8,
}

impl QuoteHeadler {
    pub fn new(price: u64, index: u8) -> Arc<Self> {
        Arc::new(Self { price, index })
    }
}

impl Headler for QuoteHeadler {
    fn headle(&self, received: &Headers, _peer: &OverlayAddress) -> Headers {
        match parse_target_header(received) {
            Ok(target) => make_pricing_response_headers(self.price, &target, self.index),
            Err(_) => Headers::default(),
        }
    }
}

/// Headler answering with no headers at all.
pub struct EmptyHeadler;

impl EmptyHeadler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl Headler for EmptyHeadler {
    fn headle(&self, _received: &Headers, _peer: &OverlayAddress) -> Headers {
        Headers::default()
    }
}
