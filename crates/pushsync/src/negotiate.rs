//! Price negotiation over stream headers.

use apiary_api::ProtocolStream;
use apiary_net_headers::{HeaderError, parse_pricing_response_headers};

/// Price quoted by a peer during stream setup.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Quote {
    pub(crate) price: u64,
    pub(crate) index: u8,
}

/// Parse the quote a peer returned in its response headers.
pub(crate) fn parse_quote(stream: &dyn ProtocolStream) -> Result<Quote, HeaderError> {
    let (_, price, index) = parse_pricing_response_headers(stream.headers())?;
    Ok(Quote { price, index })
}
