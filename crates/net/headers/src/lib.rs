//! Stream header exchange for priced protocols.

mod map;
mod pricing;

pub use map::Headers;
pub use pricing::{
    HeaderError, INDEX_FIELD, PRICE_FIELD, TARGET_FIELD, make_pricing_headers,
    make_pricing_response_headers, parse_price_header, parse_pricing_headers,
    parse_pricing_response_headers, parse_target_header,
};
