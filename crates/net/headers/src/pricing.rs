//! Pricing fields carried over stream headers.
//!
//! A forwarder announces the target address and its expected price when
//! opening a stream. The responder answers with its own price for that
//! target together with the storage price table index the quote was taken
//! from, so the peers can reconcile disagreements before any chunk moves.

use apiary_primitives::ChunkAddress;
use bytes::Bytes;

use crate::map::Headers;

/// Header key carrying a big-endian u64 price.
pub const PRICE_FIELD: &str = "price";
/// Header key carrying the 32-byte target address.
pub const TARGET_FIELD: &str = "target";
/// Header key carrying the single-byte price table index.
pub const INDEX_FIELD: &str = "index";

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("Missing header field: {0}")]
    MissingField(&'static str),
    #[error("Invalid length for header field: {0}")]
    InvalidFieldLength(&'static str),
}

/// Headers sent by the requesting side of a priced stream.
pub fn make_pricing_headers(price: u64, target: &ChunkAddress) -> Headers {
    let mut headers = Headers::default();
    headers.insert(PRICE_FIELD, Bytes::copy_from_slice(&price.to_be_bytes()));
    headers.insert(TARGET_FIELD, Bytes::copy_from_slice(target.as_bytes()));
    headers
}

/// Headers sent back by the responding side of a priced stream.
pub fn make_pricing_response_headers(price: u64, target: &ChunkAddress, index: u8) -> Headers {
    let mut headers = make_pricing_headers(price, target);
    headers.insert(INDEX_FIELD, Bytes::copy_from_slice(&[index]));
    headers
}

/// Parse the request side fields: target address and announced price.
pub fn parse_pricing_headers(headers: &Headers) -> Result<(ChunkAddress, u64), HeaderError> {
    let target = parse_target_header(headers)?;
    let price = parse_price_header(headers)?;
    Ok((target, price))
}

/// Parse the response side fields: target address, quoted price and index.
pub fn parse_pricing_response_headers(
    headers: &Headers,
) -> Result<(ChunkAddress, u64, u8), HeaderError> {
    let (target, price) = parse_pricing_headers(headers)?;
    let index = headers
        .get(INDEX_FIELD)
        .ok_or(HeaderError::MissingField(INDEX_FIELD))?;
    let index = *index
        .first()
        .ok_or(HeaderError::InvalidFieldLength(INDEX_FIELD))?;
    Ok((target, price, index))
}

/// Parse just the price field.
pub fn parse_price_header(headers: &Headers) -> Result<u64, HeaderError> {
    let raw = headers
        .get(PRICE_FIELD)
        .ok_or(HeaderError::MissingField(PRICE_FIELD))?;
    let raw: [u8; 8] = raw
        .as_ref()
        .try_into()
        .map_err(|_| HeaderError::InvalidFieldLength(PRICE_FIELD))?;
    Ok(u64::from_be_bytes(raw))
}

/// Parse just the target address field.
pub fn parse_target_header(headers: &Headers) -> Result<ChunkAddress, HeaderError> {
    let raw = headers
        .get(TARGET_FIELD)
        .ok_or(HeaderError::MissingField(TARGET_FIELD))?;
    ChunkAddress::from_slice(raw).map_err(|_| HeaderError::InvalidFieldLength(TARGET_FIELD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn request_headers_roundtrip() {
        let target = ChunkAddress::new([7; 32]);
        let headers = make_pricing_headers(1234, &target);

        let (parsed_target, parsed_price) = parse_pricing_headers(&headers).unwrap();
        assert_eq!(parsed_target, target);
        assert_eq!(parsed_price, 1234);
    }

    #[test]
    fn response_headers_roundtrip() {
        let target = ChunkAddress::new([7; 32]);
        let headers = make_pricing_response_headers(u64::MAX, &target, 9);

        let (parsed_target, price, index) = parse_pricing_response_headers(&headers).unwrap();
        assert_eq!(parsed_target, target);
        assert_eq!(price, u64::MAX);
        assert_eq!(index, 9);
    }

    #[test]
    fn missing_fields_are_reported() {
        let headers = Headers::default();
        assert_matches!(
            parse_pricing_headers(&headers),
            Err(HeaderError::MissingField(TARGET_FIELD))
        );
        assert_matches!(
            parse_price_header(&headers),
            Err(HeaderError::MissingField(PRICE_FIELD))
        );
    }

    #[test]
    fn malformed_price_is_rejected() {
        let mut headers = Headers::default();
        headers.insert(PRICE_FIELD, Bytes::from_static(&[1, 2, 3]));
        assert_matches!(
            parse_price_header(&headers),
            Err(HeaderError::InvalidFieldLength(PRICE_FIELD))
        );
    }
}
