//! Chunk and overlay addresses with the XOR distance metric.
//!
//! Chunks and nodes share one 256-bit address space. A chunk is stored by
//! the nodes whose overlay addresses are nearest to the chunk address under
//! the XOR metric, so routing and storage-responsibility decisions reduce to
//! [`distance_cmp`] and [`proximity`] over raw address bytes.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Display, Formatter};

use crate::ADDRESS_LENGTH;

/// Error returned when constructing an address from raw bytes.
#[derive(Debug, thiserror::Error)]
#[error("invalid address length: expected {ADDRESS_LENGTH}, got {0}")]
pub struct InvalidAddressLength(pub usize);

macro_rules! address_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; ADDRESS_LENGTH]);

        impl $name {
            /// Creates a new address from raw bytes.
            pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Creates an address from a byte slice.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, InvalidAddressLength> {
                let bytes: [u8; ADDRESS_LENGTH] = bytes
                    .try_into()
                    .map_err(|_| InvalidAddressLength(bytes.len()))?;
                Ok(Self(bytes))
            }

            /// Returns the underlying bytes.
            pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
                &self.0
            }

            /// Returns the address as a byte vector.
            pub fn to_vec(&self) -> Vec<u8> {
                self.0.to_vec()
            }
        }

        impl From<[u8; ADDRESS_LENGTH]> for $name {
            fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), hex::encode(self.0))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                // Leading bytes are enough to identify an address in logs.
                write!(f, "{}", hex::encode(&self.0[..4]))
            }
        }
    };
}

address_type! {
    /// The content- or owner-derived address of a chunk.
    ChunkAddress
}

address_type! {
    /// The overlay address of a node in the network topology.
    OverlayAddress
}

impl ChunkAddress {
    /// Proximity order between this chunk address and a node overlay.
    pub fn proximity(&self, overlay: &OverlayAddress) -> u8 {
        proximity(self.as_bytes(), overlay.as_bytes())
    }
}

impl OverlayAddress {
    /// Proximity order between two node overlays.
    pub fn proximity(&self, other: &OverlayAddress) -> u8 {
        proximity(self.as_bytes(), other.as_bytes())
    }
}

/// Number of leading bits two addresses share, capped at 255.
pub fn proximity(a: &[u8; ADDRESS_LENGTH], b: &[u8; ADDRESS_LENGTH]) -> u8 {
    let mut po = 0u16;
    for (x, y) in a.iter().zip(b.iter()) {
        let xor = x ^ y;
        if xor == 0 {
            po += 8;
            continue;
        }
        po += xor.leading_zeros() as u16;
        break;
    }
    po.min(u8::MAX as u16) as u8
}

/// Compares the XOR distances of two overlays from a chunk address.
///
/// Returns [`Ordering::Less`] when `x` is strictly closer to `target` than
/// `y`, [`Ordering::Greater`] when `y` is strictly closer, and
/// [`Ordering::Equal`] when `x == y`.
pub fn distance_cmp(
    target: &ChunkAddress,
    x: &OverlayAddress,
    y: &OverlayAddress,
) -> Ordering {
    let target = target.as_bytes();
    for ((t, a), b) in target.iter().zip(x.as_bytes()).zip(y.as_bytes()) {
        let da = t ^ a;
        let db = t ^ b;
        if da != db {
            return da.cmp(&db);
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(first: u8) -> [u8; ADDRESS_LENGTH] {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[0] = first;
        bytes
    }

    #[test]
    fn proximity_of_identical_addresses() {
        assert_eq!(proximity(&addr(0xaa), &addr(0xaa)), 255);
    }

    #[test]
    fn proximity_counts_leading_shared_bits() {
        // 0b1000_0000 vs 0b0000_0000 differ in the first bit.
        assert_eq!(proximity(&addr(0x80), &addr(0x00)), 0);
        // 0b0100_0000 vs 0b0000_0000 share one leading bit.
        assert_eq!(proximity(&addr(0x40), &addr(0x00)), 1);
        // Same first byte, difference in the second.
        let mut a = addr(0x12);
        a[1] = 0x80;
        assert_eq!(proximity(&a, &addr(0x12)), 8);
    }

    #[test]
    fn distance_cmp_orders_by_xor_distance() {
        let target = ChunkAddress::new(addr(0x00));
        let near = OverlayAddress::new(addr(0x01));
        let far = OverlayAddress::new(addr(0xf0));

        assert_eq!(distance_cmp(&target, &near, &far), Ordering::Less);
        assert_eq!(distance_cmp(&target, &far, &near), Ordering::Greater);
        assert_eq!(distance_cmp(&target, &near, &near), Ordering::Equal);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(ChunkAddress::from_slice(&[0u8; 31]).is_err());
        assert!(ChunkAddress::from_slice(&[0u8; 32]).is_ok());
    }
}
