//! The chunk: an immutable, addressed unit of stored data.

use bytes::Bytes;

use crate::ChunkAddress;

/// An immutable pair of address and opaque data.
///
/// Chunks are produced by content addressing or owner signing elsewhere;
/// this type never recomputes or mutates either half, it is only forwarded
/// and stored. An optional tag identifier links the chunk to a local upload
/// progress counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    address: ChunkAddress,
    data: Bytes,
    tag: Option<u64>,
}

impl Chunk {
    /// Creates a new chunk from an address and data.
    pub fn new(address: ChunkAddress, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            data: data.into(),
            tag: None,
        }
    }

    /// Attaches a progress tag identifier.
    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Returns the chunk's address.
    pub fn address(&self) -> &ChunkAddress {
        &self.address
    }

    /// Returns the chunk's data.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the progress tag identifier, if any.
    pub fn tag(&self) -> Option<u64> {
        self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_accessors() {
        let address = ChunkAddress::new([0x42; 32]);
        let chunk = Chunk::new(address, vec![1, 2, 3]).with_tag(7);

        assert_eq!(chunk.address(), &address);
        assert_eq!(chunk.data().as_ref(), &[1, 2, 3]);
        assert_eq!(chunk.tag(), Some(7));
    }
}
