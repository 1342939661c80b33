//! Signing and chunk validation traits

use std::sync::Arc;

use apiary_primitives::Chunk;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Signing error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Signs payloads with this node's identity key.
#[auto_impl::auto_impl(&, Arc)]
pub trait Signer: Send + Sync + 'static {
    /// Sign `data`, returning the encoded signature.
    fn sign(&self, data: &[u8]) -> Result<Bytes, SignerError>;
}

/// Validates chunk integrity before the node takes custody.
#[auto_impl::auto_impl(&, Arc)]
pub trait ChunkValidator: Send + Sync + 'static {
    /// Whether the chunk is a valid content addressed chunk, i.e. its
    /// address matches the hash of its content.
    fn valid_content_addressed(&self, chunk: &Chunk) -> bool;

    /// Whether the chunk is a valid single owner chunk, i.e. its address
    /// and owner signature are consistent with its content.
    fn valid_single_owner(&self, chunk: &Chunk) -> bool;
}

/// Inspects a valid content addressed chunk for wrapped payloads, for
/// dispersed replica handling. Runs off the delivery path.
pub type UnwrapFn = Arc<dyn Fn(Chunk) + Send + Sync>;
