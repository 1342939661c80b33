//! Chunk storage traits

use apiary_primitives::Chunk;

use crate::async_trait;

/// How a chunk entered the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModePut {
    /// Chunk uploaded by a local client.
    Upload,
    /// Chunk received from the network for safekeeping.
    Sync,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Persists chunks this node is responsible for.
#[async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait ChunkStore: Send + Sync + 'static {
    /// Store a chunk under the given mode.
    async fn put(&self, mode: ModePut, chunk: &Chunk) -> Result<(), StoreError>;
}
