//! In-memory chunk store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use apiary_api::{ChunkStore, ModePut, StoreError, async_trait};
use apiary_primitives::{Chunk, ChunkAddress};
use parking_lot::Mutex;

/// Chunk store keeping everything in memory.
pub struct MemoryChunkStore {
    puts: Mutex<Vec<(ModePut, Chunk)>>,
    fail: AtomicBool,
}

impl MemoryChunkStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            puts: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }

    /// Make every subsequent put fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every put made so far, in order.
    pub fn puts(&self) -> Vec<(ModePut, Chunk)> {
        self.puts.lock().clone()
    }

    /// Whether a chunk with `address` was stored.
    pub fn contains(&self, address: &ChunkAddress) -> bool {
        self.puts
            .lock()
            .iter()
            .any(|(_, chunk)| chunk.address() == address)
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn put(&self, mode: ModePut, chunk: &Chunk) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::ErrorKind::Other.into()));
        }
        self.puts.lock().push((mode, chunk.clone()));
        Ok(())
    }
}
