//! Test signers and chunk validators.

use std::sync::Arc;

use alloy_primitives::keccak256;
use apiary_api::{ChunkValidator, Signer, SignerError};
use apiary_primitives::{Chunk, ChunkAddress};
use bytes::Bytes;
use parking_lot::Mutex;

/// Signer returning a fixed signature and recording what it signed.
pub struct TestSigner {
    signature: Bytes,
    signed: Mutex<Vec<Bytes>>,
}

impl TestSigner {
    pub fn new(signature: impl Into<Bytes>) -> Arc<Self> {
        Arc::new(Self {
            signature: signature.into(),
            signed: Mutex::new(Vec::new()),
        })
    }

    /// Every payload signed so far, in order.
    pub fn signed(&self) -> Vec<Bytes> {
        self.signed.lock().clone()
    }
}

impl Signer for TestSigner {
    fn sign(&self, data: &[u8]) -> Result<Bytes, SignerError> {
        self.signed.lock().push(Bytes::copy_from_slice(data));
        Ok(self.signature.clone())
    }
}

/// Validator with fixed answers.
pub struct StaticValidator {
    pub content_addressed: bool,
    pub single_owner: bool,
}

impl StaticValidator {
    pub fn new(content_addressed: bool, single_owner: bool) -> Arc<Self> {
        Arc::new(Self {
            content_addressed,
            single_owner,
        })
    }
}

impl ChunkValidator for StaticValidator {
    fn valid_content_addressed(&self, _chunk: &Chunk) -> bool {
        self.content_addressed
    }

    fn valid_single_owner(&self, _chunk: &Chunk) -> bool {
        self.single_owner
    }
}

/// Validator accepting chunks whose address is the keccak hash of the data.
pub struct ContentValidator;

impl ContentValidator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl ChunkValidator for ContentValidator {
    fn valid_content_addressed(&self, chunk: &Chunk) -> bool {
        keccak256(chunk.data()).as_slice() == chunk.address().as_bytes()
    }

    fn valid_single_owner(&self, _chunk: &Chunk) -> bool {
        false
    }
}

/// Build a chunk addressed by the keccak hash of `data`.
pub fn content_chunk(data: impl Into<Bytes>) -> Chunk {
    let data = data.into();
    let address = ChunkAddress::new(keccak256(&data).0);
    Chunk::new(address, data)
}
