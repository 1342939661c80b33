//! Error types for push syncing.

use apiary_api::{
    AccountingError, SignerError, StoreError, StreamError, TagError, TopologyError,
};
use apiary_net_headers::HeaderError;
use apiary_primitives::{ChunkAddress, OverlayAddress};

use crate::codec::CodecError;

/// Error from pushing a chunk towards its storer.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// This node is the closest to the chunk and must take custody itself.
    #[error("Want self, chunk belongs to this node")]
    WantSelf,
    #[error("No push destination peer found")]
    NoPeerFound,
    #[error("Peer selection failed: {0}")]
    Selection(#[from] TopologyError),
    #[error("Reserve balance for {peer}: {source}")]
    Reserve {
        peer: OverlayAddress,
        source: AccountingError,
    },
    #[error("Credit balance: {0}")]
    Credit(AccountingError),
    #[error("Tag {tag}: {source}")]
    Tag { tag: u64, source: TagError },
    #[error("New stream for peer {peer}: {source}")]
    Stream {
        peer: OverlayAddress,
        source: StreamError,
    },
    #[error("Pricing headers from {peer}: {source}")]
    PricingHeaders {
        peer: OverlayAddress,
        source: HeaderError,
    },
    #[error("Chunk {chunk} deliver to {peer}: {source}")]
    Delivery {
        chunk: ChunkAddress,
        peer: OverlayAddress,
        source: CodecError,
    },
    #[error("Receipt from {peer}: {source}")]
    ReceiptRead {
        peer: OverlayAddress,
        source: CodecError,
    },
    #[error("Invalid receipt for chunk {chunk} from {peer}")]
    InvalidReceipt {
        chunk: ChunkAddress,
        peer: OverlayAddress,
    },
}

/// Error from handling an inbound delivery.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Read delivery: {0}")]
    ReadDelivery(CodecError),
    #[error("Invalid chunk {0}")]
    InvalidChunk(ChunkAddress),
    #[error("Chunk {0} replicated out of neighborhood depth")]
    OutOfDepthReplication(ChunkAddress),
    #[error("Store chunk {chunk}: {source}")]
    Store {
        chunk: ChunkAddress,
        source: StoreError,
    },
    #[error("Sign receipt: {0}")]
    Sign(#[from] SignerError),
    #[error("Send receipt: {0}")]
    SendReceipt(CodecError),
    #[error("Debit upstream: {0}")]
    Debit(AccountingError),
    #[error("Forward chunk {chunk}: {source}")]
    Forward {
        chunk: ChunkAddress,
        source: Box<PushError>,
    },
    #[error("Handler deadline exceeded")]
    DeadlineExceeded,
}
