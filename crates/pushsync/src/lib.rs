//! Push syncing protocol for chunk delivery and storage receipts.
//!
//! When a chunk enters the network it is pushed, hop by hop, towards the
//! node whose overlay address is closest to the chunk address. Each hop
//! picks the cheapest closer peer, negotiates a price over stream headers,
//! reserves bandwidth credit and delivers the chunk. The closest node takes
//! custody: it stores the chunk, replicates it to a few neighborhood peers
//! and signs a receipt that travels back along the forwarding path, with
//! every hop crediting downstream and debiting upstream.

mod codec;
mod error;
mod handler;
mod metrics;
mod negotiate;
mod proto;
mod push;
mod replication;
mod reservation;

pub use codec::{CodecError, Delivery, DeliveryCodec, Receipt, ReceiptCodec};
pub use error::{HandlerError, PushError};

use std::sync::Arc;
use std::time::Duration;

use apiary_api::{
    Accounting, ChunkStore, ChunkValidator, Headers, Headler, Pricer, ProtocolSpec, Signer,
    StreamHandler, StreamSpec, Streamer, Tags, Topology, UnwrapFn,
};
use apiary_primitives::{Chunk, OverlayAddress};

use crate::metrics::PushSyncMetrics;

/// Protocol name for push syncing.
pub const PROTOCOL_NAME: &str = "pushsync";
/// Protocol semantic version.
pub const PROTOCOL_VERSION: &str = "1.0.0";
/// Stream name within the protocol.
pub const STREAM_NAME: &str = "pushsync";

/// Maximum number of distinct peers attempted for one chunk.
pub const MAX_PEER_ATTEMPTS: usize = 5;
/// Deadline for delivering a chunk and collecting its receipt.
pub const TIME_TO_LIVE: Duration = Duration::from_secs(5);
/// Deadline for delivering a chunk to a single neighborhood peer.
pub const REPLICATION_TIMEOUT: Duration = Duration::from_secs(3);
/// Number of neighborhood peers a stored chunk is replicated to.
pub const REPLICATION_PEERS: usize = 3;

/// Collaborators wired into a [`PushSync`] instance.
pub struct PushSyncComponents {
    /// This node's overlay address.
    pub address: OverlayAddress,
    /// Opens protocol streams to peers.
    pub streamer: Arc<dyn Streamer>,
    /// Stores chunks this node takes custody of.
    pub store: Arc<dyn ChunkStore>,
    /// Topology queries and peer selection.
    pub topology: Arc<dyn Topology>,
    /// Upload tag registry.
    pub tags: Arc<dyn Tags>,
    /// Recovers wrapped chunks from single owner chunks.
    pub unwrap: UnwrapFn,
    /// Bandwidth accounting.
    pub accounting: Arc<dyn Accounting>,
    /// Chunk traffic pricing.
    pub pricer: Arc<dyn Pricer>,
    /// Chunk integrity validation.
    pub validator: Arc<dyn ChunkValidator>,
    /// Signs storage receipts.
    pub signer: Arc<dyn Signer>,
}

/// The push syncing protocol.
pub struct PushSync {
    pub(crate) address: OverlayAddress,
    pub(crate) streamer: Arc<dyn Streamer>,
    pub(crate) store: Arc<dyn ChunkStore>,
    pub(crate) topology: Arc<dyn Topology>,
    pub(crate) tags: Arc<dyn Tags>,
    pub(crate) unwrap: UnwrapFn,
    pub(crate) accounting: Arc<dyn Accounting>,
    pub(crate) pricer: Arc<dyn Pricer>,
    pub(crate) validator: Arc<dyn ChunkValidator>,
    pub(crate) signer: Arc<dyn Signer>,
    pub(crate) metrics: PushSyncMetrics,
}

impl PushSync {
    /// Create a new push syncing protocol instance.
    pub fn new(components: PushSyncComponents) -> Arc<Self> {
        let PushSyncComponents {
            address,
            streamer,
            store,
            topology,
            tags,
            unwrap,
            accounting,
            pricer,
            validator,
            signer,
        } = components;

        Arc::new(Self {
            address,
            streamer,
            store,
            topology,
            tags,
            unwrap,
            accounting,
            pricer,
            validator,
            signer,
            metrics: PushSyncMetrics::default(),
        })
    }

    /// Push `chunk` towards the node closest to its address and wait for a
    /// signed storage receipt.
    ///
    /// Returns [`PushError::WantSelf`] when this node itself is the closest,
    /// in which case the caller is responsible for taking custody.
    pub async fn push_chunk_to_closest(&self, chunk: &Chunk) -> Result<Receipt, PushError> {
        self.push_to_closest(chunk).await
    }

    /// The protocol specification to register with the stream multiplexer.
    pub fn protocol(self: &Arc<Self>) -> ProtocolSpec {
        ProtocolSpec {
            name: PROTOCOL_NAME,
            version: PROTOCOL_VERSION,
            streams: vec![StreamSpec {
                name: STREAM_NAME,
                handler: Arc::clone(self) as Arc<dyn StreamHandler>,
                headler: Some(Arc::new(PricingHeadler(Arc::clone(&self.pricer)))),
            }],
        }
    }
}

/// Answers pricing header exchanges with the node's own quote.
struct PricingHeadler(Arc<dyn Pricer>);

impl Headler for PricingHeadler {
    fn headle(&self, received: &Headers, peer: &OverlayAddress) -> Headers {
        self.0.price_headler(received, peer)
    }
}
