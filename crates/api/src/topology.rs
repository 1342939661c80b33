//! Topology and peer selection traits

use std::ops::ControlFlow;

use apiary_primitives::{ChunkAddress, OverlayAddress};

/// Outcome of a closest-peer query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerSelection {
    /// A connected peer closer to the address than this node.
    Selected(OverlayAddress),
    /// This node is the closest; the caller should take custody itself.
    WantSelf,
    /// No connected peer is eligible.
    NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Topology error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Queries over the node's view of the network topology.
#[auto_impl::auto_impl(&, Arc)]
pub trait Topology: Send + Sync + 'static {
    /// Find the cheapest connected peer closer to `address` than this node,
    /// excluding the peers in `skip`.
    fn cheapest_peer(
        &self,
        address: &ChunkAddress,
        skip: &[OverlayAddress],
    ) -> Result<PeerSelection, TopologyError>;

    /// Whether `address` falls within this node's area of responsibility.
    fn is_within_depth(&self, address: &ChunkAddress) -> bool;

    /// Visit each connected peer in this node's neighborhood together with
    /// its proximity order, until the visitor breaks.
    fn each_neighbor(&self, visitor: &mut dyn FnMut(&OverlayAddress, u8) -> ControlFlow<()>);
}
