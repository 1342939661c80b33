//! Scripted topology.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use apiary_api::{PeerSelection, Topology, TopologyError};
use apiary_primitives::{ChunkAddress, OverlayAddress, distance_cmp, proximity};
use parking_lot::Mutex;

enum Mode {
    /// Answer `cheapest_peer` from a fixed script, one entry per call.
    Scripted(Mutex<VecDeque<PeerSelection>>),
    /// Compute the closest of a fixed peer set relative to a self address.
    Kademlia {
        this: OverlayAddress,
        peers: Vec<OverlayAddress>,
    },
}

/// Topology answering from a script or from a fixed peer set.
pub struct TestTopology {
    mode: Mode,
    within_depth: AtomicBool,
    neighbors: Mutex<Vec<OverlayAddress>>,
    queries: Mutex<Vec<Vec<OverlayAddress>>>,
}

impl TestTopology {
    /// Answers `cheapest_peer` calls from `selections`, in order. Once the
    /// script runs out, every further call answers `NotFound`.
    pub fn scripted(selections: impl IntoIterator<Item = PeerSelection>) -> Arc<Self> {
        Arc::new(Self {
            mode: Mode::Scripted(Mutex::new(selections.into_iter().collect())),
            within_depth: AtomicBool::new(false),
            neighbors: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Selects among `peers` by distance from the queried address, honoring
    /// the skip list and answering `WantSelf` when `this` is the closest.
    pub fn kademlia(this: OverlayAddress, peers: Vec<OverlayAddress>) -> Arc<Self> {
        Arc::new(Self {
            mode: Mode::Kademlia { this, peers },
            within_depth: AtomicBool::new(false),
            neighbors: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Set what `is_within_depth` answers.
    pub fn set_within_depth(&self, within: bool) {
        self.within_depth.store(within, AtomicOrdering::SeqCst);
    }

    /// Set the neighborhood peers visited by `each_neighbor`.
    pub fn set_neighbors(&self, neighbors: Vec<OverlayAddress>) {
        *self.neighbors.lock() = neighbors;
    }

    /// The skip list of every `cheapest_peer` call made so far.
    pub fn queries(&self) -> Vec<Vec<OverlayAddress>> {
        self.queries.lock().clone()
    }
}

impl Topology for TestTopology {
    fn cheapest_peer(
        &self,
        address: &ChunkAddress,
        skip: &[OverlayAddress],
    ) -> Result<PeerSelection, TopologyError> {
        self.queries.lock().push(skip.to_vec());

        match &self.mode {
            Mode::Scripted(script) => {
                Ok(script.lock().pop_front().unwrap_or(PeerSelection::NotFound))
            }
            Mode::Kademlia { this, peers } => {
                let mut closest: Option<OverlayAddress> = None;
                for peer in peers {
                    if skip.contains(peer) {
                        continue;
                    }
                    closest = match closest {
                        Some(best)
                            if distance_cmp(address, &best, peer)
                                != std::cmp::Ordering::Greater =>
                        {
                            Some(best)
                        }
                        _ => Some(*peer),
                    };
                }

                Ok(match closest {
                    Some(peer)
                        if distance_cmp(address, &peer, this) == std::cmp::Ordering::Less =>
                    {
                        PeerSelection::Selected(peer)
                    }
                    Some(_) => PeerSelection::WantSelf,
                    None => PeerSelection::NotFound,
                })
            }
        }
    }

    fn is_within_depth(&self, _address: &ChunkAddress) -> bool {
        self.within_depth.load(AtomicOrdering::SeqCst)
    }

    fn each_neighbor(&self, visitor: &mut dyn FnMut(&OverlayAddress, u8) -> ControlFlow<()>) {
        let neighbors = self.neighbors.lock().clone();
        let this = match &self.mode {
            Mode::Kademlia { this, .. } => Some(*this),
            Mode::Scripted(_) => None,
        };
        for peer in &neighbors {
            let po = this
                .map(|this| proximity(this.as_bytes(), peer.as_bytes()))
                .unwrap_or(0);
            if visitor(peer, po).is_break() {
                break;
            }
        }
    }
}
