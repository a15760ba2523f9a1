//! Node state handed to capability entry points.

use capnet_protocol::{CustomPayload, PeerId};

/// The per-node state a capability is allowed to touch.
///
/// Owns the neighbor list; everything the node actor keeps private (cache,
/// active-capability reference, resolver) lives outside this struct so a
/// capability cannot mutate the loading machinery underneath itself.
#[derive(Debug, Clone)]
pub struct NodeState {
    node_id: String,

    /// Ordered peer references. Population and gossip are owned by the
    /// external membership component; this is plain data here.
    neighbors: Vec<PeerId>,
}

impl NodeState {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            neighbors: Vec::new(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn neighbors(&self) -> &[PeerId] {
        &self.neighbors
    }

    /// Replace the neighbor list wholesale, as the membership component does.
    pub fn set_neighbors(&mut self, neighbors: Vec<PeerId>) {
        self.neighbors = neighbors;
    }
}

/// Context for a single delegated message.
///
/// Second argument of the fixed capability calling convention, built fresh
/// for every `Custom` message the node forwards.
#[derive(Debug, Clone)]
pub struct MessageContext {
    /// Runtime id of the receiving actor, for logging inside capabilities.
    pub actor_id: String,

    /// The payload being delegated.
    pub payload: CustomPayload,
}
