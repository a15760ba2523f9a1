//! Built-in capability behaviors shipped with the node binary.
//!
//! These back the `builtin:*` provider keys that module descriptors may
//! reference. Real deployments register their own providers before spawning
//! nodes.

use tracing::info;

use super::module::BehaviorRegistry;
use crate::state::{MessageContext, NodeState};

/// Logs every delegated payload.
pub struct EchoBehavior;

impl super::module::CapabilityBehavior for EchoBehavior {
    fn receive(&self, state: &mut NodeState, ctx: &MessageContext) {
        info!(
            node_id = %state.node_id(),
            kind = %ctx.payload.kind,
            body = %ctx.payload.body,
            "echo capability received message"
        );
    }
}

/// Logs the node's current neighbor list.
pub struct NeighborsBehavior;

impl super::module::CapabilityBehavior for NeighborsBehavior {
    fn receive(&self, state: &mut NodeState, ctx: &MessageContext) {
        let neighbors: Vec<&str> = state.neighbors().iter().map(|p| p.as_str()).collect();
        info!(
            node_id = %state.node_id(),
            kind = %ctx.payload.kind,
            count = neighbors.len(),
            ?neighbors,
            "neighbors capability received message"
        );
    }
}

/// Registry preloaded with the built-in providers.
pub fn builtin_registry() -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::new();
    registry.register("builtin:echo", std::sync::Arc::new(EchoBehavior));
    registry.register("builtin:neighbors", std::sync::Arc::new(NeighborsBehavior));
    registry
}
