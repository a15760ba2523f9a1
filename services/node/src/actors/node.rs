//! The node actor: message classification and capability dispatch.

use async_trait::async_trait;
use capnet_protocol::{CapabilityId, CustomPayload, LifecycleEvent, NodeMessage, PeerId};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::framework::{Actor, ActorContext, ActorError};
use crate::capability::{
    BehaviorRegistry, CapabilityCache, CapabilityResolver, ModuleLoader, RemoteFetcher,
};
use crate::config::Config;
use crate::state::{MessageContext, NodeState};

/// One node in the peer network.
///
/// Owns the capability cache, the neighbor list, and the active-capability
/// reference. Inbound messages are classified in order: lifecycle events are
/// handled locally, `LoadCapability` goes through the resolver, and
/// everything else is forwarded to the active capability's contract.
///
/// The active reference is the `CapabilityId` of a cache entry; since the
/// cache never evicts, a reference once set always points at a present entry
/// for the node's lifetime.
pub struct NodeActor {
    state: NodeState,
    cache: CapabilityCache,
    active: Option<CapabilityId>,
    resolver: CapabilityResolver,
}

impl NodeActor {
    /// Build a node from configuration and a frozen provider registry.
    pub fn new(config: &Config, registry: Arc<BehaviorRegistry>) -> anyhow::Result<Self> {
        let loader = ModuleLoader::new(config.module_extension.clone(), registry);
        let fetcher = RemoteFetcher::new()?;
        let resolver = CapabilityResolver::new(
            config.capability_dir.clone(),
            config.repo_base_url.clone(),
            loader,
            fetcher,
        );

        Ok(Self {
            state: NodeState::new(config.node_id.clone()),
            cache: CapabilityCache::new(),
            active: None,
            resolver,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn neighbors(&self) -> &[PeerId] {
        self.state.neighbors()
    }

    /// Replace the neighbor list; called by the external membership component.
    pub fn set_neighbors(&mut self, neighbors: Vec<PeerId>) {
        self.state.set_neighbors(neighbors);
    }

    pub fn remote_repo_url(&self) -> &Url {
        self.resolver.repo_base()
    }

    pub fn set_remote_repo_url(&mut self, url: Url) {
        self.resolver.set_repo_base(url);
    }

    pub fn active_capability(&self) -> Option<&CapabilityId> {
        self.active.as_ref()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn has_capability(&self, id: &CapabilityId) -> bool {
        self.cache.contains(id)
    }

    // -------------------------------------------------------------------------
    // Message handlers
    // -------------------------------------------------------------------------

    fn handle_lifecycle(&mut self, event: LifecycleEvent, ctx: &ActorContext) {
        // Logging only; lifecycle events cause no other state change.
        match event {
            LifecycleEvent::Started => {
                info!(actor_id = %ctx.actor_id, node_id = %self.state.node_id(), "initializing node");
            }
            LifecycleEvent::Stopping => {
                info!(actor_id = %ctx.actor_id, node_id = %self.state.node_id(), "shutting down node");
            }
            LifecycleEvent::Stopped => {
                info!(actor_id = %ctx.actor_id, node_id = %self.state.node_id(), "node shut down");
            }
        }
    }

    async fn handle_load_capability(&mut self, id: CapabilityId) {
        if self.cache.contains(&id) {
            // Already loaded: switch with no reload, even if a newer module
            // file exists locally or remotely.
            debug!(id = %id, "capability already loaded, switching active");
            self.active = Some(id);
            return;
        }

        // Resolution blocks this node's single processing slot until it
        // completes; there is no timeout or cancellation.
        match self.resolver.resolve(&mut self.cache, &id).await {
            Ok(_contract) => {
                info!(id = %id, "capability loaded and activated");
                self.active = Some(id);
            }
            Err(e) => {
                // Fail-soft: the previously active capability, if any, stays
                // active. A failed load never removes existing functionality.
                warn!(
                    id = %id,
                    error = %e,
                    active = ?self.active,
                    "could not load capability, keeping previous active capability"
                );
            }
        }
    }

    fn handle_custom(&mut self, payload: CustomPayload, ctx: &ActorContext) {
        let Some(active) = self.active.clone() else {
            // Silently dropped: no error to the sender, no acknowledgement.
            info!(
                actor_id = %ctx.actor_id,
                kind = %payload.kind,
                "no active capability, dropping message"
            );
            return;
        };

        let Some(contract) = self.cache.get(&active).cloned() else {
            // The cache never evicts, so an active id without an entry means
            // corrupted internal state; log loudly and drop the message.
            error!(id = %active, "active capability missing from cache");
            return;
        };

        let message_ctx = MessageContext {
            actor_id: ctx.actor_id.clone(),
            payload,
        };
        // Synchronous, exactly once. The capability runs unguarded with the
        // node's full state.
        contract.receive(&mut self.state, &message_ctx);
    }
}

#[async_trait]
impl Actor for NodeActor {
    type Message = NodeMessage;

    fn name(&self) -> &str {
        "node"
    }

    async fn handle(
        &mut self,
        msg: NodeMessage,
        ctx: &mut ActorContext,
    ) -> Result<bool, ActorError> {
        match msg {
            NodeMessage::Lifecycle(event) => self.handle_lifecycle(event, ctx),
            NodeMessage::LoadCapability(id) => self.handle_load_capability(id).await,
            NodeMessage::Custom(payload) => self.handle_custom(payload, ctx),
        }

        Ok(true)
    }

    async fn on_start(&mut self, ctx: &mut ActorContext) -> Result<(), ActorError> {
        info!(
            actor_id = %ctx.actor_id,
            node_id = %self.state.node_id(),
            repo = %self.resolver.repo_base(),
            "node actor starting"
        );
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &mut ActorContext) {
        info!(
            actor_id = %ctx.actor_id,
            node_id = %self.state.node_id(),
            cached_capabilities = self.cache.len(),
            "node actor stopping"
        );
    }
}
