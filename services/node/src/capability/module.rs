//! Module descriptor format, provider registry, and the capability contract.
//!
//! Host-specific dynamic linking is not portable, so a capability module is
//! not machine code: it is a small descriptor file that names its exports and
//! the provider strategy backing each one. The strategy implemented here is
//! the statically registered in-process one: a [`BehaviorRegistry`] built at
//! node construction maps provider keys to behavior implementations. The
//! [`CapabilityBehavior`] trait is the seam where a dynamically linked or
//! out-of-process provider could be substituted without touching the
//! resolver: the durable requirement is "resolve a named, versioned
//! capability to a fixed calling convention", independent of linking
//! mechanism.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::state::{MessageContext, NodeState};

/// The single well-known export every capability module must provide.
pub const RECEIVE_SYMBOL: &str = "Receive";

/// The required calling convention, as declared in module descriptors.
pub const RECEIVE_SIGNATURE: &str = "fn(&mut NodeState, &MessageContext)";

// =============================================================================
// Behavior trait and contract
// =============================================================================

/// Behavior a provider supplies for a capability's entry point.
///
/// Receives the node's state and the message context, returns nothing. Runs
/// unguarded with the node's full state; faults inside an implementation are
/// out of scope for the loading machinery.
pub trait CapabilityBehavior: Send + Sync {
    fn receive(&self, state: &mut NodeState, ctx: &MessageContext);
}

impl<F> CapabilityBehavior for F
where
    F: Fn(&mut NodeState, &MessageContext) + Send + Sync,
{
    fn receive(&self, state: &mut NodeState, ctx: &MessageContext) {
        self(state, ctx)
    }
}

/// The validated, callable entry point extracted from a loaded module.
///
/// Owned by the capability cache once inserted and never mutated. Cloning is
/// cheap (shared entry point), which is how the node actor hands the contract
/// around without removing it from the cache.
#[derive(Clone)]
pub struct CapabilityContract {
    entry: Arc<dyn CapabilityBehavior>,
}

impl CapabilityContract {
    pub fn new(entry: Arc<dyn CapabilityBehavior>) -> Self {
        Self { entry }
    }

    /// Invoke the capability's entry point, synchronously.
    pub fn receive(&self, state: &mut NodeState, ctx: &MessageContext) {
        self.entry.receive(state, ctx);
    }
}

impl fmt::Debug for CapabilityContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityContract").finish_non_exhaustive()
    }
}

// =============================================================================
// Provider registry
// =============================================================================

/// Statically registered in-process capability providers.
///
/// Populated once at node construction and frozen behind an `Arc` before the
/// actor starts, so loads never need locking.
#[derive(Default)]
pub struct BehaviorRegistry {
    providers: HashMap<String, Arc<dyn CapabilityBehavior>>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under a key like `"builtin:echo"`. Later
    /// registrations under the same key replace earlier ones.
    pub fn register(&mut self, key: impl Into<String>, behavior: Arc<dyn CapabilityBehavior>) {
        self.providers.insert(key.into(), behavior);
    }

    /// Convenience for closure-backed providers.
    pub fn register_fn<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: Fn(&mut NodeState, &MessageContext) + Send + Sync + 'static,
    {
        self.register(key, Arc::new(f));
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn CapabilityBehavior>> {
        self.providers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Module descriptor
// =============================================================================

/// On-disk module contents: the capability's identity plus its export table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub version: String,

    /// Export table keyed by symbol name.
    #[serde(default)]
    pub exports: HashMap<String, ModuleExport>,
}

/// One exported symbol: its declared signature and backing provider key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleExport {
    pub signature: String,
    pub provider: String,
}

/// An opened-but-not-yet-validated module.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    pub path: PathBuf,
    pub descriptor: ModuleDescriptor,
}
