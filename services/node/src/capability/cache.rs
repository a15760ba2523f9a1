//! Append-only capability cache.

use std::collections::HashMap;

use capnet_protocol::CapabilityId;

use super::module::CapabilityContract;

/// Mapping from capability identifier to its loaded contract.
///
/// Append-only for the node's lifetime: entries are inserted (or overwritten)
/// by the resolver on successful loads and never removed. No eviction, no
/// size bound, no expiry. A capability once loaded stays loaded until node
/// teardown, which is what keeps the node actor's active-capability reference
/// valid without further checks.
///
/// Not internally synchronized. The hosting actor runtime guarantees one
/// message at a time per node, and each node owns its cache exclusively, so
/// no locking is needed or wanted here.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    entries: HashMap<CapabilityId, CapabilityContract>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a contract by identifier.
    pub fn get(&self, id: &CapabilityId) -> Option<&CapabilityContract> {
        self.entries.get(id)
    }

    /// Insert or overwrite the contract for `id`.
    pub fn put(&mut self, id: CapabilityId, contract: CapabilityContract) {
        self.entries.insert(id, contract);
    }

    pub fn contains(&self, id: &CapabilityId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::{MessageContext, NodeState};

    fn noop_contract() -> CapabilityContract {
        CapabilityContract::new(Arc::new(|_state: &mut NodeState, _ctx: &MessageContext| {}))
    }

    #[test]
    fn put_then_get() {
        let mut cache = CapabilityCache::new();
        let id = CapabilityId::new("alpha", "1.0");
        assert!(cache.get(&id).is_none());

        cache.put(id.clone(), noop_contract());
        assert!(cache.contains(&id));
        assert!(cache.get(&id).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_overwrites_same_key() {
        let mut cache = CapabilityCache::new();
        let id = CapabilityId::new("alpha", "1.0");
        cache.put(id.clone(), noop_contract());
        cache.put(id.clone(), noop_contract());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn versions_are_distinct_keys() {
        let mut cache = CapabilityCache::new();
        cache.put(CapabilityId::new("alpha", "1.0"), noop_contract());
        cache.put(CapabilityId::new("alpha", "2.0"), noop_contract());
        assert_eq!(cache.len(), 2);
    }
}
