//! Inbound message union and lifecycle events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::CapabilityId;

// =============================================================================
// Lifecycle
// =============================================================================

/// Lifecycle events produced by the hosting actor runtime.
///
/// A node handles these locally (logging/initialization only); they never
/// reach the active capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The actor has been placed in the runtime and may initialize.
    Started,
    /// The actor is about to stop; mailbox is draining.
    Stopping,
    /// The actor has stopped.
    Stopped,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Started => f.write_str("started"),
            LifecycleEvent::Stopping => f.write_str("stopping"),
            LifecycleEvent::Stopped => f.write_str("stopped"),
        }
    }
}

// =============================================================================
// Custom payload
// =============================================================================

/// Application payload delegated to the active capability.
///
/// `kind` is a free-form discriminator for the capability's own dispatch;
/// `body` is opaque JSON the core never interprets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPayload {
    pub kind: String,

    #[serde(default)]
    pub body: serde_json::Value,
}

impl CustomPayload {
    pub fn new(kind: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            body,
        }
    }
}

// =============================================================================
// NodeMessage
// =============================================================================

/// Everything a node can receive, as a closed union.
///
/// Classification happens in declaration order: lifecycle events first, then
/// capability-load requests, then delegation of anything else to the active
/// capability. New message classes require a new variant here, which forces
/// every dispatch site to handle them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum NodeMessage {
    /// Runtime lifecycle notification.
    Lifecycle(LifecycleEvent),

    /// Load the named, versioned capability and make it the active behavior.
    LoadCapability(CapabilityId),

    /// Anything else: forwarded to the active capability's entry point.
    Custom(CustomPayload),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn load_capability_wire_layout_is_stable() {
        let msg = NodeMessage::LoadCapability(CapabilityId::new("alpha", "1.0"));
        let encoded = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            encoded,
            json!({
                "type": "load_capability",
                "payload": { "name": "alpha", "version": "1.0" }
            })
        );
    }

    #[test]
    fn lifecycle_wire_layout_is_stable() {
        let msg = NodeMessage::Lifecycle(LifecycleEvent::Started);
        let encoded = serde_json::to_value(&msg).unwrap();
        assert_eq!(encoded, json!({ "type": "lifecycle", "payload": "started" }));
    }

    #[test]
    fn custom_payload_defaults_to_null_body() {
        let decoded: NodeMessage = serde_json::from_value(json!({
            "type": "custom",
            "payload": { "kind": "ping" }
        }))
        .unwrap();
        assert_eq!(
            decoded,
            NodeMessage::Custom(CustomPayload::new("ping", serde_json::Value::Null))
        );
    }
}
