//! # capnet-protocol
//!
//! Message and identifier types shared across the capnet peer network.
//!
//! ## Design Principles
//!
//! - Inbound traffic is a closed union: every message a node can receive is a
//!   variant of [`NodeMessage`], so dispatch is an exhaustive match
//! - Capability identifiers are plain (name, version) value types; equality
//!   and hashing cover both fields and nothing else
//! - All wire types round-trip through serde with a stable JSON layout
//!
//! ## Message Classes
//!
//! - `Lifecycle(..)`: produced by the hosting actor runtime (`started`,
//!   `stopping`, `stopped`)
//! - `LoadCapability(..)`: instructs a node to make a capability its active
//!   behavior
//! - `Custom(..)`: everything else; delegated to the active capability

mod error;
mod id;
mod messages;

pub use error::IdError;
pub use id::{CapabilityId, PeerId};
pub use messages::{CustomPayload, LifecycleEvent, NodeMessage};
