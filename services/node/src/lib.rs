//! capnet Node Library
//!
//! A capnet node is an actor in a peer-to-peer network whose behavior is
//! extensible at runtime: told to load a named, versioned capability, it
//! resolves the capability from its in-memory cache, the local filesystem,
//! or a remote module repository, and installs the result as its active
//! message handler.
//!
//! ## Architecture
//!
//! ```text
//! Supervisor
//! └── NodeActor                 (one per peer; owns all node state)
//!     ├── CapabilityCache      (append-only id → contract map)
//!     └── CapabilityResolver
//!         ├── ModuleLoader     (descriptor files, export validation)
//!         └── RemoteFetcher    (HTTP GET from the module repository)
//! ```
//!
//! Nodes in the same process share nothing; each owns an independent cache
//! and neighbor list.
//!
//! ## Modules
//!
//! - `actors`: actor runtime and the node actor
//! - `capability`: resolution, loading, and fetching of capability modules
//! - `state`: the node state handed to capability entry points
//! - `config`: per-node configuration

pub mod actors;
pub mod capability;
pub mod config;
pub mod state;

// Re-export commonly used types
pub use actors::{NodeActor, Supervisor};
pub use capability::{BehaviorRegistry, CapabilityContract, CapabilityError};
pub use config::Config;
pub use state::{MessageContext, NodeState};
