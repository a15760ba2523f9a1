//! Capability resolution and loading subsystem.
//!
//! Turning a (name, version) identifier into a callable contract goes through
//! a strict fallback chain:
//!
//! ```text
//! CapabilityResolver
//! ├── CapabilityCache     (in-memory, append-only, first stop)
//! ├── ModuleLoader        (descriptor file on local disk)
//! └── RemoteFetcher       (HTTP GET from the repository, then one reload)
//! ```
//!
//! The subsystem is owned by a single node actor and accessed one message at
//! a time, so nothing here is internally synchronized.

mod builtin;
mod cache;
mod error;
mod fetcher;
mod loader;
mod module;
mod resolver;

pub use builtin::{builtin_registry, EchoBehavior, NeighborsBehavior};
pub use cache::CapabilityCache;
pub use error::{CapabilityError, FetchFailureReason};
pub use fetcher::RemoteFetcher;
pub use loader::ModuleLoader;
pub use module::{
    BehaviorRegistry, CapabilityBehavior, CapabilityContract, ModuleDescriptor, ModuleExport,
    ModuleHandle, RECEIVE_SIGNATURE, RECEIVE_SYMBOL,
};
pub use resolver::CapabilityResolver;
