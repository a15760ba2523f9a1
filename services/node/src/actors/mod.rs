//! Actor runtime and the node actor.
//!
//! The runtime (in `framework`) supplies the mailbox semantics the rest of
//! the crate assumes: one message at a time per actor, no shared state,
//! supervised shutdown. The `node` module is the only production actor:
//! each spawned `NodeActor` is one independent peer with its own cache and
//! neighbor list.

mod framework;
mod node;

pub use framework::{
    Actor, ActorContext, ActorError, ActorHandle, ActorState, Message, Supervisor,
};
pub use node::NodeActor;
