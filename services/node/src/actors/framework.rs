//! Minimal actor runtime: mailboxes, the message loop, and a supervisor.
//!
//! Each actor owns its mutable state and processes messages strictly one at
//! a time from a bounded `mpsc` mailbox. That single-threaded access
//! guarantee is what the capability subsystem relies on. Communication is
//! message passing only; shutdown is signalled over a `watch` channel.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

// =============================================================================
// Traits
// =============================================================================

/// Marker trait for actor messages.
pub trait Message: Send + Debug + 'static {}

impl<T: Send + Debug + 'static> Message for T {}

/// Behavior of one actor.
#[async_trait]
pub trait Actor: Send + 'static {
    /// The message type this actor handles.
    type Message: Message;

    /// Actor name, used in generated actor ids and logging.
    fn name(&self) -> &str;

    /// Handle one message. Return `Ok(true)` to keep running, `Ok(false)` to
    /// stop. Errors are logged and the actor keeps running; no message is
    /// allowed to kill a node.
    async fn handle(
        &mut self,
        msg: Self::Message,
        ctx: &mut ActorContext,
    ) -> Result<bool, ActorError>;

    /// Called once before the first message.
    async fn on_start(&mut self, _ctx: &mut ActorContext) -> Result<(), ActorError> {
        Ok(())
    }

    /// Called after the loop exits, before the task ends.
    async fn on_stop(&mut self, _ctx: &mut ActorContext) {}
}

/// Per-actor context handed to every handler invocation.
pub struct ActorContext {
    /// Unique runtime id, `{name}_{counter}`.
    pub actor_id: String,

    /// Shutdown signal receiver.
    pub shutdown: watch::Receiver<bool>,

    /// Messages handled so far.
    pub messages_processed: u64,

    /// Lifecycle state, maintained by the run loop.
    pub state: ActorState,
}

impl ActorContext {
    pub fn new(actor_id: String, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            actor_id,
            shutdown,
            messages_processed: 0,
            state: ActorState::Uninitialized,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Actor lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    Uninitialized,
    Running,
    Stopping,
    Stopped,
}

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced by the actor runtime.
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("mailbox full")]
    MailboxFull,

    #[error("actor stopped")]
    ActorStopped,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

// =============================================================================
// Handles
// =============================================================================

/// Sender half of an actor's mailbox.
#[derive(Clone)]
pub struct ActorHandle<M: Message> {
    tx: mpsc::Sender<M>,
    actor_id: String,
}

impl<M: Message> ActorHandle<M> {
    /// Deliver a message, waiting for mailbox space.
    pub async fn send(&self, msg: M) -> Result<(), ActorError> {
        self.tx.send(msg).await.map_err(|_| ActorError::ActorStopped)
    }

    /// Deliver without waiting; fails if the mailbox is full.
    pub fn try_send(&self, msg: M) -> Result<(), ActorError> {
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ActorError::MailboxFull,
            mpsc::error::TrySendError::Closed(_) => ActorError::ActorStopped,
        })
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }
}

/// Type-erased reference to a spawned actor, for supervision.
struct ActorRef {
    task_handle: tokio::task::JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl ActorRef {
    fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }

    fn abort(&self) {
        self.task_handle.abort();
    }
}

// =============================================================================
// Supervisor
// =============================================================================

/// Spawns actors and owns their shutdown.
#[derive(Default)]
pub struct Supervisor {
    children: HashMap<String, ActorRef>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an actor with a bounded mailbox and supervise it.
    pub fn spawn<A>(&mut self, actor: A, mailbox_size: usize) -> ActorHandle<A::Message>
    where
        A: Actor,
    {
        let actor_id = format!("{}_{}", actor.name(), next_actor_id());
        let (tx, rx) = mpsc::channel(mailbox_size);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let loop_id = actor_id.clone();
        let task_handle = tokio::spawn(async move {
            run_actor_loop(actor, rx, shutdown_rx, loop_id).await;
        });

        info!(actor_id = %actor_id, "spawned actor");
        self.children.insert(
            actor_id.clone(),
            ActorRef {
                task_handle,
                shutdown_tx,
            },
        );

        ActorHandle { tx, actor_id }
    }

    /// Signal all actors to stop and wait briefly for them to drain.
    pub async fn stop_all(&mut self) {
        info!(count = self.children.len(), "stopping all actors");

        for child in self.children.values() {
            child.stop();
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if self.children.values().all(|c| !c.is_running()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        for (actor_id, child) in &self.children {
            if child.is_running() {
                warn!(actor_id = %actor_id, "force aborting actor");
                child.abort();
            }
        }

        self.children.clear();
    }

    pub fn running_count(&self) -> usize {
        self.children.values().filter(|c| c.is_running()).count()
    }
}

// =============================================================================
// Run loop
// =============================================================================

async fn run_actor_loop<A: Actor>(
    mut actor: A,
    mut rx: mpsc::Receiver<A::Message>,
    mut shutdown: watch::Receiver<bool>,
    actor_id: String,
) {
    let mut ctx = ActorContext::new(actor_id.clone(), shutdown.clone());

    if let Err(e) = actor.on_start(&mut ctx).await {
        error!(actor_id = %actor_id, error = %e, "actor failed to start");
        return;
    }

    ctx.state = ActorState::Running;
    debug!(actor_id = %actor_id, "actor running");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!(actor_id = %actor_id, "actor received shutdown signal");
                    break;
                }
            }

            msg = rx.recv() => {
                match msg {
                    Some(msg) => {
                        ctx.messages_processed += 1;
                        match actor.handle(msg, &mut ctx).await {
                            Ok(true) => {}
                            Ok(false) => {
                                info!(actor_id = %actor_id, "actor requested stop");
                                break;
                            }
                            Err(e) => {
                                // Logged and dropped; the actor keeps running.
                                error!(actor_id = %actor_id, error = %e, "actor handler error");
                            }
                        }
                    }
                    None => {
                        debug!(actor_id = %actor_id, "actor mailbox closed");
                        break;
                    }
                }
            }
        }
    }

    ctx.state = ActorState::Stopping;
    actor.on_stop(&mut ctx).await;
    ctx.state = ActorState::Stopped;

    info!(
        actor_id = %actor_id,
        messages_processed = ctx.messages_processed,
        "actor stopped"
    );
}

static ACTOR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_actor_id() -> u64 {
    ACTOR_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

// =============================================================================
// Tests
// =============================================================================
