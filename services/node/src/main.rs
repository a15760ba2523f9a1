//! capnet Node
//!
//! Boots one node actor, wires up the built-in capability providers, and
//! runs until interrupted. Capability loads arrive as `LoadCapability`
//! messages; everything else is delegated to whatever capability is active.

use std::sync::Arc;

use anyhow::Result;
use capnet_protocol::{LifecycleEvent, NodeMessage};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use capnet_node::actors::{NodeActor, Supervisor};
use capnet_node::capability::builtin_registry;
use capnet_node::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting capnet node");
    info!(
        node_id = %config.node_id,
        capability_dir = %config.capability_dir.display(),
        repo = %config.repo_base_url,
        "configuration loaded"
    );

    let registry = Arc::new(builtin_registry());
    let node = NodeActor::new(&config, registry)?;

    let mut supervisor = Supervisor::new();
    let handle = supervisor.spawn(node, config.mailbox_size);

    handle
        .send(NodeMessage::Lifecycle(LifecycleEvent::Started))
        .await?;

    tokio::signal::ctrl_c().await?;
    info!("received shutdown signal");

    // Deliver the runtime lifecycle events before tearing the actor down.
    let _ = handle
        .send(NodeMessage::Lifecycle(LifecycleEvent::Stopping))
        .await;
    let _ = handle
        .send(NodeMessage::Lifecycle(LifecycleEvent::Stopped))
        .await;
    supervisor.stop_all().await;

    info!("capnet node exited");
    Ok(())
}
