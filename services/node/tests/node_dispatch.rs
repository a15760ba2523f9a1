//! Integration tests for node actor message dispatch.
//!
//! These drive the node actor's handler directly (the runtime's one-message-
//! at-a-time guarantee makes that equivalent to mailbox delivery) plus one
//! end-to-end pass through the supervisor and a real mailbox.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use capnet_protocol::{CapabilityId, CustomPayload, LifecycleEvent, NodeMessage, PeerId};
use reqwest::Url;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::watch;

use capnet_node::actors::{Actor, ActorContext, NodeActor, Supervisor};
use capnet_node::capability::{BehaviorRegistry, CapabilityBehavior};
use capnet_node::config::Config;
use capnet_node::state::{MessageContext, NodeState};

const EXTENSION: &str = "capmod";

/// Records every invocation of the capability entry point.
#[derive(Clone, Default)]
struct Probe {
    calls: Arc<Mutex<Vec<ProbeCall>>>,
}

#[derive(Clone)]
struct ProbeCall {
    node_id: String,
    neighbors: Vec<PeerId>,
    payload: CustomPayload,
}

impl CapabilityBehavior for Probe {
    fn receive(&self, state: &mut NodeState, ctx: &MessageContext) {
        self.calls.lock().unwrap().push(ProbeCall {
            node_id: state.node_id().to_string(),
            neighbors: state.neighbors().to_vec(),
            payload: ctx.payload.clone(),
        });
    }
}

fn write_module(dir: &Path, id: &CapabilityId, provider: &str) {
    let contents = format!(
        r#"{{
            "name": "{}",
            "version": "{}",
            "exports": {{
                "Receive": {{
                    "signature": "fn(&mut NodeState, &MessageContext)",
                    "provider": "{provider}"
                }}
            }}
        }}"#,
        id.name, id.version
    );
    std::fs::write(dir.join(id.module_file_name(EXTENSION)), contents).unwrap();
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        node_id: "test-node".to_string(),
        capability_dir: dir.path().to_path_buf(),
        module_extension: EXTENSION.to_string(),
        // Nothing listens on the discard port; remote fetches always fail.
        repo_base_url: Url::parse("http://127.0.0.1:9/").unwrap(),
        mailbox_size: 16,
        log_level: "info".to_string(),
    }
}

fn test_node(dir: &TempDir, probe: &Probe) -> NodeActor {
    let mut registry = BehaviorRegistry::new();
    registry.register("test:probe", Arc::new(probe.clone()));
    NodeActor::new(&test_config(dir), Arc::new(registry)).unwrap()
}

fn test_ctx() -> (watch::Sender<bool>, ActorContext) {
    let (tx, rx) = watch::channel(false);
    (tx, ActorContext::new("node_0".to_string(), rx))
}

#[tokio::test]
async fn custom_message_without_active_capability_is_dropped() {
    let dir = TempDir::new().unwrap();
    let probe = Probe::default();
    let mut node = test_node(&dir, &probe);
    node.set_neighbors(vec![PeerId::from("peer-a")]);
    let (_shutdown, mut ctx) = test_ctx();

    let keep_running = node
        .handle(
            NodeMessage::Custom(CustomPayload::new("ping", json!({"seq": 1}))),
            &mut ctx,
        )
        .await
        .unwrap();

    // Processing continues and no node state changed.
    assert!(keep_running);
    assert!(node.active_capability().is_none());
    assert_eq!(node.cached_count(), 0);
    assert_eq!(node.neighbors(), &[PeerId::from("peer-a")]);
    assert!(probe.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_events_cause_no_state_change() {
    let dir = TempDir::new().unwrap();
    let probe = Probe::default();
    let mut node = test_node(&dir, &probe);
    let (_shutdown, mut ctx) = test_ctx();

    for event in [
        LifecycleEvent::Started,
        LifecycleEvent::Stopping,
        LifecycleEvent::Stopped,
    ] {
        node.handle(NodeMessage::Lifecycle(event), &mut ctx)
            .await
            .unwrap();
    }

    assert!(node.active_capability().is_none());
    assert_eq!(node.cached_count(), 0);
    assert!(probe.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn loaded_capability_receives_custom_message_exactly_once() {
    let dir = TempDir::new().unwrap();
    let probe = Probe::default();
    let id = CapabilityId::new("alpha", "1.0");
    write_module(dir.path(), &id, "test:probe");

    let mut node = test_node(&dir, &probe);
    node.set_neighbors(vec![PeerId::from("peer-a"), PeerId::from("peer-b")]);
    let (_shutdown, mut ctx) = test_ctx();

    node.handle(NodeMessage::LoadCapability(id.clone()), &mut ctx)
        .await
        .unwrap();
    assert_eq!(node.active_capability(), Some(&id));
    assert!(node.has_capability(&id));

    let payload = CustomPayload::new("ping", json!({"seq": 7}));
    node.handle(NodeMessage::Custom(payload.clone()), &mut ctx)
        .await
        .unwrap();

    let calls = probe.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].payload, payload);
    assert_eq!(calls[0].node_id, "test-node");
    assert_eq!(
        calls[0].neighbors,
        vec![PeerId::from("peer-a"), PeerId::from("peer-b")]
    );
    drop(calls);

    // State survives dispatch unmodified.
    assert_eq!(node.neighbors().len(), 2);
}

#[tokio::test]
async fn failed_load_keeps_previous_capability_active() {
    let dir = TempDir::new().unwrap();
    let probe = Probe::default();
    let active = CapabilityId::new("y", "1");
    write_module(dir.path(), &active, "test:probe");

    let mut node = test_node(&dir, &probe);
    let (_shutdown, mut ctx) = test_ctx();

    node.handle(NodeMessage::LoadCapability(active.clone()), &mut ctx)
        .await
        .unwrap();
    assert_eq!(node.active_capability(), Some(&active));

    // No module for x@9 locally, and the repository is unreachable.
    node.handle(
        NodeMessage::LoadCapability(CapabilityId::new("x", "9")),
        &mut ctx,
    )
    .await
    .unwrap();

    // Fail-soft: the previous capability is still active and still works.
    assert_eq!(node.active_capability(), Some(&active));
    assert_eq!(node.cached_count(), 1);

    node.handle(
        NodeMessage::Custom(CustomPayload::new("ping", json!(null))),
        &mut ctx,
    )
    .await
    .unwrap();
    assert_eq!(probe.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn reloading_cached_capability_switches_without_touching_disk() {
    let dir = TempDir::new().unwrap();
    let probe = Probe::default();
    let id = CapabilityId::new("alpha", "1.0");
    write_module(dir.path(), &id, "test:probe");

    let mut node = test_node(&dir, &probe);
    let (_shutdown, mut ctx) = test_ctx();

    node.handle(NodeMessage::LoadCapability(id.clone()), &mut ctx)
        .await
        .unwrap();

    // Corrupt the module file; a cached load request must not re-read it.
    std::fs::write(dir.path().join(id.module_file_name(EXTENSION)), "junk").unwrap();

    node.handle(NodeMessage::LoadCapability(id.clone()), &mut ctx)
        .await
        .unwrap();
    assert_eq!(node.active_capability(), Some(&id));
    assert_eq!(node.cached_count(), 1);
}

#[tokio::test]
async fn switching_between_cached_capabilities_does_not_reload() {
    let dir = TempDir::new().unwrap();
    let probe = Probe::default();
    let alpha = CapabilityId::new("alpha", "1.0");
    let beta = CapabilityId::new("beta", "2.0");
    write_module(dir.path(), &alpha, "test:probe");
    write_module(dir.path(), &beta, "test:probe");

    let mut node = test_node(&dir, &probe);
    let (_shutdown, mut ctx) = test_ctx();

    node.handle(NodeMessage::LoadCapability(alpha.clone()), &mut ctx)
        .await
        .unwrap();
    node.handle(NodeMessage::LoadCapability(beta.clone()), &mut ctx)
        .await
        .unwrap();
    assert_eq!(node.active_capability(), Some(&beta));
    assert_eq!(node.cached_count(), 2);

    // Switch back: both stay cached, the active reference moves.
    node.handle(NodeMessage::LoadCapability(alpha.clone()), &mut ctx)
        .await
        .unwrap();
    assert_eq!(node.active_capability(), Some(&alpha));
    assert_eq!(node.cached_count(), 2);
}

#[tokio::test]
async fn end_to_end_through_supervisor_mailbox() {
    let dir = TempDir::new().unwrap();
    let probe = Probe::default();
    let id = CapabilityId::new("alpha", "1.0");
    write_module(dir.path(), &id, "test:probe");
    let node = test_node(&dir, &probe);

    let mut supervisor = Supervisor::new();
    let handle = supervisor.spawn(node, 16);

    handle
        .send(NodeMessage::Lifecycle(LifecycleEvent::Started))
        .await
        .unwrap();
    handle
        .send(NodeMessage::LoadCapability(id))
        .await
        .unwrap();
    handle
        .send(NodeMessage::Custom(CustomPayload::new("ping", json!({"seq": 1}))))
        .await
        .unwrap();

    // The mailbox is processed in order, so the custom message arrives after
    // the load completes.
    tokio::time::timeout(Duration::from_secs(5), async {
        while probe.calls.lock().unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("capability was never invoked");

    assert_eq!(probe.calls.lock().unwrap().len(), 1);
    supervisor.stop_all().await;
}
