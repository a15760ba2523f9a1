//! Configuration for a capnet node.
//!
//! Built once per node and passed down to the actor and resolver; there is
//! no process-global configuration state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Url;

/// Node configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier for this node, used in logging.
    pub node_id: String,

    /// Local directory holding capability module files.
    pub capability_dir: PathBuf,

    /// Platform module extension, without the leading dot.
    pub module_extension: String,

    /// Base address of the remote module repository. Module filenames are
    /// resolved against this URL, so it should end with a `/`.
    pub repo_base_url: Url,

    /// Mailbox capacity for the node actor.
    pub mailbox_size: usize,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Fallback repository used when `CAPNET_REPO_URL` is unset.
pub const DEFAULT_REPO_URL: &str = "https://modules.capnet.dev/";

impl Config {
    /// Load configuration from `CAPNET_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let node_id = std::env::var("CAPNET_NODE_ID")
            .unwrap_or_else(|_| format!("node-{}", std::process::id()));

        let capability_dir = std::env::var("CAPNET_CAPABILITY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("capabilities"));

        let module_extension =
            std::env::var("CAPNET_MODULE_EXTENSION").unwrap_or_else(|_| "capmod".to_string());

        let repo_base_url = std::env::var("CAPNET_REPO_URL")
            .unwrap_or_else(|_| DEFAULT_REPO_URL.to_string());
        let repo_base_url = Url::parse(&repo_base_url)
            .with_context(|| format!("invalid CAPNET_REPO_URL: {repo_base_url}"))?;

        let mailbox_size = std::env::var("CAPNET_MAILBOX_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);

        let log_level = std::env::var("CAPNET_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            node_id,
            capability_dir,
            module_extension,
            repo_base_url,
            mailbox_size,
            log_level,
        })
    }
}
