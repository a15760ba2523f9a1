//! Remote fetcher: downloads capability modules from the repository.

use std::path::Path;

use capnet_protocol::CapabilityId;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode, Url};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::error::{CapabilityError, FetchFailureReason};

/// Downloads module files from the configured repository into local storage.
///
/// The GET runs on a spawned worker task while the destination directory is
/// created concurrently; the caller then blocks on a oneshot channel until
/// the worker signals completion. There is no timeout or cancellation: a
/// hanging download stalls the resolution (and with it the node's message
/// processing) until the transport gives up.
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Fetch the canonical module file for `id` from `repo_base` into `dest`.
    ///
    /// Only HTTP 200 counts as success. On success the body is streamed to
    /// `dest`, overwriting any existing file. The write is not atomic: a
    /// failure partway through the copy can leave a truncated file at
    /// `dest`, which a later local load rejects with `LoadFailure`.
    pub async fn fetch(
        &self,
        repo_base: &Url,
        id: &CapabilityId,
        extension: &str,
        dest: &Path,
    ) -> Result<(), CapabilityError> {
        let file_name = id.module_file_name(extension);
        let url = repo_base
            .join(&file_name)
            .map_err(|e| CapabilityError::FetchFailure {
                url: format!("{repo_base}{file_name}"),
                reason: FetchFailureReason::Transport(e.to_string()),
            })?;

        info!(url = %url, id = %id, "downloading capability module from repository");

        // Issue the GET on a worker task; finish local preparation while the
        // request is in flight.
        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        let request_url = url.clone();
        tokio::spawn(async move {
            let _ = tx.send(client.get(request_url).send().await);
        });

        // Idempotent; must succeed or the fetch fails with the directory
        // error.
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CapabilityError::FetchFailure {
                    url: url.to_string(),
                    reason: FetchFailureReason::Io(e.to_string()),
                })?;
        }

        let response = rx
            .await
            .map_err(|_| CapabilityError::FetchFailure {
                url: url.to_string(),
                reason: FetchFailureReason::Transport("fetch worker dropped".to_string()),
            })?
            .map_err(|e| CapabilityError::FetchFailure {
                url: url.to_string(),
                reason: FetchFailureReason::Transport(e.to_string()),
            })?;

        if response.status() != StatusCode::OK {
            return Err(CapabilityError::FetchFailure {
                url: url.to_string(),
                reason: FetchFailureReason::Status(response.status()),
            });
        }

        let mut file =
            tokio::fs::File::create(dest)
                .await
                .map_err(|e| CapabilityError::FetchFailure {
                    url: url.to_string(),
                    reason: FetchFailureReason::Io(e.to_string()),
                })?;

        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CapabilityError::FetchFailure {
                url: url.to_string(),
                reason: FetchFailureReason::Transport(e.to_string()),
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| CapabilityError::FetchFailure {
                    url: url.to_string(),
                    reason: FetchFailureReason::Io(e.to_string()),
                })?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| CapabilityError::FetchFailure {
                url: url.to_string(),
                reason: FetchFailureReason::Io(e.to_string()),
            })?;

        debug!(
            url = %url,
            dest = %dest.display(),
            bytes = written,
            "capability module downloaded"
        );

        Ok(())
    }
}
