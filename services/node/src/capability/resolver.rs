//! Capability resolver: cache, then local disk, then the remote repository.

use std::path::{Path, PathBuf};

use capnet_protocol::CapabilityId;
use reqwest::Url;
use tracing::{debug, info};

use super::cache::CapabilityCache;
use super::error::CapabilityError;
use super::fetcher::RemoteFetcher;
use super::loader::ModuleLoader;
use super::module::CapabilityContract;

/// Orchestrates cache lookup, local load, remote fetch, and the single
/// post-fetch retry.
///
/// Resolution is synchronous end-to-end from the node's point of view: the
/// node actor awaits it inside message handling, so a slow download stalls
/// all other message processing for that node. There is no retry or backoff
/// beyond the single post-fetch reload.
pub struct CapabilityResolver {
    capability_dir: PathBuf,
    repo_base: Url,
    loader: ModuleLoader,
    fetcher: RemoteFetcher,
}

impl CapabilityResolver {
    pub fn new(
        capability_dir: PathBuf,
        repo_base: Url,
        loader: ModuleLoader,
        fetcher: RemoteFetcher,
    ) -> Self {
        Self {
            capability_dir,
            repo_base,
            loader,
            fetcher,
        }
    }

    pub fn repo_base(&self) -> &Url {
        &self.repo_base
    }

    /// Point this node at a different repository.
    pub fn set_repo_base(&mut self, repo_base: Url) {
        self.repo_base = repo_base;
    }

    /// Canonical on-disk path for a capability's module file.
    pub fn module_path(&self, id: &CapabilityId) -> PathBuf {
        self.capability_dir
            .join(id.module_file_name(self.loader.extension()))
    }

    /// Resolve `id` to a contract, in strict order, short-circuiting on the
    /// first success:
    ///
    /// 1. cache lookup (zero I/O on hit);
    /// 2. loader on the canonical local path;
    /// 3. remote fetch of the same canonical filename into that path;
    /// 4. loader retry, exactly once;
    /// 5. otherwise `NotFound`.
    ///
    /// Successful loads are inserted into `cache` before returning, so a
    /// capability once resolved never goes through I/O again.
    pub async fn resolve(
        &self,
        cache: &mut CapabilityCache,
        id: &CapabilityId,
    ) -> Result<CapabilityContract, CapabilityError> {
        if let Some(contract) = cache.get(id) {
            debug!(id = %id, "capability cache hit");
            return Ok(contract.clone());
        }

        let path = self.module_path(id);

        match self.load_from_path(&path) {
            Ok(contract) => {
                info!(id = %id, path = %path.display(), "capability loaded from local filesystem");
                cache.put(id.clone(), contract.clone());
                return Ok(contract);
            }
            Err(e) => {
                debug!(id = %id, error = %e, "capability not loadable locally, trying repository");
            }
        }

        if let Err(e) = self
            .fetcher
            .fetch(&self.repo_base, id, self.loader.extension(), &path)
            .await
        {
            debug!(id = %id, error = %e, "repository fetch failed");
            return Err(CapabilityError::NotFound { id: id.clone() });
        }

        match self.load_from_path(&path) {
            Ok(contract) => {
                info!(id = %id, path = %path.display(), "capability loaded after repository fetch");
                cache.put(id.clone(), contract.clone());
                Ok(contract)
            }
            Err(e) => {
                debug!(id = %id, error = %e, "downloaded module failed to load");
                Err(CapabilityError::NotFound { id: id.clone() })
            }
        }
    }

    fn load_from_path(&self, path: &Path) -> Result<CapabilityContract, CapabilityError> {
        let handle = self.loader.open_module(path)?;
        self.loader.extract_contract(&handle)
    }
}
