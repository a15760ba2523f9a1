//! Module loader: opens descriptor files and validates the export contract.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::error::CapabilityError;
use super::module::{
    BehaviorRegistry, CapabilityContract, ModuleDescriptor, ModuleHandle, RECEIVE_SIGNATURE,
    RECEIVE_SYMBOL,
};

/// Opens capability modules and extracts their contracts.
pub struct ModuleLoader {
    extension: String,
    registry: Arc<BehaviorRegistry>,
}

impl ModuleLoader {
    pub fn new(extension: impl Into<String>, registry: Arc<BehaviorRegistry>) -> Self {
        Self {
            extension: extension.into(),
            registry,
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Open a module file and parse its descriptor.
    ///
    /// The extension check happens before any filesystem access; a path that
    /// cannot be a module never touches the disk.
    pub fn open_module(&self, path: &Path) -> Result<ModuleHandle, CapabilityError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == self.extension => {}
            _ => {
                return Err(CapabilityError::InvalidExtension {
                    path: path.to_path_buf(),
                    expected: self.extension.clone(),
                });
            }
        }

        debug!(path = %path.display(), "opening capability module");

        let bytes = fs::read(path).map_err(|e| CapabilityError::LoadFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let descriptor: ModuleDescriptor =
            serde_json::from_slice(&bytes).map_err(|e| CapabilityError::LoadFailure {
                path: path.to_path_buf(),
                reason: format!("malformed module descriptor: {e}"),
            })?;

        Ok(ModuleHandle {
            path: path.to_path_buf(),
            descriptor,
        })
    }

    /// Validate the `Receive` export and bind it to its provider.
    ///
    /// Fails `SymbolMissing` if the export table lacks the symbol or no
    /// registered provider backs it, `SignatureMismatch` if the declared
    /// signature differs from the required calling convention.
    pub fn extract_contract(
        &self,
        handle: &ModuleHandle,
    ) -> Result<CapabilityContract, CapabilityError> {
        let export = handle.descriptor.exports.get(RECEIVE_SYMBOL).ok_or_else(|| {
            CapabilityError::SymbolMissing {
                path: handle.path.clone(),
                symbol: RECEIVE_SYMBOL.to_string(),
            }
        })?;

        if export.signature != RECEIVE_SIGNATURE {
            return Err(CapabilityError::SignatureMismatch {
                path: handle.path.clone(),
                symbol: RECEIVE_SYMBOL.to_string(),
                expected: RECEIVE_SIGNATURE.to_string(),
                found: export.signature.clone(),
            });
        }

        let entry = self.registry.get(&export.provider).ok_or_else(|| {
            debug!(
                provider = %export.provider,
                path = %handle.path.display(),
                "export names an unregistered provider"
            );
            CapabilityError::SymbolMissing {
                path: handle.path.clone(),
                symbol: RECEIVE_SYMBOL.to_string(),
            }
        })?;

        Ok(CapabilityContract::new(entry))
    }
}
