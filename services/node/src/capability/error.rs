//! Error taxonomy for the capability resolution chain.
//!
//! Nothing in this taxonomy is fatal to a node: every error is logged at the
//! node actor boundary and the triggering load request is dropped. A
//! malformed or unreachable module only fails to update the active
//! capability.

use std::fmt;
use std::path::PathBuf;

use capnet_protocol::CapabilityId;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced inside the resolver/loader/fetcher chain.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The module path does not carry the required platform module extension.
    /// Raised before any filesystem access.
    #[error("invalid module extension on `{}`: expected `.{expected}`", path.display())]
    InvalidExtension { path: PathBuf, expected: String },

    /// The module file could not be read or is malformed.
    #[error("failed to load module `{}`: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    /// The module's required export could not be found or bound.
    #[error("module `{}` has no loadable symbol `{symbol}`", path.display())]
    SymbolMissing { path: PathBuf, symbol: String },

    /// The export exists but does not match the required calling convention.
    #[error(
        "symbol `{symbol}` in `{}` has signature `{found}`, expected `{expected}`",
        path.display()
    )]
    SignatureMismatch {
        path: PathBuf,
        symbol: String,
        expected: String,
        found: String,
    },

    /// The remote repository fetch failed.
    #[error("fetch of `{url}` failed: {reason}")]
    FetchFailure { url: String, reason: FetchFailureReason },

    /// The capability could not be resolved from cache, disk, or the remote
    /// repository.
    #[error("capability {id} could not be found")]
    NotFound { id: CapabilityId },
}

/// Why a remote fetch failed.
#[derive(Debug)]
pub enum FetchFailureReason {
    /// The repository answered with a non-200 status.
    Status(StatusCode),

    /// The request could not be completed (DNS, connect, mid-body error).
    Transport(String),

    /// Local filesystem error while preparing or writing the destination.
    Io(String),
}

impl fmt::Display for FetchFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailureReason::Status(status) => write!(f, "status {status}"),
            FetchFailureReason::Transport(cause) => write!(f, "transport error: {cause}"),
            FetchFailureReason::Io(cause) => write!(f, "io error: {cause}"),
        }
    }
}

impl CapabilityError {
    /// True for the terminal "nothing worked" resolver outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CapabilityError::NotFound { .. })
    }
}
