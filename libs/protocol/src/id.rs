//! Capability and peer identifier types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdError;

// =============================================================================
// CapabilityId
// =============================================================================

/// Immutable (name, version) key identifying one capability.
///
/// Used as the capability cache key and for deterministic module filename
/// derivation. Equality and hashing cover both fields; there is no semantic
/// version ordering, and resolution is exact name+version match only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityId {
    /// Capability name, e.g. `"search"`.
    pub name: String,

    /// Capability version, e.g. `"2.0"`. An opaque label, not a semver.
    pub version: String,
}

impl CapabilityId {
    /// Create an identifier from name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Canonical module filename for this identifier: `{name}_{version}.{ext}`.
    ///
    /// Both local lookup and remote fetch use this exact filename, so a module
    /// downloaded once is found locally on the next resolution.
    pub fn module_file_name(&self, extension: &str) -> String {
        format!("{}_{}.{}", self.name, self.version, extension)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl FromStr for CapabilityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        let (name, version) = s
            .split_once('@')
            .ok_or_else(|| IdError::MissingSeparator(s.to_string()))?;
        if name.is_empty() {
            return Err(IdError::EmptyName(s.to_string()));
        }
        if version.is_empty() {
            return Err(IdError::EmptyVersion(s.to_string()));
        }
        Ok(Self::new(name, version))
    }
}

// =============================================================================
// PeerId
// =============================================================================

/// Address of a peer node reachable from this node.
///
/// Neighbor lists are ordered sequences of these. Population and gossip are
/// owned by the external membership component; this crate only carries the
/// value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// Tests
// =============================================================================
