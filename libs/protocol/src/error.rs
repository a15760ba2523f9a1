//! Error types for identifier parsing.

use thiserror::Error;

/// Errors that can occur when parsing capability or peer identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier string is empty.
    #[error("identifier cannot be empty")]
    Empty,

    /// The capability name portion is empty.
    #[error("capability name cannot be empty in '{0}'")]
    EmptyName(String),

    /// The capability version portion is empty.
    #[error("capability version cannot be empty in '{0}'")]
    EmptyVersion(String),

    /// The identifier is missing the `name@version` separator.
    #[error("capability id '{0}' is missing the '@' separator (expected name@version)")]
    MissingSeparator(String),
}
