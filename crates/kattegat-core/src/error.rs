//! Error type for network construction and editing.
//!
//! Solver-facing failures live in `kattegat_algo::OpfError`; this enum only
//! covers what can go wrong while assembling or editing a [`Network`].
//!
//! [`Network`]: crate::Network

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A bus ID or element name is already taken
    #[error("duplicate {0}")]
    Duplicate(String),

    /// A name or bus ID that does not exist in the network
    #[error("not found: {0}")]
    NotFound(String),

    /// An edge whose endpoints cannot be connected
    #[error("invalid connection: {0}")]
    InvalidConnection(String),
}

pub type GridResult<T> = Result<T, GridError>;
