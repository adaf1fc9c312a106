//! Error handling for X3GBridge
//!
//! Provides error types for the layers that can genuinely fail:
//! - Table errors (allocation failures in the directory listing cache)
//! - I/O errors on the upstream (host-facing) text endpoint
//!
//! Device-reported conditions are not errors here. They travel as outcome
//! codes through the translation pipeline and end up as reply text.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// String table error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Memory for the requested number of entries could not be reserved
    #[error("Failed to reserve room for {requested} entries")]
    AllocationFailed {
        /// Total number of entries the table tried to hold.
        requested: usize,
    },
}

/// Main error type for X3GBridge
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// String table error
    #[error(transparent)]
    Table(#[from] TableError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is an allocation failure from the string table
    pub fn is_table_error(&self) -> bool {
        matches!(self, Error::Table(_))
    }

    /// Check if the upstream endpoint failed
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
