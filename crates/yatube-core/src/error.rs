//! Errors surfaced through the repository ports.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    /// The store could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage query failed: {0}")]
    Query(String),

    /// An update targeted a record that does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness or reference rule rejected the write.
    #[error("conflicts with stored data: {0}")]
    Conflict(String),
}
