//! The resource accessor contract and the transports shipped with it.
//!
//! A [`ResourceAccessor`] is the database's only path to backing storage:
//! fetch content, store content with an optional revision precondition,
//! read head revisions, delete, and list. Writes are non-blocking; a
//! transport either completes a put inline ([`PutResponse::Done`]) or hands
//! back a ticket and delivers a [`WriteOutcome`] later, which the host pumps
//! into [`SourceDatabase::deliver_write_outcome`].
//!
//! [`SourceDatabase::deliver_write_outcome`]: crate::database::SourceDatabase::deliver_write_outcome

pub mod fs;
pub mod memory;

use thiserror::Error;

use crate::base::RevisionToken;

/// A listing or generic network failure.
///
/// Transport errors are reported to the user interactively during file
/// discovery and code-base switching; elsewhere they propagate to whoever
/// initiated the operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Handle for a write the transport has accepted but not yet resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteTicket(pub u64);

/// Whether a put should resolve before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Sync,
    Async,
}

/// Terminal status of a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// Content stored; a fresh head revision is available.
    Saved,
    /// The precondition revision no longer matches the stored content
    /// (HTTP 412 equivalent). Nothing was written.
    Conflict,
    /// Any other failure, with a transport-specific code.
    Failed(u16),
}

/// How the transport answered a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutResponse {
    /// Resolved inline (synchronous transports, or `WriteMode::Sync`).
    Done(WriteStatus),
    /// Accepted; a [`WriteOutcome`] with this ticket arrives later.
    Pending(WriteTicket),
}

/// Completion notification for a pending put.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub location: String,
    pub ticket: WriteTicket,
    pub status: WriteStatus,
}

/// Content retrieval and storage against a location.
///
/// Locations are opaque strings; the database derives them by joining its
/// code base with a wrapper's file name.
pub trait ResourceAccessor {
    /// Fetch content. `Ok(None)` means the resource does not exist, which
    /// callers coerce as they see fit. `force_uncached` bypasses any
    /// transport-level cache.
    fn get(&mut self, location: &str, force_uncached: bool)
    -> Result<Option<String>, TransportError>;

    /// Store content. A `precondition` revision makes the write
    /// conditional: the transport must answer [`WriteStatus::Conflict`]
    /// without writing when the stored revision differs.
    fn put(
        &mut self,
        location: &str,
        content: &str,
        mime: Option<&str>,
        precondition: Option<&RevisionToken>,
        mode: WriteMode,
    ) -> Result<PutResponse, TransportError>;

    /// The current head revision. Absent resources report the transport's
    /// zero revision rather than an error.
    fn head_revision(&mut self, location: &str) -> Result<RevisionToken, TransportError>;

    /// Delete the resource. Deleting an absent resource is not an error.
    fn delete(&mut self, location: &str) -> Result<(), TransportError>;

    /// Relative names of all files under a base location.
    fn list(&mut self, location: &str) -> Result<Vec<String>, TransportError>;
}
