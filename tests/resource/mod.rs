//! Resource transport tests
//!
//! Tests for:
//! - In-memory store: deferred async puts, preconditions, call recording
//! - Filesystem store: round trips, content-hash revisions, listing

pub mod tests_fs;
pub mod tests_memory;
