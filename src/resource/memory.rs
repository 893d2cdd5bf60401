//! In-memory transport with an explicitly driven completion queue.
//!
//! Async puts do not apply immediately: they queue as pending operations
//! until [`MemoryStore::complete_next`] resolves one and hands back the
//! [`WriteOutcome`] to pump into the database. That makes the whole
//! write/conflict/queue protocol observable step by step, which is exactly
//! what the tests need. The store is shared behind `Rc<RefCell<...>>` so a
//! test can keep a handle while the database owns the accessor.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::base::RevisionToken;

use super::{
    PutResponse, ResourceAccessor, TransportError, WriteMode, WriteOutcome, WriteStatus,
    WriteTicket,
};

/// A call the accessor has seen, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorCall {
    Get(String),
    Put(String),
    HeadRevision(String),
    Delete(String),
    List(String),
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    revision: u64,
}

#[derive(Debug)]
struct PendingPut {
    location: String,
    content: String,
    precondition: Option<RevisionToken>,
    ticket: WriteTicket,
}

/// Shared handle to a [`MemoryStore`].
pub type SharedStore = Rc<RefCell<MemoryStore>>;

/// Backing state of the in-memory transport.
#[derive(Default)]
pub struct MemoryStore {
    files: IndexMap<String, StoredFile>,
    pending: VecDeque<PendingPut>,
    calls: Vec<AccessorCall>,
    next_ticket: u64,
    next_revision: u64,
    fail_listings: bool,
}

impl MemoryStore {
    pub fn shared() -> SharedStore {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Put a file in place without going through the accessor protocol.
    /// Bumps the revision, so it also simulates an external change.
    pub fn seed_file(&mut self, location: impl Into<String>, content: impl Into<String>) {
        let revision = self.bump_revision();
        self.files.insert(
            location.into(),
            StoredFile {
                content: content.into(),
                revision,
            },
        );
    }

    /// Make `list` fail, to exercise the interactive error paths.
    pub fn set_fail_listings(&mut self, fail: bool) {
        self.fail_listings = fail;
    }

    pub fn contents(&self, location: &str) -> Option<&str> {
        self.files.get(location).map(|f| f.content.as_str())
    }

    pub fn revision_of(&self, location: &str) -> RevisionToken {
        let revision = self.files.get(location).map(|f| f.revision).unwrap_or(0);
        RevisionToken::new(format!("r{revision}"))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn calls(&self) -> &[AccessorCall] {
        &self.calls
    }

    /// Resolve the oldest pending put and return its outcome, or `None`
    /// when nothing is pending.
    pub fn complete_next(&mut self) -> Option<WriteOutcome> {
        let put = self.pending.pop_front()?;
        let status = self.apply_put(&put.location, put.content, put.precondition.as_ref());
        Some(WriteOutcome {
            location: put.location,
            ticket: put.ticket,
            status,
        })
    }

    fn apply_put(
        &mut self,
        location: &str,
        content: String,
        precondition: Option<&RevisionToken>,
    ) -> WriteStatus {
        if let Some(expected) = precondition {
            if self.revision_of(location) != *expected {
                return WriteStatus::Conflict;
            }
        }
        let revision = self.bump_revision();
        self.files
            .insert(location.to_string(), StoredFile { content, revision });
        WriteStatus::Saved
    }

    fn bump_revision(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

/// Accessor front-end over a [`SharedStore`].
#[derive(Clone)]
pub struct MemoryAccessor {
    store: SharedStore,
}

impl MemoryAccessor {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Fresh store plus an accessor over it.
    pub fn fresh() -> (Self, SharedStore) {
        let store = MemoryStore::shared();
        (Self::new(store.clone()), store)
    }
}

impl ResourceAccessor for MemoryAccessor {
    fn get(
        &mut self,
        location: &str,
        _force_uncached: bool,
    ) -> Result<Option<String>, TransportError> {
        let mut store = self.store.borrow_mut();
        store.calls.push(AccessorCall::Get(location.to_string()));
        Ok(store.files.get(location).map(|f| f.content.clone()))
    }

    fn put(
        &mut self,
        location: &str,
        content: &str,
        _mime: Option<&str>,
        precondition: Option<&RevisionToken>,
        mode: WriteMode,
    ) -> Result<PutResponse, TransportError> {
        let mut store = self.store.borrow_mut();
        store.calls.push(AccessorCall::Put(location.to_string()));
        match mode {
            WriteMode::Sync => Ok(PutResponse::Done(store.apply_put(
                location,
                content.to_string(),
                precondition,
            ))),
            WriteMode::Async => {
                store.next_ticket += 1;
                let ticket = WriteTicket(store.next_ticket);
                store.pending.push_back(PendingPut {
                    location: location.to_string(),
                    content: content.to_string(),
                    precondition: precondition.cloned(),
                    ticket,
                });
                Ok(PutResponse::Pending(ticket))
            }
        }
    }

    fn head_revision(&mut self, location: &str) -> Result<RevisionToken, TransportError> {
        let mut store = self.store.borrow_mut();
        store
            .calls
            .push(AccessorCall::HeadRevision(location.to_string()));
        Ok(store.revision_of(location))
    }

    fn delete(&mut self, location: &str) -> Result<(), TransportError> {
        let mut store = self.store.borrow_mut();
        store.calls.push(AccessorCall::Delete(location.to_string()));
        store.files.shift_remove(location);
        Ok(())
    }

    fn list(&mut self, location: &str) -> Result<Vec<String>, TransportError> {
        let mut store = self.store.borrow_mut();
        store.calls.push(AccessorCall::List(location.to_string()));
        if store.fail_listings {
            return Err(TransportError::new("listing unavailable"));
        }
        let prefix = if location.is_empty() {
            String::new()
        } else {
            format!("{}/", location.trim_end_matches('/'))
        };
        Ok(store
            .files
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .map(ToString::to_string)
            .collect())
    }
}
