//! Builders for databases backed by the in-memory transport.

use std::cell::RefCell;
use std::rc::Rc;

use sourcedb::database::{SourceContext, SourceDatabase, UserPrompt};
use sourcedb::parser::ParserSet;
use sourcedb::resource::memory::{MemoryAccessor, SharedStore};

/// Prompt that records every message it is asked to present.
pub struct RecordingPrompt {
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingPrompt {
    pub fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (Self { log: log.clone() }, log)
    }
}

impl UserPrompt for RecordingPrompt {
    fn confirm(&mut self, message: &str) {
        self.log.borrow_mut().push(format!("confirm: {message}"));
    }

    fn alert(&mut self, message: &str) {
        self.log.borrow_mut().push(format!("alert: {message}"));
    }

    fn notify(&mut self, message: &str) {
        self.log.borrow_mut().push(format!("notify: {message}"));
    }
}

/// A database over a fresh in-memory store, with the store and prompt log
/// exposed for inspection.
pub fn memory_database() -> (SourceDatabase, SharedStore, Rc<RefCell<Vec<String>>>) {
    let (accessor, store) = MemoryAccessor::fresh();
    let (prompt, log) = RecordingPrompt::new();
    let ctx = SourceContext::new(
        Box::new(accessor),
        Box::new(prompt),
        ParserSet::with_defaults(),
        "",
    );
    (SourceDatabase::new(ctx), store, log)
}

/// Deliver every queued write completion to the database, in order.
pub fn settle_writes(db: &mut SourceDatabase, store: &SharedStore) {
    loop {
        let outcome = store.borrow_mut().complete_next();
        match outcome {
            Some(outcome) => db
                .deliver_write_outcome(outcome)
                .unwrap_or_else(|e| panic!("write outcome delivery failed: {e}")),
            None => break,
        }
    }
}
