//! Module registry tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sourcedb::base::Dialect;
use sourcedb::database::{SourceContext, SourceDatabase, SourceError};
use sourcedb::fragment::{FileFragment, FragmentKind};
use sourcedb::parser::{DialectParser, ParseContext, ParserSet};
use sourcedb::resource::memory::{AccessorCall, MemoryAccessor};

use crate::helpers::db_helpers::{RecordingPrompt, memory_database};

fn get_calls_for(calls: &[AccessorCall], location: &str) -> usize {
    calls
        .iter()
        .filter(|c| matches!(c, AccessorCall::Get(l) if l == location))
        .count()
}

#[test]
fn test_add_module_fetches_and_parses() {
    let (mut db, store, _log) = memory_database();
    store
        .borrow_mut()
        .seed_file("a/B.js", "module('a.B').requires().toRun(function() {\nfoo();\n});");

    db.add_module("a/B.js", None, false).unwrap();
    let root = db.root_fragment_for_module("a/B.js").unwrap();
    assert_eq!(root.kind(), FragmentKind::ModuleDef);
    assert_eq!(root.name(), Some("a.B"));
}

#[test]
fn test_add_module_is_idempotent() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", "foo();");

    db.add_module("a/B.js", None, false).unwrap();
    db.add_module("a/B.js", None, false).unwrap();
    db.add_module("../core/a/B.js", None, false).unwrap();

    assert_eq!(db.all_module_wrappers().count(), 1);
    assert_eq!(get_calls_for(store.borrow().calls(), "a/B.js"), 1);
}

#[test]
fn test_add_module_with_seeded_source_skips_the_fetch() {
    let (mut db, store, _log) = memory_database();

    db.add_module("a/B.js", Some("seeded();".to_string()), false)
        .unwrap();

    assert_eq!(db.cached_text("a/B.js"), "seeded();");
    assert!(db.root_fragment_for_module("a/B.js").is_some());
    assert_eq!(get_calls_for(store.borrow().calls(), "a/B.js"), 0);
}

#[test]
fn test_reparse_with_force_reread_refetches() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", "one();");
    db.add_module("a/B.js", None, false).unwrap();

    store.borrow_mut().seed_file("a/B.js", "one();\ntwo();");
    let root = db.reparse_module("a/B.js", true).unwrap();
    assert_eq!(root.children().len(), 2);
    assert_eq!(db.cached_text("a/B.js"), "one();\ntwo();");
}

#[test]
fn test_reparse_without_force_keeps_cache() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", "one();");
    db.add_module("a/B.js", None, false).unwrap();

    store.borrow_mut().seed_file("a/B.js", "one();\ntwo();");
    let root = db.reparse_module("a/B.js", false).unwrap();
    assert_eq!(root.children().len(), 1);
}

struct CountingParser {
    parses: Arc<AtomicUsize>,
}

impl DialectParser for CountingParser {
    fn parse_source(&self, _source: &str, _ctx: &ParseContext<'_>) -> Vec<FileFragment> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        Vec::new()
    }
}

#[test]
fn test_reparse_of_an_unknown_file_parses_once() {
    let (accessor, store) = MemoryAccessor::fresh();
    let (prompt, _log) = RecordingPrompt::new();
    let parses = Arc::new(AtomicUsize::new(0));
    let mut parsers = ParserSet::with_defaults();
    parsers.register(
        Dialect::Script,
        Arc::new(CountingParser {
            parses: parses.clone(),
        }),
    );
    let ctx = SourceContext::new(Box::new(accessor), Box::new(prompt), parsers, "");
    let mut db = SourceDatabase::new(ctx);
    store.borrow_mut().seed_file("a/B.js", "one();");

    db.reparse_module("a/B.js", false).unwrap();
    assert_eq!(parses.load(Ordering::SeqCst), 1);
}

#[test]
fn test_parse_complete_file_with_text_override() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", "one();");
    db.add_module("a/B.js", None, false).unwrap();

    let root = db
        .parse_complete_file("a/B.js", Some("one();\ntwo();\nthree();"))
        .unwrap();
    assert_eq!(root.children().len(), 3);

    // The registered tree is untouched.
    let registered = db.root_fragment_for_module("a/B.js").unwrap();
    assert_eq!(registered.children().len(), 1);
}

#[test]
fn test_parse_complete_file_requires_registration() {
    let (mut db, _store, _log) = memory_database();
    let result = db.parse_complete_file("never/Seen.js", None);
    assert!(matches!(result, Err(SourceError::NotFound(_))));
}

#[test]
fn test_virtual_module_lives_outside_the_transport() {
    let (mut db, store, _log) = memory_database();
    let (name, file_name) = {
        let wrapper = db
            .add_virtual_module(None, "scratch();".to_string(), Dialect::Script)
            .unwrap();
        assert!(wrapper.is_virtual());
        (wrapper.module_name().as_str().to_string(), wrapper.file_name())
    };
    assert!(name.starts_with("virtual-module.x"), "generated id: {name}");

    assert_eq!(db.cached_text(&file_name), "scratch();");
    assert!(db.root_fragment_for_module(&file_name).is_some());

    db.remove_file(&file_name).unwrap();
    assert!(db.find_module_wrapper_for_file_name(&file_name).is_none());
    // Neither creation nor removal touched the transport.
    assert!(store.borrow().calls().is_empty());
}

#[test]
fn test_named_virtual_module() {
    let (mut db, _store, _log) = memory_database();
    let wrapper = db
        .add_virtual_module(Some("workspace.Pad"), "x();".to_string(), Dialect::Script)
        .unwrap();
    assert_eq!(wrapper.module_name().as_str(), "workspace.Pad");
}

#[test]
fn test_remove_file_deletes_and_unregisters() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", "foo();");
    db.add_module("a/B.js", None, false).unwrap();

    db.remove_file("a/B.js").unwrap();
    assert!(db.find_module_wrapper_for_file_name("a/B.js").is_none());
    assert_eq!(store.borrow().contents("a/B.js"), None);
}

#[test]
fn test_cached_text_for_unknown_module_reads_as_empty() {
    let (db, _store, _log) = memory_database();
    assert_eq!(db.cached_text("never/Seen.js"), "");
}
