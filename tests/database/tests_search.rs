//! Fragment search tests.

use std::rc::Rc;

use sourcedb::base::DatabaseId;
use sourcedb::database::ChangeSetProvider;
use sourcedb::fragment::{FileFragment, FragmentKind};
use sourcedb::{TextRange, TextSize};

use crate::helpers::db_helpers::memory_database;

const MODULE: &str = "\
module('a.B').requires().toRun(function() {
Object.subclass('a.B.Thing', {
    poke: function() { return magicValue; },
    idle: function() { },
});
globalCall();
});";

#[test]
fn test_search_matches_only_the_owning_fragment() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", MODULE);
    db.add_module("a/B.js", None, false).unwrap();

    let hits = db.search_for("magicValue");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind(), FragmentKind::Method);
    assert_eq!(hits[0].name(), Some("poke"));
}

#[test]
fn test_search_matches_a_parent_in_its_own_text() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", MODULE);
    db.add_module("a/B.js", None, false).unwrap();

    // The class name lives in the class header, outside every method body,
    // so the class matches in its own text and its parents do not.
    let hits = db.search_for("a.B.Thing");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind(), FragmentKind::Class);
}

#[test]
fn test_search_spans_modules_and_dialects() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/One.js", "sharedName();");
    store
        .borrow_mut()
        .seed_file("g/G.ometa", "ometa G {\n  rule = sharedName\n}\n");
    db.add_module("a/One.js", None, false).unwrap();
    db.add_module("g/G.ometa", None, false).unwrap();

    let hits = db.search_for("sharedName");
    assert_eq!(hits.len(), 2);
    let mut files: Vec<_> = hits.iter().map(|h| h.file_name().to_string()).collect();
    files.sort();
    assert_eq!(files, vec!["a/One.js", "g/G.ometa"]);
}

#[test]
fn test_search_misses_return_empty() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", MODULE);
    db.add_module("a/B.js", None, false).unwrap();
    assert!(db.search_for("definitelyNotThere").is_empty());
}

struct FixedChangeSet {
    fragments: Vec<FileFragment>,
}

impl ChangeSetProvider for FixedChangeSet {
    fn current_fragments(&self) -> Vec<FileFragment> {
        self.fragments.clone()
    }
}

#[test]
fn test_search_consults_change_set_fragments() {
    let (mut db, store, _log) = memory_database();
    store.borrow_mut().seed_file("a/B.js", "prefix(); magicValue();");
    db.add_module("a/B.js", None, false).unwrap();

    let change = FileFragment::new(
        FragmentKind::Change,
        Some("recorded".into()),
        TextRange::new(TextSize::new(10), TextSize::new(23)),
        "a/B.js",
        Vec::new(),
        DatabaseId::fresh(),
    );
    db.register_change_set_provider(Rc::new(FixedChangeSet {
        fragments: vec![change],
    }));

    let hits = db.search_for("magicValue");
    let kinds: Vec<_> = hits.iter().map(FileFragment::kind).collect();
    assert!(kinds.contains(&FragmentKind::Change));
}
