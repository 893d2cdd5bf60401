//! In-memory transport tests.

use sourcedb::resource::memory::MemoryAccessor;
use sourcedb::resource::{PutResponse, ResourceAccessor, WriteMode, WriteStatus};

#[test]
fn test_sync_put_applies_inline() {
    let (mut accessor, store) = MemoryAccessor::fresh();
    let response = accessor
        .put("a/B.js", "text", None, None, WriteMode::Sync)
        .unwrap();
    assert!(matches!(response, PutResponse::Done(WriteStatus::Saved)));
    assert_eq!(store.borrow().contents("a/B.js"), Some("text"));
}

#[test]
fn test_async_put_defers_until_completed() {
    let (mut accessor, store) = MemoryAccessor::fresh();
    let response = accessor
        .put("a/B.js", "text", None, None, WriteMode::Async)
        .unwrap();
    assert!(matches!(response, PutResponse::Pending(_)));
    assert_eq!(store.borrow().contents("a/B.js"), None);

    let outcome = store.borrow_mut().complete_next().unwrap();
    assert_eq!(outcome.location, "a/B.js");
    assert_eq!(outcome.status, WriteStatus::Saved);
    assert_eq!(store.borrow().contents("a/B.js"), Some("text"));
}

#[test]
fn test_stale_precondition_conflicts() {
    let (mut accessor, store) = MemoryAccessor::fresh();
    store.borrow_mut().seed_file("a/B.js", "v1");
    let stale = accessor.head_revision("a/B.js").unwrap();

    // The file changes underneath the observed revision.
    store.borrow_mut().seed_file("a/B.js", "v2");

    accessor
        .put("a/B.js", "local", None, Some(&stale), WriteMode::Async)
        .unwrap();
    let outcome = store.borrow_mut().complete_next().unwrap();
    assert_eq!(outcome.status, WriteStatus::Conflict);
    // The conflicting content is not applied.
    assert_eq!(store.borrow().contents("a/B.js"), Some("v2"));
}

#[test]
fn test_completions_are_delivered_in_order() {
    let (mut accessor, store) = MemoryAccessor::fresh();
    accessor.put("x", "1", None, None, WriteMode::Async).unwrap();
    accessor.put("y", "2", None, None, WriteMode::Async).unwrap();
    assert_eq!(store.borrow_mut().complete_next().unwrap().location, "x");
    assert_eq!(store.borrow_mut().complete_next().unwrap().location, "y");
    assert!(store.borrow_mut().complete_next().is_none());
}

#[test]
fn test_listing_strips_the_location_prefix() {
    let (mut accessor, store) = MemoryAccessor::fresh();
    store.borrow_mut().seed_file("base/a/One.js", "");
    store.borrow_mut().seed_file("base/Two.js", "");
    store.borrow_mut().seed_file("elsewhere/Three.js", "");

    let listing = accessor.list("base").unwrap();
    assert_eq!(listing, vec!["a/One.js", "Two.js"]);
}

#[test]
fn test_absent_file_reads_as_none_with_zero_revision() {
    let (mut accessor, _store) = MemoryAccessor::fresh();
    assert_eq!(accessor.get("nope.js", true).unwrap(), None);
    assert_eq!(accessor.head_revision("nope.js").unwrap().as_str(), "r0");
}

#[test]
fn test_failed_listing_surfaces_as_transport_error() {
    let (mut accessor, store) = MemoryAccessor::fresh();
    store.borrow_mut().set_fail_listings(true);
    assert!(accessor.list("").is_err());
}
