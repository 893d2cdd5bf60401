//! Filesystem transport tests.

use sourcedb::resource::fs::FsAccessor;
use sourcedb::resource::{PutResponse, ResourceAccessor, WriteMode, WriteStatus};

#[test]
fn test_put_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let mut accessor = FsAccessor::new(dir.path());

    let response = accessor
        .put("deep/nested/Mod.js", "content", None, None, WriteMode::Async)
        .unwrap();
    assert!(matches!(response, PutResponse::Done(WriteStatus::Saved)));
    assert_eq!(
        accessor.get("deep/nested/Mod.js", true).unwrap().as_deref(),
        Some("content")
    );
}

#[test]
fn test_revision_tracks_content() {
    let dir = tempfile::tempdir().unwrap();
    let mut accessor = FsAccessor::new(dir.path());

    let empty = accessor.head_revision("Mod.js").unwrap();
    accessor
        .put("Mod.js", "v1", None, None, WriteMode::Sync)
        .unwrap();
    let v1 = accessor.head_revision("Mod.js").unwrap();
    assert_ne!(empty, v1);

    // Unchanged content keeps the same token.
    assert_eq!(accessor.head_revision("Mod.js").unwrap(), v1);
}

#[test]
fn test_stale_precondition_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let mut accessor = FsAccessor::new(dir.path());

    accessor.put("Mod.js", "v1", None, None, WriteMode::Sync).unwrap();
    let observed = accessor.head_revision("Mod.js").unwrap();
    accessor.put("Mod.js", "v2", None, None, WriteMode::Sync).unwrap();

    let response = accessor
        .put("Mod.js", "local", None, Some(&observed), WriteMode::Sync)
        .unwrap();
    assert!(matches!(response, PutResponse::Done(WriteStatus::Conflict)));
    assert_eq!(accessor.get("Mod.js", true).unwrap().as_deref(), Some("v2"));
}

#[test]
fn test_delete_tolerates_absent_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut accessor = FsAccessor::new(dir.path());

    accessor.put("Mod.js", "x", None, None, WriteMode::Sync).unwrap();
    accessor.delete("Mod.js").unwrap();
    accessor.delete("Mod.js").unwrap();
    assert_eq!(accessor.get("Mod.js", true).unwrap(), None);
}

#[test]
fn test_listing_is_recursive_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let mut accessor = FsAccessor::new(dir.path());

    accessor.put("b/Two.js", "", None, None, WriteMode::Sync).unwrap();
    accessor.put("a/One.js", "", None, None, WriteMode::Sync).unwrap();
    accessor.put("Top.js", "", None, None, WriteMode::Sync).unwrap();

    let listing = accessor.list("").unwrap();
    assert_eq!(listing, vec!["Top.js", "a/One.js", "b/Two.js"]);
}
