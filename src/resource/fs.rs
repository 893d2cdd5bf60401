//! Filesystem-backed transport.
//!
//! Locations are paths relative to a root directory. Revisions are a hash
//! of the file content, so a token observed at load time stops matching
//! exactly when the content changes. Puts resolve inline in both write
//! modes; the filesystem has no deferred completion to model.

use std::fs;
use std::hash::Hasher;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHasher;

use crate::base::RevisionToken;

use super::{
    PutResponse, ResourceAccessor, TransportError, WriteMode, WriteStatus,
};

pub struct FsAccessor {
    root: PathBuf,
}

impl FsAccessor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        self.root.join(location)
    }

    fn current_revision(&self, location: &str) -> Result<RevisionToken, TransportError> {
        let content = match fs::read_to_string(self.resolve(location)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(read_error(location, e)),
        };
        Ok(content_revision(&content))
    }
}

/// Hash-based revision token; absent files hash like empty content.
fn content_revision(content: &str) -> RevisionToken {
    let mut hasher = FxHasher::default();
    hasher.write(content.as_bytes());
    RevisionToken::new(format!("h{:016x}", hasher.finish()))
}

fn read_error(location: &str, e: io::Error) -> TransportError {
    TransportError::new(format!("reading {location}: {e}"))
}

impl ResourceAccessor for FsAccessor {
    fn get(
        &mut self,
        location: &str,
        _force_uncached: bool,
    ) -> Result<Option<String>, TransportError> {
        match fs::read_to_string(self.resolve(location)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(read_error(location, e)),
        }
    }

    fn put(
        &mut self,
        location: &str,
        content: &str,
        _mime: Option<&str>,
        precondition: Option<&RevisionToken>,
        _mode: WriteMode,
    ) -> Result<PutResponse, TransportError> {
        if let Some(expected) = precondition {
            if self.current_revision(location)? != *expected {
                return Ok(PutResponse::Done(WriteStatus::Conflict));
            }
        }
        let path = self.resolve(location);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TransportError::new(format!("creating {}: {e}", parent.display())))?;
        }
        fs::write(&path, content)
            .map_err(|e| TransportError::new(format!("writing {location}: {e}")))?;
        Ok(PutResponse::Done(WriteStatus::Saved))
    }

    fn head_revision(&mut self, location: &str) -> Result<RevisionToken, TransportError> {
        self.current_revision(location)
    }

    fn delete(&mut self, location: &str) -> Result<(), TransportError> {
        match fs::remove_file(self.resolve(location)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TransportError::new(format!("deleting {location}: {e}"))),
        }
    }

    fn list(&mut self, location: &str) -> Result<Vec<String>, TransportError> {
        let base = self.resolve(location);
        let mut out = Vec::new();
        collect_files(&base, &base, &mut out)
            .map_err(|e| TransportError::new(format!("listing {location}: {e}")))?;
        out.sort();
        Ok(out)
    }
}

fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(base, &path, out)?;
        } else if path.is_file() {
            if let Ok(relative) = path.strip_prefix(base) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(name);
            }
        }
    }
    Ok(())
}
