//! Opaque revision tokens for optimistic-concurrency writes.

use std::fmt;

use smol_str::SmolStr;

/// An opaque version marker handed out by a resource accessor.
///
/// The database never interprets the token; it only stores the value
/// observed at load time and passes it back as a write precondition so the
/// transport can detect that the remote content changed in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionToken(SmolStr);

impl RevisionToken {
    #[inline]
    pub fn new(token: impl Into<SmolStr>) -> Self {
        Self(token.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
