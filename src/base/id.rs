//! Identifiers for source databases.

use std::fmt;

use uuid::Uuid;

/// A lightweight handle identifying one [`SourceDatabase`] instance.
///
/// Fragments carry this id as a non-owning back-reference to the database
/// that parsed them. It is fixed at fragment construction time, so a tree
/// can never be half-stamped.
///
/// [`SourceDatabase`]: crate::database::SourceDatabase
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseId(Uuid);

impl DatabaseId {
    /// Mint a fresh, unique database id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatabaseId({})", self.0)
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "db#{}", self.0.simple())
    }
}
