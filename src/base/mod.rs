//! Foundation types for the source database.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Dialect`] - the closed set of source dialects
//! - [`ModuleName`] - dotted logical module names and file-name derivation
//! - [`RevisionToken`] - opaque version markers for optimistic-concurrency writes
//! - [`DatabaseId`] - lightweight handle identifying an owning database
//!
//! This module has NO dependencies on other sourcedb modules.

mod dialect;
mod id;
mod module_name;
mod revision;

pub use dialect::Dialect;
pub use id::DatabaseId;
pub use module_name::ModuleName;
pub use revision::RevisionToken;

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
