//! # sourcedb-base
//!
//! Core library for a browser-style source database: typed module
//! wrappers, lightweight dialect parsers, and an asynchronous write
//! protocol over pluggable resource transports.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Editor views (program snapshots, symbol lists)
//!   ↓
//! database  → SourceDatabase, ModuleWrapper, write state machine
//!   ↓
//! resource  → ResourceAccessor transports (memory, filesystem)
//!   ↓
//! parser    → Logos lexer, per-dialect fragment parsers
//!   ↓
//! fragment  → FileFragment trees over source ranges
//!   ↓
//! base      → Primitives (Dialect, ModuleName, RevisionToken, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → fragment → parser → resource → database → ide)
// ============================================================================

/// Foundation types: Dialect, ModuleName, DatabaseId, RevisionToken
pub mod base;

/// Fragments: FileFragment trees, pre-order traversal, own-text slicing
pub mod fragment;

/// Parsers: Logos lexer plus script, grammar, and change-list parsers
pub mod parser;

/// Resource transports: accessor trait, in-memory store, filesystem store
pub mod resource;

/// The database: wrapper registry, file set, writes, search, notifications
pub mod database;

/// Editor views: program snapshots and completion symbol lists
pub mod ide;

// Re-export foundation types
pub use base::{DatabaseId, Dialect, ModuleName, RevisionToken, TextRange, TextSize};

// Re-export the main entry points
pub use database::{
    Browser, ChangeSetProvider, ModuleWrapper, NullPrompt, Result, SourceContext, SourceDatabase,
    SourceError, UserPrompt,
};
pub use fragment::{FileFragment, FragmentKind};
pub use parser::{DialectParser, ParseContext, ParserSet};
pub use resource::{
    PutResponse, ResourceAccessor, TransportError, WriteMode, WriteOutcome, WriteStatus,
    WriteTicket,
};
