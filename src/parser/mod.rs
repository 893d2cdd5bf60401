//! Dialect parsers: raw text in, fragment trees out.
//!
//! Each [`Dialect`] has at most one [`DialectParser`]. The set of parsers is
//! fixed in a [`ParserSet`] and the parser for a wrapper is selected once at
//! wrapper construction, never re-dispatched by string tag.
//!
//! The parsers shipped here are reference implementations of the pipeline
//! contract: they produce ordered, non-overlapping top-level fragments whose
//! ranges contain all their children. Hosts with a richer grammar can
//! register their own implementations.

pub mod changes;
pub mod grammar;
pub mod lexer;
pub mod script;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::base::{DatabaseId, Dialect};
use crate::fragment::FileFragment;

/// Per-parse inputs handed to a dialect parser.
pub struct ParseContext<'a> {
    /// The file name fragments are attributed to.
    pub file_name: &'a str,
    /// The database stamped into every constructed fragment.
    pub database: DatabaseId,
}

/// Converts raw source text into an ordered sequence of top-level fragments.
///
/// The root policy (synthetic whole-file fragment, module-definition
/// promotion) is applied by the module wrapper, not here.
pub trait DialectParser: Send + Sync {
    fn parse_source(&self, source: &str, ctx: &ParseContext<'_>) -> Vec<FileFragment>;
}

/// One parser per dialect.
///
/// `Dialect::LegacyScript` stays unregistered by default; parsing a legacy
/// module without registering a parser is a configuration error surfaced by
/// the wrapper.
pub struct ParserSet {
    parsers: FxHashMap<Dialect, Arc<dyn DialectParser>>,
}

impl ParserSet {
    /// An empty set. Every parse fails until parsers are registered.
    pub fn empty() -> Self {
        Self {
            parsers: FxHashMap::default(),
        }
    }

    /// The reference parsers for script, grammar, and change-list sources.
    pub fn with_defaults() -> Self {
        let mut set = Self::empty();
        set.register(Dialect::Script, Arc::new(script::ScriptParser));
        set.register(Dialect::Grammar, Arc::new(grammar::GrammarParser));
        set.register(Dialect::ChangeList, Arc::new(changes::ChangeListParser));
        set
    }

    /// Register (or replace) the parser for a dialect.
    pub fn register(&mut self, dialect: Dialect, parser: Arc<dyn DialectParser>) {
        self.parsers.insert(dialect, parser);
    }

    /// The parser for a dialect, if one is registered.
    pub fn get(&self, dialect: Dialect) -> Option<Arc<dyn DialectParser>> {
        self.parsers.get(&dialect).cloned()
    }
}

impl Default for ParserSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}
