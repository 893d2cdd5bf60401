//! The explicit context threaded through database operations.
//!
//! Collects every collaborator a wrapper or the registry needs: the
//! transport, the user-prompt surface, the parser set, the code base
//! location, and the legacy module-path allow-list. Constructed once by the
//! host application and owned by the [`SourceDatabase`]; nothing here is a
//! process-wide singleton.
//!
//! [`SourceDatabase`]: crate::database::SourceDatabase

use crate::parser::ParserSet;
use crate::resource::ResourceAccessor;

/// Legacy path prefixes accepted by file-name normalization.
pub const DEFAULT_MODULE_PATHS: [&str; 2] = ["users/", "projects/"];

/// Interactive user surface.
///
/// `confirm` is fire-and-forget: it presents the question and returns; the
/// host delivers the answer later through
/// [`SourceDatabase::resolve_overwrite`].
///
/// [`SourceDatabase::resolve_overwrite`]: crate::database::SourceDatabase::resolve_overwrite
pub trait UserPrompt {
    fn confirm(&mut self, message: &str);
    fn alert(&mut self, message: &str);
    fn notify(&mut self, message: &str);
}

/// Prompt that only logs. Useful for headless hosts and tools that never
/// expect conflicts.
pub struct NullPrompt;

impl UserPrompt for NullPrompt {
    fn confirm(&mut self, message: &str) {
        tracing::info!(message, "confirmation requested");
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!(message, "alert");
    }

    fn notify(&mut self, message: &str) {
        tracing::info!(message, "notify");
    }
}

/// Collaborators and configuration for one source database.
pub struct SourceContext {
    pub accessor: Box<dyn ResourceAccessor>,
    pub prompt: Box<dyn UserPrompt>,
    pub parsers: ParserSet,
    /// Base location all backing files resolve against.
    pub code_base: String,
    /// Allow-list for `../<prefix>/...` legacy file names.
    pub module_paths: Vec<String>,
}

impl SourceContext {
    pub fn new(
        accessor: Box<dyn ResourceAccessor>,
        prompt: Box<dyn UserPrompt>,
        parsers: ParserSet,
        code_base: impl Into<String>,
    ) -> Self {
        Self {
            accessor,
            prompt,
            parsers,
            code_base: code_base.into(),
            module_paths: DEFAULT_MODULE_PATHS.map(String::from).to_vec(),
        }
    }

    /// Join the code base with a relative file name.
    pub fn resolve(&self, file_name: &str) -> String {
        if self.code_base.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.code_base.trim_end_matches('/'), file_name)
        }
    }
}
