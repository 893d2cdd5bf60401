//! Dotted logical module names.

use std::fmt;

use smol_str::SmolStr;

use super::Dialect;

/// A dotted logical module name, e.g. `lively.ide.SourceDatabase`.
///
/// Immutable once constructed. The backing file path is derived
/// deterministically: dots become path separators and the dialect's
/// extension is appended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleName(SmolStr);

impl ModuleName {
    /// Create a module name. No validation happens here; emptiness is
    /// rejected when a wrapper is constructed.
    #[inline]
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// The dotted name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The backing file name for this module under `dialect`:
    /// dots replaced by `/`, suffixed with `.<extension>`.
    pub fn file_name(&self, dialect: Dialect) -> String {
        format!("{}.{}", self.0.replace('.', "/"), dialect.extension())
    }

    /// Reverse derivation: parse a relative file name back into a module
    /// name and dialect. Leading `../` segments are stripped. Returns
    /// `None` when the extension is not one of the known dialects.
    pub fn from_file_name(file_name: &str) -> Option<(Self, Dialect)> {
        let mut path = file_name;
        while let Some(rest) = path.strip_prefix("../") {
            path = rest;
        }
        let (stem, ext) = path.rsplit_once('.')?;
        let dialect = Dialect::from_extension(ext)?;
        Some((Self::new(stem.replace('/', ".")), dialect))
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
