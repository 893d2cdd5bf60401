//! Source dialects understood by the database.

use std::fmt;

/// A source dialect. Closed set: every module wrapper carries exactly one.
///
/// The dialect determines the file extension of the backing file and which
/// parser turns the raw text into a fragment tree. [`Dialect::LegacyScript`]
/// has no parser registered by default; parsing such a module is a
/// configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Structured script sources (`.js`).
    Script,
    /// Grammar definitions (`.ometa`).
    Grammar,
    /// Serialized change lists (`.lkml`).
    ChangeList,
    /// Legacy script sources (`.st`).
    LegacyScript,
}

impl Dialect {
    /// All dialects, in discovery-filter order.
    pub const ALL: [Dialect; 4] = [
        Dialect::Script,
        Dialect::Grammar,
        Dialect::ChangeList,
        Dialect::LegacyScript,
    ];

    /// The file extension for this dialect, without the leading dot.
    #[inline]
    pub const fn extension(self) -> &'static str {
        match self {
            Dialect::Script => "js",
            Dialect::Grammar => "ometa",
            Dialect::ChangeList => "lkml",
            Dialect::LegacyScript => "st",
        }
    }

    /// Look up a dialect by file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" => Some(Dialect::Script),
            "ometa" => Some(Dialect::Grammar),
            "lkml" => Some(Dialect::ChangeList),
            "st" => Some(Dialect::LegacyScript),
            _ => None,
        }
    }

    /// Infer the dialect from a file name's extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
