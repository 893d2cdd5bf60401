//! Fragment trees: syntactic subranges of a source file.
//!
//! A [`FileFragment`] is the unit of navigation, search, and incremental
//! editing. Every fragment covers a byte range `[start, end)` of its file's
//! source text, owns its child fragments, and carries a non-owning
//! [`DatabaseId`] back-reference to the database that parsed it.
//!
//! Invariants maintained by the parsers:
//! - sibling ranges are non-overlapping and ordered by start offset
//! - a parent's range contains every descendant range

use std::fmt;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::DatabaseId;

/// The kind of syntactic unit a fragment represents. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Synthetic root spanning the whole file.
    CompleteFile,
    /// A `module('...')` definition spanning its body.
    ModuleDef,
    /// A run of line or block comments.
    Comment,
    /// A class definition.
    Class,
    /// A method inside a class definition.
    Method,
    /// A named top-level function.
    Function,
    /// Any other top-level statement.
    Statement,
    /// A grammar definition block.
    Grammar,
    /// A single rule inside a grammar definition.
    GrammarRule,
    /// One entry of a serialized change list.
    Change,
}

impl FragmentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            FragmentKind::CompleteFile => "completeFile",
            FragmentKind::ModuleDef => "moduleDef",
            FragmentKind::Comment => "comment",
            FragmentKind::Class => "class",
            FragmentKind::Method => "method",
            FragmentKind::Function => "function",
            FragmentKind::Statement => "statement",
            FragmentKind::Grammar => "grammar",
            FragmentKind::GrammarRule => "grammarRule",
            FragmentKind::Change => "change",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntactic subrange of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFragment {
    kind: FragmentKind,
    name: Option<SmolStr>,
    range: TextRange,
    file_name: SmolStr,
    children: Vec<FileFragment>,
    source_control: DatabaseId,
}

impl FileFragment {
    pub fn new(
        kind: FragmentKind,
        name: Option<SmolStr>,
        range: TextRange,
        file_name: impl Into<SmolStr>,
        children: Vec<FileFragment>,
        source_control: DatabaseId,
    ) -> Self {
        Self {
            kind,
            name,
            range,
            file_name: file_name.into(),
            children,
            source_control,
        }
    }

    #[inline]
    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[inline]
    pub fn file_name(&self) -> &SmolStr {
        &self.file_name
    }

    #[inline]
    pub fn children(&self) -> &[FileFragment] {
        &self.children
    }

    /// The database that parsed this fragment.
    #[inline]
    pub fn source_control(&self) -> DatabaseId {
        self.source_control
    }

    /// Pre-order traversal over this fragment and all descendants.
    /// Finite and restartable: each call returns a fresh iterator.
    pub fn flattened(&self) -> Flattened<'_> {
        Flattened { stack: vec![self] }
    }

    /// The slice of `file_source` covered by this fragment, clamped to the
    /// text length.
    pub fn source_in<'a>(&self, file_source: &'a str) -> &'a str {
        let len = file_source.len();
        let start = usize::from(self.range.start()).min(len);
        let end = usize::from(self.range.end()).min(len);
        file_source.get(start..end).unwrap_or("")
    }

    /// This fragment's own text with all child ranges removed.
    ///
    /// This is what search matches against, so a query hitting only a
    /// nested method body does not also report every ancestor.
    pub fn own_source(&self, file_source: &str) -> String {
        if self.children.is_empty() {
            return self.source_in(file_source).to_string();
        }
        let len = TextSize::of(file_source);
        let start = self.range.start().min(len);
        let end = self.range.end().min(len);
        let mut out = String::new();
        let mut cursor = start;
        for child in &self.children {
            let child_start = child.range.start().clamp(cursor, end);
            out.push_str(slice(file_source, cursor, child_start));
            cursor = child.range.end().clamp(child_start, end);
        }
        out.push_str(slice(file_source, cursor, end));
        out
    }
}

fn slice(text: &str, start: TextSize, end: TextSize) -> &str {
    text.get(usize::from(start)..usize::from(end)).unwrap_or("")
}

/// Pre-order iterator over a fragment tree.
pub struct Flattened<'a> {
    stack: Vec<&'a FileFragment>,
}

impl<'a> Iterator for Flattened<'a> {
    type Item = &'a FileFragment;

    fn next(&mut self) -> Option<Self::Item> {
        let fragment = self.stack.pop()?;
        self.stack.extend(fragment.children.iter().rev());
        Some(fragment)
    }
}
