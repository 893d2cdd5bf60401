//! Reference parser for the change-list dialect.
//!
//! Change lists are serialized as a flat XML-ish document: one root element
//! whose direct children each describe one recorded change. The parser
//! scans tags by depth counting and emits one [`FragmentKind::Change`]
//! fragment per direct child, named by its `name="..."` attribute when
//! present and by its tag otherwise.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::fragment::{FileFragment, FragmentKind};

use super::{DialectParser, ParseContext};

pub struct ChangeListParser;

impl DialectParser for ChangeListParser {
    fn parse_source(&self, source: &str, ctx: &ParseContext<'_>) -> Vec<FileFragment> {
        let mut out = Vec::new();
        let Some(root) = Tag::scan(source, 0) else {
            return out;
        };
        let mut pos = root.content_start;
        let scan_end = if root.self_closing {
            // Degenerate document; nothing inside the root.
            return out;
        } else {
            source.len()
        };

        while pos < scan_end {
            let Some(tag) = Tag::scan(source, pos) else {
                break;
            };
            if tag.closing {
                // The root's own close tag ends the scan.
                break;
            }
            let end = if tag.self_closing {
                tag.open_end
            } else {
                element_end(source, &tag)
            };
            out.push(FileFragment::new(
                FragmentKind::Change,
                tag.display_name(),
                TextRange::new(
                    TextSize::new(tag.start as u32),
                    TextSize::new(end as u32),
                ),
                ctx.file_name,
                Vec::new(),
                ctx.database,
            ));
            pos = end;
        }
        out
    }
}

/// One scanned open/close tag.
struct Tag<'a> {
    /// Offset of the `<`.
    start: usize,
    /// Offset just past the `>`.
    open_end: usize,
    /// Offset just past the `>`, i.e. where content starts.
    content_start: usize,
    name: &'a str,
    /// Raw attribute text between the name and the `>`.
    attrs: &'a str,
    closing: bool,
    self_closing: bool,
}

impl<'a> Tag<'a> {
    /// Scan for the next tag at or after `from`.
    fn scan(source: &'a str, from: usize) -> Option<Self> {
        let mut from = from;
        loop {
            let rel = source[from..].find('<')?;
            let start = from + rel;
            let after = &source[start + 1..];
            let closing = after.starts_with('/');
            let name_from = start + 1 + usize::from(closing);
            let rest = &source[name_from..];
            let name_len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(rest.len());
            let name = &rest[..name_len];
            if name.is_empty() {
                // Not a tag (e.g. `<` in text); resume after it.
                from = start + 1;
                continue;
            }
            return Self::finish(source, start, name_from, name_len, closing);
        }
    }

    fn finish(
        source: &'a str,
        start: usize,
        name_from: usize,
        name_len: usize,
        closing: bool,
    ) -> Option<Self> {
        let name = &source[name_from..name_from + name_len];
        let gt_rel = source[name_from + name_len..].find('>')?;
        let open_end = name_from + name_len + gt_rel + 1;
        let attrs = &source[name_from + name_len..open_end - 1];
        let self_closing = attrs.trim_end().ends_with('/');
        Some(Self {
            start,
            open_end,
            content_start: open_end,
            name,
            attrs,
            closing,
            self_closing,
        })
    }

    /// The `name="..."` attribute when present, the tag name otherwise.
    fn display_name(&self) -> Option<SmolStr> {
        if let Some(idx) = self.attrs.find("name=\"") {
            let value = &self.attrs[idx + 6..];
            if let Some(end) = value.find('"') {
                return Some(SmolStr::new(&value[..end]));
            }
        }
        Some(SmolStr::new(self.name))
    }
}

/// Offset just past the close tag matching `tag`, depth-counting nested
/// elements of the same name. Falls back to the end of input.
fn element_end(source: &str, tag: &Tag<'_>) -> usize {
    let mut depth = 1u32;
    let mut pos = tag.content_start;
    while let Some(next) = Tag::scan(source, pos) {
        if next.name == tag.name {
            if next.closing {
                depth -= 1;
                if depth == 0 {
                    return next.open_end;
                }
            } else if !next.self_closing {
                depth += 1;
            }
        }
        pos = next.open_end;
    }
    source.len()
}
