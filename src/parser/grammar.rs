//! Reference parser for the grammar-definition dialect.
//!
//! Line-oriented: an `ometa Name {` header opens a grammar block whose
//! `rule = ...` lines become [`FragmentKind::GrammarRule`] children; the
//! block ends where the braces balance out. Comment runs and stray rules at
//! top level are kept as fragments of their own.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::fragment::{FileFragment, FragmentKind};

use super::{DialectParser, ParseContext};

pub struct GrammarParser;

impl DialectParser for GrammarParser {
    fn parse_source(&self, source: &str, ctx: &ParseContext<'_>) -> Vec<FileFragment> {
        let lines = line_spans(source);
        let mut out = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let (start, text) = lines[i];
            let trimmed = text.trim_start();
            if trimmed.is_empty() {
                i += 1;
                continue;
            }
            if trimmed.starts_with("//") {
                let (fragment, next) = comment_run(&lines, i, ctx);
                out.push(fragment);
                i = next;
                continue;
            }
            if let Some(name) = grammar_header(trimmed) {
                let (fragment, next) = grammar_block(source, &lines, i, name, ctx);
                out.push(fragment);
                i = next;
                continue;
            }
            // Anything else is a single-line fragment: a stray rule or a
            // plain statement.
            let end = start + TextSize::of(text.trim_end());
            let kind = if rule_name(text).is_some() {
                FragmentKind::GrammarRule
            } else {
                FragmentKind::Statement
            };
            let name = rule_name(text).map(SmolStr::new);
            out.push(FileFragment::new(
                kind,
                name,
                TextRange::new(start, end),
                ctx.file_name,
                Vec::new(),
                ctx.database,
            ));
            i += 1;
        }
        out
    }
}

/// Byte offset and text of every line, including its trailing newline.
fn line_spans(source: &str) -> Vec<(TextSize, &str)> {
    let mut out = Vec::new();
    let mut offset = 0u32;
    for line in source.split_inclusive('\n') {
        out.push((TextSize::new(offset), line));
        offset += line.len() as u32;
    }
    out
}

fn comment_run<'a>(
    lines: &[(TextSize, &str)],
    from: usize,
    ctx: &ParseContext<'a>,
) -> (FileFragment, usize) {
    let start = lines[from].0;
    let mut i = from;
    let mut end = start;
    while i < lines.len() && lines[i].1.trim_start().starts_with("//") {
        end = lines[i].0 + TextSize::of(lines[i].1.trim_end());
        i += 1;
    }
    (
        FileFragment::new(
            FragmentKind::Comment,
            None,
            TextRange::new(start, end),
            ctx.file_name,
            Vec::new(),
            ctx.database,
        ),
        i,
    )
}

/// `ometa Name {` or `ometa Name <: Parent {` — returns the grammar name.
fn grammar_header(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix("ometa")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let name_len = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    Some(&rest[..name_len])
}

/// A `rule = ...` line; returns the rule name.
fn rule_name(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let first = trimmed.chars().next()?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }
    let name_len = trimmed
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    let after = trimmed[name_len..].trim_start();
    // Parameters may sit between the name and the `=`.
    let mut rest = after;
    while let Some(c) = rest.chars().next() {
        if c == '=' {
            return Some(&trimmed[..name_len]);
        }
        if c.is_alphanumeric() || c == '_' || c == ':' || c == ',' || c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
        } else {
            return None;
        }
    }
    None
}

/// Parse one grammar block: header line through the balancing `}`.
fn grammar_block<'a>(
    source: &str,
    lines: &[(TextSize, &str)],
    from: usize,
    name: &str,
    ctx: &ParseContext<'a>,
) -> (FileFragment, usize) {
    let start = lines[from].0;
    let close = block_close(source, usize::from(start));
    let end = TextSize::new(close as u32);

    // Rule lines strictly inside the block.
    let mut rule_starts: Vec<(TextSize, SmolStr)> = Vec::new();
    let mut i = from + 1;
    let mut next_line = from + 1;
    while i < lines.len() && usize::from(lines[i].0) < close {
        if let Some(rule) = rule_name(lines[i].1) {
            rule_starts.push((lines[i].0, SmolStr::new(rule)));
        }
        next_line = i + 1;
        i += 1;
    }

    // Offset of the closing brace itself; rules never extend past it.
    let close_start = TextSize::new(close.saturating_sub(1) as u32);
    let mut children = Vec::new();
    for (idx, (rule_start, rule)) in rule_starts.iter().enumerate() {
        let rule_end = rule_starts
            .get(idx + 1)
            .map(|(next_start, _)| *next_start)
            .unwrap_or(close_start)
            .min(close_start);
        children.push(FileFragment::new(
            FragmentKind::GrammarRule,
            Some(rule.clone()),
            TextRange::new(*rule_start, rule_end),
            ctx.file_name,
            Vec::new(),
            ctx.database,
        ));
    }

    (
        FileFragment::new(
            FragmentKind::Grammar,
            Some(SmolStr::new(name)),
            TextRange::new(start, end),
            ctx.file_name,
            children,
            ctx.database,
        ),
        next_line,
    )
}

/// Byte offset just past the `}` balancing the first `{` at or after `from`.
/// Falls back to the end of input for unbalanced blocks.
fn block_close(source: &str, from: usize) -> usize {
    let mut depth = 0i32;
    let mut seen_open = false;
    for (idx, c) in source[from..].char_indices() {
        match c {
            '{' => {
                depth += 1;
                seen_open = true;
            }
            '}' => {
                depth -= 1;
                if seen_open && depth == 0 {
                    return from + idx + 1;
                }
            }
            _ => {}
        }
    }
    source.len()
}
