//! Reference parser for the script dialect.
//!
//! A statement-level scanner over the logos token stream. It does not build
//! expression trees; it recognizes the shapes the database cares about:
//! comment runs, `module('...')` definitions (with recursively parsed
//! bodies), `X.subclass('Name', ...)` class definitions with their
//! `name: function` methods, named top-level functions, and plain
//! statements. Brackets are matched by depth counting, so malformed input
//! degrades to coarse fragments instead of failing.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::DatabaseId;
use crate::fragment::{FileFragment, FragmentKind};

use super::lexer::{Token, TokenKind, tokenize, unquote};
use super::{DialectParser, ParseContext};

pub struct ScriptParser;

impl DialectParser for ScriptParser {
    fn parse_source(&self, source: &str, ctx: &ParseContext<'_>) -> Vec<FileFragment> {
        let tokens = tokenize(source);
        let mut cursor = Cursor {
            tokens: &tokens,
            pos: 0,
            file_name: ctx.file_name,
            database: ctx.database,
        };
        cursor.statements()
    }
}

struct Cursor<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    file_name: &'a str,
    database: DatabaseId,
}

/// What a forward scan over one statement found.
struct StmtScan {
    /// Token index just past the statement.
    end_pos: usize,
    /// Byte offset past the last significant token.
    end_offset: TextSize,
    /// First `{` of the statement and its matching `}`.
    first_brace: Option<(usize, usize)>,
    /// `.subclass('Name', ...)` call: name, argument `(` and matching `)`.
    subclass: Option<(SmolStr, usize, usize)>,
}

impl<'a> Cursor<'a> {
    fn statements(&mut self) -> Vec<FileFragment> {
        let mut out = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(tok) = self.tokens.get(self.pos) else {
                break;
            };
            if tok.kind.is_comment() {
                out.push(self.comment_run());
                continue;
            }
            if matches!(
                tok.kind,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket
            ) {
                // Stray closer; skip it rather than looping.
                self.pos += 1;
                continue;
            }
            if let Some(fragment) = self.statement() {
                out.push(fragment);
            }
        }
        out
    }

    fn skip_whitespace(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.kind == TokenKind::Whitespace)
        {
            self.pos += 1;
        }
    }

    fn comment_run(&mut self) -> FileFragment {
        let start = self.tokens[self.pos].offset;
        let mut end = self.tokens[self.pos].end();
        loop {
            match self.tokens.get(self.pos) {
                Some(t) if t.kind == TokenKind::Whitespace => self.pos += 1,
                Some(t) if t.kind.is_comment() => {
                    end = t.end();
                    self.pos += 1;
                }
                _ => break,
            }
        }
        self.fragment(FragmentKind::Comment, None, start, end, Vec::new())
    }

    fn statement(&mut self) -> Option<FileFragment> {
        let start_pos = self.pos;
        let start = self.tokens[start_pos].offset;
        let scan = self.scan_statement();
        if scan.end_pos == start_pos {
            self.pos = start_pos + 1;
            return None;
        }
        self.pos = scan.end_pos;

        if let Some(name) = self.module_header(start_pos, scan.end_pos) {
            let children = match scan.first_brace {
                Some((open, close)) => self.sub_statements(open + 1, close),
                None => Vec::new(),
            };
            return Some(self.fragment(
                FragmentKind::ModuleDef,
                Some(name),
                start,
                scan.end_offset,
                children,
            ));
        }

        if let Some(name) = self.function_header(start_pos, scan.end_pos) {
            // A declaration ends at its body's closing brace, not at the
            // next semicolon.
            if let Some((_, close)) = scan.first_brace {
                let end = self.tokens[close].end();
                self.pos = close + 1;
                return Some(self.fragment(FragmentKind::Function, Some(name), start, end, Vec::new()));
            }
            return Some(self.fragment(
                FragmentKind::Function,
                Some(name),
                start,
                scan.end_offset,
                Vec::new(),
            ));
        }

        if let Some((name, args_open, args_close)) = scan.subclass {
            let children = self.methods_in(args_open + 1, args_close);
            return Some(self.fragment(
                FragmentKind::Class,
                Some(name),
                start,
                scan.end_offset,
                children,
            ));
        }

        Some(self.fragment(
            FragmentKind::Statement,
            None,
            start,
            scan.end_offset,
            Vec::new(),
        ))
    }

    /// Scan one statement starting at `self.pos` without consuming it.
    ///
    /// Ends at a `;` at bracket depth zero, at a top-level comment, at an
    /// unbalanced closer, or at the end of input.
    fn scan_statement(&self) -> StmtScan {
        let mut depth = 0u32;
        let mut i = self.pos;
        let mut end_offset = self.tokens[self.pos].end();
        let mut first_brace_open: Option<usize> = None;
        let mut first_brace_close: Option<usize> = None;
        let mut brace_base = 0u32;
        let mut subclass_name: Option<SmolStr> = None;
        let mut subclass_open: Option<usize> = None;
        let mut subclass_close: Option<usize> = None;
        let mut subclass_base = 0u32;
        let mut subclass_pending = false;

        while i < self.tokens.len() {
            let tok = &self.tokens[i];
            match tok.kind {
                TokenKind::LBrace => {
                    if first_brace_open.is_none() {
                        first_brace_open = Some(i);
                        brace_base = depth;
                    }
                    depth += 1;
                }
                TokenKind::LParen | TokenKind::LBracket => {
                    if tok.kind == TokenKind::LParen && subclass_pending {
                        subclass_open = Some(i);
                        subclass_base = depth;
                        subclass_pending = false;
                    }
                    depth += 1;
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    if tok.kind == TokenKind::RBrace
                        && first_brace_close.is_none()
                        && first_brace_open.is_some()
                        && depth == brace_base
                    {
                        first_brace_close = Some(i);
                    }
                    if tok.kind == TokenKind::RParen
                        && subclass_close.is_none()
                        && subclass_open.is_some()
                        && depth == subclass_base
                    {
                        subclass_close = Some(i);
                    }
                }
                TokenKind::Semi if depth == 0 => {
                    end_offset = tok.end();
                    i += 1;
                    break;
                }
                TokenKind::Ident if tok.text == "subclass" && subclass_name.is_none() => {
                    if self.is_subclass_call(i) {
                        subclass_name = self.subclass_name_after(i);
                        subclass_pending = subclass_name.is_some();
                    }
                }
                k if k.is_comment() && depth == 0 => break,
                _ => {}
            }
            if !tok.kind.is_trivia() {
                end_offset = tok.end();
            }
            i += 1;
        }

        StmtScan {
            end_pos: i,
            end_offset,
            first_brace: first_brace_open.zip(first_brace_close),
            subclass: match (subclass_name, subclass_open, subclass_close) {
                (Some(name), Some(open), Some(close)) => Some((name, open, close)),
                _ => None,
            },
        }
    }

    /// `<recv>.subclass(` — previous significant token must be a dot.
    fn is_subclass_call(&self, idx: usize) -> bool {
        self.tokens[..idx]
            .iter()
            .rev()
            .find(|t| !t.kind.is_trivia())
            .is_some_and(|t| t.kind == TokenKind::Dot)
    }

    /// The string argument right after `subclass(`.
    fn subclass_name_after(&self, idx: usize) -> Option<SmolStr> {
        let mut sig = self.tokens[idx + 1..]
            .iter()
            .filter(|t| !t.kind.is_trivia());
        if sig.next()?.kind != TokenKind::LParen {
            return None;
        }
        let name = sig.next()?;
        name.kind
            .is_string()
            .then(|| SmolStr::new(unquote(name.text)))
    }

    fn module_header(&self, start: usize, end: usize) -> Option<SmolStr> {
        let mut sig = self.tokens[start..end].iter().filter(|t| !t.kind.is_trivia());
        let first = sig.next()?;
        if first.kind != TokenKind::Ident || first.text != "module" {
            return None;
        }
        if sig.next()?.kind != TokenKind::LParen {
            return None;
        }
        let name = sig.next()?;
        name.kind
            .is_string()
            .then(|| SmolStr::new(unquote(name.text)))
    }

    fn function_header(&self, start: usize, end: usize) -> Option<SmolStr> {
        let mut sig = self.tokens[start..end].iter().filter(|t| !t.kind.is_trivia());
        let first = sig.next()?;
        if first.kind != TokenKind::Ident || first.text != "function" {
            return None;
        }
        let name = sig.next()?;
        (name.kind == TokenKind::Ident).then(|| SmolStr::new(name.text))
    }

    fn sub_statements(&self, from: usize, to: usize) -> Vec<FileFragment> {
        let mut sub = Cursor {
            tokens: &self.tokens[from..to],
            pos: 0,
            file_name: self.file_name,
            database: self.database,
        };
        sub.statements()
    }

    /// Method fragments inside the argument list of a `subclass(...)` call.
    ///
    /// A method is a `key: function ... { ... }` entry at depth one inside
    /// one of the argument object literals.
    fn methods_in(&self, from: usize, to: usize) -> Vec<FileFragment> {
        let mut out = Vec::new();
        let mut paren_depth = 0u32;
        let mut brace_depth = 0u32;
        let mut i = from;
        while i < to {
            let tok = &self.tokens[i];
            match tok.kind {
                TokenKind::LParen | TokenKind::LBracket => paren_depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    paren_depth = paren_depth.saturating_sub(1)
                }
                TokenKind::LBrace => brace_depth += 1,
                TokenKind::RBrace => brace_depth = brace_depth.saturating_sub(1),
                k if (k == TokenKind::Ident || k.is_string())
                    && paren_depth == 0
                    && brace_depth == 1 =>
                {
                    if let Some((name, close_idx, end_offset)) = self.method_at(i, to) {
                        out.push(self.fragment(
                            FragmentKind::Method,
                            Some(name),
                            tok.offset,
                            end_offset,
                            Vec::new(),
                        ));
                        // The body's brackets are balanced, so depth is
                        // unchanged by skipping past them.
                        i = close_idx + 1;
                        continue;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        out
    }

    /// `key : function ... { body }` starting at `key_idx`; returns the
    /// method name, the body's closing-brace index, and the end offset.
    fn method_at(&self, key_idx: usize, to: usize) -> Option<(SmolStr, usize, TextSize)> {
        let key = &self.tokens[key_idx];
        let mut sig = self.tokens[key_idx + 1..to]
            .iter()
            .filter(|t| !t.kind.is_trivia());
        if sig.next()?.kind != TokenKind::Colon {
            return None;
        }
        let value = sig.next()?;
        if value.kind != TokenKind::Ident || value.text != "function" {
            return None;
        }
        let open = (key_idx + 1..to).find(|&ix| self.tokens[ix].kind == TokenKind::LBrace)?;
        let mut depth = 0u32;
        for ix in open..to {
            match self.tokens[ix].kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let name = if key.kind.is_string() {
                            SmolStr::new(unquote(key.text))
                        } else {
                            SmolStr::new(key.text)
                        };
                        return Some((name, ix, self.tokens[ix].end()));
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn fragment(
        &self,
        kind: FragmentKind,
        name: Option<SmolStr>,
        start: TextSize,
        end: TextSize,
        children: Vec<FileFragment>,
    ) -> FileFragment {
        FileFragment::new(
            kind,
            name,
            TextRange::new(start, end),
            self.file_name,
            children,
            self.database,
        )
    }
}
