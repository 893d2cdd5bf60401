//! Logos-based lexer for the script dialect.
//!
//! Fast tokenization using the logos crate.

use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl<'a> Token<'a> {
    /// Byte offset just past this token.
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = result.unwrap_or(TokenKind::Other);
        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Token kinds for the script dialect.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"'([^'\\]|\\.)*'")]
    SingleString,

    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleString,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    #[regex(r"[=+\-*/<>!&|?~^%@]+")]
    Op,

    // Anything not covered above, one character at a time.
    #[regex(r".", priority = 0)]
    Other,
}

impl TokenKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    #[inline]
    pub fn is_string(self) -> bool {
        matches!(self, TokenKind::SingleString | TokenKind::DoubleString)
    }
}

/// Strip the quotes from a string token's text.
pub fn unquote(text: &str) -> &str {
    let trimmed = text
        .strip_prefix(['\'', '"'])
        .unwrap_or(text);
    trimmed.strip_suffix(['\'', '"']).unwrap_or(trimmed)
}
