//! Token types produced by the scanner

/// A classified, located span of source text.
///
/// Tokens borrow the buffer they were scanned from instead of copying it,
/// so the source must outlive every token produced from it. Error tokens
/// carry a static diagnostic message in the lexeme slot rather than a
/// source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token (or the diagnostic for `Error`)
    pub lexeme: &'src str,
    /// Line the token started on (1-indexed)
    pub line: u32,
}

impl<'src> Token<'src> {
    /// Create a new token
    pub fn new(kind: TokenKind, lexeme: &'src str, line: u32) -> Self {
        Self { kind, lexeme, line }
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single-character tokens
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `/`
    Slash,
    /// `*`
    Star,

    // One- or two-character tokens
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,

    // Literals
    /// Number literal (42, 3.14)
    Number,
    /// String literal ("hello")
    String,

    // Synthetic
    /// Malformed input; the lexeme is the diagnostic message
    Error,
    /// End of input
    Eof,
}
