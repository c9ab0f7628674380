//! Lexical analysis (tokenization)
//!
//! The scanner converts source text into a pull-based stream of tokens
//! that borrow the source buffer. One scanner instance is bound to one
//! buffer; tokens come out in source order and the sequence is not
//! restartable — a new scan needs a new scanner.

use crate::token::{Token, TokenKind};

/// Scanner state for tokenizing source code
///
/// `start` and `current` are byte offsets into the source. The grammar is
/// ASCII, so cursors move one byte at a time; multi-byte characters only
/// ever appear inside string literals or as unexpected input.
pub struct Scanner<'src> {
    /// Source text (borrowed, never copied)
    source: &'src str,
    /// Start offset of the token being scanned
    start: usize,
    /// Current scan offset
    current: usize,
    /// Current line number (1-indexed)
    line: u32,
    /// Line the current token started on
    start_line: u32,
}

impl<'src> Scanner<'src> {
    /// Bind a scanner to a source buffer, cursors at the start, line 1.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
            start_line: 1,
        }
    }

    /// Produce the next token in the stream.
    ///
    /// Runs synchronously to completion on every call. End of input and
    /// malformed input are regular tokens (`Eof`, `Error`), never faults;
    /// once `Eof` is reached it is returned on every subsequent call.
    pub fn scan_token(&mut self) -> Token<'src> {
        self.skip_whitespace_and_comments();

        // Mark start of token
        self.start = self.current;
        self.start_line = self.line;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        let c = self.advance();

        if c.is_ascii_digit() {
            return self.number();
        }

        match c {
            b'(' => self.make_token(TokenKind::LeftParen),
            b')' => self.make_token(TokenKind::RightParen),
            b'{' => self.make_token(TokenKind::LeftBrace),
            b'}' => self.make_token(TokenKind::RightBrace),
            b';' => self.make_token(TokenKind::Semicolon),
            b',' => self.make_token(TokenKind::Comma),
            b'.' => self.make_token(TokenKind::Dot),
            b'-' => self.make_token(TokenKind::Minus),
            b'+' => self.make_token(TokenKind::Plus),
            b'/' => self.make_token(TokenKind::Slash),
            b'*' => self.make_token(TokenKind::Star),

            b'!' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.make_token(kind)
            }
            b'=' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.make_token(kind)
            }
            b'<' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.make_token(kind)
            }
            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.make_token(kind)
            }

            b'"' => self.string(),

            _ => self.error_token("Unexpected character."),
        }
    }

    /// Pull tokens through `Eof`, collecting them in source order.
    pub fn tokenize(&mut self) -> Vec<Token<'src>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Skip whitespace and `//` comments.
    ///
    /// Newlines increment the line counter. A comment runs to the end of
    /// the line but does not consume the newline itself, so the newline
    /// arm counts it on the next pass. A lone `/` stops the skipper and
    /// is tokenized by the dispatch in `scan_token`.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\r') | Some(b'\t') => {
                    self.current += 1;
                }
                Some(b'\n') => {
                    self.line += 1;
                    self.current += 1;
                }
                Some(b'/') if self.peek_next() == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.current += 1;
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan a string literal; the opening quote is already consumed.
    ///
    /// Newlines inside the string still count toward the line counter.
    /// The token carries the line the string started on.
    fn string(&mut self) -> Token<'src> {
        while let Some(c) = self.peek() {
            if c == b'"' {
                break;
            }
            if c == b'\n' {
                self.line += 1;
            }
            self.current += 1;
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string.");
        }

        // The closing quote
        self.current += 1;
        self.make_token(TokenKind::String)
    }

    /// Scan a number literal; the first digit is already consumed.
    ///
    /// A `.` is consumed only when a digit follows it — fixed one-byte
    /// lookahead, no backtracking. `1.` scans as the number `1` and
    /// leaves the dot for the next token.
    fn number(&mut self) -> Token<'src> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.current += 1;
        }

        // Look for fractional part
        if self.peek() == Some(b'.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            // Consume the '.'
            self.current += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.current += 1;
            }
        }

        self.make_token(TokenKind::Number)
    }

    // === Cursor navigation ===

    /// Consume and return the byte at the cursor.
    fn advance(&mut self) -> u8 {
        let c = self.source.as_bytes()[self.current];
        self.current += 1;
        c
    }

    /// Byte at the cursor, without consuming it.
    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current).copied()
    }

    /// Byte after the cursor, without consuming anything.
    fn peek_next(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current + 1).copied()
    }

    /// Consume the byte at the cursor only if it equals `expected`.
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    // === Token creation ===

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token::new(kind, &self.source[self.start..self.current], self.start_line)
    }

    fn error_token(&self, message: &'static str) -> Token<'src> {
        Token::new(TokenKind::Error, message, self.start_line)
    }
}
