use std::fmt;

use crate::token::{self, Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Short string without its closing quote on the same line.
    UnfinishedString,
    /// Long bracket (`[==[`) without a matching closer.
    UnfinishedLongString { comment: bool },
    /// Backslash followed by a character that is not a valid escape.
    InvalidEscape(String),
    /// Number literal running into letters, digits, or dots.
    MalformedNumber(String),
    /// Byte that cannot start any token.
    BadSymbol(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnfinishedString => write!(f, "Unfinished string"),
            Self::UnfinishedLongString { comment: false } => {
                write!(f, "Unfinished long string")
            }
            Self::UnfinishedLongString { comment: true } => {
                write!(f, "Unfinished long string in comment")
            }
            Self::InvalidEscape(seq) => {
                write!(f, "Invalid Escape Sequence `{seq}`")
            }
            Self::MalformedNumber(text) => write!(f, "Malformed number `{text}`"),
            Self::BadSymbol(ch) => write!(f, "Bad symbol `{ch}` in source"),
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}:{}: {kind}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize Lua source into a token stream terminated by `Eof`.
///
/// Whitespace and comments are attached to the following token as
/// leading trivia, so the stream can reproduce the source exactly.
///
/// # Errors
///
/// Returns `LexError` on unterminated strings or long brackets,
/// invalid escapes, malformed numbers, or stray characters.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

const SYMBOLS3: &[&str] = &["..."];
const SYMBOLS2: &[&str] = &["..", "==", "~=", "<=", ">=", "<<", ">>", "//"];
const SYMBOLS1: &[u8] = b"+-*/%^#&~|<>=(){}[];:,.";

struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src,
            input: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        self.skip_preamble();

        loop {
            let trivia_start = if tokens.is_empty() { 0 } else { self.pos };
            self.skip_trivia()?;
            let leading_trivia = self.src[trivia_start..self.pos].to_string();
            let span = self.span();
            let start = self.pos;

            let Some(ch) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    span,
                    leading_trivia,
                });
                break;
            };

            let kind = match ch {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.read_word(),
                b'0'..=b'9' => self.read_number()?,
                b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.read_number()?
                }
                b'"' | b'\'' => self.read_string(ch)?,
                b'[' => match self.long_bracket_level() {
                    Some(level) => {
                        self.read_long_bracket(level, false)?;
                        TokenKind::String
                    }
                    None => {
                        self.advance();
                        TokenKind::Symbol
                    }
                },
                _ => self.read_symbol()?,
            };

            tokens.push(Token {
                kind,
                text: self.src[start..self.pos].to_string(),
                span,
                leading_trivia,
            });
        }

        Ok(tokens)
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
        }
    }

    fn error(kind: LexErrorKind, span: Span) -> LexError {
        LexError { kind, span }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Step one byte. `\n`, `\r\n` and a lone `\r` each end a line;
    /// UTF-8 continuation bytes do not move the column.
    fn advance(&mut self) {
        let Some(&byte) = self.input.get(self.pos) else {
            return;
        };
        match byte {
            b'\n' => {
                self.line += 1;
                self.col = 1;
            }
            b'\r' if self.peek_at(1) == Some(b'\n') => {}
            b'\r' => {
                self.line += 1;
                self.col = 1;
            }
            0x80..=0xBF => {}
            _ => self.col += 1,
        }
        self.pos += 1;
    }

    /// BOM and `#!` line are trivia of the first token. The BOM does
    /// not count towards columns.
    fn skip_preamble(&mut self) {
        if self.input.starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.pos = 3;
        }
        if self.peek() == Some(b'#') && self.peek_at(1) == Some(b'!') {
            while self.peek().is_some_and(|c| !matches!(c, b'\n' | b'\r')) {
                self.advance();
            }
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C) => self.advance(),
                Some(b'-') if self.peek_at(1) == Some(b'-') => self.read_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn read_comment(&mut self) -> Result<(), LexError> {
        self.advance();
        self.advance();

        if self.peek() == Some(b'[') {
            if let Some(level) = self.long_bracket_level() {
                return self.read_long_bracket(level, true);
            }
        }

        while self.peek().is_some_and(|c| !matches!(c, b'\n' | b'\r')) {
            self.advance();
        }
        Ok(())
    }

    /// At a `[`: the number of `=` signs if this opens a long bracket.
    fn long_bracket_level(&self) -> Option<usize> {
        let mut level = 0;
        while self.peek_at(1 + level) == Some(b'=') {
            level += 1;
        }
        (self.peek_at(1 + level) == Some(b'[')).then_some(level)
    }

    fn read_long_bracket(&mut self, level: usize, comment: bool) -> Result<(), LexError> {
        let start = self.span();
        // opener: `[`, `=` * level, `[`
        for _ in 0..level + 2 {
            self.advance();
        }

        while let Some(c) = self.peek() {
            if c == b']' {
                let mut equals = 0;
                while self.peek_at(1 + equals) == Some(b'=') {
                    equals += 1;
                }
                if equals == level && self.peek_at(1 + equals) == Some(b']') {
                    for _ in 0..level + 2 {
                        self.advance();
                    }
                    return Ok(());
                }
            }
            self.advance();
        }

        Err(Self::error(
            LexErrorKind::UnfinishedLongString { comment },
            start,
        ))
    }

    fn read_word(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        if token::is_keyword(&self.src[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        }
    }

    fn eat_digits(&mut self, hex: bool) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(|c| {
            if hex {
                c.is_ascii_hexdigit()
            } else {
                c.is_ascii_digit()
            }
        }) {
            self.advance();
            count += 1;
        }
        count
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let span = self.span();
        let start = self.pos;

        let hex = self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X'));
        let exponent: &[u8] = if hex {
            self.advance();
            self.advance();
            b"pP"
        } else {
            b"eE"
        };

        let mut digits = self.eat_digits(hex);
        if self.peek() == Some(b'.') && self.peek_at(1) != Some(b'.') {
            self.advance();
            digits += self.eat_digits(hex);
        }
        let mut valid = digits > 0;

        if self.peek().is_some_and(|c| exponent.contains(&c)) {
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            valid &= self.eat_digits(false) > 0;
        }

        if !valid
            || self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
        {
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
            {
                self.advance();
            }
            return Err(Self::error(
                LexErrorKind::MalformedNumber(self.src[start..self.pos].to_string()),
                span,
            ));
        }

        Ok(TokenKind::Number)
    }

    fn read_string(&mut self, quote: u8) -> Result<TokenKind, LexError> {
        let start = self.span();
        self.advance(); // skip opening quote

        loop {
            match self.peek() {
                None | Some(b'\n' | b'\r') => {
                    return Err(Self::error(LexErrorKind::UnfinishedString, start));
                }
                Some(b'\\') => self.read_escape(start)?,
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(TokenKind::String);
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn read_escape(&mut self, string_start: Span) -> Result<(), LexError> {
        let span = self.span();
        let escape_start = self.pos;
        self.advance(); // skip backslash

        let invalid = |lexer: &Self| {
            let end = lexer.pos.min(lexer.input.len());
            let mut seq = lexer.src[escape_start..end].to_string();
            if let Some(c) = lexer.src[end..].chars().next() {
                seq.push(c);
            }
            Self::error(LexErrorKind::InvalidEscape(seq), span)
        };

        match self.peek() {
            None => Err(Self::error(LexErrorKind::UnfinishedString, string_start)),
            Some(b'n' | b't' | b'a' | b'b' | b'f' | b'r' | b'v' | b'\\' | b'"' | b'\'' | b'\n') => {
                self.advance();
                Ok(())
            }
            Some(b'\r') => {
                self.advance();
                if self.peek() == Some(b'\n') {
                    self.advance();
                }
                Ok(())
            }
            Some(b'x') => {
                self.advance();
                for _ in 0..2 {
                    if !self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        return Err(invalid(self));
                    }
                    self.advance();
                }
                Ok(())
            }
            Some(b'z') => {
                self.advance();
                while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                    self.advance();
                }
                Ok(())
            }
            Some(b'u') => {
                self.advance();
                if self.peek() != Some(b'{') {
                    return Err(invalid(self));
                }
                self.advance();
                if self.eat_digits(true) == 0 || self.peek() != Some(b'}') {
                    return Err(invalid(self));
                }
                self.advance();
                Ok(())
            }
            Some(b'0'..=b'9') => {
                let digits_start = self.pos;
                while self.pos - digits_start < 3
                    && self.peek().is_some_and(|c| c.is_ascii_digit())
                {
                    self.advance();
                }
                let value: u32 = self.src[digits_start..self.pos].parse().unwrap_or(u32::MAX);
                if value > 255 {
                    let seq = self.src[escape_start..self.pos].to_string();
                    return Err(Self::error(LexErrorKind::InvalidEscape(seq), span));
                }
                Ok(())
            }
            Some(_) => Err(invalid(self)),
        }
    }

    fn read_symbol(&mut self) -> Result<TokenKind, LexError> {
        let rest = &self.src[self.pos..];
        let width = if SYMBOLS3.iter().any(|s| rest.starts_with(s)) {
            3
        } else if SYMBOLS2.iter().any(|s| rest.starts_with(s)) {
            2
        } else if self.peek().is_some_and(|c| SYMBOLS1.contains(&c)) {
            1
        } else {
            let ch = rest.chars().next().unwrap_or('\u{FFFD}');
            return Err(Self::error(LexErrorKind::BadSymbol(ch), self.span()));
        };

        for _ in 0..width {
            self.advance();
        }
        Ok(TokenKind::Symbol)
    }
}
