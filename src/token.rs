/// Source location for error reporting (1-indexed). Columns count
/// characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Reserved word (`local`, `function`, ...).
    Keyword,
    /// Identifier that is not a reserved word.
    Ident,
    /// Numeric literal, text kept verbatim.
    Number,
    /// Short (`"..."`, `'...'`) or long (`[[...]]`) string literal.
    String,
    /// Operator or punctuation.
    Symbol,
    /// End of input. Always the last token, with empty text.
    Eof,
}

/// A single token with its kind, verbatim text, location, and the
/// whitespace/comments that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub leading_trivia: String,
}

impl Token {
    /// Build a token with no leading trivia.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            leading_trivia: String::new(),
        }
    }

    /// True if this token is the given symbol.
    #[must_use]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    /// True if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    /// Line on which the token text ends. Long strings can span lines.
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.span.line + line_breaks(&self.text)
    }
}

/// Count line breaks, taking `\r\n` as one.
fn line_breaks(text: &str) -> usize {
    text.matches('\n').count() + text.matches('\r').count() - text.matches("\r\n").count()
}

/// Lua reserved words.
pub const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Check whether `word` is a reserved word.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Check whether `word` is a valid identifier (and not a keyword).
#[must_use]
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_keyword(word)
}
