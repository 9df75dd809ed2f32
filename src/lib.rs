//! Lua source-to-source transformer.
//!
//! Tokenizes and parses Lua into a typed AST, resolves lexical scopes,
//! renames variables, and serializes the tree back to source in
//! compact, expanded, or source-preserving layout.
//!
//! # Quick start
//!
//! ## Minify and beautify
//!
//! ```
//! use luamin_rs::{beautify_str, minify_str};
//!
//! let min = minify_str("function foo(bar) return bar end").unwrap();
//! assert_eq!(min, "function a(b)return b end");
//!
//! let pretty = beautify_str(&min).unwrap();
//! assert_eq!(pretty, "\nfunction G_1(L_1_arg1)\n\treturn L_1_arg1\nend");
//! ```
//!
//! ## Parse and re-format exactly
//!
//! ```
//! use luamin_rs::{Style, format, parse_str};
//!
//! let input = "local x = 1 -- one\nreturn x\n";
//! let ast = parse_str(input).unwrap();
//! assert_eq!(format(&ast, Style::Preserve), input);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod formatter;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod rename;
pub mod scope;
pub mod token;

pub use ast::{Ast, Block, Expr, ExprKind, Stat, StatKind};
pub use builder::AstBuilder;
pub use formatter::{Style, format, format_with};
pub use lexer::{LexError, LexErrorKind, tokenize};
pub use literal::{LuaValue, count_entries, to_lua_literal};
pub use parser::{ParseError, ParseErrorKind, parse};
pub use rename::Renaming;
pub use scope::{ScopeTree, VarId, VarKind, resolve};
pub use token::{Span, Token, TokenKind};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Where the error was detected.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Lex(e) => e.span,
            Self::Parse(e) => e.span,
        }
    }
}

/// Tokenize and parse a Lua source string in one step.
pub fn parse_str(input: &str) -> Result<Ast, Error> {
    let tokens = tokenize(input)?;
    Ok(parse(&tokens)?)
}

/// Compact output with the shortest collision-free names.
///
/// Scopes are resolved here unless `scopes` is given.
#[must_use]
pub fn minify(ast: &Ast, scopes: Option<&ScopeTree>) -> String {
    with_scopes(ast, scopes, |tree| {
        let renaming = Renaming::minify(tree);
        format_with(ast, Some((tree, &renaming)), Style::Compact)
    })
}

/// Expanded output with descriptive `G_n` / `L_n_k` names.
///
/// Scopes are resolved here unless `scopes` is given.
#[must_use]
pub fn beautify(ast: &Ast, scopes: Option<&ScopeTree>) -> String {
    with_scopes(ast, scopes, |tree| {
        let renaming = Renaming::beautify(tree);
        format_with(ast, Some((tree, &renaming)), Style::Expanded)
    })
}

fn with_scopes<F: FnOnce(&ScopeTree) -> String>(
    ast: &Ast,
    scopes: Option<&ScopeTree>,
    f: F,
) -> String {
    match scopes {
        Some(tree) => f(tree),
        None => f(&resolve(ast)),
    }
}

/// Parse and minify in one step.
pub fn minify_str(input: &str) -> Result<String, Error> {
    Ok(minify(&parse_str(input)?, None))
}

/// Parse and beautify in one step.
pub fn beautify_str(input: &str) -> Result<String, Error> {
    Ok(beautify(&parse_str(input)?, None))
}
