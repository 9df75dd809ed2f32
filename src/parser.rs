use std::fmt;

use crate::ast::{
    Ast, BinOp, Block, Call, CallArgs, Expr, ExprKind, Field, FuncBody, FuncName, Ident, NameId,
    Stat, StatKind, Table, TokenId, UNARY_PRECEDENCE, UnOp,
};
use crate::token::{Span, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A required token was missing. `what` names it, e.g. `` `(` ``,
    /// `end`, `Ident`.
    Expected { what: &'static str, found: String },
    /// A token that cannot start an expression.
    UnexpectedSymbol { found: String },
    /// Assignment to something that is not a name, index, or field.
    BadAssignment,
    /// Numeric `for` with the wrong number of bounds.
    RangeBounds { count: usize },
}

fn found_text(found: &str) -> &str {
    if found.is_empty() { "<eof>" } else { found }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected { what, found } => {
                write!(f, "{what} expected near `{}`", found_text(found))
            }
            Self::UnexpectedSymbol { found } => {
                write!(f, "Unexpected symbol near `{}`", found_text(found))
            }
            Self::BadAssignment => write!(f, "Bad left hand side of assignment"),
            Self::RangeBounds { count } => write!(
                f,
                "expected 2 or 3 values for range bounds, got {count}"
            ),
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}:{}: {kind}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Parse a token stream into an [`Ast`].
///
/// The stream normally comes from [`crate::tokenize`], but any
/// sequence works; a missing trailing `Eof` is supplied.
///
/// # Errors
///
/// Returns `ParseError` at the first token that does not fit the
/// grammar.
pub fn parse(tokens: &[Token]) -> Result<Ast, ParseError> {
    Parser::new(tokens.to_vec()).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    names: usize,
    /// Open `(`, `[`, `{` around the current position, reset inside
    /// function bodies.
    nesting: usize,
}

/// Tokens that close a block.
fn block_follow(token: &Token) -> bool {
    token.kind == TokenKind::Eof
        || (token.kind == TokenKind::Keyword
            && matches!(token.text.as_str(), "end" | "else" | "elseif" | "until"))
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map_or(Span::new(1, 1), |last| Span {
                line: last.end_line(),
                column: last.span.column + last.text.chars().count(),
            });
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Self {
            tokens,
            pos: 0,
            names: 0,
            nesting: 0,
        }
    }

    fn parse(mut self) -> Result<Ast, ParseError> {
        let body = self.parse_block()?;
        if self.peek().kind != TokenKind::Eof {
            return Err(self.expected("<eof>"));
        }
        Ok(Ast {
            body,
            tokens: self.tokens,
            name_count: self.names,
        })
    }

    // -- token helpers --

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn bump(&mut self) -> TokenId {
        let id = TokenId(self.pos);
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        id
    }

    fn check_symbol(&self, symbol: &str) -> bool {
        self.peek().is_symbol(symbol)
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn eat_symbol(&mut self, symbol: &str, tokens: &mut Vec<TokenId>) -> bool {
        if self.check_symbol(symbol) {
            tokens.push(self.bump());
            true
        } else {
            false
        }
    }

    fn expected(&self, what: &'static str) -> ParseError {
        ParseError {
            kind: ParseErrorKind::Expected {
                what,
                found: self.peek().text.clone(),
            },
            span: self.peek().span,
        }
    }

    fn expect_symbol(
        &mut self,
        symbol: &str,
        what: &'static str,
        tokens: &mut Vec<TokenId>,
    ) -> Result<(), ParseError> {
        if self.eat_symbol(symbol, tokens) {
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    fn expect_keyword(
        &mut self,
        keyword: &'static str,
        tokens: &mut Vec<TokenId>,
    ) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            tokens.push(self.bump());
            Ok(())
        } else {
            Err(self.expected(keyword))
        }
    }

    const fn next_name(&mut self) -> NameId {
        let id = NameId(self.names);
        self.names += 1;
        id
    }

    fn expect_name(&mut self, tokens: &mut Vec<TokenId>) -> Result<String, ParseError> {
        if self.peek().kind != TokenKind::Ident {
            return Err(self.expected("Ident"));
        }
        let name = self.peek().text.clone();
        tokens.push(self.bump());
        Ok(name)
    }

    fn expect_ident(&mut self, tokens: &mut Vec<TokenId>) -> Result<Ident, ParseError> {
        let name = self.expect_name(tokens)?;
        Ok(Ident {
            name,
            id: self.next_name(),
        })
    }

    // -- statements --

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut stats = Vec::new();

        while !block_follow(self.peek()) {
            if self.check_symbol(";") {
                let span = self.peek().span;
                stats.push(Stat {
                    kind: StatKind::Empty,
                    span,
                    tokens: vec![self.bump()],
                    semicolon: None,
                });
                continue;
            }

            let mut stat = self.parse_statement()?;
            if self.check_symbol(";") {
                stat.semicolon = Some(self.bump());
            }
            let terminator = stat.is_terminator();
            stats.push(stat);
            if terminator {
                break;
            }
        }

        Ok(Block { stats })
    }

    fn parse_statement(&mut self) -> Result<Stat, ParseError> {
        let span = self.peek().span;
        let mut tokens = Vec::new();

        let keyword =
            (self.peek().kind == TokenKind::Keyword).then(|| self.peek().text.clone());
        let kind = if let Some(keyword) = keyword {
            match keyword.as_str() {
                "if" => self.parse_if(&mut tokens)?,
                "while" => {
                    tokens.push(self.bump());
                    let cond = self.parse_expr()?;
                    self.expect_keyword("do", &mut tokens)?;
                    let body = self.parse_block()?;
                    self.expect_keyword("end", &mut tokens)?;
                    StatKind::While { cond, body }
                }
                "do" => {
                    tokens.push(self.bump());
                    let body = self.parse_block()?;
                    self.expect_keyword("end", &mut tokens)?;
                    StatKind::Do(body)
                }
                "for" => self.parse_for(&mut tokens)?,
                "repeat" => {
                    tokens.push(self.bump());
                    let body = self.parse_block()?;
                    self.expect_keyword("until", &mut tokens)?;
                    let cond = self.parse_expr()?;
                    StatKind::Repeat { body, cond }
                }
                "function" => {
                    tokens.push(self.bump());
                    let name = self.parse_func_name(&mut tokens)?;
                    let mut func = self.parse_func_body()?;
                    if name.method.is_some() {
                        func.self_param = Some(self.next_name());
                    }
                    StatKind::Function { name, func }
                }
                "local" => {
                    tokens.push(self.bump());
                    if self.check_keyword("function") {
                        tokens.push(self.bump());
                        let name = self.expect_ident(&mut tokens)?;
                        let func = self.parse_func_body()?;
                        StatKind::LocalFunction { name, func }
                    } else {
                        let mut names = vec![self.expect_ident(&mut tokens)?];
                        while self.eat_symbol(",", &mut tokens) {
                            names.push(self.expect_ident(&mut tokens)?);
                        }
                        let values = if self.eat_symbol("=", &mut tokens) {
                            self.parse_expr_list(&mut tokens)?
                        } else {
                            Vec::new()
                        };
                        StatKind::Local { names, values }
                    }
                }
                "return" => {
                    tokens.push(self.bump());
                    let values = if block_follow(self.peek()) || self.check_symbol(";") {
                        Vec::new()
                    } else {
                        self.parse_expr_list(&mut tokens)?
                    };
                    StatKind::Return(values)
                }
                "break" => {
                    tokens.push(self.bump());
                    StatKind::Break
                }
                _ => self.parse_expr_statement(&mut tokens)?,
            }
        } else {
            self.parse_expr_statement(&mut tokens)?
        };

        Ok(Stat {
            kind,
            span,
            tokens,
            semicolon: None,
        })
    }

    fn parse_if(&mut self, tokens: &mut Vec<TokenId>) -> Result<StatKind, ParseError> {
        tokens.push(self.bump());
        let mut clauses = Vec::new();

        loop {
            let cond = self.parse_expr()?;
            self.expect_keyword("then", tokens)?;
            let block = self.parse_block()?;
            clauses.push((cond, block));

            if self.check_keyword("elseif") {
                tokens.push(self.bump());
            } else {
                break;
            }
        }

        let else_block = if self.check_keyword("else") {
            tokens.push(self.bump());
            Some(self.parse_block()?)
        } else {
            None
        };

        self.expect_keyword("end", tokens)?;
        Ok(StatKind::If {
            clauses,
            else_block,
        })
    }

    fn parse_for(&mut self, tokens: &mut Vec<TokenId>) -> Result<StatKind, ParseError> {
        tokens.push(self.bump());
        let first = self.expect_ident(tokens)?;

        if self.eat_symbol("=", tokens) {
            let mut bounds = self.parse_expr_list(tokens)?.into_iter();
            let count = bounds.len();
            let (Some(start), Some(stop), step, None) =
                (bounds.next(), bounds.next(), bounds.next(), bounds.next())
            else {
                return Err(ParseError {
                    kind: ParseErrorKind::RangeBounds { count },
                    span: self.peek().span,
                });
            };
            self.expect_keyword("do", tokens)?;
            let body = self.parse_block()?;
            self.expect_keyword("end", tokens)?;
            return Ok(StatKind::NumericFor {
                var: first,
                start,
                stop,
                step,
                body,
            });
        }

        if !self.check_symbol(",") && !self.check_keyword("in") {
            return Err(self.expected("`=` or `in`"));
        }

        let mut vars = vec![first];
        while self.eat_symbol(",", tokens) {
            vars.push(self.expect_ident(tokens)?);
        }
        self.expect_keyword("in", tokens)?;
        let exprs = self.parse_expr_list(tokens)?;
        self.expect_keyword("do", tokens)?;
        let body = self.parse_block()?;
        self.expect_keyword("end", tokens)?;
        Ok(StatKind::GenericFor { vars, exprs, body })
    }

    fn parse_func_name(&mut self, tokens: &mut Vec<TokenId>) -> Result<FuncName, ParseError> {
        let base = self.expect_ident(tokens)?;
        let mut fields = Vec::new();
        while self.eat_symbol(".", tokens) {
            fields.push(self.expect_name(tokens)?);
        }
        let method = if self.eat_symbol(":", tokens) {
            Some(self.expect_name(tokens)?)
        } else {
            None
        };
        Ok(FuncName {
            base,
            fields,
            method,
        })
    }

    fn parse_expr_statement(&mut self, tokens: &mut Vec<TokenId>) -> Result<StatKind, ParseError> {
        let expr = self.parse_suffixed_expr()?;

        if self.check_symbol(",") || self.check_symbol("=") {
            let mut targets = vec![expr];
            while self.eat_symbol(",", tokens) {
                targets.push(self.parse_suffixed_expr()?);
            }
            if let Some(bad) = targets.iter().find(|t| !t.is_assignable()) {
                return Err(ParseError {
                    kind: ParseErrorKind::BadAssignment,
                    span: bad.span,
                });
            }
            self.expect_symbol("=", "`=`", tokens)?;
            let values = self.parse_expr_list(tokens)?;
            return Ok(StatKind::Assign { targets, values });
        }

        if matches!(expr.kind, ExprKind::Call(_)) {
            Ok(StatKind::Call(expr))
        } else {
            Err(self.expected("`=`"))
        }
    }

    // -- expressions --

    fn parse_expr_list(&mut self, tokens: &mut Vec<TokenId>) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat_symbol(",", tokens) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_subexpr(0)
    }

    fn operator_text(&self) -> Option<&str> {
        let token = self.peek();
        matches!(token.kind, TokenKind::Symbol | TokenKind::Keyword)
            .then_some(token.text.as_str())
    }

    fn parse_subexpr(&mut self, limit: u8) -> Result<Expr, ParseError> {
        let span = self.peek().span;

        let mut lhs = if let Some(op) = self.operator_text().and_then(UnOp::from_token) {
            let tokens = vec![self.bump()];
            let operand = self.parse_subexpr(UNARY_PRECEDENCE)?;
            Expr {
                kind: ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
                tokens,
            }
        } else {
            self.parse_simple_expr()?
        };

        while let Some(op) = self.operator_text().and_then(BinOp::from_token) {
            let (left, right) = op.precedence();
            if left <= limit {
                break;
            }
            let tokens = vec![self.bump()];
            let rhs = self.parse_subexpr(right)?;
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
                tokens,
            };
        }

        Ok(lhs)
    }

    fn parse_simple_expr(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek();
        let span = token.span;
        let (token_kind, text) = (token.kind, token.text.clone());

        let kind = match token_kind {
            TokenKind::Number => ExprKind::Number(text),
            TokenKind::String => ExprKind::String(text),
            TokenKind::Keyword => match text.as_str() {
                "nil" => ExprKind::Nil,
                "true" => ExprKind::True,
                "false" => ExprKind::False,
                "function" => {
                    let tokens = vec![self.bump()];
                    let func = self.parse_func_body()?;
                    return Ok(Expr {
                        kind: ExprKind::Function(func),
                        span,
                        tokens,
                    });
                }
                _ => return self.parse_suffixed_expr(),
            },
            TokenKind::Symbol if text == "..." => ExprKind::Vararg(self.next_name()),
            TokenKind::Symbol if text == "{" => {
                let table = self.parse_table()?;
                return Ok(Expr {
                    kind: ExprKind::Table(table),
                    span,
                    tokens: Vec::new(),
                });
            }
            _ => return self.parse_suffixed_expr(),
        };

        Ok(Expr {
            kind,
            span,
            tokens: vec![self.bump()],
        })
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek().span;
        let mut tokens = Vec::new();

        if self.peek().kind == TokenKind::Ident {
            let name = self.expect_ident(&mut tokens)?;
            return Ok(Expr {
                kind: ExprKind::Name(name),
                span,
                tokens,
            });
        }

        if self.eat_symbol("(", &mut tokens) {
            let inner = self.nested(Self::parse_expr)?;
            self.expect_symbol(")", "`)`", &mut tokens)?;
            return Ok(Expr {
                kind: ExprKind::Paren(Box::new(inner)),
                span,
                tokens,
            });
        }

        Err(ParseError {
            kind: ParseErrorKind::UnexpectedSymbol {
                found: self.peek().text.clone(),
            },
            span,
        })
    }

    /// A `(` on a later line than the previous token starts a new
    /// statement instead of calling the expression before it. Inside
    /// brackets no statement can start, so the call continues.
    fn paren_on_new_line(&self) -> bool {
        self.nesting == 0
            && self.pos > 0
            && self.peek().span.line > self.tokens[self.pos - 1].end_line()
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn parse_suffixed_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            let span = expr.span;
            let mut tokens = Vec::new();
            let (token_kind, text) = (self.peek().kind, self.peek().text.clone());

            let kind = match (token_kind, text.as_str()) {
                (TokenKind::Symbol, ".") => {
                    tokens.push(self.bump());
                    let name = self.expect_name(&mut tokens)?;
                    ExprKind::Member {
                        base: Box::new(expr),
                        name,
                    }
                }
                (TokenKind::Symbol, "[") => {
                    tokens.push(self.bump());
                    let key = self.nested(Self::parse_expr)?;
                    self.expect_symbol("]", "`]`", &mut tokens)?;
                    ExprKind::Index {
                        base: Box::new(expr),
                        key: Box::new(key),
                    }
                }
                (TokenKind::Symbol, ":") => {
                    tokens.push(self.bump());
                    let method = self.expect_name(&mut tokens)?;
                    let args = self.parse_call_args(&mut tokens)?;
                    ExprKind::Call(Call {
                        callee: Box::new(expr),
                        method: Some(method),
                        args,
                    })
                }
                (TokenKind::Symbol, "(") if self.paren_on_new_line() => return Ok(expr),
                (TokenKind::Symbol, "(" | "{") | (TokenKind::String, _) => {
                    let args = self.parse_call_args(&mut tokens)?;
                    ExprKind::Call(Call {
                        callee: Box::new(expr),
                        method: None,
                        args,
                    })
                }
                _ => return Ok(expr),
            };

            expr = Expr { kind, span, tokens };
        }
    }

    fn parse_call_args(&mut self, tokens: &mut Vec<TokenId>) -> Result<CallArgs, ParseError> {
        let (token_kind, text) = (self.peek().kind, self.peek().text.clone());
        match token_kind {
            TokenKind::String => {
                tokens.push(self.bump());
                Ok(CallArgs::Str(text))
            }
            TokenKind::Symbol if text == "{" => Ok(CallArgs::Table(self.parse_table()?)),
            TokenKind::Symbol if text == "(" => {
                tokens.push(self.bump());
                let args = if self.check_symbol(")") {
                    Vec::new()
                } else {
                    self.nested(|p| p.parse_expr_list(tokens))?
                };
                self.expect_symbol(")", "`)`", tokens)?;
                Ok(CallArgs::Paren(args))
            }
            _ => Err(self.expected("function arguments")),
        }
    }

    fn parse_table(&mut self) -> Result<Table, ParseError> {
        let mut tokens = Vec::new();
        self.expect_symbol("{", "`{`", &mut tokens)?;
        let (fields, trailing_separator) = self.nested(|p| p.parse_fields(&mut tokens))?;
        self.expect_symbol("}", "`}`", &mut tokens)?;
        Ok(Table {
            fields,
            trailing_separator,
            tokens,
        })
    }

    fn parse_fields(
        &mut self,
        tokens: &mut Vec<TokenId>,
    ) -> Result<(Vec<Field>, bool), ParseError> {
        let mut fields = Vec::new();
        let mut trailing_separator = false;

        while !self.check_symbol("}") {
            let field = if self.eat_symbol("[", tokens) {
                let key = self.parse_expr()?;
                self.expect_symbol("]", "`]`", tokens)?;
                self.expect_symbol("=", "`=`", tokens)?;
                let value = self.parse_expr()?;
                Field::Keyed { key, value }
            } else if self.peek().kind == TokenKind::Ident && self.peek_at(1).is_symbol("=") {
                let name = self.expect_name(tokens)?;
                tokens.push(self.bump());
                let value = self.parse_expr()?;
                Field::Named { name, value }
            } else {
                Field::Positional(self.parse_expr()?)
            };
            fields.push(field);

            trailing_separator = self.eat_symbol(",", tokens) || self.eat_symbol(";", tokens);
            if !trailing_separator {
                break;
            }
        }

        Ok((fields, trailing_separator))
    }

    fn parse_func_body(&mut self) -> Result<FuncBody, ParseError> {
        let mut tokens = Vec::new();
        self.expect_symbol("(", "`(`", &mut tokens)?;

        let mut params = Vec::new();
        let mut vararg = None;
        if !self.check_symbol(")") {
            loop {
                if self.eat_symbol("...", &mut tokens) {
                    vararg = Some(self.next_name());
                    break;
                }
                params.push(self.expect_ident(&mut tokens)?);
                if !self.eat_symbol(",", &mut tokens) {
                    break;
                }
            }
        }
        self.expect_symbol(")", "`)`", &mut tokens)?;

        let outer = std::mem::take(&mut self.nesting);
        let body = self.parse_block();
        self.nesting = outer;
        let body = body?;
        self.expect_keyword("end", &mut tokens)?;

        Ok(FuncBody {
            self_param: None,
            params,
            vararg,
            body,
            tokens,
        })
    }
}
