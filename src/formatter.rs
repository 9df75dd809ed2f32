//! Serializer that turns a Lua AST back into source text.
//!
//! One tree walk drives three layouts:
//!
//! - [`Style::Compact`]: no optional whitespace, a single space only
//!   where two tokens would otherwise merge.
//! - [`Style::Expanded`]: tab-indented blocks, one statement per line,
//!   spaces around binary operators and after commas.
//! - [`Style::Preserve`]: original trivia and token text, reproducing
//!   the input exactly (identifiers aside, when renamed).

use crate::ast::{
    Ast, Block, CallArgs, Expr, ExprKind, Field, FuncBody, Ident, Stat, StatKind, Table, TokenId,
    UnOp,
};
use crate::rename::Renaming;
use crate::scope::ScopeTree;
use crate::token::Token;

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Compact,
    Expanded,
    Preserve,
}

/// Format an AST with source names.
#[must_use]
pub fn format(ast: &Ast, style: Style) -> String {
    format_with(ast, None, style)
}

/// Format an AST, printing bound identifiers under `names` if given.
#[must_use]
pub fn format_with(ast: &Ast, names: Option<(&ScopeTree, &Renaming)>, style: Style) -> String {
    match style {
        Style::Compact => Printer::new(Compact::default(), names).chunk(ast),
        Style::Expanded => Printer::new(Expanded::default(), names).chunk(ast),
        Style::Preserve => Printer::new(Preserve::new(&ast.tokens), names).chunk(ast),
    }
}

/// True if `prev` immediately followed by `next` would lex differently.
#[must_use]
pub fn needs_space(prev: &str, next: &str) -> bool {
    let (Some(a), Some(b)) = (prev.chars().last(), next.chars().next()) else {
        return false;
    };
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if word(a) && word(b) {
        return true;
    }
    let prev_is_number = prev.starts_with(|c: char| c.is_ascii_digit())
        || (prev.len() > 1
            && prev.starts_with('.')
            && prev[1..].starts_with(|c: char| c.is_ascii_digit()));
    if prev_is_number && b == '.' {
        return true;
    }
    matches!(
        (a, b),
        ('-', '-')
            | ('.', '.')
            | ('[', '[' | '=')
            | ('=' | '~' | '<' | '>', '=')
            | ('<', '<')
            | ('>', '>')
            | ('/', '/')
    )
}

/// Where the walker's output goes and how optional whitespace looks.
trait Layout {
    /// A keyword, symbol, or literal. `id` is its source token, if any.
    fn token(&mut self, id: Option<TokenId>, text: &str);

    /// An identifier, already renamed.
    fn name(&mut self, id: Option<TokenId>, text: &str) {
        self.token(id, text);
    }

    fn space(&mut self) {}
    fn line(&mut self) {}
    fn blank_line(&mut self) {}
    fn indent(&mut self) {}
    fn dedent(&mut self) {}

    /// Emit source semicolons, empty statements, and trailing table
    /// separators.
    fn preserves_source(&self) -> bool {
        false
    }

    fn finish(self, eof: Option<&Token>) -> String;
}

/// Output buffer that separates tokens only where needed.
#[derive(Debug, Default)]
struct Output {
    out: String,
    last: String,
}

impl Output {
    fn push_token(&mut self, text: &str) {
        if !self.last.is_empty() && needs_space(&self.last, text) {
            self.out.push(' ');
        }
        self.out.push_str(text);
        text.clone_into(&mut self.last);
    }

    fn push_whitespace(&mut self, ws: &str) {
        self.out.push_str(ws);
        self.last.clear();
    }
}

#[derive(Debug, Default)]
struct Compact {
    output: Output,
}

impl Layout for Compact {
    fn token(&mut self, _id: Option<TokenId>, text: &str) {
        self.output.push_token(text);
    }

    fn finish(self, _eof: Option<&Token>) -> String {
        self.output.out
    }
}

#[derive(Debug, Default)]
struct Expanded {
    output: Output,
    depth: usize,
}

impl Layout for Expanded {
    fn token(&mut self, _id: Option<TokenId>, text: &str) {
        self.output.push_token(text);
    }

    fn space(&mut self) {
        if !self.output.out.is_empty() && !self.output.out.ends_with(char::is_whitespace) {
            self.output.push_whitespace(" ");
        }
    }

    fn line(&mut self) {
        let mut ws = String::from("\n");
        ws.extend(std::iter::repeat_n('\t', self.depth));
        self.output.push_whitespace(&ws);
    }

    fn blank_line(&mut self) {
        self.output.push_whitespace("\n");
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn finish(self, _eof: Option<&Token>) -> String {
        self.output.out
    }
}

struct Preserve<'a> {
    tokens: &'a [Token],
    output: Output,
}

impl<'a> Preserve<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            output: Output::default(),
        }
    }

    fn emit(&mut self, id: Option<TokenId>, text: &str) {
        match id.and_then(|id| self.tokens.get(id.0)) {
            Some(token) => {
                self.output.push_whitespace(&token.leading_trivia);
                self.output.out.push_str(text);
                text.clone_into(&mut self.output.last);
            }
            None => self.output.push_token(text),
        }
    }
}

impl Layout for Preserve<'_> {
    fn token(&mut self, id: Option<TokenId>, text: &str) {
        let source = id
            .and_then(|id| self.tokens.get(id.0))
            .map_or_else(|| text.to_string(), |t| t.text.clone());
        self.emit(id, &source);
    }

    fn name(&mut self, id: Option<TokenId>, text: &str) {
        self.emit(id, text);
    }

    fn preserves_source(&self) -> bool {
        true
    }

    fn finish(mut self, eof: Option<&Token>) -> String {
        if let Some(eof) = eof {
            self.output.out.push_str(&eof.leading_trivia);
        }
        self.output.out
    }
}

/// Hands out a node's tokens in source order.
struct Cursor<'t> {
    ids: std::slice::Iter<'t, TokenId>,
}

impl<'t> Cursor<'t> {
    fn new(ids: &'t [TokenId]) -> Self {
        Self { ids: ids.iter() }
    }

    fn pop(&mut self) -> Option<TokenId> {
        self.ids.next().copied()
    }
}

struct Printer<'a, L> {
    layout: L,
    names: Option<(&'a ScopeTree, &'a Renaming)>,
}

impl<'a, L: Layout> Printer<'a, L> {
    fn new(layout: L, names: Option<(&'a ScopeTree, &'a Renaming)>) -> Self {
        Self { layout, names }
    }

    fn chunk(mut self, ast: &Ast) -> String {
        let stats = self.visible(&ast.body);
        for (i, stat) in stats.iter().enumerate() {
            if i > 0 {
                self.layout.line();
            }
            if matches!(
                stat.kind,
                StatKind::Function { .. } | StatKind::LocalFunction { .. }
            ) {
                self.layout.blank_line();
            }
            self.stat(stat);
            self.separator(stat, stats.get(i + 1).copied());
        }
        self.layout.finish(ast.eof())
    }

    fn visible<'b>(&self, block: &'b Block) -> Vec<&'b Stat> {
        let preserve = self.layout.preserves_source();
        block
            .stats
            .iter()
            .filter(|s| preserve || !matches!(s.kind, StatKind::Empty))
            .collect()
    }

    fn separator(&mut self, stat: &Stat, next: Option<&Stat>) {
        if self.layout.preserves_source() {
            if let Some(semi) = stat.semicolon {
                self.layout.token(Some(semi), ";");
            }
        } else if next.is_some_and(Stat::starts_with_paren) {
            self.layout.token(None, ";");
        }
    }

    fn block(&mut self, block: &Block) {
        self.layout.indent();
        let stats = self.visible(block);
        for (i, stat) in stats.iter().enumerate() {
            self.layout.line();
            self.stat(stat);
            self.separator(stat, stats.get(i + 1).copied());
        }
        self.layout.dedent();
    }

    fn token(&mut self, cur: &mut Cursor<'_>, text: &str) {
        self.layout.token(cur.pop(), text);
    }

    fn ident(&mut self, cur: &mut Cursor<'_>, ident: &Ident) {
        let name = self
            .names
            .and_then(|(tree, renaming)| tree.binding(ident.id).map(|v| renaming.name(v)))
            .unwrap_or(ident.name.as_str());
        self.layout.name(cur.pop(), name);
    }

    fn field_name(&mut self, cur: &mut Cursor<'_>, name: &str) {
        self.layout.name(cur.pop(), name);
    }

    fn comma(&mut self, cur: &mut Cursor<'_>) {
        self.token(cur, ",");
        self.layout.space();
    }

    fn spaced(&mut self, cur: &mut Cursor<'_>, text: &str) {
        self.layout.space();
        self.token(cur, text);
        self.layout.space();
    }

    fn exprs(&mut self, cur: &mut Cursor<'_>, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.comma(cur);
            }
            self.expr(expr);
        }
    }

    fn idents(&mut self, cur: &mut Cursor<'_>, idents: &[Ident]) {
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.comma(cur);
            }
            self.ident(cur, ident);
        }
    }

    /// `end`, `else`, `until`, ... on a line of their own.
    fn closer(&mut self, cur: &mut Cursor<'_>, text: &str) {
        self.layout.line();
        self.token(cur, text);
    }

    fn stat(&mut self, stat: &Stat) {
        let mut cur = Cursor::new(&stat.tokens);
        let cur = &mut cur;
        match &stat.kind {
            StatKind::Assign { targets, values } => {
                self.exprs(cur, targets);
                self.spaced(cur, "=");
                self.exprs(cur, values);
            }
            StatKind::Local { names, values } => {
                self.token(cur, "local");
                self.layout.space();
                self.idents(cur, names);
                if !values.is_empty() {
                    self.spaced(cur, "=");
                    self.exprs(cur, values);
                }
            }
            StatKind::Function { name, func } => {
                self.token(cur, "function");
                self.layout.space();
                self.ident(cur, &name.base);
                for field in &name.fields {
                    self.token(cur, ".");
                    self.field_name(cur, field);
                }
                if let Some(method) = &name.method {
                    self.token(cur, ":");
                    self.field_name(cur, method);
                }
                self.func_body(func);
            }
            StatKind::LocalFunction { name, func } => {
                self.token(cur, "local");
                self.layout.space();
                self.token(cur, "function");
                self.layout.space();
                self.ident(cur, name);
                self.func_body(func);
            }
            StatKind::If {
                clauses,
                else_block,
            } => {
                for (i, (cond, block)) in clauses.iter().enumerate() {
                    if i == 0 {
                        self.token(cur, "if");
                    } else {
                        self.closer(cur, "elseif");
                    }
                    self.layout.space();
                    self.expr(cond);
                    self.layout.space();
                    self.token(cur, "then");
                    self.block(block);
                }
                if let Some(block) = else_block {
                    self.closer(cur, "else");
                    self.block(block);
                }
                self.closer(cur, "end");
            }
            StatKind::While { cond, body } => {
                self.token(cur, "while");
                self.layout.space();
                self.expr(cond);
                self.layout.space();
                self.token(cur, "do");
                self.block(body);
                self.closer(cur, "end");
            }
            StatKind::Repeat { body, cond } => {
                self.token(cur, "repeat");
                self.block(body);
                self.closer(cur, "until");
                self.layout.space();
                self.expr(cond);
            }
            StatKind::NumericFor {
                var,
                start,
                stop,
                step,
                body,
            } => {
                self.token(cur, "for");
                self.layout.space();
                self.ident(cur, var);
                self.spaced(cur, "=");
                self.expr(start);
                self.comma(cur);
                self.expr(stop);
                if let Some(step) = step {
                    self.comma(cur);
                    self.expr(step);
                }
                self.layout.space();
                self.token(cur, "do");
                self.block(body);
                self.closer(cur, "end");
            }
            StatKind::GenericFor { vars, exprs, body } => {
                self.token(cur, "for");
                self.layout.space();
                self.idents(cur, vars);
                self.spaced(cur, "in");
                self.exprs(cur, exprs);
                self.layout.space();
                self.token(cur, "do");
                self.block(body);
                self.closer(cur, "end");
            }
            StatKind::Do(body) => {
                self.token(cur, "do");
                self.block(body);
                self.closer(cur, "end");
            }
            StatKind::Return(values) => {
                self.token(cur, "return");
                if !values.is_empty() {
                    self.layout.space();
                    self.exprs(cur, values);
                }
            }
            StatKind::Break => self.token(cur, "break"),
            StatKind::Call(expr) => self.expr(expr),
            StatKind::Empty => self.token(cur, ";"),
        }
    }

    fn func_body(&mut self, func: &FuncBody) {
        let mut cur = Cursor::new(&func.tokens);
        let cur = &mut cur;
        self.token(cur, "(");
        self.idents(cur, &func.params);
        if func.vararg.is_some() {
            if !func.params.is_empty() {
                self.comma(cur);
            }
            self.token(cur, "...");
        }
        self.token(cur, ")");
        self.block(&func.body);
        self.closer(cur, "end");
    }

    fn expr(&mut self, expr: &Expr) {
        let mut cur = Cursor::new(&expr.tokens);
        let cur = &mut cur;
        match &expr.kind {
            ExprKind::Nil => self.token(cur, "nil"),
            ExprKind::True => self.token(cur, "true"),
            ExprKind::False => self.token(cur, "false"),
            ExprKind::Vararg(_) => self.token(cur, "..."),
            ExprKind::Number(text) | ExprKind::String(text) => self.token(cur, text),
            ExprKind::Name(ident) => self.ident(cur, ident),
            ExprKind::Function(func) => {
                self.token(cur, "function");
                self.func_body(func);
            }
            ExprKind::Table(table) => self.table(table),
            ExprKind::Index { base, key } => {
                self.expr(base);
                self.token(cur, "[");
                self.expr(key);
                self.token(cur, "]");
            }
            ExprKind::Member { base, name } => {
                self.expr(base);
                self.token(cur, ".");
                self.field_name(cur, name);
            }
            ExprKind::Call(call) => {
                self.expr(&call.callee);
                if let Some(method) = &call.method {
                    self.token(cur, ":");
                    self.field_name(cur, method);
                }
                match &call.args {
                    CallArgs::Paren(args) => {
                        self.token(cur, "(");
                        self.exprs(cur, args);
                        self.token(cur, ")");
                    }
                    CallArgs::Str(text) => self.token(cur, text),
                    CallArgs::Table(table) => self.table(table),
                }
            }
            ExprKind::Paren(inner) => {
                self.token(cur, "(");
                self.expr(inner);
                self.token(cur, ")");
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.expr(lhs);
                self.spaced(cur, op.as_str());
                self.expr(rhs);
            }
            ExprKind::Unary { op, operand } => {
                self.token(cur, op.as_str());
                if *op == UnOp::Not {
                    self.layout.space();
                }
                self.expr(operand);
            }
        }
    }

    fn table(&mut self, table: &Table) {
        let mut cur = Cursor::new(&table.tokens);
        let cur = &mut cur;
        self.token(cur, "{");
        for (i, field) in table.fields.iter().enumerate() {
            if i > 0 {
                self.comma(cur);
            }
            match field {
                Field::Positional(value) => self.expr(value),
                Field::Named { name, value } => {
                    self.field_name(cur, name);
                    self.spaced(cur, "=");
                    self.expr(value);
                }
                Field::Keyed { key, value } => {
                    self.token(cur, "[");
                    self.expr(key);
                    self.token(cur, "]");
                    self.spaced(cur, "=");
                    self.expr(value);
                }
            }
        }
        if table.trailing_separator {
            let id = cur.pop();
            if self.layout.preserves_source() {
                self.layout.token(id, ",");
            }
        }
        self.token(cur, "}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn ast_for(input: &str) -> Ast {
        parse(&tokenize(input).expect("tokenize failed")).expect("parse failed")
    }

    #[test]
    fn separation_rules() {
        assert!(needs_space("local", "x"));
        assert!(needs_space("-", "-1"));
        assert!(needs_space("..", "..."));
        assert!(needs_space("1", ".."));
        assert!(needs_space("=", "=="));
        assert!(needs_space("[", "[[x]]"));
        assert!(!needs_space("x", "("));
        assert!(!needs_space(")", "x"));
        assert!(!needs_space("..", "x"));
        assert!(!needs_space("\"a\"", "and"));
    }

    #[test]
    fn compact_inserts_semicolon_before_paren() {
        let ast = ast_for("print();   (\"a\"):len()");
        assert_eq!(format(&ast, Style::Compact), "print();(\"a\"):len()");
    }

    #[test]
    fn compact_keeps_negations_apart() {
        let ast = ast_for("return - -x, 1 .. 2, a.b");
        assert_eq!(format(&ast, Style::Compact), "return- -x,1 ..2,a.b");
    }

    #[test]
    fn expanded_layout() {
        let ast = ast_for("if a then b() elseif c then d() else e() end");
        assert_eq!(
            format(&ast, Style::Expanded),
            "if a then\n\tb()\nelseif c then\n\td()\nelse\n\te()\nend"
        );
    }

    #[test]
    fn expanded_blank_line_before_functions() {
        let ast = ast_for("x = 1 function f() end");
        assert_eq!(
            format(&ast, Style::Expanded),
            "x = 1\n\nfunction f()\nend"
        );
    }

    #[test]
    fn preserve_is_exact() {
        let input = "-- header\nlocal t = { 1, 2; x = 3, }  ;\n;return t -- trailing\n";
        let ast = ast_for(input);
        assert_eq!(format(&ast, Style::Preserve), input);
    }

    #[test]
    fn compact_drops_empty_statements_and_trailing_separators() {
        let ast = ast_for(";;local t = {1,2,};;");
        assert_eq!(format(&ast, Style::Compact), "local t={1,2}");
    }
}
