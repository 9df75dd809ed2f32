//! Programmatic construction of Lua syntax trees.
//!
//! Built nodes carry no source tokens, so they format in compact or
//! expanded style only. [`AstBuilder`] hands out the [`NameId`]s the
//! scope resolver needs.

use crate::ast::{
    Ast, BinOp, Block, Call, CallArgs, Expr, ExprKind, Field, FuncBody, FuncName, Ident, NameId,
    Stat, StatKind, Table, UnOp,
};
use crate::literal::quote_string;
use crate::token::Span;

/// Allocates identifier ids for a tree under construction.
#[derive(Debug, Default)]
pub struct AstBuilder {
    names: usize,
}

impl AstBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { names: 0 }
    }

    /// A fresh identifier occurrence.
    pub fn ident(&mut self, name: &str) -> Ident {
        let id = NameId(self.names);
        self.names += 1;
        Ident {
            name: name.to_string(),
            id,
        }
    }

    /// A name expression.
    pub fn name(&mut self, name: &str) -> Expr {
        Expr::new(ExprKind::Name(self.ident(name)))
    }

    /// `...`
    pub fn vararg(&mut self) -> Expr {
        let id = NameId(self.names);
        self.names += 1;
        Expr::new(ExprKind::Vararg(id))
    }

    /// `local a, b = ...`
    pub fn local(&mut self, names: &[&str], values: Vec<Expr>) -> Stat {
        let names = names.iter().map(|n| self.ident(n)).collect();
        Stat::new(StatKind::Local { names, values })
    }

    /// `local function name(params) body end`
    pub fn local_function(&mut self, name: &str, params: &[&str], body: Block) -> Stat {
        let name = self.ident(name);
        let func = self.function(params, body);
        Stat::new(StatKind::LocalFunction { name, func })
    }

    /// `function a.b.c(params) body end`
    pub fn function_decl(&mut self, path: &str, params: &[&str], body: Block) -> Stat {
        let mut parts = path.split('.');
        let base = self.ident(parts.next().unwrap_or_default());
        let name = FuncName {
            base,
            fields: parts.map(str::to_string).collect(),
            method: None,
        };
        let func = self.function(params, body);
        Stat::new(StatKind::Function { name, func })
    }

    /// Parameters and body of a function; a trailing `...` in `params`
    /// makes it variadic.
    pub fn function(&mut self, params: &[&str], body: Block) -> FuncBody {
        let (vararg, params) = match params.split_last() {
            Some((&"...", rest)) => (Some(self.vararg_id()), rest),
            _ => (None, params),
        };
        FuncBody {
            self_param: None,
            params: params.iter().map(|p| self.ident(p)).collect(),
            vararg,
            body,
            tokens: Vec::new(),
        }
    }

    fn vararg_id(&mut self) -> NameId {
        let id = NameId(self.names);
        self.names += 1;
        id
    }

    /// Wrap `body` as a chunk.
    #[must_use]
    pub fn finish(self, body: Block) -> Ast {
        Ast {
            body,
            tokens: Vec::new(),
            name_count: self.names,
        }
    }
}

impl Block {
    #[must_use]
    pub const fn new() -> Self {
        Self { stats: Vec::new() }
    }

    /// Append a statement.
    #[must_use]
    pub fn stat(mut self, stat: Stat) -> Self {
        self.stats.push(stat);
        self
    }
}

impl Stat {
    #[must_use]
    pub const fn new(kind: StatKind) -> Self {
        Self {
            kind,
            span: Span::new(0, 0),
            tokens: Vec::new(),
            semicolon: None,
        }
    }

    #[must_use]
    pub const fn assign(targets: Vec<Expr>, values: Vec<Expr>) -> Self {
        Self::new(StatKind::Assign { targets, values })
    }

    #[must_use]
    pub const fn ret(values: Vec<Expr>) -> Self {
        Self::new(StatKind::Return(values))
    }

    /// A call expression used as a statement.
    #[must_use]
    pub const fn call(expr: Expr) -> Self {
        Self::new(StatKind::Call(expr))
    }

    #[must_use]
    pub const fn do_block(body: Block) -> Self {
        Self::new(StatKind::Do(body))
    }

    #[must_use]
    pub const fn while_loop(cond: Expr, body: Block) -> Self {
        Self::new(StatKind::While { cond, body })
    }

    #[must_use]
    pub fn if_then(cond: Expr, then: Block) -> Self {
        Self::new(StatKind::If {
            clauses: vec![(cond, then)],
            else_block: None,
        })
    }

    /// Add an `elseif` clause to an `if` statement.
    #[must_use]
    pub fn elseif(mut self, cond: Expr, block: Block) -> Self {
        if let StatKind::If { clauses, .. } = &mut self.kind {
            clauses.push((cond, block));
        }
        self
    }

    /// Set the `else` block of an `if` statement.
    #[must_use]
    pub fn otherwise(mut self, block: Block) -> Self {
        if let StatKind::If { else_block, .. } = &mut self.kind {
            *else_block = Some(block);
        }
        self
    }
}

impl Expr {
    #[must_use]
    pub const fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::new(0, 0),
            tokens: Vec::new(),
        }
    }

    #[must_use]
    pub const fn nil() -> Self {
        Self::new(ExprKind::Nil)
    }

    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::new(if value { ExprKind::True } else { ExprKind::False })
    }

    /// A number literal, written as given.
    #[must_use]
    pub fn number(text: impl ToString) -> Self {
        Self::new(ExprKind::Number(text.to_string()))
    }

    /// A string literal holding `value`.
    #[must_use]
    pub fn string(value: &str) -> Self {
        Self::new(ExprKind::String(quote_string(value)))
    }

    #[must_use]
    pub fn table(fields: Vec<Field>) -> Self {
        Self::new(ExprKind::Table(Table {
            fields,
            trailing_separator: false,
            tokens: Vec::new(),
        }))
    }

    #[must_use]
    pub fn function(func: FuncBody) -> Self {
        Self::new(ExprKind::Function(func))
    }

    /// `self.name`
    #[must_use]
    pub fn member(self, name: &str) -> Self {
        Self::new(ExprKind::Member {
            base: Box::new(self),
            name: name.to_string(),
        })
    }

    /// `self[key]`
    #[must_use]
    pub fn index(self, key: Self) -> Self {
        Self::new(ExprKind::Index {
            base: Box::new(self),
            key: Box::new(key),
        })
    }

    /// `self(args)`
    #[must_use]
    pub fn call(self, args: Vec<Self>) -> Self {
        Self::new(ExprKind::Call(Call {
            callee: Box::new(self),
            method: None,
            args: CallArgs::Paren(args),
        }))
    }

    /// `self:method(args)`
    #[must_use]
    pub fn method_call(self, method: &str, args: Vec<Self>) -> Self {
        Self::new(ExprKind::Call(Call {
            callee: Box::new(self),
            method: Some(method.to_string()),
            args: CallArgs::Paren(args),
        }))
    }

    /// `(self)`
    #[must_use]
    pub fn paren(self) -> Self {
        Self::new(ExprKind::Paren(Box::new(self)))
    }

    /// `self op rhs`. Operands are parenthesized where precedence
    /// would otherwise regroup them.
    #[must_use]
    pub fn binary(self, op: BinOp, rhs: Self) -> Self {
        let (left, right) = op.precedence();
        let lhs = if binding_power(&self).is_some_and(|p| p < left) {
            self.paren()
        } else {
            self
        };
        let rhs = if binding_power(&rhs).is_some_and(|p| p <= right) {
            rhs.paren()
        } else {
            rhs
        };
        Self::new(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// `op operand`
    #[must_use]
    pub fn unary(op: UnOp, operand: Self) -> Self {
        let operand = match &operand.kind {
            ExprKind::Binary { op, .. } if op.precedence().0 <= crate::ast::UNARY_PRECEDENCE => {
                operand.paren()
            }
            _ => operand,
        };
        Self::new(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }
}

/// Binding power of an operator expression, `None` for atoms.
fn binding_power(expr: &Expr) -> Option<u8> {
    match &expr.kind {
        ExprKind::Binary { op, .. } => Some(op.precedence().0.min(op.precedence().1)),
        ExprKind::Unary { .. } => Some(crate::ast::UNARY_PRECEDENCE),
        _ => None,
    }
}

impl Field {
    /// `name = value`
    #[must_use]
    pub fn named(name: &str, value: Expr) -> Self {
        Self::Named {
            name: name.to_string(),
            value,
        }
    }
}
