//! Lua syntax tree.
//!
//! Nodes own their children exclusively. Tokens are referenced by
//! [`TokenId`] into [`Ast::tokens`], and every identifier occurrence
//! carries a [`NameId`] that the scope resolver binds to a variable.

use crate::token::{Span, Token};

/// Index of a token in [`Ast::tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub usize);

/// Unique id of one identifier occurrence (declaration or use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(pub usize);

/// A parsed Lua chunk together with the tokens it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub body: Block,
    /// Full token stream, `Eof` last. Empty for built ASTs.
    pub tokens: Vec<Token>,
    /// Number of [`NameId`]s handed out; ids are `0..name_count`.
    pub name_count: usize,
}

impl Ast {
    /// The `Eof` token, whose trivia is the document's trailing text.
    #[must_use]
    pub fn eof(&self) -> Option<&Token> {
        self.tokens.last()
    }

    #[must_use]
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.0)
    }
}

/// A flat sequence of statements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub stats: Vec<Stat>,
}

/// An identifier in binding or reference position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub id: NameId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub kind: StatKind,
    pub span: Span,
    /// This statement's own tokens in source order.
    pub tokens: Vec<TokenId>,
    /// `;` directly following the statement.
    pub semicolon: Option<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatKind {
    /// `a, b.c, d[e] = x, y`
    Assign { targets: Vec<Expr>, values: Vec<Expr> },
    /// `local a, b = x, y`
    Local { names: Vec<Ident>, values: Vec<Expr> },
    /// `function a.b:c() end`
    Function { name: FuncName, func: FuncBody },
    /// `local function f() end`
    LocalFunction { name: Ident, func: FuncBody },
    /// `if c then ... elseif d then ... else ... end`
    If {
        clauses: Vec<(Expr, Block)>,
        else_block: Option<Block>,
    },
    While { cond: Expr, body: Block },
    Repeat { body: Block, cond: Expr },
    NumericFor {
        var: Ident,
        start: Expr,
        stop: Expr,
        step: Option<Expr>,
        body: Block,
    },
    GenericFor {
        vars: Vec<Ident>,
        exprs: Vec<Expr>,
        body: Block,
    },
    Do(Block),
    Return(Vec<Expr>),
    Break,
    /// A call used as a statement.
    Call(Expr),
    /// A lone `;`.
    Empty,
}

/// Name of a non-local function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncName {
    pub base: Ident,
    pub fields: Vec<String>,
    pub method: Option<String>,
}

/// Parameters and body shared by function literals and declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncBody {
    /// Implicit `self` of `function a:b()`.
    pub self_param: Option<NameId>,
    pub params: Vec<Ident>,
    /// Present when the parameter list ends in `...`.
    pub vararg: Option<NameId>,
    pub body: Block,
    /// `(`, parameters, commas, `...`, `)`, `end`.
    pub tokens: Vec<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub tokens: Vec<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Nil,
    True,
    False,
    Vararg(NameId),
    /// Verbatim number text.
    Number(String),
    /// Verbatim string text, quotes or long brackets included.
    String(String),
    Name(Ident),
    Function(FuncBody),
    Table(Table),
    Index { base: Box<Expr>, key: Box<Expr> },
    Member { base: Box<Expr>, name: String },
    Call(Call),
    Paren(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary { op: UnOp, operand: Box<Expr> },
}

/// `f(args)` or `obj:method(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub callee: Box<Expr>,
    pub method: Option<String>,
    pub args: CallArgs,
}

/// Call arguments, tagged with the syntax that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgs {
    /// `f(a, b)`
    Paren(Vec<Expr>),
    /// `f"str"` / `f[[str]]`
    Str(String),
    /// `f{...}`
    Table(Table),
}

/// Which syntax a call used for its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    Paren,
    String,
    Table,
}

impl CallArgs {
    #[must_use]
    pub const fn style(&self) -> CallStyle {
        match self {
            Self::Paren(_) => CallStyle::Paren,
            Self::Str(_) => CallStyle::String,
            Self::Table(_) => CallStyle::Table,
        }
    }
}

/// Table constructor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub fields: Vec<Field>,
    /// `{1, 2,}`
    pub trailing_separator: bool,
    /// `{`, field names, `=`, `[`, `]`, separators, `}`.
    pub tokens: Vec<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// `value`
    Positional(Expr),
    /// `name = value`
    Named { name: String, value: Expr },
    /// `[key] = value`
    Keyed { key: Expr, value: Expr },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    And,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
    Eq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
}

impl BinOp {
    /// Map an operator token to its operator.
    #[must_use]
    pub fn from_token(text: &str) -> Option<Self> {
        Some(match text {
            "or" => Self::Or,
            "and" => Self::And,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "~=" => Self::Ne,
            "==" => Self::Eq,
            "|" => Self::BitOr,
            "~" => Self::BitXor,
            "&" => Self::BitAnd,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            ".." => Self::Concat,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "//" => Self::IDiv,
            "%" => Self::Mod,
            "^" => Self::Pow,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Ne => "~=",
            Self::Eq => "==",
            Self::BitOr => "|",
            Self::BitXor => "~",
            Self::BitAnd => "&",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Concat => "..",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::IDiv => "//",
            Self::Mod => "%",
            Self::Pow => "^",
        }
    }

    /// Left and right binding power. Right-associative operators bind
    /// tighter on the left.
    #[must_use]
    pub const fn precedence(self) -> (u8, u8) {
        match self {
            Self::Or => (1, 1),
            Self::And => (2, 2),
            Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::Ne | Self::Eq => (3, 3),
            Self::BitOr => (4, 4),
            Self::BitXor => (5, 5),
            Self::BitAnd => (6, 6),
            Self::Shl | Self::Shr => (7, 7),
            Self::Concat => (9, 8),
            Self::Add | Self::Sub => (10, 10),
            Self::Mul | Self::Div | Self::IDiv | Self::Mod => (11, 11),
            Self::Pow => (14, 13),
        }
    }
}

/// Binding power of unary operators.
pub const UNARY_PRECEDENCE: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
    Neg,
    Len,
    BitNot,
}

impl UnOp {
    #[must_use]
    pub fn from_token(text: &str) -> Option<Self> {
        Some(match text {
            "not" => Self::Not,
            "-" => Self::Neg,
            "#" => Self::Len,
            "~" => Self::BitNot,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Neg => "-",
            Self::Len => "#",
            Self::BitNot => "~",
        }
    }
}

impl Expr {
    /// Targets that may appear on the left of `=`.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Name(_) | ExprKind::Index { .. } | ExprKind::Member { .. }
        )
    }

    /// True if the leftmost token of this expression is `(`.
    #[must_use]
    pub fn starts_with_paren(&self) -> bool {
        match &self.kind {
            ExprKind::Paren(_) => true,
            ExprKind::Index { base, .. } | ExprKind::Member { base, .. } => {
                base.starts_with_paren()
            }
            ExprKind::Call(call) => call.callee.starts_with_paren(),
            ExprKind::Binary { lhs, .. } => lhs.starts_with_paren(),
            _ => false,
        }
    }
}

impl Stat {
    /// True if the statement's first token is `(`, meaning it would
    /// continue a preceding call if not separated by `;`.
    #[must_use]
    pub fn starts_with_paren(&self) -> bool {
        match &self.kind {
            StatKind::Call(expr) => expr.starts_with_paren(),
            StatKind::Assign { targets, .. } => {
                targets.first().is_some_and(Expr::starts_with_paren)
            }
            _ => false,
        }
    }

    /// `return` and `break` end their block.
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(self.kind, StatKind::Return(_) | StatKind::Break)
    }
}
