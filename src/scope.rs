//! Lexical scope resolution.
//!
//! [`resolve`] walks an [`Ast`] once, in source order, building an arena
//! of scopes and variables and binding every identifier occurrence
//! ([`NameId`]) to the variable it denotes.

use std::collections::HashMap;

use crate::ast::{
    Ast, Block, Call, CallArgs, Expr, ExprKind, Field, FuncBody, Ident, NameId, Stat, StatKind,
    Table,
};

/// Index of a scope in [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

/// Index of a variable in [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Local,
    Global,
    FunctionParam,
    VarargParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Holds globals and the implicit `_ENV`.
    Global,
    /// The main chunk.
    Chunk,
    Function,
    Block,
    Loop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
    pub scope: ScopeId,
    /// 1-based position for parameters, 0 otherwise.
    pub index: usize,
    /// Every occurrence, declaration included, in source order.
    pub references: Vec<NameId>,
    /// Target of an assignment or `function name()` declaration.
    pub assigned: bool,
    /// Declared without a name in the source: `_ENV`, the main chunk's
    /// `...`, and the `self` of `function a:m()`.
    pub implicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Variables in declaration order.
    pub variables: Vec<VarId>,
    pub kind: ScopeKind,
    pub depth: usize,
    names: HashMap<String, VarId>,
}

impl Scope {
    /// Variable currently bound to `name` in this scope alone.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<VarId> {
        self.names.get(name).copied()
    }
}

/// Scopes, variables, and name bindings of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    bindings: Vec<Option<VarId>>,
}

impl ScopeTree {
    pub const GLOBAL: ScopeId = ScopeId(0);
    pub const ROOT: ScopeId = ScopeId(1);

    /// Scope holding globals and `_ENV`.
    #[must_use]
    pub fn global_scope(&self) -> &Scope {
        &self.scopes[Self::GLOBAL.0]
    }

    /// Scope of the main chunk.
    #[must_use]
    pub fn root_scope(&self) -> &Scope {
        &self.scopes[Self::ROOT.0]
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    #[must_use]
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables.iter().enumerate().map(|(i, v)| (VarId(i), v))
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Variable an identifier occurrence is bound to.
    #[must_use]
    pub fn binding(&self, name: NameId) -> Option<VarId> {
        self.bindings.get(name.0).copied().flatten()
    }

    /// Look `name` up from `scope` outwards, using the final state of
    /// each scope.
    #[must_use]
    pub fn lookup(&self, mut scope: ScopeId, name: &str) -> Option<VarId> {
        loop {
            let current = &self.scopes[scope.0];
            if let Some(var) = current.get(name) {
                return Some(var);
            }
            scope = current.parent?;
        }
    }

    /// Globals the document reads but never assigns. Their names
    /// belong to the host environment.
    #[must_use]
    pub fn is_external(&self, var: VarId) -> bool {
        let var = self.variable(var);
        var.kind == VarKind::Global && !var.assigned
    }

    /// Variables whose name may be changed without altering meaning.
    #[must_use]
    pub fn is_renamable(&self, id: VarId) -> bool {
        let var = self.variable(id);
        if var.implicit {
            return false;
        }
        match var.kind {
            VarKind::VarargParam => false,
            VarKind::Global => var.assigned,
            VarKind::Local | VarKind::FunctionParam => {
                var.name != "_ENV" && var.scope != Self::GLOBAL
            }
        }
    }
}

/// Resolve every identifier in `ast` to a scope-owned variable.
#[must_use]
pub fn resolve(ast: &Ast) -> ScopeTree {
    let mut resolver = Resolver::new(ast.name_count);
    resolver.visit_block(&ast.body);
    resolver.tree
}

struct Resolver {
    tree: ScopeTree,
    current: ScopeId,
}

impl Resolver {
    fn new(name_count: usize) -> Self {
        let mut resolver = Self {
            tree: ScopeTree {
                scopes: Vec::new(),
                variables: Vec::new(),
                bindings: vec![None; name_count],
            },
            current: ScopeTree::GLOBAL,
        };
        resolver.push_scope(None, ScopeKind::Global);
        let env = resolver.declare("_ENV", None, VarKind::Local, 0);
        resolver.push_scope(Some(ScopeTree::GLOBAL), ScopeKind::Chunk);
        resolver.current = ScopeTree::ROOT;
        // the main chunk is a vararg function
        let dots = resolver.declare("...", None, VarKind::VarargParam, 0);
        for var in [env, dots] {
            resolver.tree.variables[var.0].implicit = true;
        }
        resolver
    }

    fn push_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.tree.scopes.len());
        let depth = parent.map_or(0, |p| self.tree.scopes[p.0].depth + 1);
        self.tree.scopes.push(Scope {
            id,
            parent,
            children: Vec::new(),
            variables: Vec::new(),
            kind,
            depth,
            names: HashMap::new(),
        });
        if let Some(parent) = parent {
            self.tree.scopes[parent.0].children.push(id);
        }
        id
    }

    fn enter(&mut self, kind: ScopeKind) {
        self.current = self.push_scope(Some(self.current), kind);
    }

    fn leave(&mut self) {
        if let Some(parent) = self.tree.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    fn bind(&mut self, occurrence: NameId, var: VarId) {
        if let Some(slot) = self.tree.bindings.get_mut(occurrence.0) {
            *slot = Some(var);
        } else {
            self.tree.bindings.resize(occurrence.0 + 1, None);
            self.tree.bindings[occurrence.0] = Some(var);
        }
        self.tree.variables[var.0].references.push(occurrence);
    }

    fn declare_in(
        &mut self,
        scope: ScopeId,
        name: &str,
        occurrence: Option<NameId>,
        kind: VarKind,
        index: usize,
    ) -> VarId {
        let id = VarId(self.tree.variables.len());
        self.tree.variables.push(Variable {
            name: name.to_string(),
            kind,
            scope,
            index,
            references: Vec::new(),
            assigned: false,
            implicit: false,
        });
        let scope = &mut self.tree.scopes[scope.0];
        scope.variables.push(id);
        scope.names.insert(name.to_string(), id);
        if let Some(occurrence) = occurrence {
            self.bind(occurrence, id);
        }
        id
    }

    fn declare(
        &mut self,
        name: &str,
        occurrence: Option<NameId>,
        kind: VarKind,
        index: usize,
    ) -> VarId {
        self.declare_in(self.current, name, occurrence, kind, index)
    }

    fn declare_local(&mut self, ident: &Ident) {
        self.declare(&ident.name, Some(ident.id), VarKind::Local, 0);
    }

    fn reference(&mut self, name: &str, occurrence: NameId, assign: bool) {
        let var = match self.tree.lookup(self.current, name) {
            Some(var) => var,
            None if name == "..." => return,
            None => self.declare_in(ScopeTree::GLOBAL, name, None, VarKind::Global, 0),
        };
        self.bind(occurrence, var);
        if assign {
            self.tree.variables[var.0].assigned = true;
        }
    }

    fn visit_block(&mut self, block: &Block) {
        for stat in &block.stats {
            self.visit_stat(stat);
        }
    }

    fn visit_scoped_block(&mut self, block: &Block, kind: ScopeKind) {
        self.enter(kind);
        self.visit_block(block);
        self.leave();
    }

    fn visit_stat(&mut self, stat: &Stat) {
        match &stat.kind {
            StatKind::Assign { targets, values } => {
                for target in targets {
                    if let ExprKind::Name(ident) = &target.kind {
                        self.reference(&ident.name, ident.id, true);
                    } else {
                        self.visit_expr(target);
                    }
                }
                self.visit_exprs(values);
            }
            StatKind::Local { names, values } => {
                // `local x = x` reads the outer `x`
                self.visit_exprs(values);
                for name in names {
                    self.declare_local(name);
                }
            }
            StatKind::Function { name, func } => {
                let plain = name.fields.is_empty() && name.method.is_none();
                self.reference(&name.base.name, name.base.id, plain);
                self.visit_function(func);
            }
            StatKind::LocalFunction { name, func } => {
                self.declare_local(name);
                self.visit_function(func);
            }
            StatKind::If {
                clauses,
                else_block,
            } => {
                for (cond, block) in clauses {
                    self.visit_expr(cond);
                    self.visit_scoped_block(block, ScopeKind::Block);
                }
                if let Some(block) = else_block {
                    self.visit_scoped_block(block, ScopeKind::Block);
                }
            }
            StatKind::While { cond, body } => {
                self.visit_expr(cond);
                self.visit_scoped_block(body, ScopeKind::Loop);
            }
            StatKind::Repeat { body, cond } => {
                // the condition sees the body's locals
                self.enter(ScopeKind::Loop);
                self.visit_block(body);
                self.visit_expr(cond);
                self.leave();
            }
            StatKind::NumericFor {
                var,
                start,
                stop,
                step,
                body,
            } => {
                self.visit_expr(start);
                self.visit_expr(stop);
                if let Some(step) = step {
                    self.visit_expr(step);
                }
                self.enter(ScopeKind::Loop);
                self.declare_local(var);
                self.visit_block(body);
                self.leave();
            }
            StatKind::GenericFor { vars, exprs, body } => {
                self.visit_exprs(exprs);
                self.enter(ScopeKind::Loop);
                for var in vars {
                    self.declare_local(var);
                }
                self.visit_block(body);
                self.leave();
            }
            StatKind::Do(block) => self.visit_scoped_block(block, ScopeKind::Block),
            StatKind::Return(values) => self.visit_exprs(values),
            StatKind::Call(expr) => self.visit_expr(expr),
            StatKind::Break | StatKind::Empty => {}
        }
    }

    fn visit_function(&mut self, func: &FuncBody) {
        self.enter(ScopeKind::Function);
        let mut index = 1;
        if let Some(self_param) = func.self_param {
            let this = self.declare("self", Some(self_param), VarKind::FunctionParam, index);
            self.tree.variables[this.0].implicit = true;
            index += 1;
        }
        for param in &func.params {
            self.declare(&param.name, Some(param.id), VarKind::FunctionParam, index);
            index += 1;
        }
        if let Some(vararg) = func.vararg {
            self.declare("...", Some(vararg), VarKind::VarargParam, 0);
        }
        self.visit_block(&func.body);
        self.leave();
    }

    fn visit_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Nil
            | ExprKind::True
            | ExprKind::False
            | ExprKind::Number(_)
            | ExprKind::String(_) => {}
            ExprKind::Vararg(id) => self.reference("...", *id, false),
            ExprKind::Name(ident) => self.reference(&ident.name, ident.id, false),
            ExprKind::Function(func) => self.visit_function(func),
            ExprKind::Table(table) => self.visit_table(table),
            ExprKind::Index { base, key } => {
                self.visit_expr(base);
                self.visit_expr(key);
            }
            ExprKind::Member { base, .. } => self.visit_expr(base),
            ExprKind::Call(Call { callee, args, .. }) => {
                self.visit_expr(callee);
                match args {
                    CallArgs::Paren(args) => self.visit_exprs(args),
                    CallArgs::Table(table) => self.visit_table(table),
                    CallArgs::Str(_) => {}
                }
            }
            ExprKind::Paren(inner) => self.visit_expr(inner),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(operand),
        }
    }

    fn visit_table(&mut self, table: &Table) {
        for field in &table.fields {
            match field {
                Field::Positional(value) | Field::Named { value, .. } => self.visit_expr(value),
                Field::Keyed { key, value } => {
                    self.visit_expr(key);
                    self.visit_expr(value);
                }
            }
        }
    }
}
