//! Variable renaming.
//!
//! A [`Renaming`] maps every [`VarId`] of a [`ScopeTree`] to the name
//! the serializer prints for it. External globals, `_ENV`, `...`, and
//! the implicit `self` of methods always keep their source names.

use std::collections::HashSet;

use crate::scope::{ScopeId, ScopeTree, VarId, VarKind};
use crate::token::KEYWORDS;

/// Output name of every variable, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renaming {
    names: Vec<String>,
}

impl Renaming {
    /// Keep every variable's source name.
    #[must_use]
    pub fn identity(tree: &ScopeTree) -> Self {
        Self {
            names: tree.variables().map(|(_, v)| v.name.clone()).collect(),
        }
    }

    /// Shortest names first: `a`..`z`, `aa`, `ab`, ...
    ///
    /// Assigned globals are named in order of first appearance and keep
    /// their names reserved everywhere. Locals are named scope by scope,
    /// depth first, and reuse names freely across sibling scopes.
    #[must_use]
    pub fn minify(tree: &ScopeTree) -> Self {
        let mut renaming = Self::identity(tree);
        let reserved = reserved_names(tree);

        let mut taken = HashSet::new();
        let mut next = 0;
        for &var in &tree.global_scope().variables {
            if !tree.is_renamable(var) {
                continue;
            }
            let name = loop {
                let candidate = short_name(next);
                next += 1;
                if !reserved.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(name.clone());
            renaming.names[var.0] = name;
        }

        renaming.minify_scope(tree, ScopeTree::ROOT, &reserved, &taken);
        renaming
    }

    fn minify_scope(
        &mut self,
        tree: &ScopeTree,
        scope: ScopeId,
        reserved: &HashSet<String>,
        enclosing: &HashSet<String>,
    ) {
        let mut taken = enclosing.clone();
        for &var in &tree.scope(scope).variables {
            if !tree.is_renamable(var) {
                taken.insert(tree.variable(var).name.clone());
                continue;
            }
            let name = (0..)
                .map(short_name)
                .find(|candidate| !reserved.contains(candidate) && !taken.contains(candidate))
                .unwrap_or_default();
            taken.insert(name.clone());
            self.names[var.0] = name;
        }
        for &child in &tree.scope(scope).children {
            self.minify_scope(tree, child, reserved, &taken);
        }
    }

    /// Descriptive names: `G_n` for assigned globals, `L_n_argK` for
    /// parameters and `L_n_k` for locals of the n-th scope that
    /// declares any. Clashes with external names get `_` appended.
    #[must_use]
    pub fn beautify(tree: &ScopeTree) -> Self {
        let mut renaming = Self::identity(tree);
        let reserved = reserved_names(tree);

        let mut counter = 0;
        for &var in &tree.global_scope().variables {
            if tree.is_renamable(var) {
                counter += 1;
                renaming.names[var.0] = unclash(format!("G_{counter}"), &reserved);
            }
        }

        let mut scope_counter = 0;
        renaming.beautify_scope(tree, ScopeTree::ROOT, &reserved, &mut scope_counter);
        renaming
    }

    fn beautify_scope(
        &mut self,
        tree: &ScopeTree,
        scope: ScopeId,
        reserved: &HashSet<String>,
        scope_counter: &mut usize,
    ) {
        let renamable: Vec<VarId> = tree
            .scope(scope)
            .variables
            .iter()
            .copied()
            .filter(|&var| tree.is_renamable(var))
            .collect();

        if !renamable.is_empty() {
            *scope_counter += 1;
            let n = *scope_counter;
            let mut local = 0;
            for var in renamable {
                let variable = tree.variable(var);
                let name = if variable.kind == VarKind::FunctionParam {
                    format!("L_{n}_arg{}", variable.index)
                } else {
                    local += 1;
                    format!("L_{n}_{local}")
                };
                self.names[var.0] = unclash(name, reserved);
            }
        }

        for &child in &tree.scope(scope).children {
            self.beautify_scope(tree, child, reserved, scope_counter);
        }
    }

    /// Output name of `var`.
    #[must_use]
    pub fn name(&self, var: VarId) -> &str {
        &self.names[var.0]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Keywords plus every name that cannot change: external globals,
/// `_ENV`, `self`.
fn reserved_names(tree: &ScopeTree) -> HashSet<String> {
    KEYWORDS
        .iter()
        .chain(&["goto"])
        .map(|k| (*k).to_string())
        .chain(
            tree.variables()
                .filter(|(id, _)| !tree.is_renamable(*id))
                .map(|(_, v)| v.name.clone()),
        )
        .collect()
}

fn unclash(mut name: String, reserved: &HashSet<String>) -> String {
    while reserved.contains(&name) {
        name.push('_');
    }
    name
}

/// Bijective base-26 name: 0 is `a`, 25 is `z`, 26 is `aa`.
#[must_use]
pub fn short_name(mut index: usize) -> String {
    let mut bytes = Vec::new();
    loop {
        bytes.push(b'a' + u8::try_from(index % 26).unwrap_or(0));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    bytes.reverse();
    String::from_utf8(bytes).unwrap_or_default()
}
