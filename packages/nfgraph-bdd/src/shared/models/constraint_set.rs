//! Ordered, de-duplicated conjunction of boolean expressions

use super::expr::{Expr, ExprRewriter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Conjunction of width-1 expressions
///
/// Insertion order is preserved so that the constraints a path reports
/// read root to leaf. Structural duplicates are dropped on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    exprs: Vec<Expr>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint; returns false if it was already present
    pub fn push(&mut self, expr: Expr) -> bool {
        if self.exprs.contains(&expr) {
            return false;
        }
        self.exprs.push(expr);
        true
    }

    /// Copy with one more constraint
    pub fn with(&self, expr: Expr) -> Self {
        let mut next = self.clone();
        next.push(expr);
        next
    }

    /// Copy with every constraint of `other` appended
    pub fn union(&self, other: &ConstraintSet) -> Self {
        let mut next = self.clone();
        next.extend(other.iter().cloned());
        next
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.exprs.iter()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn contains(&self, expr: &Expr) -> bool {
        self.exprs.contains(expr)
    }

    /// Every symbol referenced by any constraint
    pub fn symbols(&self) -> BTreeMap<String, u32> {
        let mut symbols = BTreeMap::new();
        for expr in &self.exprs {
            for (name, width) in expr.symbols() {
                symbols.entry(name).or_insert(width);
            }
        }
        symbols
    }

    pub fn rewrite(&mut self, rewriter: &mut dyn ExprRewriter) {
        for expr in &mut self.exprs {
            expr.rewrite(rewriter);
        }
        self.dedup();
    }

    pub fn rename_symbols(&mut self, renames: &BTreeMap<String, String>) {
        for expr in &mut self.exprs {
            expr.rename_symbols(renames);
        }
        self.dedup();
    }

    fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.exprs.len());
        for expr in self.exprs.drain(..) {
            if !seen.contains(&expr) {
                seen.push(expr);
            }
        }
        self.exprs = seen;
    }
}

impl Extend<Expr> for ConstraintSet {
    fn extend<I: IntoIterator<Item = Expr>>(&mut self, iter: I) {
        for expr in iter {
            self.push(expr);
        }
    }
}

impl FromIterator<Expr> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
        let mut set = ConstraintSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ConstraintSet {
    type Item = Expr;
    type IntoIter = std::vec::IntoIter<Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.exprs.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.exprs.iter()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, expr) in self.exprs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", expr)?;
        }
        write!(f, "]")
    }
}
