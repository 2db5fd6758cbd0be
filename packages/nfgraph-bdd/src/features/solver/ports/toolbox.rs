//! Oracle port
//!
//! Every structural decision of the builder goes through this trait. The
//! handle is passed explicitly into each construction call.

use crate::features::solver::domain::{Entailment, SolverResult};
use crate::shared::models::{ConstraintSet, Expr};

/// Synchronous, side-effect-free query service over symbolic expressions
///
/// Implementations must never answer both always-true and always-false for
/// the same (constraints, expression) pair.
pub trait SolverToolbox {
    /// Fresh symbol of the given width, labelled after `base`
    fn create_symbol(&self, base: &str, width: u32) -> Expr;

    /// Three-valued entailment of a boolean `expr` under `constraints`
    fn check(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<Entailment>;

    /// Value of an expression that is constant under `constraints`
    fn value_from_expr(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<u64>;

    fn is_expr_always_true(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<bool> {
        Ok(self.check(constraints, expr)? == Entailment::AlwaysTrue)
    }

    fn is_expr_always_false(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<bool> {
        Ok(self.check(constraints, expr)? == Entailment::AlwaysFalse)
    }

    fn is_expr_maybe_true(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<bool> {
        Ok(self.check(constraints, expr)?.is_maybe_true())
    }

    fn is_expr_maybe_false(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<bool> {
        Ok(self.check(constraints, expr)?.is_maybe_false())
    }

    /// Whether `a == b` in every model of `constraints`
    fn are_exprs_always_equal(
        &self,
        constraints: &ConstraintSet,
        a: &Expr,
        b: &Expr,
    ) -> SolverResult<bool> {
        if a == b {
            return Ok(true);
        }
        if a.width() != b.width() {
            return Ok(false);
        }
        self.is_expr_always_true(constraints, &a.clone().equals(b.clone()))
    }
}
