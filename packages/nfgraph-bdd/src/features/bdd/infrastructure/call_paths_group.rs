//! Call path partitioning
//!
//! Groups the call paths that sit at the same build position by their next
//! pending call. When the paths disagree, finds a constraint that sends
//! every path to exactly one side of a branch.

use crate::errors::{BddError, BddResult};
use crate::features::solver::{Entailment, SolverToolbox};
use crate::shared::models::{Arg, Call, CallPath, ConstraintSet, Expr};
use tracing::trace;

/// Read position inside one call path
///
/// The builder consumes calls front to back through cursors; the input
/// paths are never mutated.
#[derive(Debug, Clone, Copy)]
pub struct CallPathCursor<'a> {
    path: &'a CallPath,
    position: usize,
}

impl<'a> CallPathCursor<'a> {
    pub fn new(path: &'a CallPath) -> Self {
        Self { path, position: 0 }
    }

    pub fn next_call(&self) -> Option<&'a Call> {
        self.path.calls.get(self.position)
    }

    /// Cursor past the next call
    pub fn advance(self) -> Self {
        Self {
            position: (self.position + 1).min(self.path.calls.len()),
            ..self
        }
    }

    pub fn constraints(&self) -> &'a ConstraintSet {
        &self.path.constraints
    }

    pub fn path(&self) -> &'a CallPath {
        self.path
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

/// Partition of call paths by next call
#[derive(Debug)]
pub struct CallPathsGroup<'a> {
    on_true: Vec<CallPathCursor<'a>>,
    on_false: Vec<CallPathCursor<'a>>,
    discriminating_constraint: Option<Expr>,
}

impl<'a> CallPathsGroup<'a> {
    /// Partition `paths`
    ///
    /// Candidates are tried in input order; the first candidate group that
    /// either covers every path or admits a discriminating constraint wins.
    pub fn new(paths: &[CallPathCursor<'a>], solver: &dyn SolverToolbox) -> BddResult<Self> {
        let mut tried = vec![false; paths.len()];

        for candidate in 0..paths.len() {
            if tried[candidate] {
                continue;
            }
            let next = paths[candidate].next_call();

            let mut on_true = Vec::new();
            let mut on_false = Vec::new();
            for (i, path) in paths.iter().enumerate() {
                if same_next_call(next, path.next_call(), solver)? {
                    tried[i] = true;
                    on_true.push(*path);
                } else {
                    on_false.push(*path);
                }
            }

            if on_false.is_empty() {
                return Ok(Self {
                    on_true,
                    on_false,
                    discriminating_constraint: None,
                });
            }

            trace!(
                "Group on {}: {} agree, {} differ",
                next.map_or("<end>", |c| c.function_name.as_str()),
                on_true.len(),
                on_false.len()
            );

            if let Some(group) = Self::split(paths, &on_true, solver)? {
                return Ok(group);
            }
        }

        Err(BddError::UnpartitionableGroup {
            paths: paths.iter().map(|p| p.path().name.clone()).collect(),
        })
    }

    /// Search the first agreeing path's constraints for one that every
    /// agreeing path entails and every other path decides
    fn split(
        paths: &[CallPathCursor<'a>],
        agreeing: &[CallPathCursor<'a>],
        solver: &dyn SolverToolbox,
    ) -> BddResult<Option<Self>> {
        let Some(first) = agreeing.first() else {
            return Ok(None);
        };

        'candidates: for constraint in first.constraints() {
            for path in agreeing {
                if !solver.is_expr_always_true(path.constraints(), constraint)? {
                    continue 'candidates;
                }
            }

            let mut on_true = Vec::new();
            let mut on_false = Vec::new();
            for path in paths {
                match solver.check(path.constraints(), constraint)? {
                    Entailment::AlwaysTrue => on_true.push(*path),
                    Entailment::AlwaysFalse => on_false.push(*path),
                    Entailment::Maybe => continue 'candidates,
                }
            }

            if !on_false.is_empty() {
                return Ok(Some(Self {
                    on_true,
                    on_false,
                    discriminating_constraint: Some(constraint.clone()),
                }));
            }
        }

        Ok(None)
    }

    pub fn on_true(&self) -> &[CallPathCursor<'a>] {
        &self.on_true
    }

    pub fn on_false(&self) -> &[CallPathCursor<'a>] {
        &self.on_false
    }

    pub fn get_discriminating_constraint(&self) -> Option<&Expr> {
        self.discriminating_constraint.as_ref()
    }

    pub fn into_parts(self) -> (Vec<CallPathCursor<'a>>, Vec<CallPathCursor<'a>>, Option<Expr>) {
        (self.on_true, self.on_false, self.discriminating_constraint)
    }
}

fn same_next_call(a: Option<&Call>, b: Option<&Call>, solver: &dyn SolverToolbox) -> BddResult<bool> {
    match (a, b) {
        (None, None) => Ok(true),
        (Some(a), Some(b)) => are_calls_equal(a, b, solver),
        _ => Ok(false),
    }
}

/// Whether two calls can share one call node
///
/// Names and argument keys must match. Output arguments are not compared;
/// input snapshots and plain values must be equal in every model.
pub fn are_calls_equal(a: &Call, b: &Call, solver: &dyn SolverToolbox) -> BddResult<bool> {
    if a.function_name != b.function_name || !a.args.keys().eq(b.args.keys()) {
        return Ok(false);
    }

    for (name, arg_a) in &a.args {
        let Some(arg_b) = b.args.get(name) else {
            return Ok(false);
        };
        if !are_args_equal(arg_a, arg_b, solver)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn are_args_equal(a: &Arg, b: &Arg, solver: &dyn SolverToolbox) -> BddResult<bool> {
    if a.is_output() || b.is_output() {
        return Ok(true);
    }
    Ok(are_optional_exprs_equal(&a.before, &b.before, solver)?
        && are_optional_exprs_equal(&a.expr, &b.expr, solver)?)
}

fn are_optional_exprs_equal(
    a: &Option<Expr>,
    b: &Option<Expr>,
    solver: &dyn SolverToolbox,
) -> BddResult<bool> {
    match (a, b) {
        (None, None) => Ok(true),
        (Some(a), Some(b)) => Ok(solver.are_exprs_always_equal(&ConstraintSet::new(), a, b)?),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::solver::EnumeratingSolver;

    fn pkt() -> Expr {
        Expr::symbol("pkt", 8)
    }

    fn path(name: &str, calls: &[&str], constraints: Vec<Expr>) -> CallPath {
        let mut p = CallPath::new(name);
        for call in calls {
            p = p.with_call(Call::new(*call));
        }
        for c in constraints {
            p = p.with_constraint(c);
        }
        p
    }

    #[test]
    fn test_identical_calls_merge() {
        let solver = EnumeratingSolver::default();
        let a = path("a", &["rx", "tx"], vec![pkt().ult(Expr::constant(5, 8))]);
        let b = path("b", &["rx", "tx"], vec![pkt().uge(Expr::constant(5, 8))]);
        let cursors = [CallPathCursor::new(&a), CallPathCursor::new(&b)];

        let group = CallPathsGroup::new(&cursors, &solver).unwrap();
        assert_eq!(group.on_true().len(), 2);
        assert!(group.on_false().is_empty());
        assert!(group.get_discriminating_constraint().is_none());
    }

    #[test]
    fn test_divergent_calls_split() {
        let solver = EnumeratingSolver::default();
        let lt = pkt().ult(Expr::constant(5, 8));
        let a = path("a", &["tx"], vec![lt.clone()]);
        let b = path("b", &["drop"], vec![lt.clone().not()]);
        let cursors = [CallPathCursor::new(&a), CallPathCursor::new(&b)];

        let group = CallPathsGroup::new(&cursors, &solver).unwrap();
        assert_eq!(group.get_discriminating_constraint(), Some(&lt));
        assert_eq!(group.on_true()[0].path().name, "a");
        assert_eq!(group.on_false()[0].path().name, "b");
    }

    #[test]
    fn test_split_moves_entailing_paths() {
        let solver = EnumeratingSolver::default();
        let lt = pkt().ult(Expr::constant(5, 8));
        let a = path("a", &["tx"], vec![lt.clone()]);
        let b = path("b", &["drop"], vec![lt.clone().not()]);
        let c = path("c", &["log"], vec![lt.clone(), pkt().equals(Expr::constant(1, 8))]);
        let cursors = [
            CallPathCursor::new(&a),
            CallPathCursor::new(&b),
            CallPathCursor::new(&c),
        ];

        let group = CallPathsGroup::new(&cursors, &solver).unwrap();
        let names: Vec<_> = group.on_true().iter().map(|p| p.path().name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(group.on_false().len(), 1);
    }

    #[test]
    fn test_unpartitionable() {
        let solver = EnumeratingSolver::default();
        let a = path("a", &["tx"], vec![]);
        let b = path("b", &["drop"], vec![]);
        let cursors = [CallPathCursor::new(&a), CallPathCursor::new(&b)];

        let err = CallPathsGroup::new(&cursors, &solver).unwrap_err();
        assert!(matches!(err, BddError::UnpartitionableGroup { paths } if paths == ["a", "b"]));
    }

    #[test]
    fn test_call_equality_ignores_outputs() {
        let solver = EnumeratingSolver::default();
        let a = Call::new("map_get")
            .with_arg("key", Arg::value(Expr::constant(3, 16)))
            .with_arg("out", Arg::buffer(Expr::constant(0, 64), Expr::constant(0, 32), Some(Expr::symbol("v", 32))));
        let b = Call::new("map_get")
            .with_arg("key", Arg::value(Expr::constant(3, 16)))
            .with_arg("out", Arg::buffer(Expr::constant(0, 64), Expr::constant(0, 32), Some(Expr::symbol("v_1", 32))));
        assert!(are_calls_equal(&a, &b, &solver).unwrap());

        let c = a.clone().with_arg("key", Arg::value(Expr::constant(4, 16)));
        assert!(!are_calls_equal(&a, &c, &solver).unwrap());
    }

    #[test]
    fn test_cursor_advance_saturates() {
        let p = path("p", &["rx"], vec![]);
        let cursor = CallPathCursor::new(&p).advance().advance();
        assert_eq!(cursor.position(), 1);
        assert!(cursor.next_call().is_none());
    }
}
