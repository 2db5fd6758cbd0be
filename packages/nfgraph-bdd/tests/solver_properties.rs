//! Property-based tests for the enumerating oracle

use nfgraph_bdd::{ConstraintSet, EnumeratingSolver, Entailment, Expr, SolverError, SolverToolbox};
use proptest::prelude::*;

fn x() -> Expr {
    Expr::symbol("x", 8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_constant_comparison_is_decided(a in any::<u8>(), b in any::<u8>()) {
        let solver = EnumeratingSolver::default();
        let query = Expr::constant(a as u64, 8).ult(Expr::constant(b as u64, 8));
        let expected = if a < b { Entailment::AlwaysTrue } else { Entailment::AlwaysFalse };
        prop_assert_eq!(solver.check(&ConstraintSet::new(), &query).unwrap(), expected);
    }

    #[test]
    fn prop_upper_bound_entailment(bound in 1u64..=255, query in 0u64..=255) {
        // x < bound |= x < query
        let solver = EnumeratingSolver::default();
        let constraints: ConstraintSet =
            [x().ult(Expr::constant(bound, 8))].into_iter().collect();
        let answer = solver
            .check(&constraints, &x().ult(Expr::constant(query, 8)))
            .unwrap();

        let expected = if query >= bound {
            Entailment::AlwaysTrue
        } else if query == 0 {
            Entailment::AlwaysFalse
        } else {
            Entailment::Maybe
        };
        prop_assert_eq!(answer, expected);
        prop_assert_eq!(
            solver.is_expr_always_false(&constraints, &x().ult(Expr::constant(query, 8))).unwrap(),
            expected == Entailment::AlwaysFalse
        );
    }

    #[test]
    fn prop_pinned_symbol_has_value(value in any::<u8>()) {
        let solver = EnumeratingSolver::default();
        let constraints: ConstraintSet =
            [x().equals(Expr::constant(value as u64, 8))].into_iter().collect();
        prop_assert_eq!(solver.value_from_expr(&constraints, &x()).unwrap(), value as u64);
    }
}

#[test]
fn test_contradiction_is_unsatisfiable() {
    let solver = EnumeratingSolver::default();
    let constraints: ConstraintSet = [
        x().ult(Expr::constant(3, 8)),
        x().ugt(Expr::constant(7, 8)),
    ]
    .into_iter()
    .collect();

    let err = solver.check(&constraints, &Expr::bool(true)).unwrap_err();
    assert!(matches!(err, SolverError::Unsatisfiable(_)));
}

#[test]
fn test_non_boolean_query_rejected() {
    let solver = EnumeratingSolver::default();
    let err = solver.check(&ConstraintSet::new(), &x()).unwrap_err();
    assert!(matches!(err, SolverError::NotBoolean { width: 8, .. }));
}

#[test]
fn test_created_symbols_are_fresh() {
    let solver = EnumeratingSolver::default();
    let first = solver.create_symbol("len", 16);
    let second = solver.create_symbol("len", 16);
    assert_ne!(first, second);
    assert_eq!(first.width(), 16);
}
