//! Three-valued entailment results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer to "does `expr` hold under these constraints"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entailment {
    /// Holds in every model of the constraints
    AlwaysTrue,
    /// Fails in every model of the constraints
    AlwaysFalse,
    /// Holds in some models and fails in others
    Maybe,
}

impl Entailment {
    pub fn from_observed(saw_true: bool, saw_false: bool) -> Self {
        match (saw_true, saw_false) {
            (true, false) => Entailment::AlwaysTrue,
            (false, true) => Entailment::AlwaysFalse,
            _ => Entailment::Maybe,
        }
    }

    pub fn is_maybe_true(self) -> bool {
        self != Entailment::AlwaysFalse
    }

    pub fn is_maybe_false(self) -> bool {
        self != Entailment::AlwaysTrue
    }

    /// Entailment of the negated expression
    pub fn negate(self) -> Self {
        match self {
            Entailment::AlwaysTrue => Entailment::AlwaysFalse,
            Entailment::AlwaysFalse => Entailment::AlwaysTrue,
            Entailment::Maybe => Entailment::Maybe,
        }
    }
}

impl fmt::Display for Entailment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entailment::AlwaysTrue => write!(f, "always-true"),
            Entailment::AlwaysFalse => write!(f, "always-false"),
            Entailment::Maybe => write!(f, "maybe"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negate() {
        assert_eq!(Entailment::AlwaysTrue.negate(), Entailment::AlwaysFalse);
        assert_eq!(Entailment::Maybe.negate(), Entailment::Maybe);
    }

    #[test]
    fn test_maybe_predicates() {
        assert!(Entailment::Maybe.is_maybe_true());
        assert!(Entailment::Maybe.is_maybe_false());
        assert!(!Entailment::AlwaysFalse.is_maybe_true());
        assert!(!Entailment::AlwaysTrue.is_maybe_false());
    }
}
