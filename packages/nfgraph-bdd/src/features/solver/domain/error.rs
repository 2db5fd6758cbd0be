//! Oracle errors

use crate::shared::models::ExprError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// No model satisfies the constraint set
    #[error("Unsatisfiable constraints: {0}")]
    Unsatisfiable(String),

    #[error("Expected a boolean expression, found width {width}: {expr}")]
    NotBoolean { expr: String, width: u32 },

    #[error("Query needs {required} assignments, budget is {budget}")]
    BudgetExceeded { required: u64, budget: u64 },

    #[error("Expression is not constant under the constraints: {0}")]
    NotConstant(String),

    /// No model among the values tried, with some domain incomplete
    #[error("No model found among boundary values: {0}")]
    Inconclusive(String),

    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),
}

pub type SolverResult<T> = Result<T, SolverError>;
