//! Shared domain models

pub mod call;
pub mod constraint_set;
pub mod expr;

pub use call::{Arg, Call, CallPath};
pub use constraint_set::ConstraintSet;
pub use expr::{
    mask, symbol_base_matches, Assignment, Expr, ExprError, ExprRewriter, ExprVisitor,
    SymbolRenamer, MAX_WIDTH,
};
