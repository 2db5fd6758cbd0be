//! Test fixtures
//!
//! Every query stays within two exhaustively enumerated 8-bit symbols.

use super::builders::CallPathBuilder;
use nfgraph_bdd::{Bdd, BddConfig, CallPath, EnumeratingSolver, Expr, Preset};

/// 8-bit packet field the fixtures branch on
pub fn pkt() -> Expr {
    Expr::symbol("pkt", 8)
}

pub fn pkt_below(bound: u64) -> Expr {
    pkt().ult(Expr::constant(bound, 8))
}

pub fn vigor() -> BddConfig {
    BddConfig::preset(Preset::Vigor)
}

/// Build with the default oracle and the vigor conventions
pub fn build(paths: &[CallPath]) -> Bdd {
    let solver = EnumeratingSolver::default();
    Bdd::from_call_paths(paths, &solver, &vigor()).unwrap()
}

/// Forward small packets to port 1, drop the rest
pub fn forward_or_drop() -> Vec<CallPath> {
    vec![
        CallPathBuilder::new("forward")
            .with_start()
            .with_receive()
            .with_send(1)
            .with_constraint(pkt_below(10))
            .build(),
        CallPathBuilder::new("drop")
            .with_start()
            .with_receive()
            .with_free()
            .with_constraint(pkt_below(10).not())
            .build(),
    ]
}
