//! Process view simplification: identical terminals collapse, and branches
//! on "no packet" style conditions lose their empty arm.

mod common;

use common::*;
use nfgraph_bdd::{Call, CallPath, Expr, NodeKind, NodeType, ProcessOperation, ReturnProcess};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Paths that only disagree on a trailing loop invariant call
fn trailing_invariant(first_port: u64, second_port: u64) -> Vec<CallPath> {
    vec![
        CallPathBuilder::new("with_invariant")
            .with_start()
            .with_receive()
            .with_send(first_port)
            .with_named_call("loop_invariant_consume")
            .with_constraint(pkt_below(10))
            .build(),
        CallPathBuilder::new("without_invariant")
            .with_start()
            .with_receive()
            .with_send(second_port)
            .with_constraint(pkt_below(10).not())
            .build(),
    ]
}

fn received() -> Expr {
    Expr::symbol("received_a_packet", 8)
}

fn receive_with_flag() -> Call {
    Call::new("packet_receive").with_ret(received())
}

#[test]
fn test_identical_terminals_collapse() {
    let bdd = build(&trailing_invariant(4, 4));

    assert_no_branch(&bdd, bdd.get_process());
    assert_eq!(
        view_types(&bdd, bdd.get_process()),
        vec![NodeType::Call, NodeType::Call, NodeType::ReturnProcess]
    );
    assert_eq!(
        LeafCollector::collect(&bdd).process,
        vec![ReturnProcess::new(ProcessOperation::Forward, 4)]
    );
    bdd.validate().unwrap();
}

#[test]
fn test_distinct_ports_keep_branch() {
    let bdd = build(&trailing_invariant(1, 2));

    let leaves = LeafCollector::collect(&bdd);
    assert_eq!(leaves.branches.len(), 1);
    assert_eq!(
        leaves.process,
        vec![
            ReturnProcess::new(ProcessOperation::Forward, 1),
            ReturnProcess::new(ProcessOperation::Forward, 2),
        ]
    );
}

#[test]
fn test_no_packet_arm_dropped() {
    let paths = vec![
        CallPathBuilder::new("got_packet")
            .with_start()
            .with_call(receive_with_flag())
            .with_send(1)
            .with_constraint(received().not_equals(Expr::constant(0, 8)))
            .build(),
        CallPathBuilder::new("no_packet")
            .with_start()
            .with_call(receive_with_flag())
            .with_constraint(received().equals(Expr::constant(0, 8)))
            .build(),
    ];
    let bdd = build(&paths);

    assert_no_branch(&bdd, bdd.get_process());
    assert_eq!(
        view_calls(&bdd, bdd.get_process()),
        vec!["packet_receive", "packet_send"]
    );
    assert_eq!(
        LeafCollector::collect(&bdd).process,
        vec![ReturnProcess::new(ProcessOperation::Forward, 1)]
    );

    // The receive call minted the flag, so it carries the canonical label
    match &bdd.node(bdd.get_process()).unwrap().kind {
        NodeKind::Call(c) => {
            assert_eq!(c.call.ret, Some(Expr::symbol("received_a_packet__0", 8)))
        }
        other => panic!("expected call, got {:?}", other),
    }
    bdd.validate().unwrap();
}

#[test]
fn test_unrelated_condition_keeps_empty_arm() {
    let paths = vec![
        CallPathBuilder::new("small")
            .with_start()
            .with_receive()
            .with_send(1)
            .with_constraint(pkt_below(10))
            .build(),
        CallPathBuilder::new("large")
            .with_start()
            .with_receive()
            .with_constraint(pkt_below(10).not())
            .build(),
    ];
    let bdd = build(&paths);

    let leaves = LeafCollector::collect(&bdd);
    assert_eq!(leaves.branches.len(), 1);
    assert_eq!(
        leaves.process,
        vec![
            ReturnProcess::new(ProcessOperation::Forward, 1),
            ReturnProcess::new(ProcessOperation::Err, 0),
        ]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_branch_survives_only_for_distinct_ports(a in 0u64..4, b in 0u64..4) {
        let bdd = build(&trailing_invariant(a, b));
        let leaves = LeafCollector::collect(&bdd);

        prop_assert_eq!(leaves.branches.is_empty(), a == b);
        let expected: Vec<_> = if a == b {
            vec![ReturnProcess::new(ProcessOperation::Forward, a)]
        } else {
            vec![
                ReturnProcess::new(ProcessOperation::Forward, a),
                ReturnProcess::new(ProcessOperation::Forward, b),
            ]
        };
        prop_assert_eq!(leaves.process, expected);
        prop_assert!(bdd.validate().is_ok());
    }
}
