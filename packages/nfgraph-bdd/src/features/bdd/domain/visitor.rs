//! Visitor protocol for graph consumers
//!
//! Downstream tools (emulator, code synthesis, visualizers) read the graph
//! through [`BddVisitor`]. Every method has a no-op default that keeps
//! walking, so a consumer only overrides the node kinds it cares about.

use super::bdd::Bdd;
use super::node::{
    Branch, CallNode, InitOutcome, Node, NodeKind, NodeType, ProcessOperation, ReturnInit,
    ReturnProcess, ReturnRaw,
};
use std::collections::BTreeMap;
use std::fmt;

/// Whether the walk descends below the visited node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    VisitChildren,
    Stop,
}

pub trait BddVisitor {
    fn visit_init_root(&mut self, _bdd: &Bdd, _root: &Node) -> VisitAction {
        VisitAction::VisitChildren
    }

    fn visit_process_root(&mut self, _bdd: &Bdd, _root: &Node) -> VisitAction {
        VisitAction::VisitChildren
    }

    fn visit_branch(&mut self, _bdd: &Bdd, _node: &Node, _branch: &Branch) -> VisitAction {
        VisitAction::VisitChildren
    }

    fn visit_call(&mut self, _bdd: &Bdd, _node: &Node, _call: &CallNode) -> VisitAction {
        VisitAction::VisitChildren
    }

    fn visit_return_init(&mut self, _bdd: &Bdd, _node: &Node, _ret: &ReturnInit) -> VisitAction {
        VisitAction::VisitChildren
    }

    fn visit_return_process(
        &mut self,
        _bdd: &Bdd,
        _node: &Node,
        _ret: &ReturnProcess,
    ) -> VisitAction {
        VisitAction::VisitChildren
    }

    fn visit_return_raw(&mut self, _bdd: &Bdd, _node: &Node, _raw: &ReturnRaw) -> VisitAction {
        VisitAction::VisitChildren
    }
}

impl Node {
    /// Double dispatch into the visitor method for this node's kind
    pub fn accept(&self, bdd: &Bdd, visitor: &mut dyn BddVisitor) -> VisitAction {
        match &self.kind {
            NodeKind::Branch(b) => visitor.visit_branch(bdd, self, b),
            NodeKind::Call(c) => visitor.visit_call(bdd, self, c),
            NodeKind::ReturnRaw(r) => visitor.visit_return_raw(bdd, self, r),
            NodeKind::ReturnInit(r) => visitor.visit_return_init(bdd, self, r),
            NodeKind::ReturnProcess(r) => visitor.visit_return_process(bdd, self, r),
        }
    }
}

/// Node counts per view and kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BddStats {
    pub init_nodes: usize,
    pub process_nodes: usize,
    pub by_type: BTreeMap<NodeType, usize>,
    pub init_outcomes: BTreeMap<String, usize>,
    pub process_operations: BTreeMap<String, usize>,
    in_init: bool,
}

impl BddStats {
    pub fn collect(bdd: &Bdd) -> Self {
        let mut stats = BddStats::default();
        bdd.visit(&mut stats);
        stats
    }

    pub fn count(&self, node_type: NodeType) -> usize {
        self.by_type.get(&node_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.init_nodes + self.process_nodes
    }

    fn record(&mut self, node: &Node) {
        *self.by_type.entry(node.node_type()).or_insert(0) += 1;
        if self.in_init {
            self.init_nodes += 1;
        } else {
            self.process_nodes += 1;
        }
    }
}

impl BddVisitor for BddStats {
    fn visit_init_root(&mut self, _bdd: &Bdd, _root: &Node) -> VisitAction {
        self.in_init = true;
        VisitAction::VisitChildren
    }

    fn visit_process_root(&mut self, _bdd: &Bdd, _root: &Node) -> VisitAction {
        self.in_init = false;
        VisitAction::VisitChildren
    }

    fn visit_branch(&mut self, _bdd: &Bdd, node: &Node, _branch: &Branch) -> VisitAction {
        self.record(node);
        VisitAction::VisitChildren
    }

    fn visit_call(&mut self, _bdd: &Bdd, node: &Node, _call: &CallNode) -> VisitAction {
        self.record(node);
        VisitAction::VisitChildren
    }

    fn visit_return_init(&mut self, _bdd: &Bdd, node: &Node, ret: &ReturnInit) -> VisitAction {
        self.record(node);
        let key = match ret.outcome {
            InitOutcome::Success => "success",
            InitOutcome::Failure => "failure",
        };
        *self.init_outcomes.entry(key.to_string()).or_insert(0) += 1;
        VisitAction::VisitChildren
    }

    fn visit_return_process(
        &mut self,
        _bdd: &Bdd,
        node: &Node,
        ret: &ReturnProcess,
    ) -> VisitAction {
        self.record(node);
        let key = match ret.operation {
            ProcessOperation::Forward => "forward",
            ProcessOperation::Drop => "drop",
            ProcessOperation::Broadcast => "broadcast",
            ProcessOperation::Err => "err",
        };
        *self.process_operations.entry(key.to_string()).or_insert(0) += 1;
        VisitAction::VisitChildren
    }

    fn visit_return_raw(&mut self, _bdd: &Bdd, node: &Node, _raw: &ReturnRaw) -> VisitAction {
        self.record(node);
        VisitAction::VisitChildren
    }
}

impl fmt::Display for BddStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "init={} process={} branches={} calls={}",
            self.init_nodes,
            self.process_nodes,
            self.count(NodeType::Branch),
            self.count(NodeType::Call)
        )
    }
}
