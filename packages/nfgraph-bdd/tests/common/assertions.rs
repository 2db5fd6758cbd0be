//! Custom assertions for graph verification

use nfgraph_bdd::{
    Bdd, BddVisitor, Branch, InitOutcome, Node, NodeId, NodeKind, NodeType, ReturnInit,
    ReturnProcess, VisitAction,
};

/// Node kinds of the view at `root` in preorder, `on_true` arms first
pub fn view_types(bdd: &Bdd, root: NodeId) -> Vec<NodeType> {
    bdd.arena()
        .subtree(root)
        .unwrap()
        .into_iter()
        .map(|id| bdd.node(id).unwrap().node_type())
        .collect()
}

/// Function names of the calls in the view at `root`, preorder
pub fn view_calls(bdd: &Bdd, root: NodeId) -> Vec<String> {
    bdd.arena()
        .subtree(root)
        .unwrap()
        .into_iter()
        .filter_map(|id| match &bdd.node(id).unwrap().kind {
            NodeKind::Call(c) => Some(c.call.function_name.clone()),
            _ => None,
        })
        .collect()
}

pub fn assert_no_branch(bdd: &Bdd, root: NodeId) {
    let types = view_types(bdd, root);
    assert!(
        !types.contains(&NodeType::Branch),
        "Expected no branch, got: {:?}\n{}",
        types,
        bdd
    );
}

/// Collects terminals and branches in visit order
#[derive(Debug, Default)]
pub struct LeafCollector {
    pub init: Vec<InitOutcome>,
    pub process: Vec<ReturnProcess>,
    pub branches: Vec<NodeId>,
    pub leaf_ids: Vec<NodeId>,
}

impl LeafCollector {
    pub fn collect(bdd: &Bdd) -> Self {
        let mut collector = Self::default();
        bdd.visit(&mut collector);
        collector
    }
}

impl BddVisitor for LeafCollector {
    fn visit_branch(&mut self, _bdd: &Bdd, node: &Node, _branch: &Branch) -> VisitAction {
        self.branches.push(node.id);
        VisitAction::VisitChildren
    }

    fn visit_return_init(&mut self, _bdd: &Bdd, node: &Node, ret: &ReturnInit) -> VisitAction {
        self.init.push(ret.outcome);
        self.leaf_ids.push(node.id);
        VisitAction::VisitChildren
    }

    fn visit_return_process(
        &mut self,
        _bdd: &Bdd,
        node: &Node,
        ret: &ReturnProcess,
    ) -> VisitAction {
        self.process.push(*ret);
        self.leaf_ids.push(node.id);
        VisitAction::VisitChildren
    }
}
