//! Init / process projection
//!
//! Projects the unified graph into two views drawn from the same id
//! counter: the init view (calls before the init marker, ending in init
//! terminals) and the process view (calls after the marker, ending in
//! process terminals). Nodes are cloned into a fresh arena; the unified
//! graph is left untouched.

use crate::config::BddConfig;
use crate::errors::{BddError, BddResult};
use crate::features::bdd::domain::{
    ChainBuilder, Node, NodeArena, NodeId, NodeKind, ReturnInit, ReturnProcess,
};
use crate::features::solver::SolverToolbox;
use crate::shared::models::{symbol_base_matches, ConstraintSet};
use crate::shared::utils::NodeIdGenerator;
use tracing::debug;

pub struct PhaseSplitter<'a> {
    source: &'a NodeArena,
    target: NodeArena,
    ids: &'a mut NodeIdGenerator,
    config: &'a BddConfig,
    solver: &'a dyn SolverToolbox,
}

impl<'a> PhaseSplitter<'a> {
    pub fn new(
        source: &'a NodeArena,
        ids: &'a mut NodeIdGenerator,
        config: &'a BddConfig,
        solver: &'a dyn SolverToolbox,
    ) -> Self {
        Self {
            source,
            target: NodeArena::new(),
            ids,
            config,
            solver,
        }
    }

    /// Build both views; returns the new arena with the init and process roots
    pub fn split(mut self, root: NodeId) -> BddResult<(NodeArena, NodeId, NodeId)> {
        let init = self.populate_init(root)?;
        let process = self.populate_process(root, false)?;
        Ok((self.target, init, process))
    }

    /// Emit a detached copy of `node` carrying `pending` ahead of its own
    /// constraints
    fn emit_clone(&mut self, node: &Node, pending: &mut ConstraintSet) -> BddResult<NodeId> {
        let id = self.ids.next_id();
        let mut copy = node.detached(id);
        copy.constraints = std::mem::take(pending).union(&node.constraints);
        self.target.insert(copy)
    }

    fn emit(&mut self, kind: NodeKind, pending: &mut ConstraintSet) -> BddResult<NodeId> {
        let id = self.ids.next_id();
        let node = Node::new(id, kind).with_constraints(std::mem::take(pending));
        self.target.insert(node)
    }

    /// Prepend `pending` to the constraints of an already emitted node
    fn absorb(&mut self, id: NodeId, pending: ConstraintSet) -> BddResult<()> {
        let node = self.target.node_mut(id)?;
        node.constraints = pending.union(&node.constraints);
        Ok(())
    }

    /// Init view of the subgraph at `root`
    pub fn populate_init(&mut self, root: NodeId) -> BddResult<NodeId> {
        let (source, config) = (self.source, self.config);
        let phases = &config.phases;
        let mut chain = ChainBuilder::new();
        let mut pending = ConstraintSet::new();
        let mut current = Some(root);

        while let Some(id) = current {
            let node = source.node(id)?;
            match &node.kind {
                NodeKind::Call(c) => {
                    if phases.is_init_marker(&c.call.function_name) {
                        pending.extend(node.constraints.iter().cloned());
                        current = None;
                        continue;
                    }
                    if phases.is_init_skipped(&c.call.function_name) {
                        pending.extend(node.constraints.iter().cloned());
                    } else {
                        let copy = self.emit_clone(node, &mut pending)?;
                        chain.append(&mut self.target, copy)?;
                    }
                    current = Some(c.next.ok_or_else(|| dangling_call(id))?);
                }
                NodeKind::Branch(b) => {
                    let (on_true, on_false) = arms(id, b.on_true, b.on_false)?;
                    let true_root = self.populate_init(on_true)?;
                    let false_root = self.populate_init(on_false)?;
                    let copy = self.emit_clone(node, &mut pending)?;
                    self.target.link_branch(copy, true_root, false_root)?;
                    chain.append(&mut self.target, copy)?;
                    return root_of(&chain);
                }
                NodeKind::ReturnRaw(raw) => {
                    let ret = ReturnInit::from_raw(raw, phases)?;
                    pending.extend(node.constraints.iter().cloned());
                    let terminal = self.emit(NodeKind::ReturnInit(ret), &mut pending)?;
                    chain.append(&mut self.target, terminal)?;
                    return root_of(&chain);
                }
                NodeKind::ReturnInit(_) | NodeKind::ReturnProcess(_) => {
                    return Err(unexpected_terminal(node));
                }
            }
        }

        // Marker reached: init finished on this path
        let terminal = self.emit(NodeKind::ReturnInit(ReturnInit::success()), &mut pending)?;
        chain.append(&mut self.target, terminal)?;
        root_of(&chain)
    }

    /// Process view of the subgraph at `root`
    ///
    /// Calls are kept once `store` is set, which happens when the walk
    /// crosses the init marker. The marker itself is never kept.
    pub fn populate_process(&mut self, root: NodeId, store: bool) -> BddResult<NodeId> {
        let (source, config) = (self.source, self.config);
        let mut store = store;
        let mut chain = ChainBuilder::new();
        let mut pending = ConstraintSet::new();
        let mut current = root;

        loop {
            let node = source.node(current)?;
            match &node.kind {
                NodeKind::Call(c) => {
                    let name = &c.call.function_name;
                    if config.phases.is_init_marker(name) {
                        store = true;
                        pending.extend(node.constraints.iter().cloned());
                    } else if store && !config.phases.is_process_skipped(name) {
                        let copy = self.emit_clone(node, &mut pending)?;
                        chain.append(&mut self.target, copy)?;
                    } else {
                        pending.extend(node.constraints.iter().cloned());
                    }
                    current = c.next.ok_or_else(|| dangling_call(current))?;
                }
                NodeKind::Branch(b) => {
                    let (on_true, on_false) = arms(current, b.on_true, b.on_false)?;
                    let true_root = self.populate_process(on_true, store)?;
                    let false_root = self.populate_process(on_false, store)?;

                    let kept = match self.simplify(node, true_root, false_root)? {
                        Some(kept) => {
                            let mut carried = std::mem::take(&mut pending);
                            carried.extend(node.constraints.iter().cloned());
                            self.absorb(kept, carried)?;
                            kept
                        }
                        None => {
                            let copy = self.emit_clone(node, &mut pending)?;
                            self.target.link_branch(copy, true_root, false_root)?;
                            copy
                        }
                    };
                    chain.append(&mut self.target, kept)?;
                    return root_of(&chain);
                }
                NodeKind::ReturnRaw(raw) => {
                    let ret = ReturnProcess::from_raw(raw, &config.returns, self.solver)?;
                    pending.extend(node.constraints.iter().cloned());
                    let terminal = self.emit(NodeKind::ReturnProcess(ret), &mut pending)?;
                    chain.append(&mut self.target, terminal)?;
                    return root_of(&chain);
                }
                NodeKind::ReturnInit(_) | NodeKind::ReturnProcess(_) => {
                    return Err(unexpected_terminal(node));
                }
            }
        }
    }

    /// Apply the collapse and skip-condition laws to a processed branch
    ///
    /// Returns the arm that replaces the branch (the other arm is removed
    /// from the target arena), or `None` when the branch stays.
    fn simplify(
        &mut self,
        branch: &Node,
        true_root: NodeId,
        false_root: NodeId,
    ) -> BddResult<Option<NodeId>> {
        let NodeKind::Branch(b) = &branch.kind else {
            return Ok(None);
        };
        let on_true = self.target.node(true_root)?;
        let on_false = self.target.node(false_root)?;

        if let (NodeKind::ReturnProcess(t), NodeKind::ReturnProcess(f)) =
            (&on_true.kind, &on_false.kind)
        {
            if t == f {
                debug!("Collapsing branch {} into {}", branch.id, t);
                self.target.remove_subtree(false_root)?;
                return Ok(Some(true_root));
            }
        }

        let symbols = b.condition.symbols();
        let skippable = !symbols.is_empty()
            && symbols.keys().all(|label| {
                self.config
                    .phases
                    .process_skip_condition_symbols
                    .iter()
                    .any(|base| symbol_base_matches(label, base))
            });
        if !skippable {
            return Ok(None);
        }

        // Only listed conditions are dropped. A branch on any other symbol,
        // such as an init allocation check with an ERR arm, heads the
        // process view as is.
        match (is_err_terminal(on_true), is_err_terminal(on_false)) {
            (true, false) => {
                debug!("Dropping branch {} on {}: true arm is empty", branch.id, b.condition);
                self.target.remove_subtree(true_root)?;
                Ok(Some(false_root))
            }
            (false, true) => {
                debug!("Dropping branch {} on {}: false arm is empty", branch.id, b.condition);
                self.target.remove_subtree(false_root)?;
                Ok(Some(true_root))
            }
            _ => Ok(None),
        }
    }
}

/// Process terminal without forwarding decision
///
/// The process walk emits no init terminals, so ERR is the only empty arm.
fn is_err_terminal(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::ReturnProcess(ret) if ret.is_err())
}

fn arms(id: NodeId, on_true: Option<NodeId>, on_false: Option<NodeId>) -> BddResult<(NodeId, NodeId)> {
    match (on_true, on_false) {
        (Some(t), Some(f)) => Ok((t, f)),
        _ => Err(BddError::invariant(format!("branch {} misses an arm", id))),
    }
}

fn root_of(chain: &ChainBuilder) -> BddResult<NodeId> {
    chain
        .root()
        .ok_or_else(|| BddError::invariant("phase view produced no node"))
}

fn dangling_call(id: NodeId) -> BddError {
    BddError::invariant(format!("call {} ends a unified path without terminal", id))
}

fn unexpected_terminal(node: &Node) -> BddError {
    BddError::invariant(format!(
        "{} node {} in the unified graph",
        node.node_type(),
        node.id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BddConfig, Preset};
    use crate::features::bdd::domain::{
        Branch, CallNode, InitOutcome, NodeType, ProcessOperation, RawPath, ReturnRaw,
    };
    use crate::features::solver::EnumeratingSolver;
    use crate::shared::models::{Arg, Call, Expr};

    fn config() -> BddConfig {
        BddConfig::preset(Preset::Custom).phases(|p| {
            p.init_marker = "start".to_string();
            p.init_skip_functions = vec!["now".to_string()];
            p.process_skip_condition_symbols = vec!["got_packet".to_string()];
        })
        .returns(|r| {
            r.forward_function = "tx".to_string();
            r.forward_port_arg = "port".to_string();
            r.drop_functions = vec!["drop".to_string()];
        })
    }

    struct Unified {
        arena: NodeArena,
        ids: NodeIdGenerator,
    }

    impl Unified {
        fn new() -> Self {
            Self {
                arena: NodeArena::new(),
                ids: NodeIdGenerator::new(),
            }
        }

        fn call(&mut self, name: &str, next: NodeId) -> NodeId {
            self.call_with(Call::new(name), next)
        }

        fn call_with(&mut self, call: Call, next: NodeId) -> NodeId {
            let id = self.ids.next_id();
            self.arena
                .insert(Node::new(id, NodeKind::Call(CallNode::new(call))))
                .unwrap();
            self.arena.link_next(id, next).unwrap();
            id
        }

        fn branch(&mut self, condition: Expr, on_true: NodeId, on_false: NodeId) -> NodeId {
            let id = self.ids.next_id();
            self.arena
                .insert(Node::new(id, NodeKind::Branch(Branch::new(condition))))
                .unwrap();
            self.arena.link_branch(id, on_true, on_false).unwrap();
            id
        }

        fn raw(&mut self, calls: Vec<Call>) -> NodeId {
            let id = self.ids.next_id();
            let raw = ReturnRaw {
                paths: vec![RawPath {
                    name: format!("p{}", id),
                    calls,
                    constraints: ConstraintSet::new(),
                }],
            };
            self.arena
                .insert(Node::new(id, NodeKind::ReturnRaw(raw)))
                .unwrap();
            id
        }

        fn split(&mut self, root: NodeId) -> (NodeArena, NodeId, NodeId) {
            let config = config();
            let solver = EnumeratingSolver::default();
            PhaseSplitter::new(&self.arena, &mut self.ids, &config, &solver)
                .split(root)
                .unwrap()
        }
    }

    fn tx(port: u64) -> Call {
        Call::new("tx").with_arg("port", Arg::value(Expr::constant(port, 16)))
    }

    fn types(arena: &NodeArena, root: NodeId) -> Vec<NodeType> {
        arena
            .subtree(root)
            .unwrap()
            .into_iter()
            .map(|id| arena.node(id).unwrap().node_type())
            .collect()
    }

    #[test]
    fn test_marker_splits_views() {
        let mut g = Unified::new();
        let raw = g.raw(vec![Call::new("alloc"), Call::new("start"), tx(1)]);
        let send = g.call_with(tx(1), raw);
        let start = g.call("start", send);
        let alloc = g.call("alloc", start);
        let (arena, init, process) = g.split(alloc);

        assert_eq!(types(&arena, init), vec![NodeType::Call, NodeType::ReturnInit]);
        match &arena.node(arena.subtree(init).unwrap()[1]).unwrap().kind {
            NodeKind::ReturnInit(r) => assert_eq!(r.outcome, InitOutcome::Success),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(types(&arena, process), vec![NodeType::Call, NodeType::ReturnProcess]);
        let process_nodes = arena.subtree(process).unwrap();
        match &arena.node(process_nodes[1]).unwrap().kind {
            NodeKind::ReturnProcess(r) => {
                assert_eq!(*r, ReturnProcess::new(ProcessOperation::Forward, 1))
            }
            other => panic!("unexpected {:?}", other),
        }
        // Fresh ids, disjoint from the unified graph
        assert!(arena.ids().all(|id| id >= 4));
    }

    #[test]
    fn test_skipped_constraints_carried_forward() {
        let mut g = Unified::new();
        let raw = g.raw(vec![Call::new("now"), Call::new("alloc")]);
        let alloc = g.call("alloc", raw);
        let now = g.call("now", alloc);
        let marker = Expr::symbol("t", 1);
        g.arena.node_mut(now).unwrap().constraints.push(marker.clone());
        let (arena, init, _) = g.split(now);

        let first = arena.node(init).unwrap();
        assert_eq!(first.node_type(), NodeType::Call);
        assert!(first.constraints.contains(&marker));
    }

    #[test]
    fn test_collapse_identical_terminals() {
        let mut g = Unified::new();
        let t = g.raw(vec![tx(3)]);
        let f = g.raw(vec![tx(3)]);
        let branch = g.branch(Expr::symbol("c", 1), t, f);
        let start = g.call("start", branch);
        let (arena, _, process) = g.split(start);

        assert_eq!(types(&arena, process), vec![NodeType::ReturnProcess]);
    }

    #[test]
    fn test_distinct_terminals_keep_branch() {
        let mut g = Unified::new();
        let t = g.raw(vec![tx(3)]);
        let f = g.raw(vec![Call::new("drop")]);
        let branch = g.branch(Expr::symbol("c", 1), t, f);
        let start = g.call("start", branch);
        let (arena, _, process) = g.split(start);

        assert_eq!(
            types(&arena, process),
            vec![NodeType::Branch, NodeType::ReturnProcess, NodeType::ReturnProcess]
        );
    }

    #[test]
    fn test_skip_condition_drops_empty_arm() {
        let mut g = Unified::new();
        let t_raw = g.raw(vec![Call::new("start"), Call::new("rx"), Call::new("drop")]);
        let t = g.call("drop", t_raw);
        let f = g.raw(vec![Call::new("start")]);
        let branch = g.branch(Expr::symbol("got_packet", 1), t, f);
        let start = g.call("start", branch);
        let (arena, _, process) = g.split(start);

        assert_eq!(types(&arena, process), vec![NodeType::Call, NodeType::ReturnProcess]);
        // Init success, drop call, drop terminal: the dropped arm left nothing behind
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_unrelated_condition_keeps_empty_arm() {
        let mut g = Unified::new();
        let t_raw = g.raw(vec![Call::new("drop")]);
        let t = g.call("drop", t_raw);
        let f = g.raw(vec![]);
        let branch = g.branch(Expr::symbol("flag", 1), t, f);
        let start = g.call("start", branch);
        let (arena, _, process) = g.split(start);

        assert_eq!(types(&arena, process)[0], NodeType::Branch);
    }
}
