//! Graph node model
//!
//! A node is one element of the branching program: a decision on a boolean
//! condition, a traced call, or a terminal. Nodes live in a
//! [`NodeArena`](super::arena::NodeArena) and refer to each other by id;
//! forward links own their target, `prev` is navigation only.

use crate::config::{PhaseConfig, ReturnConvention};
use crate::errors::{BddError, BddResult};
use crate::features::solver::SolverToolbox;
use crate::shared::models::{Call, CallPath, ConstraintSet, Expr, ExprRewriter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier, unique within one graph
pub type NodeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    Branch,
    Call,
    ReturnRaw,
    ReturnInit,
    ReturnProcess,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Branch => "BRANCH",
            NodeType::Call => "CALL",
            NodeType::ReturnRaw => "RETURN_RAW",
            NodeType::ReturnInit => "RETURN_INIT",
            NodeType::ReturnProcess => "RETURN_PROCESS",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, NodeType::Branch | NodeType::Call)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub condition: Expr,
    pub on_true: Option<NodeId>,
    pub on_false: Option<NodeId>,
}

impl Branch {
    pub fn new(condition: Expr) -> Self {
        Self {
            condition,
            on_true: None,
            on_false: None,
        }
    }
}

/// Wraps one traced call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    pub call: Call,
    pub next: Option<NodeId>,
}

impl CallNode {
    pub fn new(call: Call) -> Self {
        Self { call, next: None }
    }
}

/// Residual backup of one call path that reached a raw terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPath {
    pub name: String,
    pub calls: Vec<Call>,
    pub constraints: ConstraintSet,
}

impl From<&CallPath> for RawPath {
    fn from(path: &CallPath) -> Self {
        Self {
            name: path.name.clone(),
            calls: path.calls.clone(),
            constraints: path.constraints.clone(),
        }
    }
}

/// Transitional terminal produced by the builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRaw {
    pub paths: Vec<RawPath>,
}

impl ReturnRaw {
    /// Path whose calls decide the terminal classification
    pub fn representative(&self) -> BddResult<&RawPath> {
        self.paths
            .first()
            .ok_or_else(|| BddError::invariant("raw terminal without call paths"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitOutcome {
    Success,
    Failure,
}

/// Init-view terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInit {
    pub outcome: InitOutcome,
}

impl ReturnInit {
    pub fn success() -> Self {
        Self {
            outcome: InitOutcome::Success,
        }
    }

    /// Classify an init path from its trace
    ///
    /// A path that reached the init marker, or never did anything but
    /// skip-listed calls, succeeded. A path that did init work and stopped
    /// short of the marker is the init failure exit.
    pub fn from_raw(raw: &ReturnRaw, phases: &PhaseConfig) -> BddResult<Self> {
        let path = raw.representative()?;
        let crossed_marker = path
            .calls
            .iter()
            .any(|c| phases.is_init_marker(&c.function_name));
        let only_skipped = path
            .calls
            .iter()
            .all(|c| phases.is_init_skipped(&c.function_name));

        let outcome = if crossed_marker || only_skipped {
            InitOutcome::Success
        } else {
            InitOutcome::Failure
        };
        Ok(Self { outcome })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessOperation {
    Forward,
    Drop,
    Broadcast,
    /// No forwarding decision recorded
    Err,
}

/// Process-view terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnProcess {
    pub operation: ProcessOperation,
    /// Output port for `Forward`, 0 otherwise
    pub value: u64,
}

impl ReturnProcess {
    pub fn new(operation: ProcessOperation, value: u64) -> Self {
        Self { operation, value }
    }

    pub fn is_err(&self) -> bool {
        self.operation == ProcessOperation::Err
    }

    /// Classify a processing path by its last forwarding decision call
    pub fn from_raw(
        raw: &ReturnRaw,
        returns: &ReturnConvention,
        solver: &dyn SolverToolbox,
    ) -> BddResult<Self> {
        let path = raw.representative()?;
        let decision = path
            .calls
            .iter()
            .rev()
            .find(|c| returns.is_decision(&c.function_name));

        let Some(call) = decision else {
            return Ok(Self::new(ProcessOperation::Err, 0));
        };

        if returns.is_forward(&call.function_name) {
            let port = call
                .args
                .get(&returns.forward_port_arg)
                .and_then(|arg| arg.expr.as_ref().or(arg.before.as_ref()))
                .ok_or_else(|| {
                    BddError::invariant(format!(
                        "{} in path {} has no '{}' argument",
                        call.function_name, path.name, returns.forward_port_arg
                    ))
                })?;
            let value = solver.value_from_expr(&path.constraints, port)?;
            Ok(Self::new(ProcessOperation::Forward, value))
        } else if returns.is_drop(&call.function_name) {
            Ok(Self::new(ProcessOperation::Drop, 0))
        } else {
            Ok(Self::new(ProcessOperation::Broadcast, 0))
        }
    }
}

impl fmt::Display for ReturnProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            ProcessOperation::Forward => write!(f, "FWD({})", self.value),
            ProcessOperation::Drop => write!(f, "DROP"),
            ProcessOperation::Broadcast => write!(f, "BCAST"),
            ProcessOperation::Err => write!(f, "ERR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Branch(Branch),
    Call(CallNode),
    ReturnRaw(ReturnRaw),
    ReturnInit(ReturnInit),
    ReturnProcess(ReturnProcess),
}

/// One graph element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub prev: Option<NodeId>,
    /// Constraints introduced at this node
    pub constraints: ConstraintSet,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            prev: None,
            constraints: ConstraintSet::new(),
            kind,
        }
    }

    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::Branch(_) => NodeType::Branch,
            NodeKind::Call(_) => NodeType::Call,
            NodeKind::ReturnRaw(_) => NodeType::ReturnRaw,
            NodeKind::ReturnInit(_) => NodeType::ReturnInit,
            NodeKind::ReturnProcess(_) => NodeType::ReturnProcess,
        }
    }

    /// Successor of a call node
    pub fn next(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Call(call) => call.next,
            _ => None,
        }
    }

    /// Forward links, `on_true` before `on_false`
    pub fn successors(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Branch(b) => b.on_true.into_iter().chain(b.on_false).collect(),
            NodeKind::Call(c) => c.next.into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Copy without links, under a new id
    pub fn detached(&self, id: NodeId) -> Node {
        let kind = match &self.kind {
            NodeKind::Branch(b) => NodeKind::Branch(Branch::new(b.condition.clone())),
            NodeKind::Call(c) => NodeKind::Call(CallNode::new(c.call.clone())),
            other => other.clone(),
        };
        Node {
            id,
            prev: None,
            constraints: self.constraints.clone(),
            kind,
        }
    }

    /// Repoint the link targeting `old` to `new`; false if no link matched
    pub fn replace_successor(&mut self, old: NodeId, new: NodeId) -> bool {
        match &mut self.kind {
            NodeKind::Branch(b) if b.on_true == Some(old) => b.on_true = Some(new),
            NodeKind::Branch(b) if b.on_false == Some(old) => b.on_false = Some(new),
            NodeKind::Call(c) if c.next == Some(old) => c.next = Some(new),
            _ => return false,
        }
        true
    }

    /// Rewrite every expression held by this node
    pub fn rewrite(&mut self, rewriter: &mut dyn ExprRewriter) {
        self.constraints.rewrite(rewriter);
        match &mut self.kind {
            NodeKind::Branch(b) => b.condition.rewrite(rewriter),
            NodeKind::Call(c) => c.call.rewrite(rewriter),
            NodeKind::ReturnRaw(raw) => {
                for path in &mut raw.paths {
                    for call in &mut path.calls {
                        call.rewrite(rewriter);
                    }
                    path.constraints.rewrite(rewriter);
                }
            }
            NodeKind::ReturnInit(_) | NodeKind::ReturnProcess(_) => {}
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.id)?;
        match &self.kind {
            NodeKind::Branch(b) => write!(f, "if {}", b.condition)?,
            NodeKind::Call(c) => write!(f, "{}", c.call)?,
            NodeKind::ReturnRaw(raw) => write!(f, "RETURN_RAW ({} paths)", raw.paths.len())?,
            NodeKind::ReturnInit(r) => match r.outcome {
                InitOutcome::Success => write!(f, "INIT SUCCESS")?,
                InitOutcome::Failure => write!(f, "INIT FAILURE")?,
            },
            NodeKind::ReturnProcess(r) => write!(f, "{}", r)?,
        }
        if !self.constraints.is_empty() {
            write!(f, " {}", self.constraints)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BddConfig;
    use crate::features::solver::EnumeratingSolver;
    use crate::shared::models::Arg;

    fn raw(calls: Vec<Call>, constraints: ConstraintSet) -> ReturnRaw {
        ReturnRaw {
            paths: vec![RawPath {
                name: "p0".to_string(),
                calls,
                constraints,
            }],
        }
    }

    #[test]
    fn test_init_classification() {
        let config = BddConfig::default();
        let skipped = raw(vec![Call::new("current_time")], ConstraintSet::new());
        assert_eq!(
            ReturnInit::from_raw(&skipped, &config.phases).unwrap().outcome,
            InitOutcome::Success
        );

        let failed = raw(
            vec![Call::new("map_allocate"), Call::new("current_time")],
            ConstraintSet::new(),
        );
        assert_eq!(
            ReturnInit::from_raw(&failed, &config.phases).unwrap().outcome,
            InitOutcome::Failure
        );

        assert!(ReturnInit::from_raw(&ReturnRaw { paths: vec![] }, &config.phases).is_err());
    }

    #[test]
    fn test_process_classification() {
        let config = BddConfig::default();
        let solver = EnumeratingSolver::default();
        let device = Expr::symbol("dev", 16);
        let pinned: ConstraintSet = [device.clone().equals(Expr::constant(1, 16))]
            .into_iter()
            .collect();

        let fwd = raw(
            vec![
                Call::new("packet_receive"),
                Call::new("packet_send").with_arg("dst_device", Arg::value(device)),
            ],
            pinned,
        );
        let ret = ReturnProcess::from_raw(&fwd, &config.returns, &solver).unwrap();
        assert_eq!(ret, ReturnProcess::new(ProcessOperation::Forward, 1));

        let drop = raw(vec![Call::new("packet_free")], ConstraintSet::new());
        let ret = ReturnProcess::from_raw(&drop, &config.returns, &solver).unwrap();
        assert_eq!(ret.operation, ProcessOperation::Drop);

        let none = raw(vec![Call::new("packet_receive")], ConstraintSet::new());
        assert!(ReturnProcess::from_raw(&none, &config.returns, &solver)
            .unwrap()
            .is_err());
    }

    #[test]
    fn test_forward_without_port_is_invariant() {
        let config = BddConfig::default();
        let solver = EnumeratingSolver::default();
        let fwd = raw(vec![Call::new("packet_send")], ConstraintSet::new());
        let err = ReturnProcess::from_raw(&fwd, &config.returns, &solver).unwrap_err();
        assert!(matches!(err, BddError::Invariant(_)));
    }

    #[test]
    fn test_replace_successor() {
        let mut node = Node::new(
            1,
            NodeKind::Branch(Branch {
                condition: Expr::symbol("c", 1),
                on_true: Some(2),
                on_false: Some(3),
            }),
        );
        assert!(node.replace_successor(3, 9));
        assert_eq!(node.successors(), vec![2, 9]);
        assert!(!node.replace_successor(42, 7));
    }
}
