//! Unified graph construction
//!
//! Merges call paths into one graph whose leaves are raw terminals. Paths
//! that agree on their next call share a call node; when they disagree a
//! branch on a discriminating constraint splits them and each side is built
//! independently.

use super::call_paths_group::{CallPathCursor, CallPathsGroup};
use crate::errors::{BddError, BddResult};
use crate::features::bdd::domain::{
    Branch, CallNode, ChainBuilder, Node, NodeArena, NodeId, NodeKind, RawPath, ReturnRaw,
};
use crate::features::solver::SolverToolbox;
use crate::shared::models::{Call, CallPath, ConstraintSet, Expr};
use crate::shared::utils::NodeIdGenerator;
use tracing::{debug, trace};

pub struct BddBuilder<'a> {
    solver: &'a dyn SolverToolbox,
    ids: &'a mut NodeIdGenerator,
    arena: NodeArena,
}

impl<'a> BddBuilder<'a> {
    pub fn new(solver: &'a dyn SolverToolbox, ids: &'a mut NodeIdGenerator) -> Self {
        Self {
            solver,
            ids,
            arena: NodeArena::new(),
        }
    }

    /// Build the unified graph; returns its arena and root
    pub fn build(mut self, paths: &[CallPath]) -> BddResult<(NodeArena, NodeId)> {
        if paths.is_empty() {
            return Err(BddError::EmptyInput);
        }
        let cursors = paths.iter().map(CallPathCursor::new).collect();
        let root = self.populate(cursors, ConstraintSet::new())?;
        Ok((self.arena, root))
    }

    fn populate(
        &mut self,
        mut paths: Vec<CallPathCursor<'_>>,
        mut accumulated: ConstraintSet,
    ) -> BddResult<NodeId> {
        let mut chain = ChainBuilder::new();

        loop {
            let group = CallPathsGroup::new(&paths, self.solver)?;

            if group.on_false().is_empty() {
                if group.on_true()[0].next_call().is_none() {
                    break;
                }

                let call = self.successful_call(group.on_true())?.clone();
                let common = self.common_constraints(group.on_true(), &accumulated)?;
                trace!(
                    "Call {} shared by {} paths, {} new constraints",
                    call.function_name,
                    paths.len(),
                    common.len()
                );

                let id = self.ids.next_id();
                let node = Node::new(id, NodeKind::Call(CallNode::new(call)))
                    .with_constraints(common.clone());
                self.arena.insert(node)?;
                chain.append(&mut self.arena, id)?;

                accumulated.extend(common);
                paths = paths.into_iter().map(CallPathCursor::advance).collect();
                continue;
            }

            let (on_true, on_false, condition) = group.into_parts();
            let condition = condition.ok_or_else(|| {
                BddError::invariant("split group without a discriminating constraint")
            })?;

            let branch_id = self.ids.next_id();
            debug!(
                "Branch {} on {}: {} / {} paths",
                branch_id,
                condition,
                on_true.len(),
                on_false.len()
            );
            self.arena.insert(Node::new(
                branch_id,
                NodeKind::Branch(Branch::new(condition.clone())),
            ))?;

            let true_root = self.populate(on_true, accumulated.with(condition.clone()))?;
            let false_root = self.populate(on_false, accumulated.with(condition.not()))?;
            self.arena.link_branch(branch_id, true_root, false_root)?;
            chain.append(&mut self.arena, branch_id)?;

            return chain
                .root()
                .ok_or_else(|| BddError::invariant("branch not appended"));
        }

        let id = self.ids.next_id();
        let raw = ReturnRaw {
            paths: paths.iter().map(|p| RawPath::from(p.path())).collect(),
        };
        self.arena.insert(Node::new(id, NodeKind::ReturnRaw(raw)))?;
        chain.append(&mut self.arena, id)?;

        chain
            .root()
            .ok_or_else(|| BddError::invariant("raw terminal not appended"))
    }

    /// Call whose return value is not provably a failure, else the first
    fn successful_call<'p>(&self, paths: &[CallPathCursor<'p>]) -> BddResult<&'p Call> {
        let mut first = None;
        for path in paths {
            let Some(call) = path.next_call() else {
                continue;
            };
            first.get_or_insert(call);

            let failed = match &call.ret {
                Some(ret) => {
                    let zero = Expr::constant(0, ret.width());
                    self.solver
                        .is_expr_always_true(path.constraints(), &ret.clone().equals(zero))?
                }
                None => false,
            };
            if !failed {
                return Ok(call);
            }
        }
        first.ok_or_else(|| BddError::invariant("no pending call in group"))
    }

    /// Constraints of the first path that every path entails and that
    /// `accumulated` does not already imply, in the first path's order
    fn common_constraints(
        &self,
        paths: &[CallPathCursor<'_>],
        accumulated: &ConstraintSet,
    ) -> BddResult<ConstraintSet> {
        let mut common = ConstraintSet::new();
        let Some((first, rest)) = paths.split_first() else {
            return Ok(common);
        };

        'constraints: for constraint in first.constraints() {
            let context = accumulated.union(&common);
            if self.solver.is_expr_always_true(&context, constraint)? {
                continue;
            }
            for path in rest {
                if !self.solver.is_expr_always_true(path.constraints(), constraint)? {
                    continue 'constraints;
                }
            }
            common.push(constraint.clone());
        }
        Ok(common)
    }
}
