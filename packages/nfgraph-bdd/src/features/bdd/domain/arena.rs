//! Id-indexed node storage

use super::node::{Node, NodeId, NodeKind};
use crate::errors::{BddError, BddResult};
use std::collections::BTreeMap;

/// Owns every node of a graph; links between nodes are ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeArena {
    nodes: BTreeMap<NodeId, Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) -> BddResult<NodeId> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(BddError::invariant(format!("duplicate node id {}", id)));
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Node that must exist
    pub fn node(&self, id: NodeId) -> BddResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| BddError::invariant(format!("dangling node id {}", id)))
    }

    pub fn node_mut(&mut self, id: NodeId) -> BddResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| BddError::invariant(format!("dangling node id {}", id)))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    /// Remove `root` and everything it reaches; returns the number removed
    pub fn remove_subtree(&mut self, root: NodeId) -> BddResult<usize> {
        let ids = self.subtree(root)?;
        for id in &ids {
            self.nodes.remove(id);
        }
        Ok(ids.len())
    }

    /// Set `from.next = to` and `to.prev = from`
    pub fn link_next(&mut self, from: NodeId, to: NodeId) -> BddResult<()> {
        match &mut self.node_mut(from)?.kind {
            NodeKind::Call(call) => call.next = Some(to),
            _ => {
                return Err(BddError::invariant(format!(
                    "node {} cannot take a successor",
                    from
                )))
            }
        }
        self.set_prev(to, Some(from))
    }

    /// Wire both arms of a branch
    pub fn link_branch(&mut self, branch: NodeId, on_true: NodeId, on_false: NodeId) -> BddResult<()> {
        match &mut self.node_mut(branch)?.kind {
            NodeKind::Branch(b) => {
                b.on_true = Some(on_true);
                b.on_false = Some(on_false);
            }
            _ => {
                return Err(BddError::invariant(format!(
                    "node {} is not a branch",
                    branch
                )))
            }
        }
        self.set_prev(on_true, Some(branch))?;
        self.set_prev(on_false, Some(branch))
    }

    pub fn set_prev(&mut self, id: NodeId, prev: Option<NodeId>) -> BddResult<()> {
        self.node_mut(id)?.prev = prev;
        Ok(())
    }

    /// Pre-order ids reachable from `root`, `on_true` arms first
    pub fn subtree(&self, root: NodeId) -> BddResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            out.push(id);
            stack.extend(node.successors().into_iter().rev());
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Largest id in use
    pub fn max_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }
}

impl FromIterator<Node> for NodeArena {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(|n| (n.id, n)).collect(),
        }
    }
}

/// Linear chain under construction
///
/// Nodes are appended at the leaf; only a call leaf can take a successor,
/// so nothing follows a branch or terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainBuilder {
    root: Option<NodeId>,
    leaf: Option<NodeId>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, arena: &mut NodeArena, id: NodeId) -> BddResult<()> {
        match self.leaf {
            Some(leaf) => arena.link_next(leaf, id)?,
            None => self.root = Some(id),
        }
        self.leaf = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn leaf(&self) -> Option<NodeId> {
        self.leaf
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bdd::domain::node::{Branch, CallNode, ReturnInit};
    use crate::shared::models::{Call, Expr};

    fn call(id: NodeId, name: &str) -> Node {
        Node::new(id, NodeKind::Call(CallNode::new(Call::new(name))))
    }

    fn ret(id: NodeId) -> Node {
        Node::new(id, NodeKind::ReturnInit(ReturnInit::success()))
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut arena = NodeArena::new();
        arena.insert(call(0, "a")).unwrap();
        assert!(matches!(
            arena.insert(call(0, "b")),
            Err(BddError::Invariant(_))
        ));
    }

    #[test]
    fn test_chain_sets_back_references() {
        let mut arena = NodeArena::new();
        let mut chain = ChainBuilder::new();
        for node in [call(0, "a"), call(1, "b"), ret(2)] {
            let id = arena.insert(node).unwrap();
            chain.append(&mut arena, id).unwrap();
        }
        assert_eq!(chain.root(), Some(0));
        assert_eq!(arena.node(1).unwrap().prev, Some(0));
        assert_eq!(arena.node(2).unwrap().prev, Some(1));
        assert_eq!(arena.subtree(0).unwrap(), vec![0, 1, 2]);

        // Terminal leaf cannot take a successor
        let id = arena.insert(ret(3)).unwrap();
        assert!(chain.append(&mut arena, id).is_err());
    }

    #[test]
    fn test_subtree_true_arm_first() {
        let mut arena = NodeArena::new();
        arena
            .insert(Node::new(0, NodeKind::Branch(Branch::new(Expr::symbol("c", 1)))))
            .unwrap();
        arena.insert(ret(1)).unwrap();
        arena.insert(ret(2)).unwrap();
        arena.link_branch(0, 2, 1).unwrap();
        assert_eq!(arena.subtree(0).unwrap(), vec![0, 2, 1]);
        assert_eq!(arena.remove_subtree(0).unwrap(), 3);
        assert!(arena.is_empty());
    }
}
