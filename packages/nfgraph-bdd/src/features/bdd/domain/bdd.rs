//! Graph container
//!
//! Owns the node arena, the init and process roots, and the id counter both
//! views were allocated from. This is the read interface every downstream
//! consumer goes through.

use super::arena::NodeArena;
use super::node::{Node, NodeId, NodeKind, NodeType};
use super::visitor::{BddVisitor, VisitAction};
use crate::errors::{BddError, BddResult};
use crate::shared::models::ConstraintSet;
use crate::shared::utils::NodeIdGenerator;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bdd {
    ids: NodeIdGenerator,
    init: NodeId,
    process: NodeId,
    n_call_paths: usize,
    arena: NodeArena,
}

impl Bdd {
    /// Assemble and validate a graph
    pub fn from_parts(
        arena: NodeArena,
        init: NodeId,
        process: NodeId,
        ids: NodeIdGenerator,
        n_call_paths: usize,
    ) -> BddResult<Self> {
        let bdd = Self {
            ids,
            init,
            process,
            n_call_paths,
            arena,
        };
        bdd.validate()?;
        Ok(bdd)
    }

    pub fn get_init(&self) -> NodeId {
        self.init
    }

    pub fn get_process(&self) -> NodeId {
        self.process
    }

    pub fn n_call_paths(&self) -> usize {
        self.n_call_paths
    }

    /// Next id the counter will hand out
    pub fn get_id(&self) -> NodeId {
        self.ids.peek()
    }

    /// Rebase the id counter, used when merging graphs
    pub fn set_id(&mut self, id: NodeId) {
        self.ids.set(id);
    }

    /// Allocate an id for a node built outside the container
    pub fn new_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn node(&self, id: NodeId) -> BddResult<&Node> {
        self.arena.get(id).ok_or(BddError::NodeNotFound(id))
    }

    /// Breadth-first search from both roots
    pub fn get_node_by_id(&self, id: NodeId) -> Option<&Node> {
        let mut queue: VecDeque<NodeId> = [self.init, self.process].into_iter().collect();
        let mut seen = BTreeSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let node = self.arena.get(current)?;
            if current == id {
                return Some(node);
            }
            queue.extend(node.successors());
        }
        None
    }

    /// Every constraint that holds at `id`, root to node
    ///
    /// Each branch ancestor contributes its condition when the walk came up
    /// through `on_true` and its negation when through `on_false`.
    pub fn get_constraints(&self, id: NodeId) -> BddResult<ConstraintSet> {
        let mut current = self.node(id)?;
        let mut segments = vec![current.constraints.clone()];
        let mut steps = 0;

        while let Some(prev) = current.prev {
            steps += 1;
            if steps > self.arena.len() {
                return Err(BddError::invariant(format!(
                    "back-references from node {} form a cycle",
                    id
                )));
            }

            let parent = self.arena.node(prev)?;
            let mut segment = parent.constraints.clone();
            match &parent.kind {
                NodeKind::Branch(b) if b.on_true == Some(current.id) => {
                    segment.push(b.condition.clone());
                }
                NodeKind::Branch(b) if b.on_false == Some(current.id) => {
                    segment.push(b.condition.clone().not());
                }
                NodeKind::Call(c) if c.next == Some(current.id) => {}
                _ => {
                    return Err(BddError::invariant(format!(
                        "node {} points back to {} which does not link to it",
                        current.id, prev
                    )))
                }
            }
            segments.push(segment);
            current = parent;
        }

        let mut constraints = ConstraintSet::new();
        for segment in segments.into_iter().rev() {
            constraints.extend(segment);
        }
        Ok(constraints)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Graph surgery
    //
    // Used by tools that splice shared graphs. Callers keep the structure
    // consistent; `validate` checks the result.
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert a detached node; the counter moves past its id
    pub fn add_node(&mut self, node: Node) -> BddResult<NodeId> {
        if self.arena.contains(node.id) {
            return Err(BddError::invariant(format!("duplicate node id {}", node.id)));
        }
        if node.id >= self.ids.peek() {
            let next = node.id.checked_add(1).ok_or_else(|| {
                BddError::invariant(format!("node id {} exhausts the id space", node.id))
            })?;
            self.ids.set(next);
        }
        self.arena.insert(node)
    }

    /// Give a call node without successor the successor `next`
    pub fn add_next(&mut self, id: NodeId, next: NodeId) -> BddResult<()> {
        if self.node(id)?.next().is_some() {
            return Err(BddError::invariant(format!(
                "node {} already has a successor",
                id
            )));
        }
        self.node(next)?;
        self.arena.link_next(id, next)
    }

    /// Repoint the link of `id` that targets `old` to `new`
    pub fn replace_next(&mut self, id: NodeId, old: NodeId, new: NodeId) -> BddResult<()> {
        self.node(new)?;
        let node = self.arena.get_mut(id).ok_or(BddError::NodeNotFound(id))?;
        if !node.replace_successor(old, new) {
            return Err(BddError::invariant(format!(
                "node {} has no successor {}",
                id, old
            )));
        }
        if let Some(old_node) = self.arena.get_mut(old) {
            if old_node.prev == Some(id) {
                old_node.prev = None;
            }
        }
        self.arena.set_prev(new, Some(id))
    }

    pub fn replace_prev(&mut self, id: NodeId, prev: Option<NodeId>) -> BddResult<()> {
        let node = self.arena.get_mut(id).ok_or(BddError::NodeNotFound(id))?;
        node.prev = prev;
        Ok(())
    }

    /// Copy a node, or its whole subtree, under fresh ids
    ///
    /// The copy is detached: its root has no back-reference and nothing
    /// links to it until spliced in.
    pub fn clone_subtree(&mut self, root: NodeId, recursive: bool) -> BddResult<NodeId> {
        self.node(root)?;
        if !recursive {
            let id = self.ids.next_id();
            let copy = self.arena.node(root)?.detached(id);
            return self.arena.insert(copy);
        }

        let old_ids = self.arena.subtree(root)?;
        let mut mapping = BTreeMap::new();
        for &old in &old_ids {
            mapping.insert(old, self.ids.next_id());
        }
        let lookup = |old: NodeId| -> BddResult<NodeId> {
            mapping
                .get(&old)
                .copied()
                .ok_or_else(|| BddError::invariant(format!("node {} escaped its subtree", old)))
        };

        let mut copies = Vec::with_capacity(old_ids.len());
        for &old in &old_ids {
            let mut copy = self.arena.node(old)?.clone();
            copy.id = lookup(old)?;
            copy.prev = match copy.prev {
                Some(prev) if old != root => Some(lookup(prev)?),
                _ => None,
            };
            relink(&mut copy, &lookup)?;
            copies.push(copy);
        }
        for copy in copies {
            self.arena.insert(copy)?;
        }
        lookup(root)
    }

    /// Renumber a subtree in pre-order starting at `*next_id`
    ///
    /// On return `*next_id` is one past the last id used. The parent link,
    /// the view roots and the counter follow the renumbering. On error the
    /// graph and `*next_id` are unchanged.
    pub fn recursive_update_ids(&mut self, root: NodeId, next_id: &mut NodeId) -> BddResult<()> {
        let old_ids = self.arena.subtree(root)?;
        let members: BTreeSet<NodeId> = old_ids.iter().copied().collect();
        let mut mapping = BTreeMap::new();
        let mut cursor = *next_id;
        for &old in &old_ids {
            if self.arena.contains(cursor) && !members.contains(&cursor) {
                return Err(BddError::invariant(format!(
                    "renumbering {} onto {} collides with a node outside the subtree",
                    old, cursor
                )));
            }
            mapping.insert(old, cursor);
            cursor = cursor.checked_add(1).ok_or_else(|| {
                BddError::invariant(format!("renumbering {} exhausts the id space", root))
            })?;
        }
        *next_id = cursor;
        let lookup = |old: NodeId| -> BddResult<NodeId> {
            mapping
                .get(&old)
                .copied()
                .ok_or_else(|| BddError::invariant(format!("node {} escaped its subtree", old)))
        };

        let mut nodes = Vec::with_capacity(old_ids.len());
        for &old in &old_ids {
            if let Some(node) = self.arena.remove(old) {
                nodes.push(node);
            }
        }

        let parent = nodes.first().and_then(|n| n.prev);
        for mut node in nodes {
            let old = node.id;
            node.id = lookup(old)?;
            if old != root {
                node.prev = node.prev.map(&lookup).transpose()?;
            }
            relink(&mut node, &lookup)?;
            self.arena.insert(node)?;
        }

        let new_root = lookup(root)?;
        if let Some(parent) = parent {
            let parent = self.arena.node_mut(parent)?;
            parent.replace_successor(root, new_root);
        }
        if self.init == root {
            self.init = new_root;
        }
        if self.process == root {
            self.process = new_root;
        }
        if *next_id > self.ids.peek() {
            self.ids.set(*next_id);
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Checks and traversal
    // ═══════════════════════════════════════════════════════════════════════

    /// Structural well-formedness
    ///
    /// Back-references match forward links, every node is reached exactly
    /// once, the init view ends only in init terminals and the process view
    /// only in process terminals, and no id is at or past the counter.
    pub fn validate(&self) -> BddResult<()> {
        let mut seen = BTreeSet::new();
        for (root, terminal) in [
            (self.init, NodeType::ReturnInit),
            (self.process, NodeType::ReturnProcess),
        ] {
            if self.arena.node(root)?.prev.is_some() {
                return Err(BddError::invariant(format!(
                    "root {} has a back-reference",
                    root
                )));
            }

            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                if !seen.insert(id) {
                    return Err(BddError::invariant(format!("node {} reached twice", id)));
                }
                if id >= self.ids.peek() {
                    return Err(BddError::invariant(format!(
                        "node {} is past the id counter {}",
                        id,
                        self.ids.peek()
                    )));
                }

                let node = self.arena.node(id)?;
                match &node.kind {
                    NodeKind::Branch(b) if b.on_true.is_none() || b.on_false.is_none() => {
                        return Err(BddError::invariant(format!("branch {} misses an arm", id)))
                    }
                    NodeKind::Call(c) if c.next.is_none() => {
                        return Err(BddError::invariant(format!("call {} ends a path", id)))
                    }
                    NodeKind::Branch(_) | NodeKind::Call(_) => {}
                    _ if node.node_type() != terminal => {
                        return Err(BddError::invariant(format!(
                            "{} node {} under the {} root",
                            node.node_type(),
                            id,
                            if terminal == NodeType::ReturnInit { "init" } else { "process" }
                        )))
                    }
                    _ => {}
                }

                for successor in node.successors() {
                    let child = self.arena.node(successor)?;
                    if child.prev != Some(id) {
                        return Err(BddError::invariant(format!(
                            "node {} points back to {:?}, expected {}",
                            successor, child.prev, id
                        )));
                    }
                    stack.push(successor);
                }
            }
        }

        if seen.len() != self.arena.len() {
            return Err(BddError::invariant(format!(
                "{} nodes unreachable from either root",
                self.arena.len() - seen.len()
            )));
        }
        Ok(())
    }

    /// Walk both views
    pub fn visit(&self, visitor: &mut dyn BddVisitor) {
        if let Some(root) = self.arena.get(self.init) {
            if visitor.visit_init_root(self, root) == VisitAction::VisitChildren {
                self.visit_from(self.init, visitor);
            }
        }
        if let Some(root) = self.arena.get(self.process) {
            if visitor.visit_process_root(self, root) == VisitAction::VisitChildren {
                self.visit_from(self.process, visitor);
            }
        }
    }

    /// Depth-first walk from `root`, `on_true` arms first
    pub fn visit_from(&self, root: NodeId, visitor: &mut dyn BddVisitor) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if node.accept(self, visitor) == VisitAction::VisitChildren {
                stack.extend(node.successors().into_iter().rev());
            }
        }
    }

    fn dump_view(&self, f: &mut fmt::Formatter<'_>, root: NodeId) -> fmt::Result {
        let mut stack = vec![(root, 1usize, "")];
        while let Some((id, depth, arm)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                writeln!(f, "{:indent$}<missing {}>", "", id, indent = depth * 2)?;
                continue;
            };
            writeln!(f, "{:indent$}{}{}", "", arm, node, indent = depth * 2)?;
            match &node.kind {
                NodeKind::Branch(b) => {
                    if let Some(on_false) = b.on_false {
                        stack.push((on_false, depth + 1, "F: "));
                    }
                    if let Some(on_true) = b.on_true {
                        stack.push((on_true, depth + 1, "T: "));
                    }
                }
                NodeKind::Call(c) => {
                    if let Some(next) = c.next {
                        stack.push((next, depth, ""));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Map forward links through `lookup`
fn relink(node: &mut Node, lookup: &impl Fn(NodeId) -> BddResult<NodeId>) -> BddResult<()> {
    match &mut node.kind {
        NodeKind::Branch(b) => {
            b.on_true = b.on_true.map(lookup).transpose()?;
            b.on_false = b.on_false.map(lookup).transpose()?;
        }
        NodeKind::Call(c) => {
            c.next = c.next.map(lookup).transpose()?;
        }
        _ => {}
    }
    Ok(())
}

impl fmt::Display for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "INIT:")?;
        self.dump_view(f, self.init)?;
        writeln!(f, "PROCESS:")?;
        self.dump_view(f, self.process)
    }
}
