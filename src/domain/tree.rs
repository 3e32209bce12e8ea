//! Arena-backed org chart tree and the reparent operation.

use std::collections::{HashMap, HashSet};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::{Attributes, NodeId, NodeRecord, ViewState};

/// Tree node in the arena-based chart.
#[derive(Debug, Clone)]
pub struct OrgNode {
    pub id: NodeId,
    pub name: String,
    pub attributes: Attributes,
    /// Index of parent node in the arena, None for the root
    parent: Option<Index>,
    /// Indices of subordinates, in display order
    children: Vec<Index>,
}

/// Organizational chart: every node appears exactly once below a single fixed root.
///
/// Nodes live in a generational arena; `index` maps identifiers to arena slots.
/// Parent back-links make "who is my manager" an O(1) lookup instead of a scan.
/// The only structural mutator is [`OrgTree::reparent`], which validates before
/// touching anything, so a rejected move leaves the tree as it was.
#[derive(Debug, Clone)]
pub struct OrgTree {
    arena: Arena<OrgNode>,
    index: HashMap<NodeId, Index>,
    root: Index,
}

impl OrgTree {
    /// Build a chart from a flat node list.
    ///
    /// Child order follows each record's `subordinates`. Rejects duplicate ids,
    /// unknown subordinates, nodes with two parents, a root that has a parent,
    /// and nodes that cannot be reached from the root (orphans and cycles).
    #[instrument(level = "debug", skip(records))]
    pub fn from_records<I>(records: I, root: &NodeId) -> TreeResult<Self>
    where
        I: IntoIterator<Item = NodeRecord>,
    {
        let mut arena = Arena::new();
        let mut index = HashMap::new();
        let mut links = Vec::new();

        for record in records {
            let NodeRecord {
                id,
                name,
                subordinates,
                attributes,
            } = record;
            if index.contains_key(&id) {
                return Err(DomainError::DuplicateNode(id));
            }
            let idx = arena.insert(OrgNode {
                id: id.clone(),
                name,
                attributes,
                parent: None,
                children: Vec::new(),
            });
            index.insert(id.clone(), idx);
            links.push((idx, id, subordinates));
        }

        let root_idx = *index
            .get(root)
            .ok_or_else(|| DomainError::NotFound(root.clone()))?;

        let order: Vec<(Index, NodeId)> = links
            .iter()
            .map(|(idx, id, _)| (*idx, id.clone()))
            .collect();

        for (parent_idx, parent_id, subordinates) in links {
            for child_id in subordinates {
                let child_idx = match index.get(&child_id) {
                    Some(&idx) => idx,
                    None => {
                        return Err(DomainError::DanglingChild {
                            parent: parent_id,
                            child: child_id,
                        })
                    }
                };
                if child_idx == root_idx {
                    return Err(DomainError::RootHasParent {
                        root: child_id,
                        parent: parent_id,
                    });
                }
                if let Some(child) = arena.get_mut(child_idx) {
                    if child.parent.is_some() {
                        return Err(DomainError::MultipleParents(child_id));
                    }
                    child.parent = Some(parent_idx);
                }
                if let Some(parent) = arena.get_mut(parent_idx) {
                    parent.children.push(child_idx);
                }
            }
        }

        let tree = Self {
            arena,
            index,
            root: root_idx,
        };

        // Each node has at most one parent and the root has none, so the walk terminates.
        let reachable: HashSet<Index> = tree.walk_indices(root_idx).collect();
        if let Some((_, id)) = order.into_iter().find(|(idx, _)| !reachable.contains(idx)) {
            return Err(DomainError::Unreachable(id));
        }

        debug!("built chart with {} nodes", tree.len());
        Ok(tree)
    }

    /// Move `moved` to the end of `new_parent`'s subordinates.
    ///
    /// Validation order: moved exists, moved is not the root, target exists,
    /// target is neither `moved` nor one of its descendants. Nothing is mutated
    /// unless every check passes. Moving a node under its current parent sends
    /// it to the end of the list, so repeating a move is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent(&mut self, moved: &NodeId, new_parent: &NodeId) -> TreeResult<()> {
        let moved_idx = self.lookup(moved)?;
        if moved_idx == self.root {
            return Err(DomainError::RootMove(moved.clone()));
        }
        let target_idx = self.lookup(new_parent)?;
        if target_idx == moved_idx || self.is_ancestor_idx(moved_idx, target_idx) {
            return Err(DomainError::Cycle {
                moved: moved.clone(),
                target: new_parent.clone(),
            });
        }

        let old_parent = self.detach(moved_idx);
        self.attach(moved_idx, target_idx);

        debug!(
            "moved {} from {} to {}",
            moved,
            old_parent
                .and_then(|idx| self.arena.get(idx))
                .map(|n| n.id.to_string())
                .unwrap_or_else(|| "<none>".to_string()),
            new_parent
        );
        Ok(())
    }

    /// Like [`OrgTree::reparent`], but returns the moved-into copy and leaves `self` alone.
    #[instrument(level = "debug", skip(self))]
    pub fn reparented(&self, moved: &NodeId, new_parent: &NodeId) -> TreeResult<OrgTree> {
        let mut next = self.clone();
        next.reparent(moved, new_parent)?;
        Ok(next)
    }

    fn detach(&mut self, idx: Index) -> Option<Index> {
        let parent_idx = self.arena.get_mut(idx)?.parent.take()?;
        if let Some(parent) = self.arena.get_mut(parent_idx) {
            parent.children.retain(|&child| child != idx);
        }
        Some(parent_idx)
    }

    fn attach(&mut self, idx: Index, parent_idx: Index) {
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = Some(parent_idx);
        }
        if let Some(parent) = self.arena.get_mut(parent_idx) {
            parent.children.push(idx);
        }
    }

    /// True when `ancestor` lies on the parent chain above `idx`.
    fn is_ancestor_idx(&self, ancestor: Index, idx: Index) -> bool {
        let mut current = self.arena.get(idx).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.arena.get(parent).and_then(|n| n.parent);
        }
        false
    }

    #[instrument(level = "trace", skip(self))]
    fn lookup(&self, id: &NodeId) -> TreeResult<Index> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| DomainError::NotFound(id.clone()))
    }

    fn node_ref(&self, idx: Index) -> Option<NodeRef<'_>> {
        self.arena.get(idx).map(|node| NodeRef { tree: self, node })
    }

    fn walk_indices(&self, start: Index) -> impl Iterator<Item = Index> + '_ {
        let mut stack = vec![start];
        std::iter::from_fn(move || {
            let idx = stack.pop()?;
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().rev());
            }
            Some(idx)
        })
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            node: &self.arena[self.root],
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.arena[self.root].id
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<NodeRef<'_>> {
        self.index.get(id).and_then(|&idx| self.node_ref(idx))
    }

    /// Current manager of `id`, `None` for the root.
    pub fn parent_of(&self, id: &NodeId) -> TreeResult<Option<NodeId>> {
        let idx = self.lookup(id)?;
        Ok(self
            .arena
            .get(idx)
            .and_then(|n| n.parent)
            .and_then(|p| self.arena.get(p))
            .map(|p| p.id.clone()))
    }

    pub fn children_of(&self, id: &NodeId) -> TreeResult<Vec<NodeId>> {
        let idx = self.lookup(id)?;
        Ok(self
            .node_ref(idx)
            .map(|n| n.child_ids())
            .unwrap_or_default())
    }

    /// Number of direct subordinates.
    pub fn subordinate_count(&self, id: &NodeId) -> TreeResult<usize> {
        let idx = self.lookup(id)?;
        Ok(self.arena.get(idx).map_or(0, |n| n.children.len()))
    }

    /// True when `candidate` sits strictly below `ancestor`.
    pub fn is_descendant(&self, candidate: &NodeId, ancestor: &NodeId) -> TreeResult<bool> {
        let candidate_idx = self.lookup(candidate)?;
        let ancestor_idx = self.lookup(ancestor)?;
        Ok(self.is_ancestor_idx(ancestor_idx, candidate_idx))
    }

    /// Depth-first pre-order walk from the root.
    pub fn iter(&self) -> Traverse<'_> {
        Traverse::new(self, self.root, None)
    }

    /// Depth-first pre-order walk from `start`. Restartable: calling it again
    /// on an unchanged tree yields the same sequence.
    #[instrument(level = "trace", skip(self))]
    pub fn traverse(&self, start: &NodeId) -> TreeResult<Traverse<'_>> {
        let idx = self.lookup(start)?;
        Ok(Traverse::new(self, idx, None))
    }

    /// Pre-order walk that does not descend into collapsed nodes.
    /// Collapsed nodes themselves are still yielded.
    #[instrument(level = "trace", skip(self, view))]
    pub fn traverse_visible<'a>(
        &'a self,
        start: &NodeId,
        view: &'a ViewState,
    ) -> TreeResult<Traverse<'a>> {
        let idx = self.lookup(start)?;
        Ok(Traverse::new(self, idx, Some(view)))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn traverse_postorder(&self, start: &NodeId) -> TreeResult<PostOrderIterator<'_>> {
        let idx = self.lookup(start)?;
        Ok(PostOrderIterator::new(self, idx))
    }

    /// Number of levels, a lone root counts as 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Ids of nodes without subordinates, in pre-order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|n| n.child_count() == 0)
            .map(|n| n.id().clone())
            .collect()
    }

    /// Re-verify the structural invariants, reporting the first violation.
    #[instrument(level = "debug", skip(self))]
    pub fn check_invariants(&self) -> TreeResult<()> {
        for (idx, node) in self.arena.iter() {
            if self.index.get(&node.id) != Some(&idx) {
                return Err(DomainError::DuplicateNode(node.id.clone()));
            }

            let mut seen = HashSet::new();
            for &child in &node.children {
                let Some(child_node) = self.arena.get(child) else {
                    // stale index, the subordinate no longer exists
                    return Err(DomainError::Unreachable(node.id.clone()));
                };
                if child == self.root {
                    return Err(DomainError::RootHasParent {
                        root: child_node.id.clone(),
                        parent: node.id.clone(),
                    });
                }
                if !seen.insert(child) || child_node.parent != Some(idx) {
                    return Err(DomainError::MultipleParents(child_node.id.clone()));
                }
            }

            if idx == self.root {
                if let Some(parent) = node.parent.and_then(|p| self.arena.get(p)) {
                    return Err(DomainError::RootHasParent {
                        root: node.id.clone(),
                        parent: parent.id.clone(),
                    });
                }
                continue;
            }

            let listed = node
                .parent
                .and_then(|p| self.arena.get(p))
                .is_some_and(|p| p.children.contains(&idx));
            if !listed {
                return Err(DomainError::Unreachable(node.id.clone()));
            }
        }

        // Links are consistent at this point, so a cycle can only hide in an unreachable part.
        let visited: HashSet<Index> = self.walk_indices(self.root).collect();
        if let Some((_, node)) = self.arena.iter().find(|(idx, _)| !visited.contains(idx)) {
            return Err(DomainError::Unreachable(node.id.clone()));
        }
        Ok(())
    }

    /// Export as a node list in pre-order, root first. Feeding the result back
    /// into [`OrgTree::from_records`] reproduces an equal tree.
    pub fn to_records(&self) -> Vec<NodeRecord> {
        self.iter().map(|n| n.to_record()).collect()
    }
}

impl PartialEq for OrgTree {
    fn eq(&self, other: &Self) -> bool {
        self.root_id() == other.root_id() && self.to_records() == other.to_records()
    }
}

impl Eq for OrgTree {}

/// Borrowed view of a node together with the tree it belongs to.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a OrgTree,
    node: &'a OrgNode,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a NodeId {
        &self.node.id
    }

    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    pub fn attributes(&self) -> &'a Attributes {
        &self.node.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.node.attributes.get(key).map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        let node = self.node;
        node.children
            .iter()
            .filter_map(move |&idx| tree.node_ref(idx))
    }

    pub fn child_ids(&self) -> Vec<NodeId> {
        self.children().map(|c| c.id().clone()).collect()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|idx| self.tree.node_ref(idx))
    }

    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            id: self.node.id.clone(),
            name: self.node.name.clone(),
            subordinates: self.child_ids(),
            attributes: self.node.attributes.clone(),
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.node.id)
            .field("name", &self.node.name)
            .field("children", &self.child_ids())
            .finish()
    }
}

/// Lazy depth-first pre-order iterator.
#[derive(Debug)]
pub struct Traverse<'a> {
    tree: &'a OrgTree,
    stack: Vec<Index>,
    view: Option<&'a ViewState>,
}

impl<'a> Traverse<'a> {
    fn new(tree: &'a OrgTree, start: Index, view: Option<&'a ViewState>) -> Self {
        Self {
            tree,
            stack: vec![start],
            view,
        }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current_idx) {
                let expanded = self.view.map_or(true, |view| !view.is_collapsed(&node.id));
                if expanded {
                    // Push children in reverse order for left-to-right traversal
                    self.stack.extend(node.children.iter().rev());
                }
                return Some(NodeRef {
                    tree: self.tree,
                    node,
                });
            }
        }
        None
    }
}

/// Lazy depth-first post-order iterator: subordinates before their manager.
#[derive(Debug)]
pub struct PostOrderIterator<'a> {
    tree: &'a OrgTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a OrgTree, start: Index) -> Self {
        Self {
            tree,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current_idx) {
                if visited {
                    return Some(NodeRef {
                        tree: self.tree,
                        node,
                    });
                }
                self.stack.push((current_idx, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chart() -> OrgTree {
        let records = vec![
            NodeRecord::new("DIRETORIA", "DIRETORIA").with_subordinates([1, 2]),
            NodeRecord::new(1, "DIRETOR 1").with_subordinates([12, 13, 14]),
            NodeRecord::new(2, "DIRETOR 2"),
            NodeRecord::new(12, "Linda Newland"),
            NodeRecord::new(13, "Linda Newland"),
            NodeRecord::new(14, "Kaesyo").with_subordinates([45, 46]),
            NodeRecord::new(45, "Juniord"),
            NodeRecord::new(46, "Executive Assistant"),
        ];
        OrgTree::from_records(records, &NodeId::from("DIRETORIA")).unwrap()
    }

    #[test]
    fn given_chart_when_walking_parent_links_then_finds_ancestors() {
        let tree = small_chart();
        let idx_1 = tree.lookup(&NodeId::from(1)).unwrap();
        let idx_46 = tree.lookup(&NodeId::from(46)).unwrap();
        let idx_2 = tree.lookup(&NodeId::from(2)).unwrap();

        assert!(tree.is_ancestor_idx(idx_1, idx_46));
        assert!(tree.is_ancestor_idx(tree.root, idx_46));
        assert!(!tree.is_ancestor_idx(idx_2, idx_46));
        assert!(!tree.is_ancestor_idx(idx_46, idx_1));
    }

    #[test]
    fn given_node_when_detached_and_attached_then_links_stay_consistent() {
        let mut tree = small_chart();
        let idx_14 = tree.lookup(&NodeId::from(14)).unwrap();
        let idx_2 = tree.lookup(&NodeId::from(2)).unwrap();

        let old = tree.detach(idx_14);
        assert_eq!(old, tree.index.get(&NodeId::from(1)).copied());
        assert_eq!(tree.detach(idx_14), None, "second detach is a no-op");

        tree.attach(idx_14, idx_2);
        assert!(tree.check_invariants().is_ok());
        assert_eq!(
            tree.children_of(&NodeId::from(2)).unwrap(),
            vec![NodeId::from(14)]
        );
    }

    #[test]
    fn given_half_applied_move_when_checking_invariants_then_reports_orphan() {
        let mut tree = small_chart();
        let idx_14 = tree.lookup(&NodeId::from(14)).unwrap();
        tree.detach(idx_14);

        assert_eq!(
            tree.check_invariants(),
            Err(DomainError::Unreachable(NodeId::from(14)))
        );
    }

    #[test]
    fn given_chart_when_calculating_depth_then_counts_levels() {
        assert_eq!(small_chart().depth(), 4);
    }
}
