//! Search-filtered schema tree.
//!
//! Nodes live in an arena addressed by [`NodeId`]; children are id lists and each
//! node records its parent id, so there are no reference cycles. A node's path
//! (ancestor labels plus its own, root excluded) identifies it uniquely.

use crate::metadata::Category;
use std::collections::{HashMap, HashSet};

/// Character stripped from search input before substring comparison.
pub const WILDCARD: char = '*';

const ROOT: NodeId = NodeId(0);

/// Stable index of a node inside a [`NodeTree`] until the next [`NodeTree::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node represents, derived from its depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Category,
    Entity,
    Field,
}

impl NodeKind {
    const fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Self::Root,
            1 => Self::Category,
            2 => Self::Entity,
            _ => Self::Field,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub label: String,
    pub path: Vec<String>,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub expanded: bool,
}

impl Node {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One row of the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visible {
    pub id: NodeId,
    pub depth: usize,
}

/// Lowercase the term and drop wildcard markers.
#[must_use]
pub fn normalize_term(search: &str) -> String {
    search
        .chars()
        .filter(|c| *c != WILDCARD)
        .collect::<String>()
        .trim()
        .to_lowercase()
}

fn label_matches(label: &str, term: &str) -> bool {
    term.is_empty() || label.to_lowercase().contains(term)
}

#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
    index: HashMap<Vec<String>, NodeId>,
    /// Paths the user expanded; survives `clear` so rebuilds keep the view.
    remembered: HashSet<Vec<String>>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                label: String::new(),
                path: Vec::new(),
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                expanded: true,
            }],
            index: HashMap::new(),
            remembered: HashSet::new(),
        }
    }

    /// Drop every node below the root. Remembered expansion is kept.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].children.clear();
        self.index.clear();
    }

    /// Number of nodes, root excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id == ROOT {
            return None;
        }
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn find(&self, path: &[String]) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// Top-level nodes in display order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.nodes[0].children
    }

    /// Ensure a node exists at `parents + [label]`, creating intermediate nodes.
    ///
    /// With a non-empty `search` only the prefix of the path ending at the deepest
    /// segment that contains the term is kept, so a node survives iff its own label
    /// matches or it leads to a matching descendant. Inserting an existing path
    /// merges into it. Returns the deepest node kept, or `None` if nothing matched.
    pub fn add_child(&mut self, parents: &[String], label: &str, search: &str) -> Option<NodeId> {
        let term = normalize_term(search);
        let segments: Vec<&str> = parents
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(label))
            .collect();

        let keep = if term.is_empty() {
            segments.len()
        } else {
            segments
                .iter()
                .rposition(|seg| label_matches(seg, &term))
                .map(|i| i + 1)?
        };

        let mut current = ROOT;
        let mut path = Vec::with_capacity(keep);
        for seg in &segments[..keep] {
            path.push((*seg).to_string());
            current = self.ensure(current, &path);
        }
        Some(current)
    }

    fn ensure(&mut self, parent: NodeId, path: &[String]) -> NodeId {
        if let Some(id) = self.index.get(path) {
            return *id;
        }

        let id = NodeId(self.nodes.len());
        let label = path.last().cloned().unwrap_or_default();
        self.nodes.push(Node {
            label,
            path: path.to_vec(),
            kind: NodeKind::from_depth(path.len()),
            parent: Some(parent),
            children: Vec::new(),
            expanded: self.remembered.contains(path),
        });
        self.index.insert(path.to_vec(), id);

        if parent == ROOT {
            // Categories keep their fixed priority regardless of arrival order
            let rank = |n: &Node| Category::from_label(&n.label).map_or(usize::MAX, Category::priority);
            let new_rank = rank(&self.nodes[id.0]);
            let pos = self.nodes[0]
                .children
                .iter()
                .position(|c| rank(&self.nodes[c.0]) > new_rank)
                .unwrap_or(self.nodes[0].children.len());
            self.nodes[0].children.insert(pos, id);
        } else {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Flip a node's expanded flag. Returns the new state.
    pub fn toggle_expand(&mut self, id: NodeId) -> bool {
        let expanded = self.get(id).is_some_and(|n| !n.expanded);
        self.set_expanded(id, expanded);
        expanded
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if id == ROOT {
            return;
        }
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        node.expanded = expanded;
        if expanded {
            self.remembered.insert(node.path.clone());
        } else {
            self.remembered.remove(&node.path);
        }
    }

    /// Expand every node that has children. Not remembered across rebuilds.
    pub fn expand_all(&mut self) {
        for node in self.nodes.iter_mut().skip(1) {
            if !node.children.is_empty() {
                node.expanded = true;
            }
        }
    }

    /// Paths of branch nodes currently shown collapsed.
    #[must_use]
    pub fn collapsed_paths(&self) -> HashSet<Vec<String>> {
        self.nodes
            .iter()
            .skip(1)
            .filter(|n| !n.children.is_empty() && !n.expanded)
            .map(|n| n.path.clone())
            .collect()
    }

    /// Collapse every node whose path is listed. Remembered expansion is untouched.
    pub fn collapse_paths(&mut self, paths: &HashSet<Vec<String>>) {
        for node in self.nodes.iter_mut().skip(1) {
            if paths.contains(&node.path) {
                node.expanded = false;
            }
        }
    }

    /// Pre-order walk that only descends into expanded nodes.
    ///
    /// Computed fresh on every call.
    #[must_use]
    pub fn flatten(&self) -> Vec<Visible> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<Visible> = self.nodes[0]
            .children
            .iter()
            .rev()
            .map(|&id| Visible { id, depth: 0 })
            .collect();

        while let Some(item) = stack.pop() {
            out.push(item);
            let node = &self.nodes[item.id.0];
            if node.expanded {
                stack.extend(node.children.iter().rev().map(|&id| Visible {
                    id,
                    depth: item.depth + 1,
                }));
            }
        }
        out
    }

    /// Count of all nodes below `id`, regardless of expansion.
    #[must_use]
    pub fn descendant_count(&self, id: NodeId) -> usize {
        let Some(node) = self.nodes.get(id.0) else {
            return 0;
        };
        node.children
            .iter()
            .map(|&c| 1 + self.descendant_count(c))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| (*s).to_string()).collect()
    }

    fn labels(tree: &NodeTree) -> Vec<String> {
        tree.flatten()
            .into_iter()
            .map(|v| tree.get(v.id).map(|n| n.label.clone()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_add_child_is_idempotent() {
        let mut tree = NodeTree::new();
        let first = tree.add_child(&p(&["Tables"]), "users", "");
        let second = tree.add_child(&p(&["Tables"]), "users", "");
        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.roots().len(), 1);

        let tables = tree.find(&p(&["Tables"])).unwrap();
        assert_eq!(tree.get(tables).unwrap().children.len(), 1);
    }

    #[test]
    fn test_search_keeps_matching_chain_only() {
        let mut tree = NodeTree::new();
        tree.add_child(&[], "Tables", "user");
        tree.add_child(&p(&["Tables"]), "users_by_email", "user");
        tree.add_child(&p(&["Tables"]), "orders", "user");

        assert!(tree.find(&p(&["Tables", "users_by_email"])).is_some());
        assert!(tree.find(&p(&["Tables"])).is_some());
        assert!(tree.find(&p(&["Tables", "orders"])).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_and_strips_wildcard() {
        let mut tree = NodeTree::new();
        assert!(tree.add_child(&p(&["Tables"]), "UserProfiles", "*PROF*").is_some());
        assert!(tree.add_child(&p(&["Tables"]), "orders", "*PROF*").is_none());
        assert_eq!(normalize_term(" *Us*er "), "user");
    }

    #[test]
    fn test_matching_ancestor_kept_without_children() {
        let mut tree = NodeTree::new();
        let id = tree.add_child(&p(&["UserTypes", "address"]), "street", "address");
        assert_eq!(id, tree.find(&p(&["UserTypes", "address"])));
        assert!(tree.find(&p(&["UserTypes", "address", "street"])).is_none());
    }

    #[test]
    fn test_categories_follow_priority() {
        let mut tree = NodeTree::new();
        tree.add_child(&[], "UserTypes", "");
        tree.add_child(&[], "Views", "");
        tree.add_child(&[], "Tables", "");
        tree.add_child(&[], "Functions", "");
        assert_eq!(labels(&tree), vec!["Tables", "Functions", "Views", "UserTypes"]);
    }

    #[test]
    fn test_flatten_respects_expanded() {
        let mut tree = NodeTree::new();
        for name in ["a", "b", "c"] {
            tree.add_child(&p(&["Tables"]), name, "");
        }
        tree.add_child(&p(&["Tables", "a"]), "x", "");
        let tables = tree.find(&p(&["Tables"])).unwrap();

        assert_eq!(tree.descendant_count(tables), 4);
        assert_eq!(tree.flatten().len(), 1);

        tree.toggle_expand(tables);
        assert_eq!(labels(&tree), vec!["Tables", "a", "b", "c"]);
        assert_eq!(tree.flatten()[1].depth, 1);

        tree.expand_all();
        assert_eq!(labels(&tree), vec!["Tables", "a", "x", "b", "c"]);
        assert_eq!(tree.flatten()[2].depth, 2);
    }

    #[test]
    fn test_expansion_remembered_across_clear() {
        let mut tree = NodeTree::new();
        tree.add_child(&p(&["Tables"]), "users", "");
        let tables = tree.find(&p(&["Tables"])).unwrap();
        assert!(tree.toggle_expand(tables));

        tree.clear();
        assert!(tree.is_empty());
        tree.add_child(&p(&["Tables"]), "users", "");
        let tables = tree.find(&p(&["Tables"])).unwrap();
        assert!(tree.get(tables).unwrap().expanded);
        assert_eq!(tree.flatten().len(), 2);
    }

    #[test]
    fn test_kinds_follow_depth() {
        let mut tree = NodeTree::new();
        let field = tree
            .add_child(&p(&["UserTypes", "address"]), "street", "")
            .unwrap();
        assert_eq!(tree.get(field).unwrap().kind, NodeKind::Field);
        let entity = tree.find(&p(&["UserTypes", "address"])).unwrap();
        assert_eq!(tree.get(entity).unwrap().kind, NodeKind::Entity);
        assert_eq!(tree.get(entity).unwrap().parent, tree.find(&p(&["UserTypes"])));
    }
}
