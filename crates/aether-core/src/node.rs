//! The dependency graph's arena.
//!
//! Nodes are allocated into a `petgraph::graph::DiGraph` that is never
//! shrunk; the graph gives each node a stable `NodeIndex` and records edges
//! for reverse (`dependents_of`) queries, while each node additionally keeps
//! an explicit, declaration-ordered `children` list — `DiGraph`'s own edge
//! iteration order is not declaration order, and "nearest wins" tie-breaking
//! depends on that order being exact. A single `NodeIndex` may be the target
//! of more than one parent edge: that is how a subtree reached through two
//! different routes is shared rather than duplicated.

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::coordinate::Artifact;
use crate::dependency::{Dependency, DependencyScope};

/// Which fields of a [`Dependency`] were overwritten by dependency management
/// before this node was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagedBits {
    pub version: bool,
    pub scope: bool,
    pub optional: bool,
    pub exclusions: bool,
    pub properties: bool,
}

impl ManagedBits {
    pub fn any(&self) -> bool {
        self.version || self.scope || self.optional || self.exclusions || self.properties
    }
}

/// Scratch values the resolver records on scratch `data` during conflict
/// resolution: winner back-references and pre-resolution scope/optionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScratchValue {
    NodeRef(NodeIndex),
    Scope(DependencyScope),
    Bool(bool),
    Text(String),
}

pub const DATA_KEY_CONFLICT_WINNER: &str = "conflict.winner";
pub const DATA_KEY_ORIGINAL_SCOPE: &str = "conflict.originalScope";
pub const DATA_KEY_ORIGINAL_OPTIONALITY: &str = "conflict.originalOptionality";

/// A node in the raw (pre- or post-resolution) dependency graph.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    /// `None` only for the synthetic root node of a collect request that
    /// supplied a bare root artifact rather than a root dependency.
    pub dependency: Option<Dependency>,
    /// Declaration-ordered children; order is load-bearing for nearest-wins.
    pub children: Vec<NodeIndex>,
    /// The raw version constraint text this node was created under (a range
    /// or a concrete version), before range resolution picked a winner.
    pub version_constraint: Option<String>,
    /// Repository ids the artifact was found in, aggregated across routes.
    pub repositories: Vec<String>,
    /// Chain of coordinates this node was redirected through via descriptor relocation.
    pub relocations: Vec<Artifact>,
    /// Coordinates considered equivalent to this node's artifact.
    pub aliases: Vec<Artifact>,
    pub managed_bits: ManagedBits,
    /// Assigned by the conflict marker; empty until marking runs.
    pub conflict_id: Option<String>,
    pub data: BTreeMap<String, ScratchValue>,
}

impl DependencyNode {
    pub fn new(dependency: Option<Dependency>) -> Self {
        Self {
            dependency,
            children: Vec::new(),
            version_constraint: None,
            repositories: Vec::new(),
            relocations: Vec::new(),
            aliases: Vec::new(),
            managed_bits: ManagedBits::default(),
            conflict_id: None,
            data: BTreeMap::new(),
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.dependency.as_ref().map(|d| &d.artifact)
    }

    /// All fingerprints that should be unioned into one conflict group for
    /// this node: its own coordinate plus every relocation/alias coordinate.
    pub fn conflict_fingerprints(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let Some(a) = self.artifact() {
            keys.push(a.conflict_fingerprint());
        }
        keys.extend(self.relocations.iter().map(Artifact::conflict_fingerprint));
        keys.extend(self.aliases.iter().map(Artifact::conflict_fingerprint));
        keys
    }
}

/// Arena-backed dependency graph. Edges exist for reverse traversal; forward
/// traversal always goes through each node's `children` vector.
pub struct Graph {
    arena: DiGraph<DependencyNode, ()>,
    root: Option<NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            arena: DiGraph::new(),
            root: None,
        }
    }

    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        self.arena.add_node(node)
    }

    pub fn set_root(&mut self, idx: NodeIndex) {
        self.root = Some(idx);
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Append `child` to `parent`'s declaration-ordered children and record
    /// the corresponding arena edge. Does not deduplicate: the same child may
    /// legitimately be linked from several parents (shared subtree), and a
    /// cycle stub intentionally repeats an ancestor's index.
    pub fn link(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.arena[parent].children.push(child);
        self.arena.add_edge(parent, child, ());
    }

    pub fn node(&self, idx: NodeIndex) -> &DependencyNode {
        &self.arena[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut DependencyNode {
        &mut self.arena[idx]
    }

    pub fn children_of(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.arena[idx].children
    }

    /// Nodes with an incoming edge from `idx` (i.e. who points at `idx`).
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.arena
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    /// Every index in the arena, in allocation order. Unlike [`Self::walk_preorder`]
    /// this visits a shared subtree's node exactly once, which is what
    /// whole-graph passes (conflict marking, id sorting) need.
    pub fn all_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.arena.node_indices()
    }

    /// Depth-first walk from the root, in declaration order, calling `visit`
    /// once per (index, depth). Does not protect against revisiting a shared
    /// subtree — callers that need cycle safety should track visited indices
    /// themselves via the per-call parent-stack, as the collector does.
    pub fn walk_preorder<F: FnMut(NodeIndex, usize)>(&self, mut visit: F) {
        let Some(root) = self.root else { return };
        let mut stack = vec![(root, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            visit(idx, depth);
            for &child in self.children_of(idx).iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(group: &str, artifact: &str, version: &str) -> Dependency {
        Dependency::new(Artifact::new(group, artifact, version))
    }

    #[test]
    fn shared_subtree_has_two_dependents() {
        let mut g = Graph::new();
        let root = g.add_node(DependencyNode::new(None));
        g.set_root(root);
        let a = g.add_node(DependencyNode::new(Some(dep("g", "a", "1.0"))));
        let b = g.add_node(DependencyNode::new(Some(dep("g", "b", "1.0"))));
        let shared = g.add_node(DependencyNode::new(Some(dep("g", "shared", "1.0"))));

        g.link(root, a);
        g.link(root, b);
        g.link(a, shared);
        g.link(b, shared);

        let dependents = g.dependents_of(shared);
        assert_eq!(dependents.len(), 2);
        assert!(dependents.contains(&a));
        assert!(dependents.contains(&b));
    }

    #[test]
    fn children_preserve_declaration_order() {
        let mut g = Graph::new();
        let root = g.add_node(DependencyNode::new(None));
        g.set_root(root);
        let first = g.add_node(DependencyNode::new(Some(dep("g", "first", "1.0"))));
        let second = g.add_node(DependencyNode::new(Some(dep("g", "second", "1.0"))));
        g.link(root, first);
        g.link(root, second);
        assert_eq!(g.children_of(root), &[first, second]);
    }

    #[test]
    fn walk_preorder_visits_root_then_children_in_order() {
        let mut g = Graph::new();
        let root = g.add_node(DependencyNode::new(None));
        g.set_root(root);
        let a = g.add_node(DependencyNode::new(Some(dep("g", "a", "1.0"))));
        let b = g.add_node(DependencyNode::new(Some(dep("g", "b", "1.0"))));
        g.link(root, a);
        g.link(root, b);

        let mut visited = Vec::new();
        g.walk_preorder(|idx, depth| visited.push((idx, depth)));
        assert_eq!(visited, vec![(root, 0), (a, 1), (b, 1)]);
    }

    #[test]
    fn conflict_fingerprints_include_relocations() {
        let mut node = DependencyNode::new(Some(dep("old.group", "lib", "1.0")));
        node.relocations.push(Artifact::new("new.group", "lib", "1.0"));
        let fps = node.conflict_fingerprints();
        assert_eq!(fps.len(), 2);
        assert_ne!(fps[0], fps[1]);
    }
}
