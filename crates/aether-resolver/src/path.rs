//! The path-based resolver's parallel, cycle-free tree over the raw graph.
//!
//! Distinct `Path` entries may share the same underlying `NodeIndex` when
//! more than one route reaches it; conflict groups are built from `Path`
//! entries, not raw nodes, so every route contributes its own derived
//! scope/optionality/depth to the group.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use aether_core::dependency::DependencyScope;
use aether_core::node::Graph;

use crate::selectors::{derive_scope, ConflictItem};

pub struct PathNode {
    pub node_idx: NodeIndex,
    pub parent: Option<usize>,
    pub conflict_id: String,
    pub depth: usize,
    pub scope: DependencyScope,
    pub optional: bool,
    pub children: Vec<usize>,
    /// Children that would re-enter an ancestor already on this route; kept
    /// as a record but never walked further.
    pub cycle_stubs: Vec<NodeIndex>,
}

pub struct PathArena {
    pub nodes: Vec<PathNode>,
}

impl PathArena {
    pub fn node(&self, idx: usize) -> &PathNode {
        &self.nodes[idx]
    }
}

/// Build the path arena plus a `conflict_id -> Path indices` grouping.
pub fn build_paths(graph: &Graph, conflict_ids: &HashMap<NodeIndex, String>) -> (PathArena, HashMap<String, Vec<usize>>) {
    let mut arena = PathArena { nodes: Vec::new() };
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();

    let Some(root) = graph.root() else {
        return (arena, groups);
    };

    let mut ancestors = vec![root];
    for &child in graph.children_of(root) {
        walk(
            graph,
            conflict_ids,
            child,
            None,
            1,
            DependencyScope::Compile,
            false,
            &mut ancestors,
            &mut arena,
            &mut groups,
        );
    }

    (arena, groups)
}

#[allow(clippy::too_many_arguments)]
fn walk(
    graph: &Graph,
    conflict_ids: &HashMap<NodeIndex, String>,
    node_idx: NodeIndex,
    parent_path: Option<usize>,
    depth: usize,
    parent_scope: DependencyScope,
    parent_optional: bool,
    ancestors: &mut Vec<NodeIndex>,
    arena: &mut PathArena,
    groups: &mut HashMap<String, Vec<usize>>,
) {
    if ancestors.contains(&node_idx) {
        if let Some(p) = parent_path {
            arena.nodes[p].cycle_stubs.push(node_idx);
        }
        return;
    }

    let node = graph.node(node_idx);
    let Some(declared) = node.dependency.as_ref() else {
        return;
    };
    let scope = derive_scope(parent_scope, declared.scope, depth);
    let optional = declared.optional || (depth > 1 && parent_optional);
    let conflict_id = conflict_ids.get(&node_idx).cloned().unwrap_or_default();

    let path_idx = arena.nodes.len();
    arena.nodes.push(PathNode {
        node_idx,
        parent: parent_path,
        conflict_id: conflict_id.clone(),
        depth,
        scope,
        optional,
        children: Vec::new(),
        cycle_stubs: Vec::new(),
    });
    if let Some(p) = parent_path {
        arena.nodes[p].children.push(path_idx);
    }
    groups.entry(conflict_id).or_default().push(path_idx);

    ancestors.push(node_idx);
    for &child in graph.children_of(node_idx) {
        walk(
            graph,
            conflict_ids,
            child,
            Some(path_idx),
            depth + 1,
            scope,
            optional,
            ancestors,
            arena,
            groups,
        );
    }
    ancestors.pop();
}

/// Collect the `ConflictItem`s for one group's path indices, reading each
/// item's declared version/constraint straight off the underlying graph node.
pub fn conflict_items(graph: &Graph, arena: &PathArena, path_indices: &[usize]) -> Vec<ConflictItem> {
    path_indices
        .iter()
        .map(|&path_idx| {
            let p = arena.node(path_idx);
            let node = graph.node(p.node_idx);
            let dep = node.dependency.as_ref().expect("path nodes always carry a dependency");
            ConflictItem {
                path_idx,
                version: dep.artifact.version.clone(),
                constraint: node.version_constraint.clone(),
                depth: p.depth,
                scope: p.scope,
                optional: p.optional,
            }
        })
        .collect()
}
