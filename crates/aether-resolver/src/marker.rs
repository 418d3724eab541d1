//! Conflict marking: assigns each dependency node a `conflict_id` such that
//! nodes sharing groupId/artifactId/extension/classifier — and nodes related
//! through a relocation or alias chain — end up in the same group.
//!
//! A union-find over fingerprint strings, rather than over node indices,
//! since the thing being merged is "these coordinates are the same conflict
//! group", and several nodes can independently contribute the same
//! fingerprint.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use aether_core::node::Graph;

#[derive(Default)]
pub struct ConflictMarker {
    parent: HashMap<String, String>,
}

impl ConflictMarker {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&mut self, key: &str) -> String {
        let next = match self.parent.get(key) {
            Some(p) if p != key => p.clone(),
            _ => return key.to_string(),
        };
        let root = self.find(&next);
        self.parent.insert(key.to_string(), root.clone());
        root
    }

    fn union(&mut self, a: &str, b: &str) {
        self.parent.entry(a.to_string()).or_insert_with(|| a.to_string());
        self.parent.entry(b.to_string()).or_insert_with(|| b.to_string());
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }

    /// Walk every node in the arena (not just the reachable tree — a shared
    /// subtree is present only once in the arena) and assign conflict ids.
    pub fn mark(&mut self, graph: &mut Graph) -> HashMap<NodeIndex, String> {
        for idx in graph.all_indices() {
            let keys = graph.node(idx).conflict_fingerprints();
            let Some(first) = keys.first().cloned() else {
                continue;
            };
            self.parent.entry(first.clone()).or_insert_with(|| first.clone());
            for other in &keys[1..] {
                self.union(&first, other);
            }
        }

        let mut ids = HashMap::new();
        for idx in graph.all_indices() {
            let keys = graph.node(idx).conflict_fingerprints();
            let Some(first) = keys.first() else { continue };
            let group = self.find(first);
            graph.node_mut(idx).conflict_id = Some(group.clone());
            ids.insert(idx, group);
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::coordinate::Artifact;
    use aether_core::dependency::Dependency;
    use aether_core::node::DependencyNode;

    fn dep(group: &str, artifact: &str, version: &str) -> Dependency {
        Dependency::new(Artifact::new(group, artifact, version))
    }

    #[test]
    fn same_ga_different_version_share_a_group() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);
        let a = graph.add_node(DependencyNode::new(Some(dep("g", "x", "1.0"))));
        let b = graph.add_node(DependencyNode::new(Some(dep("g", "x", "2.0"))));
        graph.link(root, a);
        graph.link(root, b);

        let ids = ConflictMarker::new().mark(&mut graph);
        assert_eq!(ids[&a], ids[&b]);
    }

    #[test]
    fn relocation_merges_old_and_new_groups() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);
        let mut old_node = DependencyNode::new(Some(dep("old.group", "lib", "1.0")));
        old_node.relocations.push(Artifact::new("new.group", "lib", "1.0"));
        let old = graph.add_node(old_node);
        let new = graph.add_node(DependencyNode::new(Some(dep("new.group", "lib", "2.0"))));
        graph.link(root, old);
        graph.link(root, new);

        let ids = ConflictMarker::new().mark(&mut graph);
        assert_eq!(ids[&old], ids[&new]);
    }

    #[test]
    fn unrelated_artifacts_get_distinct_groups() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);
        let a = graph.add_node(DependencyNode::new(Some(dep("g", "a", "1.0"))));
        let b = graph.add_node(DependencyNode::new(Some(dep("g", "b", "1.0"))));
        graph.link(root, a);
        graph.link(root, b);

        let ids = ConflictMarker::new().mark(&mut graph);
        assert_ne!(ids[&a], ids[&b]);
    }
}
