//! Topological ordering of conflict ids: a group's parent groups are resolved
//! before it is, so scope/optionality derivation can consult an already
//! resolved ancestor. Groups that cannot be ordered (a cycle strictly among
//! conflict ids, not the single-node collector-level cycle stubs) are
//! reported separately rather than silently dropped.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;

use aether_core::node::Graph;

pub struct SortedConflictIds {
    /// Parent groups before child groups; leaf groups last.
    pub order: Vec<String>,
    /// Groups that could not be placed by Kahn's algorithm because they sit
    /// on a cycle of group-to-group edges.
    pub cyclic: HashSet<String>,
}

pub struct ConflictIdSorter;

impl ConflictIdSorter {
    /// `conflict_ids` maps every node with a dependency to its group id.
    pub fn sort(graph: &Graph, conflict_ids: &HashMap<NodeIndex, String>) -> SortedConflictIds {
        let mut edges: HashMap<String, HashSet<String>> = HashMap::new();
        let mut indegree: HashMap<String, usize> = HashMap::new();

        for id in conflict_ids.values() {
            edges.entry(id.clone()).or_default();
            indegree.entry(id.clone()).or_insert(0);
        }

        for idx in graph.all_indices() {
            let Some(parent_id) = conflict_ids.get(&idx) else { continue };
            for &child in graph.children_of(idx) {
                let Some(child_id) = conflict_ids.get(&child) else { continue };
                if child_id == parent_id {
                    continue;
                }
                if edges.get_mut(parent_id).unwrap().insert(child_id.clone()) {
                    *indegree.entry(child_id.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut queue: VecDeque<String> = indegree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(id, _)| id.clone())
            .collect();
        let mut order = Vec::new();
        let mut remaining = indegree.clone();

        while let Some(id) = queue.pop_front() {
            order.push(id.clone());
            for child in edges.get(&id).into_iter().flatten() {
                let d = remaining.get_mut(child).unwrap();
                *d -= 1;
                if *d == 0 {
                    queue.push_back(child.clone());
                }
            }
        }

        let ordered: HashSet<&String> = order.iter().collect();
        let cyclic: HashSet<String> = indegree
            .keys()
            .filter(|id| !ordered.contains(id))
            .cloned()
            .collect();
        // Groups on a cycle still need to be resolved; append them after the
        // well-ordered prefix rather than dropping them.
        order.extend(cyclic.iter().cloned());

        SortedConflictIds { order, cyclic }
    }
}
