//! Conflict resolution orchestration: mark groups, order them, build the
//! path tree, pick a winner per group, and rewrite the graph according to
//! the configured verbosity.

use std::collections::HashSet;
use std::fmt;

use petgraph::graph::NodeIndex;

use aether_core::node::{Graph, ScratchValue, DATA_KEY_CONFLICT_WINNER, DATA_KEY_ORIGINAL_OPTIONALITY, DATA_KEY_ORIGINAL_SCOPE};
use aether_core::session::{ResolverSession, Verbosity};
use aether_core::version::VersionRange;
use aether_util::errors::{AetherError, AetherResult};

use crate::marker::ConflictMarker;
use crate::path::{build_paths, conflict_items, PathArena};
use crate::selectors::{select_optionality, select_scope, select_version};
use crate::sorter::ConflictIdSorter;

/// One resolved conflict group: which node won, and which lost.
#[derive(Debug, Clone)]
pub struct GroupResolution {
    pub conflict_id: String,
    pub group_id: String,
    pub artifact_id: String,
    pub winner: NodeIndex,
    pub winner_version: String,
    pub losers: Vec<LoserEntry>,
}

#[derive(Debug, Clone)]
pub struct LoserEntry {
    pub node: NodeIndex,
    pub version: String,
    pub pruned: bool,
}

/// Summary of everything the resolver decided, in group-processing order.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub groups: Vec<GroupResolution>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return write!(f, "No conflicts.");
        }
        writeln!(f, "Conflicts resolved ({}):", self.groups.len())?;
        for g in &self.groups {
            writeln!(
                f,
                "  {}:{} -> {} ({} loser(s))",
                g.group_id,
                g.artifact_id,
                g.winner_version,
                g.losers.len()
            )?;
        }
        Ok(())
    }
}

/// Mark, order, build paths, and resolve every conflict group in the graph.
pub fn resolve(session: &ResolverSession, graph: &mut Graph) -> AetherResult<ConflictReport> {
    let conflict_ids = ConflictMarker::new().mark(graph);
    let sorted = ConflictIdSorter::sort(graph, &conflict_ids);
    let (arena, groups) = build_paths(graph, &conflict_ids);

    let mut report = ConflictReport::default();

    for conflict_id in &sorted.order {
        let Some(path_indices) = groups.get(conflict_id) else { continue };
        if path_indices.is_empty() {
            continue;
        }
        let resolution = resolve_group(session, graph, &arena, conflict_id, path_indices)?;
        apply_verbosity(session, graph, &arena, path_indices, &resolution);
        report.groups.push(resolution);
    }

    Ok(report)
}

fn resolve_group(
    session: &ResolverSession,
    graph: &Graph,
    arena: &PathArena,
    conflict_id: &str,
    path_indices: &[usize],
) -> AetherResult<GroupResolution> {
    let items = conflict_items(graph, arena, path_indices);

    let (group_id, artifact_id) = {
        let any_node = arena.node(path_indices[0]).node_idx;
        let artifact = graph
            .node(any_node)
            .artifact()
            .expect("conflict groups only ever contain nodes with a dependency");
        (artifact.group_id.clone(), artifact.artifact_id.clone())
    };

    let Some(winner_item_idx) = select_version(&items, session.version_selector) else {
        let paths: Vec<String> = items.iter().map(|i| i.version.clone()).collect();
        return Err(AetherError::UnsolvableVersionConflict {
            group_id,
            artifact_id,
            paths,
        }
        .into());
    };

    if session.enforce_version_convergence {
        let distinct: HashSet<&str> = items.iter().map(|i| i.version.as_str()).collect();
        let winner_is_range = items
            .iter()
            .any(|i| i.constraint.as_deref().and_then(VersionRange::parse).is_some());
        if distinct.len() > 1 && !winner_is_range {
            let mut versions: Vec<String> = distinct.into_iter().map(str::to_string).collect();
            versions.sort();
            return Err(AetherError::VersionConvergenceViolated {
                group_id,
                artifact_id,
                versions,
            }
            .into());
        }
    }

    let winner_path_idx = items[winner_item_idx].path_idx;
    let winner_node = arena.node(winner_path_idx).node_idx;
    let winner_version = items[winner_item_idx].version.clone();

    let mut seen_losers: HashSet<NodeIndex> = HashSet::new();
    let mut losers = Vec::new();
    for &pi in path_indices {
        let node_idx = arena.node(pi).node_idx;
        if node_idx == winner_node {
            continue;
        }
        if !seen_losers.insert(node_idx) {
            continue;
        }
        let version = graph
            .node(node_idx)
            .artifact()
            .map(|a| a.version.clone())
            .unwrap_or_default();
        losers.push(LoserEntry {
            node: node_idx,
            version,
            pruned: false,
        });
    }

    tracing::debug!(
        group = conflict_id,
        winner = %winner_version,
        losers = losers.len(),
        "resolved conflict group"
    );

    Ok(GroupResolution {
        conflict_id: conflict_id.to_string(),
        group_id,
        artifact_id,
        winner: winner_node,
        winner_version,
        losers,
    })
}

fn apply_verbosity(
    session: &ResolverSession,
    graph: &mut Graph,
    arena: &PathArena,
    path_indices: &[usize],
    resolution: &GroupResolution,
) {
    // Mutate the winner's effective scope/optionality now that we hold `&mut Graph`.
    let items = conflict_items(graph, arena, path_indices);
    let effective_scope = select_scope(&items);
    let effective_optional = select_optionality(&items);
    if let Some(dep) = graph.node_mut(resolution.winner).dependency.as_mut() {
        dep.scope = effective_scope;
        dep.optional = effective_optional;
    }

    let range_sibling_count = path_indices
        .iter()
        .filter(|&&pi| {
            let node_idx = arena.node(pi).node_idx;
            node_idx != resolution.winner
                && graph
                    .node(node_idx)
                    .artifact()
                    .map(|a| a.has_version_range())
                    .unwrap_or(false)
        })
        .count();

    for loser in &resolution.losers {
        let is_range_sibling = graph
            .node(loser.node)
            .artifact()
            .map(|a| a.has_version_range())
            .unwrap_or(false);

        match session.conflict_resolver_verbosity {
            Verbosity::None => unlink_everywhere(graph, loser.node),
            Verbosity::Standard => {
                if is_range_sibling && range_sibling_count > 1 {
                    unlink_everywhere(graph, loser.node);
                } else {
                    annotate_loser(graph, loser.node, resolution.winner);
                    graph.node_mut(loser.node).children.clear();
                }
            }
            Verbosity::Full => {
                annotate_loser(graph, loser.node, resolution.winner);
            }
        }
    }
}

fn annotate_loser(graph: &mut Graph, loser: NodeIndex, winner: NodeIndex) {
    let (scope, optional) = {
        let node = graph.node(loser);
        let dep = node.dependency.as_ref();
        (
            dep.map(|d| d.scope).unwrap_or_default(),
            dep.map(|d| d.optional).unwrap_or(false),
        )
    };
    let node = graph.node_mut(loser);
    node.data.insert(DATA_KEY_CONFLICT_WINNER.to_string(), ScratchValue::NodeRef(winner));
    node.data.insert(DATA_KEY_ORIGINAL_SCOPE.to_string(), ScratchValue::Scope(scope));
    node.data.insert(DATA_KEY_ORIGINAL_OPTIONALITY.to_string(), ScratchValue::Bool(optional));
}

fn unlink_everywhere(graph: &mut Graph, loser: NodeIndex) {
    let parents = graph.dependents_of(loser);
    for parent in parents {
        graph.node_mut(parent).children.retain(|&c| c != loser);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::coordinate::Artifact;
    use aether_core::dependency::Dependency;
    use aether_core::node::DependencyNode;
    use aether_core::spi::{AcceptAllSelector, AlwaysTraverse, ArtifactDescriptor, ArtifactDescriptorReader, BoxFuture, NoopDependencyManager, NoopVersionFilter, VersionRangeResolver};
    use aether_core::repository::RemoteRepository;
    use std::sync::Arc;

    struct DummyReader;
    impl ArtifactDescriptorReader for DummyReader {
        fn read_descriptor<'a>(
            &'a self,
            _artifact: &'a Artifact,
            _repositories: &'a [RemoteRepository],
        ) -> BoxFuture<'a, AetherResult<ArtifactDescriptor>> {
            Box::pin(async { Ok(ArtifactDescriptor::default()) })
        }
    }
    impl VersionRangeResolver for DummyReader {
        fn resolve_range<'a>(
            &'a self,
            _artifact: &'a Artifact,
            _repositories: &'a [RemoteRepository],
        ) -> BoxFuture<'a, AetherResult<Vec<String>>> {
            Box::pin(async { Ok(vec![]) })
        }
    }

    fn session() -> ResolverSession {
        ResolverSession::builder(Arc::new(DummyReader), Arc::new(DummyReader))
            .selector(Arc::new(AcceptAllSelector))
            .manager(Arc::new(NoopDependencyManager))
            .traverser(Arc::new(AlwaysTraverse))
            .version_filter(Arc::new(NoopVersionFilter))
            .build()
    }

    fn dep(group: &str, artifact: &str, version: &str) -> Dependency {
        Dependency::new(Artifact::new(group, artifact, version))
    }

    #[test]
    fn nearest_wins_and_loser_is_stubbed_with_winner_reference() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);
        let direct = graph.add_node(DependencyNode::new(Some(dep("g", "x", "2.0"))));
        let transitive_parent = graph.add_node(DependencyNode::new(Some(dep("g", "y", "1.0"))));
        let transitive = graph.add_node(DependencyNode::new(Some(dep("g", "x", "1.0"))));
        graph.link(root, direct);
        graph.link(root, transitive_parent);
        graph.link(transitive_parent, transitive);

        let sess = session();
        let report = resolve(&sess, &mut graph).unwrap();

        let group = report.groups.iter().find(|g| g.artifact_id == "x").unwrap();
        assert_eq!(group.winner, direct);
        assert_eq!(group.losers.len(), 1);
        assert_eq!(group.losers[0].node, transitive);

        let loser_node = graph.node(transitive);
        assert!(loser_node.data.contains_key(DATA_KEY_CONFLICT_WINNER));
    }

    #[test]
    fn verbosity_none_severs_loser_entirely() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);
        let direct = graph.add_node(DependencyNode::new(Some(dep("g", "x", "2.0"))));
        let transitive = graph.add_node(DependencyNode::new(Some(dep("g", "x", "1.0"))));
        graph.link(root, direct);
        graph.link(root, transitive);

        let mut sess = session();
        sess.conflict_resolver_verbosity = Verbosity::None;
        resolve(&sess, &mut graph).unwrap();

        assert!(!graph.children_of(root).contains(&transitive));
    }

    #[test]
    fn unsolvable_range_conflict_is_reported_as_an_error() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);
        let mut a = DependencyNode::new(Some(dep("g", "x", "1.0")));
        a.version_constraint = Some("[4.0,6.0)".to_string());
        let mut b = DependencyNode::new(Some(dep("g", "x", "5.0")));
        b.version_constraint = Some("[0.0,2.0)".to_string());
        let a_idx = graph.add_node(a);
        let b_idx = graph.add_node(b);
        graph.link(root, a_idx);
        graph.link(root, b_idx);

        let sess = session();
        assert!(resolve(&sess, &mut graph).is_err());
    }

    #[test]
    fn range_dependency_is_satisfied_by_a_direct_version() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);

        let mut ranged = DependencyNode::new(Some(dep("g", "x", "1.5")));
        ranged.version_constraint = Some("[1.0,2.0)".to_string());
        let via_a = graph.add_node(DependencyNode::new(Some(dep("g", "a", "1.0"))));
        let ranged_idx = graph.add_node(ranged);
        let direct = graph.add_node(DependencyNode::new(Some(dep("g", "x", "1.5"))));
        graph.link(root, via_a);
        graph.link(via_a, ranged_idx);
        graph.link(root, direct);

        let sess = session();
        let report = resolve(&sess, &mut graph).unwrap();

        let group = report
            .groups
            .iter()
            .find(|g| g.artifact_id == "x")
            .expect("x conflict group resolved");
        assert_eq!(group.winner, direct);
        assert_eq!(group.winner_version, "1.5");
        assert_eq!(group.losers.len(), 1);
        assert_eq!(group.losers[0].node, ranged_idx);
    }

    #[test]
    fn relocated_node_merges_into_the_new_coordinate_group() {
        let mut graph = Graph::new();
        let root = graph.add_node(DependencyNode::new(None));
        graph.set_root(root);

        let mut old_node = DependencyNode::new(Some(dep("old.group", "lib", "1.0")));
        old_node.relocations.push(Artifact::new("new.group", "lib", "1.0"));
        let old_idx = graph.add_node(old_node);
        let new_idx = graph.add_node(DependencyNode::new(Some(dep("new.group", "lib", "2.0"))));
        graph.link(root, old_idx);
        graph.link(root, new_idx);

        let sess = session();
        let report = resolve(&sess, &mut graph).unwrap();

        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.winner, new_idx);
        assert_eq!(group.losers.len(), 1);
        assert_eq!(group.losers[0].node, old_idx);
    }
}
