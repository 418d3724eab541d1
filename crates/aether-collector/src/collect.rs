//! Recursive descent from a [`CollectRequest`] to a raw [`CollectResult`].
//!
//! Processes the frontier one depth level at a time: within a level, the
//! distinct artifacts needing a descriptor are fetched concurrently (bounded
//! by a semaphore, mirroring a bounded-worker-pool fetch stage elsewhere in
//! this codebase), then every mutation to the graph happens back on this
//! task, in the level's original declaration order, so "nearest wins"
//! ordering downstream never depends on fetch completion order.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use petgraph::graph::NodeIndex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use aether_core::coordinate::Artifact;
use aether_core::dependency::Dependency;
use aether_core::node::{DependencyNode, Graph, ManagedBits};
use aether_core::repository::RemoteRepository;
use aether_core::request::{CollectRequest, CollectResult, CollectRoot, CollectionException, Cycle};
use aether_core::session::ResolverSession;
use aether_core::spi::{ArtifactDescriptor, ArtifactDescriptorReader};
use aether_util::errors::{format_dependency_path, AetherError, AetherResult};
use aether_core::version::MavenVersion;

use crate::pool::{artifact_key, range_key, DataPool, DescriptorOutcome};

const MAX_CONCURRENT_FETCHES: usize = 8;
const MAX_RELOCATION_HOPS: usize = 10;

/// One artifact still waiting to become a graph node.
struct PendingChild {
    parent: NodeIndex,
    dependency: Dependency,
    managed_bits: ManagedBits,
    depth: usize,
    /// `(coordinate label, node index)` from the root down to `parent`.
    ancestors: Vec<(String, NodeIndex)>,
    repositories: Vec<RemoteRepository>,
}

/// Recursively collect the dependency graph described by `request`.
///
/// Always returns `Ok`; a partial failure (an unreadable descriptor, an
/// unresolved range) is recorded into the result's `exceptions`/`error_path`
/// rather than aborting the walk. Call [`CollectResult::has_errors`] and, if
/// the caller wants collection failures to be terminal, raise
/// [`AetherError::DependencyCollection`] from the returned `error_path`.
pub async fn collect(session: &ResolverSession, request: CollectRequest) -> AetherResult<CollectResult> {
    let mut graph = Graph::new();
    let mut pool = DataPool::new();
    let mut exceptions = Vec::new();
    let mut cycles = Vec::new();
    let mut error_path: Option<String> = None;

    let (root_idx, mut queue) = initialize_root(
        session,
        &mut graph,
        &mut pool,
        &request,
        &mut exceptions,
        &mut error_path,
    )
    .await;

    while let Some(depth) = queue.front().map(|c| c.depth) {
        let mut level: Vec<PendingChild> = Vec::new();
        while queue.front().map(|c| c.depth) == Some(depth) {
            level.push(queue.pop_front().unwrap());
        }

        let expanded = expand_version_ranges(session, &mut pool, &level, &mut exceptions, &mut error_path).await;
        fetch_descriptors_for_level(session, &mut pool, &expanded, &level).await;

        for (idx, artifact) in expanded {
            process_candidate(
                session,
                &mut graph,
                &mut pool,
                &mut queue,
                &mut cycles,
                &level[idx],
                &artifact,
            );
        }
    }

    Ok(CollectResult {
        graph,
        root: root_idx,
        exceptions,
        cycles,
        error_path,
    })
}

async fn initialize_root(
    session: &ResolverSession,
    graph: &mut Graph,
    pool: &mut DataPool,
    request: &CollectRequest,
    exceptions: &mut Vec<CollectionException>,
    error_path: &mut Option<String>,
) -> (NodeIndex, VecDeque<PendingChild>) {
    let mut queue = VecDeque::new();

    let (root_dependency, extra_dependencies) = match &request.root {
        CollectRoot::Artifact(_) => (None, Vec::new()),
        CollectRoot::Dependency(dep) => {
            let mut dep = dep.clone();
            if dep.artifact.has_version_range() {
                match resolve_versions(session, pool, &dep.artifact, &request.repositories).await {
                    Ok(versions) => match highest_version(versions) {
                        Some(v) => dep.artifact = dep.artifact.with_version(v),
                        None => {
                            record_exception(
                                session,
                                exceptions,
                                error_path,
                                &[],
                                &dep.artifact,
                                "version range resolved to no candidates".to_string(),
                            );
                        }
                    },
                    Err(message) => {
                        record_exception(session, exceptions, error_path, &[], &dep.artifact, message);
                    }
                }
            }

            let dependencies = match session
                .descriptor_reader
                .read_descriptor(&dep.artifact, &request.repositories)
                .await
            {
                Ok(descriptor) => descriptor.dependencies,
                Err(err) => {
                    record_exception(session, exceptions, error_path, &[], &dep.artifact, err.to_string());
                    Vec::new()
                }
            };
            (Some(dep), dependencies)
        }
    };

    let root_idx = graph.add_node(DependencyNode::new(root_dependency.clone()));
    graph.set_root(root_idx);

    let root_label = root_dependency
        .as_ref()
        .map(|d| d.artifact.to_string())
        .unwrap_or_else(|| "root".to_string());
    let ancestors = vec![(root_label, root_idx)];

    // Request-declared dependencies win over descriptor-declared ones on a GA clash.
    let mut seen_ga: HashSet<(String, String)> = request.dependencies.iter().map(|d| d.artifact.ga()).collect();
    let mut children: Vec<Dependency> = request.dependencies.clone();
    children.extend(extra_dependencies.into_iter().filter(|d| seen_ga.insert(d.artifact.ga())));

    enqueue_children(
        session,
        graph,
        &mut queue,
        root_idx,
        root_dependency.as_ref(),
        &children,
        1,
        &ancestors,
        &request.repositories,
    );

    (root_idx, queue)
}

fn enqueue_children(
    session: &ResolverSession,
    graph: &Graph,
    queue: &mut VecDeque<PendingChild>,
    parent: NodeIndex,
    parent_dependency: Option<&Dependency>,
    declared: &[Dependency],
    depth: usize,
    ancestors: &[(String, NodeIndex)],
    repositories: &[RemoteRepository],
) {
    let parent_node = graph.node(parent);
    for raw in declared {
        let managed = session.manager.manage(raw);
        if !session.selector.select(&managed.dependency, parent_node) {
            continue;
        }
        if let Some(pd) = parent_dependency {
            if pd.excludes(&managed.dependency.artifact.group_id, &managed.dependency.artifact.artifact_id) {
                continue;
            }
        }
        queue.push_back(PendingChild {
            parent,
            dependency: managed.dependency,
            managed_bits: managed.managed_bits,
            depth,
            ancestors: ancestors.to_vec(),
            repositories: repositories.to_vec(),
        });
    }
}

async fn expand_version_ranges(
    session: &ResolverSession,
    pool: &mut DataPool,
    level: &[PendingChild],
    exceptions: &mut Vec<CollectionException>,
    error_path: &mut Option<String>,
) -> Vec<(usize, Artifact)> {
    let mut expanded = Vec::new();
    for (i, candidate) in level.iter().enumerate() {
        let artifact = &candidate.dependency.artifact;
        if !artifact.has_version_range() {
            expanded.push((i, artifact.clone()));
            continue;
        }
        match resolve_versions(session, pool, artifact, &candidate.repositories).await {
            Ok(versions) if !versions.is_empty() => {
                for v in versions {
                    expanded.push((i, artifact.clone().with_version(v)));
                }
            }
            Ok(_) => {
                record_exception(
                    session,
                    exceptions,
                    error_path,
                    &candidate.ancestors,
                    artifact,
                    "version range resolved to no candidates".to_string(),
                );
            }
            Err(message) => {
                record_exception(session, exceptions, error_path, &candidate.ancestors, artifact, message);
            }
        }
    }
    expanded
}

async fn resolve_versions(
    session: &ResolverSession,
    pool: &mut DataPool,
    artifact: &Artifact,
    repositories: &[RemoteRepository],
) -> Result<Vec<String>, String> {
    let key = range_key(artifact);
    if let Some(cached) = pool.get_range(&key) {
        return Ok(cached.clone());
    }
    match session.range_resolver.resolve_range(artifact, repositories).await {
        Ok(versions) => {
            let filtered = session.version_filter.filter(versions);
            pool.insert_range(key, filtered.clone());
            Ok(filtered)
        }
        Err(err) => Err(err.to_string()),
    }
}

fn highest_version(versions: Vec<String>) -> Option<String> {
    versions
        .into_iter()
        .max_by(|a, b| MavenVersion::parse(a).cmp(&MavenVersion::parse(b)))
}

async fn fetch_descriptors_for_level(
    session: &ResolverSession,
    pool: &mut DataPool,
    expanded: &[(usize, Artifact)],
    level: &[PendingChild],
) {
    let mut repos_for_key: HashMap<String, Vec<RemoteRepository>> = HashMap::new();
    let mut fetch_jobs: Vec<Artifact> = Vec::new();
    let mut seen = HashSet::new();

    for (i, artifact) in expanded {
        let key = artifact_key(artifact);
        repos_for_key
            .entry(key.clone())
            .or_insert_with(|| level[*i].repositories.clone());
        if pool.get_descriptor(&key).is_none() && seen.insert(key) {
            fetch_jobs.push(artifact.clone());
        }
    }

    if fetch_jobs.is_empty() {
        return;
    }

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES));
    let mut join_set = JoinSet::new();
    for artifact in fetch_jobs {
        let key = artifact_key(&artifact);
        let repos = repos_for_key.get(&key).cloned().unwrap_or_default();
        let reader = Arc::clone(&session.descriptor_reader);
        let sem = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = sem.acquire().await;
            let outcome = fetch_with_relocations(reader, repos, artifact).await;
            (key, outcome)
        });
    }

    while let Some(result) = join_set.join_next().await {
        if let Ok((key, outcome)) = result {
            debug!(artifact = %key, "descriptor fetched");
            pool.insert_descriptor(key, outcome);
        }
    }
}

async fn fetch_with_relocations(
    reader: Arc<dyn ArtifactDescriptorReader>,
    repositories: Vec<RemoteRepository>,
    start: Artifact,
) -> DescriptorOutcome {
    let mut current = start;
    let mut chain = Vec::new();
    let mut disable_version_management = false;

    for _ in 0..MAX_RELOCATION_HOPS {
        match reader.read_descriptor(&current, &repositories).await {
            Ok(descriptor) => {
                if descriptor.relocations.is_empty() {
                    return DescriptorOutcome {
                        final_artifact: current,
                        relocation_chain: chain,
                        descriptor: Ok(descriptor),
                        disable_version_management,
                    };
                }
                let next = descriptor.relocations[0].clone();
                if next.ga() == current.ga() {
                    disable_version_management = true;
                }
                chain.push(current.clone());
                current = next;
            }
            Err(err) => {
                return DescriptorOutcome {
                    final_artifact: current,
                    relocation_chain: chain,
                    descriptor: Err(err.to_string()),
                    disable_version_management,
                };
            }
        }
    }

    DescriptorOutcome {
        final_artifact: current,
        relocation_chain: chain,
        descriptor: Err("relocation chain exceeded maximum hop count".to_string()),
        disable_version_management,
    }
}

fn process_candidate(
    session: &ResolverSession,
    graph: &mut Graph,
    pool: &mut DataPool,
    queue: &mut VecDeque<PendingChild>,
    cycles: &mut Vec<Cycle>,
    candidate: &PendingChild,
    requested_artifact: &Artifact,
) {
    let key = artifact_key(requested_artifact);
    let Some(outcome) = pool.get_descriptor(&key).cloned() else {
        return;
    };

    let descriptor = match outcome.descriptor {
        Ok(d) => d,
        Err(_) => return, // already recorded as an exception when it was fetched
    };

    let final_artifact = outcome.final_artifact;

    if let Some(&(_, cycle_idx)) = candidate.ancestors.iter().find(|(_, idx)| {
        graph
            .node(*idx)
            .artifact()
            .map(|a| a.conflict_fingerprint())
            == Some(final_artifact.conflict_fingerprint())
    }) {
        warn!(artifact = %final_artifact, "cycle detected");
        let path = candidate.ancestors.iter().map(|(label, _)| label.clone()).collect();
        if session.cycles_unbounded() || (cycles.len() as i64) < session.max_cycles {
            cycles.push(Cycle {
                coordinate: final_artifact.to_string(),
                path,
            });
        }
        graph.link(candidate.parent, cycle_idx);
        return;
    }

    let subtree_key = artifact_key(&final_artifact);
    if let Some(existing) = pool.get_subtree(&subtree_key) {
        graph.link(candidate.parent, existing);
        return;
    }

    let mut dependency = candidate.dependency.clone();
    dependency.artifact = final_artifact.clone();

    let mut node = DependencyNode::new(Some(dependency.clone()));
    node.managed_bits = candidate.managed_bits;
    if outcome.disable_version_management {
        node.managed_bits.version = false;
    }
    node.relocations = outcome.relocation_chain;
    node.repositories = merge_repository_ids(&candidate.repositories, &descriptor.repositories);
    node.version_constraint = candidate.dependency.artifact.has_version_range().then(|| candidate.dependency.artifact.base_version.clone());

    let new_idx = graph.add_node(node);
    graph.link(candidate.parent, new_idx);
    pool.insert_subtree(subtree_key, new_idx);

    if descriptor.includes_dependencies || !session.traverser.traverse(&dependency) {
        return;
    }

    let next_repositories = merge_repositories(&candidate.repositories, &descriptor.repositories);
    let mut next_ancestors = candidate.ancestors.clone();
    next_ancestors.push((final_artifact.to_string(), new_idx));

    enqueue_children(
        session,
        graph,
        queue,
        new_idx,
        Some(&dependency),
        &descriptor.dependencies,
        candidate.depth + 1,
        &next_ancestors,
        &next_repositories,
    );
}

fn merge_repositories(current: &[RemoteRepository], extra: &[RemoteRepository]) -> Vec<RemoteRepository> {
    let mut merged = current.to_vec();
    for repo in extra {
        if !merged.iter().any(|r| r.id == repo.id) {
            merged.push(repo.clone());
        }
    }
    merged
}

fn merge_repository_ids(current: &[RemoteRepository], extra: &[RemoteRepository]) -> Vec<String> {
    merge_repositories(current, extra).into_iter().map(|r| r.id).collect()
}

fn record_exception(
    session: &ResolverSession,
    exceptions: &mut Vec<CollectionException>,
    error_path: &mut Option<String>,
    ancestors: &[(String, NodeIndex)],
    artifact: &Artifact,
    message: String,
) {
    let coordinate = artifact.to_string();
    if session.exceptions_unbounded() || (exceptions.len() as i64) < session.max_exceptions {
        exceptions.push(CollectionException {
            coordinate: coordinate.clone(),
            message,
        });
    }
    if error_path.is_none() {
        let mut segments: Vec<String> = ancestors.iter().map(|(label, _)| label.clone()).collect();
        segments.push(coordinate);
        *error_path = Some(format_dependency_path(&segments));
    }
}

/// Raise [`AetherError::DependencyCollection`] if the walk accumulated any
/// exception or recorded error path.
pub fn ensure_no_errors(result: &CollectResult) -> AetherResult<()> {
    if result.has_errors() {
        return Err(AetherError::DependencyCollection {
            error_path: result.error_path.clone(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureRepository;
    use aether_core::coordinate::Artifact;
    use aether_core::dependency::Dependency;
    use aether_core::repository::RemoteRepository;
    use std::sync::Arc;

    fn session_with(fixtures: FixtureRepository) -> ResolverSession {
        let fixtures = Arc::new(fixtures);
        ResolverSession::builder(fixtures.clone(), fixtures).build()
    }

    #[tokio::test]
    async fn single_dependency_produces_one_child_node() {
        let fixtures = FixtureRepository::new().with_descriptor(
            &Artifact::new("g", "x", "1.0"),
            ArtifactDescriptor::default(),
        );
        let session = session_with(fixtures);

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![Dependency::new(Artifact::new("g", "x", "1.0"))],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert!(!result.has_errors());
        assert_eq!(result.graph.children_of(result.root).len(), 1);
    }

    #[tokio::test]
    async fn missing_descriptor_is_recorded_as_exception_without_aborting() {
        let session = session_with(FixtureRepository::new());

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![Dependency::new(Artifact::new("g", "missing", "1.0"))],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert!(result.has_errors());
        assert_eq!(result.exceptions.len(), 1);
        assert!(ensure_no_errors(&result).is_err());
    }

    #[tokio::test]
    async fn shared_transitive_dependency_is_linked_not_duplicated() {
        let shared = Artifact::new("g", "shared", "1.0");
        let a_desc = ArtifactDescriptor {
            dependencies: vec![Dependency::new(shared.clone())],
            ..Default::default()
        };
        let b_desc = ArtifactDescriptor {
            dependencies: vec![Dependency::new(shared.clone())],
            ..Default::default()
        };
        let fixtures = FixtureRepository::new()
            .with_descriptor(&Artifact::new("g", "a", "1.0"), a_desc)
            .with_descriptor(&Artifact::new("g", "b", "1.0"), b_desc)
            .with_descriptor(&shared, ArtifactDescriptor::default());
        let session = session_with(fixtures);

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![
                Dependency::new(Artifact::new("g", "a", "1.0")),
                Dependency::new(Artifact::new("g", "b", "1.0")),
            ],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert!(!result.has_errors());
        let roots = result.graph.children_of(result.root).to_vec();
        assert_eq!(roots.len(), 2);
        let shared_idx = result.graph.children_of(roots[0])[0];
        assert_eq!(result.graph.children_of(roots[1])[0], shared_idx);
        assert_eq!(result.graph.dependents_of(shared_idx).len(), 2);
    }

    #[tokio::test]
    async fn direct_cycle_is_recorded_and_not_expanded_again() {
        let a = Artifact::new("g", "a", "1.0");
        let b = Artifact::new("g", "b", "1.0");
        let a_desc = ArtifactDescriptor {
            dependencies: vec![Dependency::new(b.clone())],
            ..Default::default()
        };
        let b_desc = ArtifactDescriptor {
            dependencies: vec![Dependency::new(a.clone())],
            ..Default::default()
        };
        let fixtures = FixtureRepository::new()
            .with_descriptor(&a, a_desc)
            .with_descriptor(&b, b_desc);
        let session = session_with(fixtures);

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![Dependency::new(a)],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert_eq!(result.cycles.len(), 1);
    }

    #[tokio::test]
    async fn relocation_redirects_to_new_coordinate() {
        let old = Artifact::new("old.group", "lib", "1.0");
        let new = Artifact::new("new.group", "lib", "1.0");
        let old_desc = ArtifactDescriptor {
            relocations: vec![new.clone()],
            ..Default::default()
        };
        let fixtures = FixtureRepository::new()
            .with_descriptor(&old, old_desc)
            .with_descriptor(&new, ArtifactDescriptor::default());
        let session = session_with(fixtures);

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![Dependency::new(old)],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert!(!result.has_errors());
        let child_idx = result.graph.children_of(result.root)[0];
        let child = result.graph.node(child_idx);
        assert_eq!(child.artifact().unwrap().group_id, "new.group");
        assert_eq!(child.relocations.len(), 1);
    }

    #[tokio::test]
    async fn fat_artifact_is_not_recursed_into_regardless_of_traverser() {
        let inner = Artifact::new("g", "inner", "1.0");
        let fat_desc = ArtifactDescriptor {
            dependencies: vec![Dependency::new(inner.clone())],
            includes_dependencies: true,
            ..Default::default()
        };
        let fixtures = FixtureRepository::new()
            .with_descriptor(&Artifact::new("g", "fat", "1.0"), fat_desc)
            .with_descriptor(&inner, ArtifactDescriptor::default());
        let session = session_with(fixtures);

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![Dependency::new(Artifact::new("g", "fat", "1.0"))],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert!(!result.has_errors());
        let fat_idx = result.graph.children_of(result.root)[0];
        assert!(result.graph.children_of(fat_idx).is_empty());
    }

    #[tokio::test]
    async fn same_ga_relocation_clears_the_premanaged_version_bit() {
        let old = Artifact::new("g", "lib", "1.0");
        let new = Artifact::new("g", "lib", "2.0");
        let old_desc = ArtifactDescriptor {
            relocations: vec![new.clone()],
            ..Default::default()
        };
        let fixtures = FixtureRepository::new()
            .with_descriptor(&old, old_desc)
            .with_descriptor(&new, ArtifactDescriptor::default());
        let session = session_with(fixtures);

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![Dependency::new(old)],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert!(!result.has_errors());
        let child_idx = result.graph.children_of(result.root)[0];
        let child = result.graph.node(child_idx);
        assert_eq!(child.artifact().unwrap().version, "2.0");
        assert!(!child.managed_bits.version);
    }

    #[tokio::test]
    async fn version_range_expands_to_resolved_version() {
        let fixtures = FixtureRepository::new()
            .with_range("g", "x", "[1.0,2.0)", vec!["1.5"])
            .with_descriptor(&Artifact::new("g", "x", "1.5"), ArtifactDescriptor::default());
        let session = session_with(fixtures);

        let request = CollectRequest {
            root: CollectRoot::Artifact(Artifact::new("g", "root", "1.0")),
            dependencies: vec![Dependency::new(Artifact::new("g", "x", "[1.0,2.0)"))],
            managed_dependencies: Vec::new(),
            repositories: vec![RemoteRepository::central()],
            request_context: String::new(),
        };

        let result = collect(&session, request).await.unwrap();
        assert!(!result.has_errors());
        let child_idx = result.graph.children_of(result.root)[0];
        assert_eq!(result.graph.node(child_idx).artifact().unwrap().version, "1.5");
    }
}
