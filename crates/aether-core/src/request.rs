use petgraph::graph::NodeIndex;

use crate::coordinate::Artifact;
use crate::dependency::Dependency;
use crate::node::Graph;
use crate::repository::RemoteRepository;

/// Input to the graph collector.
pub struct CollectRequest {
    /// Either a root dependency (carries scope/optional/exclusions for the
    /// synthetic root edge) or a bare root artifact with implicit defaults.
    pub root: CollectRoot,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    pub repositories: Vec<RemoteRepository>,
    pub request_context: String,
}

pub enum CollectRoot {
    Dependency(Dependency),
    Artifact(Artifact),
}

impl CollectRequest {
    pub fn from_artifact(artifact: Artifact, repositories: Vec<RemoteRepository>) -> Self {
        Self {
            root: CollectRoot::Artifact(artifact),
            dependencies: Vec::new(),
            managed_dependencies: Vec::new(),
            repositories,
            request_context: String::new(),
        }
    }
}

/// One collector-recorded exception: the artifact it occurred on and a
/// human-readable message. Accumulated up to `maxExceptions`.
#[derive(Debug, Clone)]
pub struct CollectionException {
    pub coordinate: String,
    pub message: String,
}

/// One detected cycle: the artifact that closes the cycle and the path
/// (root-to-node coordinates) at which it was detected.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub coordinate: String,
    pub path: Vec<String>,
}

/// Raw output of the collector: always has a root node, even on failure.
pub struct CollectResult {
    pub graph: Graph,
    pub root: NodeIndex,
    pub exceptions: Vec<CollectionException>,
    pub cycles: Vec<Cycle>,
    /// Path-from-root to the first recorded exception, if any.
    pub error_path: Option<String>,
}

impl CollectResult {
    /// `true` when the walk accumulated an error; collection is terminal in
    /// that case (`AetherError::DependencyCollection`).
    pub fn has_errors(&self) -> bool {
        self.error_path.is_some() || !self.exceptions.is_empty()
    }
}
