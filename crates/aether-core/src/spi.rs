//! Service-provider interfaces for the collaborators the collector and
//! resolver delegate to but do not implement themselves: descriptor reading,
//! version-range resolution, and the pluggable selection/management/traversal
//! hooks a session installs. Transport, POM/metadata parsing and checksum
//! verification live behind [`ArtifactDescriptorReader`] and
//! [`VersionRangeResolver`]; this crate ships a minimal in-memory
//! implementation of each (see `aether-collector`'s test fixtures) sufficient
//! to exercise the collection and resolution algorithms end to end.

use std::future::Future;
use std::pin::Pin;

use aether_util::errors::AetherResult;

use crate::coordinate::Artifact;
use crate::dependency::Dependency;
use crate::node::DependencyNode;
use crate::repository::RemoteRepository;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The declared dependencies, managed dependencies, relocations, and
/// repositories for one artifact, as found in its descriptor (e.g. a POM).
#[derive(Debug, Clone, Default)]
pub struct ArtifactDescriptor {
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    /// Non-empty when the descriptor redirects to another coordinate.
    pub relocations: Vec<Artifact>,
    pub repositories: Vec<RemoteRepository>,
    /// A "fat" artifact that already bundles its own dependencies; the
    /// collector never recurses into one regardless of what the configured
    /// [`DependencyTraverser`] would otherwise decide.
    pub includes_dependencies: bool,
}

/// Reads the descriptor for a concrete (non-range) artifact version.
pub trait ArtifactDescriptorReader: Send + Sync {
    fn read_descriptor<'a>(
        &'a self,
        artifact: &'a Artifact,
        repositories: &'a [RemoteRepository],
    ) -> BoxFuture<'a, AetherResult<ArtifactDescriptor>>;
}

/// Resolves a version range (or a bare version) against repository metadata
/// into the list of concrete versions it matches, newest-compatible last.
pub trait VersionRangeResolver: Send + Sync {
    fn resolve_range<'a>(
        &'a self,
        artifact: &'a Artifact,
        repositories: &'a [RemoteRepository],
    ) -> BoxFuture<'a, AetherResult<Vec<String>>>;
}

/// Decides whether a declared dependency should be included at all.
pub trait DependencySelector: Send + Sync {
    fn select(&self, dependency: &Dependency, parent: &DependencyNode) -> bool;
}

/// Applies managed version/scope/optional/exclusions to a declared dependency,
/// returning the (possibly) overridden dependency and which fields were managed.
pub trait DependencyManager: Send + Sync {
    fn manage(&self, dependency: &Dependency) -> ManagedDependency;
}

#[derive(Debug, Clone)]
pub struct ManagedDependency {
    pub dependency: Dependency,
    pub managed_bits: crate::node::ManagedBits,
}

/// Decides whether to recurse into a dependency's own children, beyond the
/// collector's own built-in `includes_dependencies` gate on the descriptor.
pub trait DependencyTraverser: Send + Sync {
    fn traverse(&self, dependency: &Dependency) -> bool;
}

/// Filters (and may reorder) the set of versions a range resolved to, before
/// the collector iterates them.
pub trait VersionFilter: Send + Sync {
    fn filter(&self, versions: Vec<String>) -> Vec<String>;
}

/// Default "allow everything" selector: no dependency is ever rejected.
pub struct AcceptAllSelector;
impl DependencySelector for AcceptAllSelector {
    fn select(&self, _dependency: &Dependency, _parent: &DependencyNode) -> bool {
        true
    }
}

/// Default no-op manager: declared values pass through unmanaged.
pub struct NoopDependencyManager;
impl DependencyManager for NoopDependencyManager {
    fn manage(&self, dependency: &Dependency) -> ManagedDependency {
        ManagedDependency {
            dependency: dependency.clone(),
            managed_bits: crate::node::ManagedBits::default(),
        }
    }
}

/// Default traverser: recurse into everything.
pub struct AlwaysTraverse;
impl DependencyTraverser for AlwaysTraverse {
    fn traverse(&self, _dependency: &Dependency) -> bool {
        true
    }
}

/// Default filter: pass every resolved version through unchanged.
pub struct NoopVersionFilter;
impl VersionFilter for NoopVersionFilter {
    fn filter(&self, versions: Vec<String>) -> Vec<String> {
        versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_all_selector_never_rejects() {
        let sel = AcceptAllSelector;
        let parent = DependencyNode::new(None);
        let dep = Dependency::new(Artifact::new("g", "a", "1.0"));
        assert!(sel.select(&dep, &parent));
    }

    #[test]
    fn noop_manager_leaves_bits_unset() {
        let dep = Dependency::new(Artifact::new("g", "a", "1.0"));
        let managed = NoopDependencyManager.manage(&dep);
        assert!(!managed.managed_bits.any());
    }

    #[test]
    fn noop_filter_passes_through() {
        let versions = vec!["1.0".to_string(), "2.0".to_string()];
        assert_eq!(NoopVersionFilter.filter(versions.clone()), versions);
    }
}
