//! Process-side memoization for one collection run.
//!
//! Local to a single [`crate::collect::collect`] call: no cross-thread
//! sharing, no locking. Mutated only on the orchestrating task, after the
//! concurrent descriptor-fetch phase for a depth level has been joined.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use aether_core::coordinate::Artifact;
use aether_core::spi::ArtifactDescriptor;

/// The outcome of resolving one artifact's descriptor, following any
/// relocation chain to a final, non-relocating coordinate.
#[derive(Clone)]
pub struct DescriptorOutcome {
    pub final_artifact: Artifact,
    pub relocation_chain: Vec<Artifact>,
    /// `Err` holds a rendered message rather than an [`aether_util::errors::AetherError`]
    /// so outcomes stay cheaply cloneable once cached.
    pub descriptor: Result<ArtifactDescriptor, String>,
    /// Set once a hop in `relocation_chain` redirected within the same
    /// `groupId:artifactId` (a pure version bump); the premanaged version
    /// bit on the resulting node is cleared so conflict resolution treats
    /// the relocated version as authoritative rather than management-derived.
    pub disable_version_management: bool,
}

#[derive(Default)]
pub struct DataPool {
    descriptors: HashMap<String, DescriptorOutcome>,
    ranges: HashMap<String, Vec<String>>,
    subtrees: HashMap<String, NodeIndex>,
}

impl DataPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_descriptor(&self, key: &str) -> Option<&DescriptorOutcome> {
        self.descriptors.get(key)
    }

    pub fn insert_descriptor(&mut self, key: String, outcome: DescriptorOutcome) {
        self.descriptors.insert(key, outcome);
    }

    pub fn get_range(&self, key: &str) -> Option<&Vec<String>> {
        self.ranges.get(key)
    }

    pub fn insert_range(&mut self, key: String, versions: Vec<String>) {
        self.ranges.insert(key, versions);
    }

    pub fn get_subtree(&self, key: &str) -> Option<NodeIndex> {
        self.subtrees.get(key).copied()
    }

    pub fn insert_subtree(&mut self, key: String, idx: NodeIndex) {
        self.subtrees.insert(key, idx);
    }
}

/// Cache key for a concrete (non-range) artifact's descriptor.
pub fn artifact_key(a: &Artifact) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        a.group_id, a.artifact_id, a.extension, a.classifier, a.version
    )
}

/// Cache key for a version-range request; `base_version` carries the range
/// text while `version` may still be empty/unresolved.
pub fn range_key(a: &Artifact) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        a.group_id, a.artifact_id, a.extension, a.classifier, a.base_version
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_key_is_stable_for_equal_coordinates() {
        let a = Artifact::new("g", "a", "1.0");
        let b = Artifact::new("g", "a", "1.0");
        assert_eq!(artifact_key(&a), artifact_key(&b));
    }

    #[test]
    fn range_key_uses_base_version_not_version() {
        let mut a = Artifact::new("g", "a", "[1.0,2.0)");
        a.version = "1.5".to_string();
        assert!(range_key(&a).ends_with("[1.0,2.0)"));
    }

    #[test]
    fn subtree_cache_round_trips() {
        let mut pool = DataPool::new();
        let idx = NodeIndex::new(3);
        pool.insert_subtree("k".to_string(), idx);
        assert_eq!(pool.get_subtree("k"), Some(idx));
    }
}
