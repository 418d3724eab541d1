//! Small in-memory `ArtifactDescriptorReader`/`VersionRangeResolver`
//! implementations for exercising the collector without network fixtures.

use std::collections::HashMap;

use aether_core::coordinate::Artifact;
use aether_core::repository::RemoteRepository;
use aether_core::spi::{ArtifactDescriptor, ArtifactDescriptorReader, BoxFuture, VersionRangeResolver};
use aether_util::errors::{AetherError, AetherResult};

use crate::pool::artifact_key;

/// A fixed map of coordinate -> descriptor/range, keyed the same way the
/// collector's own data pool keys its caches.
#[derive(Default)]
pub struct FixtureRepository {
    descriptors: HashMap<String, ArtifactDescriptor>,
    ranges: HashMap<String, Vec<String>>,
}

impl FixtureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptor(mut self, artifact: &Artifact, descriptor: ArtifactDescriptor) -> Self {
        self.descriptors.insert(artifact_key(artifact), descriptor);
        self
    }

    pub fn with_range(mut self, group_id: &str, artifact_id: &str, range: &str, versions: Vec<&str>) -> Self {
        let key = format!("{group_id}:{artifact_id}:jar::{range}");
        self.ranges
            .insert(key, versions.into_iter().map(str::to_string).collect());
        self
    }
}

impl ArtifactDescriptorReader for FixtureRepository {
    fn read_descriptor<'a>(
        &'a self,
        artifact: &'a Artifact,
        _repositories: &'a [RemoteRepository],
    ) -> BoxFuture<'a, AetherResult<ArtifactDescriptor>> {
        Box::pin(async move {
            self.descriptors
                .get(&artifact_key(artifact))
                .cloned()
                .ok_or_else(|| {
                    AetherError::DescriptorNotFound {
                        coordinate: artifact.to_string(),
                    }
                    .into()
                })
        })
    }
}

impl VersionRangeResolver for FixtureRepository {
    fn resolve_range<'a>(
        &'a self,
        artifact: &'a Artifact,
        _repositories: &'a [RemoteRepository],
    ) -> BoxFuture<'a, AetherResult<Vec<String>>> {
        Box::pin(async move {
            let key = format!(
                "{}:{}:{}:{}:{}",
                artifact.group_id, artifact.artifact_id, artifact.extension, artifact.classifier, artifact.base_version
            );
            self.ranges.get(&key).cloned().ok_or_else(|| {
                AetherError::VersionRangeUnresolved {
                    coordinate: format!("{}:{}", artifact.group_id, artifact.artifact_id),
                    range: artifact.base_version.clone(),
                }
                .into()
            })
        })
    }
}
