//! A small, fixed dependency graph used to exercise collection and
//! resolution end to end without a real repository.
//!
//! Shape: `root -> (direct: com.example:shared:2.0), (direct: com.example:a:1.0
//! -> com.example:shared:1.0)` — a classic nearest-wins diamond, plus a range
//! dependency on `com.example:ranged` to exercise range resolution.

use std::sync::Arc;

use aether_collector::fixtures::FixtureRepository;
use aether_core::coordinate::Artifact;
use aether_core::dependency::Dependency;
use aether_core::repository::RemoteRepository;
use aether_core::request::CollectRequest;
use aether_core::spi::ArtifactDescriptor;

pub fn repositories() -> Vec<RemoteRepository> {
    vec![RemoteRepository::new("central", "https://repo.maven.apache.org/maven2/")]
}

pub fn fixture_repository() -> Arc<FixtureRepository> {
    let shared_1_0 = Artifact::new("com.example", "shared", "1.0");
    let shared_2_0 = Artifact::new("com.example", "shared", "2.0");
    let a = Artifact::new("com.example", "a", "1.0");
    let ranged_resolved = Artifact::new("com.example", "ranged", "1.5");

    let repo = FixtureRepository::new()
        .with_descriptor(
            &a,
            ArtifactDescriptor {
                dependencies: vec![Dependency::new(shared_1_0.clone())],
                ..Default::default()
            },
        )
        .with_descriptor(&shared_1_0, ArtifactDescriptor::default())
        .with_descriptor(&shared_2_0, ArtifactDescriptor::default())
        .with_descriptor(&ranged_resolved, ArtifactDescriptor::default())
        .with_range("com.example", "ranged", "[1.0,2.0)", vec!["1.0", "1.5"]);

    Arc::new(repo)
}

pub fn request() -> CollectRequest {
    CollectRequest {
        root: aether_core::request::CollectRoot::Artifact(Artifact::new("com.example", "demo", "1.0")),
        dependencies: vec![
            Dependency::new(Artifact::new("com.example", "a", "1.0")),
            Dependency::new(Artifact::new("com.example", "shared", "2.0")),
            Dependency::new(Artifact::new("com.example", "ranged", "[1.0,2.0)")),
        ],
        managed_dependencies: Vec::new(),
        repositories: repositories(),
        request_context: "aether-cli demo".to_string(),
    }
}
