/// A remote repository reference. Transport is out of scope here; this is
/// just the identity a [`crate::spi::ArtifactDescriptorReader`] and
/// [`crate::spi::VersionRangeResolver`] implementation keys its own lookups
/// on, and what the collector records into a node's `repositories` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    pub fn central() -> Self {
        Self::new("central", "https://repo.maven.apache.org/maven2/")
    }
}
