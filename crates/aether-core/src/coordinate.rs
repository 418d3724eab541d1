use std::collections::BTreeMap;
use std::fmt;

/// An artifact coordinate: `(groupId, artifactId, extension, classifier,
/// version, baseVersion, properties)`.
///
/// `base_version` is the declared version (a range or a concrete version);
/// `version` is the resolved concrete version, filled in once range
/// resolution has picked one. `classifier` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub extension: String,
    pub classifier: String,
    pub version: String,
    pub base_version: String,
    pub properties: BTreeMap<String, String>,
}

impl Artifact {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: "jar".to_string(),
            classifier: String::new(),
            base_version: version.clone(),
            version,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// `true` if this coordinate's `base_version` is a Maven version range
    /// (`[1.0,2.0)`-shaped) rather than a concrete version.
    pub fn has_version_range(&self) -> bool {
        crate::version::VersionRange::parse(&self.base_version).is_some()
    }

    /// Fingerprint used by the conflict marker: `(groupId, artifactId,
    /// classifier, extension)`, deliberately excluding version.
    pub fn conflict_fingerprint(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.extension, self.classifier
        )
    }

    /// `groupId:artifactId` pair, used as the key for dependency management lookups.
    pub fn ga(&self) -> (String, String) {
        (self.group_id.clone(), self.artifact_id.clone())
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}:{}", self.extension, self.classifier)?;
        } else if self.extension != "jar" {
            write!(f, ":{}", self.extension)?;
        }
        write!(f, ":{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_default_extension_and_empty_classifier() {
        let a = Artifact::new("com.example", "lib", "1.0.0");
        assert_eq!(a.to_string(), "com.example:lib:1.0.0");
    }

    #[test]
    fn display_includes_extension_and_classifier() {
        let a = Artifact::new("com.example", "lib", "1.0.0")
            .with_extension("jar")
            .with_classifier("sources");
        assert_eq!(a.to_string(), "com.example:lib:jar:sources:1.0.0");
    }

    #[test]
    fn conflict_fingerprint_excludes_version() {
        let a = Artifact::new("com.example", "lib", "1.0.0");
        let b = Artifact::new("com.example", "lib", "2.0.0");
        assert_eq!(a.conflict_fingerprint(), b.conflict_fingerprint());
    }

    #[test]
    fn has_version_range_detects_bracket_syntax() {
        let a = Artifact::new("com.example", "lib", "[1.0,2.0)");
        assert!(a.has_version_range());
        let b = Artifact::new("com.example", "lib", "1.0.0");
        assert!(!b.has_version_range());
    }
}
