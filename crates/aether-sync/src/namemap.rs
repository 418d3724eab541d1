//! Name-mapper strategies: pure functions from an artifact/metadata
//! collection to a *sorted* set of lock keys. Sorting is the sole
//! anti-deadlock mechanism when multiple sync contexts acquire overlapping
//! key sets, so every strategy funnels through [`finish`] rather than
//! returning keys in visitation order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use aether_core::coordinate::Artifact;
use aether_util::fs::sanitize_path_segment;
use aether_util::hash::hex_sha1;

/// A piece of repository metadata to be locked: `groupId[:artifactId[:version]][:type]`.
/// The standard `maven-metadata.xml` type is omitted from the rendered key.
#[derive(Debug, Clone)]
pub struct MetadataKey {
    pub group_id: String,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub kind: Option<String>,
}

impl MetadataKey {
    fn render(&self) -> String {
        let mut out = format!("metadata:{}", self.group_id);
        if let Some(a) = &self.artifact_id {
            out.push(':');
            out.push_str(a);
        }
        if let Some(v) = &self.version {
            out.push(':');
            out.push_str(v);
        }
        if let Some(kind) = &self.kind {
            if kind != "maven-metadata.xml" {
                out.push(':');
                out.push_str(&sanitize_path_segment(kind));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMapper {
    Static,
    Gav,
    Gaecv,
    FileGav,
    FileGaecv,
    FileHgav,
    FileHgaecv,
    Discriminating,
}

impl NameMapper {
    pub fn is_file_system_friendly(self) -> bool {
        !matches!(self, Self::Static | Self::Gav | Self::Gaecv)
    }

    /// Produce the sorted, deduplicated set of lock keys for one mapper
    /// invocation. `basedir` is only consulted by the `file-*` and
    /// `discriminating` variants; it must already be canonicalized.
    pub fn keys(
        self,
        artifacts: &[Artifact],
        metadata: &[MetadataKey],
        basedir: Option<&Path>,
    ) -> Vec<String> {
        if matches!(self, Self::Static) {
            return vec!["static".to_string()];
        }

        let is_gav_family = matches!(self, Self::Gav | Self::FileGav | Self::FileHgav);

        let mut raw: BTreeSet<String> = BTreeSet::new();
        for a in artifacts {
            raw.insert(if is_gav_family { gav_key(a) } else { gaecv_key(a) });
        }
        for m in metadata {
            raw.insert(m.render());
        }

        let keys: Vec<String> = match self {
            Self::Static => unreachable!(),
            Self::Gav | Self::Gaecv => raw.into_iter().collect(),
            Self::FileGav | Self::FileGaecv => raw
                .into_iter()
                .map(|k| wrap_basedir(basedir, &format!("{}.lock", to_file_segment(&k))))
                .collect(),
            Self::FileHgav | Self::FileHgaecv => raw
                .into_iter()
                .map(|k| wrap_basedir(basedir, &format!("{}.lock", hex_sha1(&k))))
                .collect(),
            Self::Discriminating => {
                let host = hex_sha1(&hostname_hint());
                let repo = hex_sha1(&basedir.map(|p| p.display().to_string()).unwrap_or_default());
                raw.into_iter()
                    .map(|k| format!("{host}:{repo}:{k}"))
                    .collect()
            }
        };

        let mut sorted = keys;
        sorted.sort();
        sorted.dedup();
        sorted
    }
}

impl std::str::FromStr for NameMapper {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Self::Static),
            "gav" => Ok(Self::Gav),
            "gaecv" => Ok(Self::Gaecv),
            "file-gav" => Ok(Self::FileGav),
            "file-gaecv" => Ok(Self::FileGaecv),
            "file-hgav" => Ok(Self::FileHgav),
            "file-hgaecv" => Ok(Self::FileHgaecv),
            "discriminating" => Ok(Self::Discriminating),
            other => Err(format!("unknown name mapper: {other}")),
        }
    }
}

/// Coordinate-only key: `artifact:<g>:<a>:<baseVersion>`, omitting extension
/// and classifier so two artifacts differing only in those fields collapse
/// into one lock key.
fn gav_key(a: &Artifact) -> String {
    format!("artifact:{}:{}:{}", a.group_id, a.artifact_id, a.base_version)
}

fn gaecv_key(a: &Artifact) -> String {
    let mut key = format!("artifact:{}:{}:{}", a.group_id, a.artifact_id, a.extension);
    if !a.classifier.is_empty() {
        key.push(':');
        key.push_str(&a.classifier);
    }
    key.push(':');
    key.push_str(&a.base_version);
    key
}

fn to_file_segment(key: &str) -> String {
    sanitize_path_segment(&key.replace(':', "~"))
}

fn wrap_basedir(basedir: Option<&Path>, filename: &str) -> String {
    match basedir {
        Some(dir) => {
            let joined: PathBuf = dir.join(filename);
            joined.display().to_string()
        }
        None => filename.to_string(),
    }
}

/// A stand-in host discriminant; a real deployment would use the machine
/// hostname, but that's an I/O dependent non-goal here.
fn hostname_hint() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}
