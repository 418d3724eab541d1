//! On-disk mirror of the session configuration in [`crate::session`], for
//! processes that want to load settings from a file rather than build a
//! [`crate::session::ResolverSession`] in code. Table keys mirror the
//! string-keyed `aether.*` session settings one-to-one.

use std::path::{Path, PathBuf};

use aether_util::errors::{AetherError, AetherResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolverConfig {
    #[serde(default)]
    pub sync_context: SyncContextConfig,
    #[serde(default)]
    pub dependency_collector: DependencyCollectorConfig,
    #[serde(default)]
    pub conflict_resolver: ConflictResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyncContextConfig {
    #[serde(default = "default_factory")]
    pub factory: String,
    #[serde(default = "default_name_mapper")]
    pub name_mapper: String,
    #[serde(default = "default_locks_dir_name")]
    pub locks_dir_name: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SyncContextConfig {
    fn default() -> Self {
        Self {
            factory: default_factory(),
            name_mapper: default_name_mapper(),
            locks_dir_name: default_locks_dir_name(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_factory() -> String {
    "file-lock".to_string()
}
fn default_name_mapper() -> String {
    "file-gaecv".to_string()
}
fn default_locks_dir_name() -> String {
    ".locks".to_string()
}
fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyCollectorConfig {
    #[serde(default = "default_collector_impl")]
    pub implementation: String,
    #[serde(default = "default_max_exceptions")]
    pub max_exceptions: i64,
    #[serde(default = "default_max_cycles")]
    pub max_cycles: i64,
}

impl Default for DependencyCollectorConfig {
    fn default() -> Self {
        Self {
            implementation: default_collector_impl(),
            max_exceptions: default_max_exceptions(),
            max_cycles: default_max_cycles(),
        }
    }
}

fn default_collector_impl() -> String {
    "bf".to_string()
}
fn default_max_exceptions() -> i64 {
    50
}
fn default_max_cycles() -> i64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConflictResolverConfig {
    #[serde(default = "default_verbosity")]
    pub verbose: String,
}

impl Default for ConflictResolverConfig {
    fn default() -> Self {
        Self {
            verbose: default_verbosity(),
        }
    }
}

fn default_verbosity() -> String {
    "STANDARD".to_string()
}

impl ResolverConfig {
    /// Load from a TOML file, falling back to documented defaults if the
    /// file does not exist.
    pub fn load(path: &Path) -> AetherResult<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(AetherError::Io)?;
        toml::from_str(&content).map_err(|e| {
            AetherError::InvalidConfiguration {
                key: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Default location: `~/.aether/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok()?;
        Some(PathBuf::from(home).join(".aether").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = ResolverConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.sync_context.factory, "file-lock");
        assert_eq!(config.dependency_collector.max_exceptions, 50);
    }

    #[test]
    fn loads_overridden_values() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"
            [sync-context]
            factory = "rwlock-local"
            timeout-seconds = 5

            [dependency-collector]
            max-exceptions = -1
            "#,
        )
        .unwrap();
        let config = ResolverConfig::load(tmp.path()).unwrap();
        assert_eq!(config.sync_context.factory, "rwlock-local");
        assert_eq!(config.sync_context.timeout_seconds, 5);
        assert_eq!(config.dependency_collector.max_exceptions, -1);
        assert_eq!(config.conflict_resolver.verbose, "STANDARD");
    }
}
