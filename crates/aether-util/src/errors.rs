use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for the resolver core.
///
/// One variant per entry in the error taxonomy: collector-side descriptor and
/// version-range failures accumulate up to `maxExceptions` and are reported
/// through [`AetherError::DependencyCollection`]; resolver-side conflicts are
/// immediately terminal.
#[derive(Debug, Error, Diagnostic)]
pub enum AetherError {
    /// I/O operation failed (file-lock backend, local-cache access).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An artifact descriptor could not be found in any configured repository.
    #[error("descriptor not found for {coordinate}")]
    #[diagnostic(help("check that the repository list includes the artifact's source"))]
    DescriptorNotFound { coordinate: String },

    /// An artifact descriptor was found but could not be parsed/interpreted.
    #[error("invalid descriptor for {coordinate}: {message}")]
    DescriptorInvalid { coordinate: String, message: String },

    /// A version range could not be resolved against any repository metadata.
    #[error("could not resolve version range {range} for {coordinate}")]
    VersionRangeUnresolved { coordinate: String, range: String },

    /// Collection finished with accumulated per-node exceptions or a recorded error path.
    #[error("dependency collection failed{}", format_error_path(.error_path))]
    DependencyCollection { error_path: Option<String> },

    /// No candidate version satisfies every range constraint seen in a conflict group.
    #[error("unsolvable version conflict for {group_id}:{artifact_id}; paths: {}", .paths.join(", "))]
    UnsolvableVersionConflict {
        group_id: String,
        artifact_id: String,
        paths: Vec<String>,
    },

    /// `enforceVersionConvergence` rejected a group with more than one concrete version.
    #[error("version convergence violated for {group_id}:{artifact_id}: {}", .versions.join(", "))]
    VersionConvergenceViolated {
        group_id: String,
        artifact_id: String,
        versions: Vec<String>,
    },

    /// `compatibilityStrategy` judged a candidate incompatible with the winner.
    #[error("incompatible versions for {group_id}:{artifact_id}: {candidate} vs winner {winner}")]
    IncompatibleVersions {
        group_id: String,
        artifact_id: String,
        candidate: String,
        winner: String,
    },

    /// A sync-context lock acquisition exceeded its configured timeout.
    #[error("timed out acquiring lock {key}")]
    LockTimeout { key: String },

    /// A sync-context acquisition or collection walk was interrupted/cancelled.
    #[error("interrupted")]
    Interrupted,

    /// A shared lock was re-acquired in exclusive mode (or vice versa) within one sync context.
    #[error("conflicting lock kind for key {key}: held as {held}, requested {requested}")]
    ConflictingLockKind {
        key: String,
        held: &'static str,
        requested: &'static str,
    },

    /// Malformed session configuration (e.g. an unknown name-mapper or factory key).
    #[error("invalid session configuration for {key}: {message}")]
    #[diagnostic(help("check the configured value against the documented session keys"))]
    InvalidConfiguration { key: String, message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

fn format_error_path(path: &Option<String>) -> String {
    match path {
        Some(p) => format!(": {p}"),
        None => String::new(),
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type AetherResult<T> = miette::Result<T>;

/// Render a dependency path from root to the failing node, e.g. `"a -> b -> c"`.
pub fn format_dependency_path(segments: &[String]) -> String {
    segments.join(" -> ")
}
