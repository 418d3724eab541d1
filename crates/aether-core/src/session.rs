//! Typed session configuration: the in-code equivalent of the string-keyed
//! `aether.*` settings a caller would otherwise set via [`crate::config`].

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use aether_util::errors::AetherError;

use crate::spi::{
    AcceptAllSelector, AlwaysTraverse, ArtifactDescriptorReader, DependencyManager,
    DependencySelector, DependencyTraverser, NoopDependencyManager, NoopVersionFilter,
    VersionFilter, VersionRangeResolver,
};

/// `aether.syncContext.named.factory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncContextFactoryKind {
    FileLock,
    RwLockLocal,
    SemaphoreLocal,
    Noop,
}

impl FromStr for SyncContextFactoryKind {
    type Err = AetherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file-lock" => Ok(Self::FileLock),
            "rwlock-local" => Ok(Self::RwLockLocal),
            "semaphore-local" => Ok(Self::SemaphoreLocal),
            "noop" => Ok(Self::Noop),
            other => Err(AetherError::InvalidConfiguration {
                key: "aether.syncContext.named.factory".to_string(),
                message: format!("unknown factory `{other}`"),
            }),
        }
    }
}

/// `aether.syncContext.named.nameMapper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMapperKind {
    Static,
    Gav,
    Gaecv,
    FileGav,
    FileGaecv,
    FileHgav,
    FileHgaecv,
    Discriminating,
}

impl FromStr for NameMapperKind {
    type Err = AetherError;

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
            other => Err(AetherError::InvalidConfiguration {
                key: "aether.syncContext.named.nameMapper".to_string(),
                message: format!("unknown name mapper `{other}`"),
            }),
        }
    }
}

impl NameMapperKind {
    /// Whether this mapper's output is meant to be joined onto a filesystem
    /// base path (the `file-*` and `discriminating` variants).
    pub fn is_file_system_friendly(self) -> bool {
        !matches!(self, Self::Static | Self::Gav | Self::Gaecv)
    }
}

/// `aether.dependencyCollector.impl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorImpl {
    /// Breadth-first, per-depth-level batching of descriptor fetches.
    Bf,
    /// Depth-first descent.
    Df,
}

impl FromStr for CollectorImpl {
    type Err = AetherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bf" => Ok(Self::Bf),
            "df" => Ok(Self::Df),
            other => Err(AetherError::InvalidConfiguration {
                key: "aether.dependencyCollector.impl".to_string(),
                message: format!("unknown collector impl `{other}`"),
            }),
        }
    }
}

/// `aether.conflictResolver.verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    None,
    #[default]
    Standard,
    Full,
}

impl FromStr for Verbosity {
    type Err = AetherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" | "false" => Ok(Self::None),
            "STANDARD" => Ok(Self::Standard),
            "FULL" | "true" => Ok(Self::Full),
            other => Err(AetherError::InvalidConfiguration {
                key: "aether.conflictResolver.verbose".to_string(),
                message: format!("unknown verbosity `{other}`"),
            }),
        }
    }
}

/// Which of the two version-selection strategies the resolver applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionSelectorKind {
    #[default]
    Nearest,
    HigherVersion,
}

/// All collaborators and tunables a collection + resolution run needs.
/// Construct via [`ResolverSession::builder`]; unset collaborator slots fall
/// back to the permissive `Accept`/`Noop`/`Always` defaults.
pub struct ResolverSession {
    pub sync_context_factory: SyncContextFactoryKind,
    pub name_mapper: NameMapperKind,
    pub locks_dir_name: String,
    pub acquire_timeout: Duration,
    pub collector_impl: CollectorImpl,
    pub max_exceptions: i64,
    pub max_cycles: i64,
    pub conflict_resolver_verbosity: Verbosity,
    pub version_selector: VersionSelectorKind,
    pub enforce_version_convergence: bool,

    pub descriptor_reader: Arc<dyn ArtifactDescriptorReader>,
    pub range_resolver: Arc<dyn VersionRangeResolver>,
    pub selector: Arc<dyn DependencySelector>,
    pub manager: Arc<dyn DependencyManager>,
    pub traverser: Arc<dyn DependencyTraverser>,
    pub version_filter: Arc<dyn VersionFilter>,
}

impl ResolverSession {
    pub fn builder(
        descriptor_reader: Arc<dyn ArtifactDescriptorReader>,
        range_resolver: Arc<dyn VersionRangeResolver>,
    ) -> ResolverSessionBuilder {
        ResolverSessionBuilder {
            descriptor_reader,
            range_resolver,
            selector: Arc::new(AcceptAllSelector),
            manager: Arc::new(NoopDependencyManager),
            traverser: Arc::new(AlwaysTraverse),
            version_filter: Arc::new(NoopVersionFilter),
            sync_context_factory: SyncContextFactoryKind::FileLock,
            name_mapper: NameMapperKind::FileGaecv,
            locks_dir_name: ".locks".to_string(),
            acquire_timeout: Duration::from_secs(30),
            collector_impl: CollectorImpl::Bf,
            max_exceptions: 50,
            max_cycles: 10,
            conflict_resolver_verbosity: Verbosity::Standard,
            version_selector: VersionSelectorKind::Nearest,
            enforce_version_convergence: false,
        }
    }

    /// `maxExceptions < 0` means unbounded.
    pub fn exceptions_unbounded(&self) -> bool {
        self.max_exceptions < 0
    }

    pub fn cycles_unbounded(&self) -> bool {
        self.max_cycles < 0
    }
}

pub struct ResolverSessionBuilder {
    descriptor_reader: Arc<dyn ArtifactDescriptorReader>,
    range_resolver: Arc<dyn VersionRangeResolver>,
    selector: Arc<dyn DependencySelector>,
    manager: Arc<dyn DependencyManager>,
    traverser: Arc<dyn DependencyTraverser>,
    version_filter: Arc<dyn VersionFilter>,
    sync_context_factory: SyncContextFactoryKind,
    name_mapper: NameMapperKind,
    locks_dir_name: String,
    acquire_timeout: Duration,
    collector_impl: CollectorImpl,
    max_exceptions: i64,
    max_cycles: i64,
    conflict_resolver_verbosity: Verbosity,
    version_selector: VersionSelectorKind,
    enforce_version_convergence: bool,
}

impl ResolverSessionBuilder {
    pub fn selector(mut self, selector: Arc<dyn DependencySelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn manager(mut self, manager: Arc<dyn DependencyManager>) -> Self {
        self.manager = manager;
        self
    }

    pub fn traverser(mut self, traverser: Arc<dyn DependencyTraverser>) -> Self {
        self.traverser = traverser;
        self
    }

    pub fn version_filter(mut self, filter: Arc<dyn VersionFilter>) -> Self {
        self.version_filter = filter;
        self
    }

    pub fn sync_context_factory(mut self, kind: SyncContextFactoryKind) -> Self {
        self.sync_context_factory = kind;
        self
    }

    pub fn name_mapper(mut self, kind: NameMapperKind) -> Self {
        self.name_mapper = kind;
        self
    }

    pub fn locks_dir_name(mut self, name: impl Into<String>) -> Self {
        self.locks_dir_name = name.into();
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn collector_impl(mut self, kind: CollectorImpl) -> Self {
        self.collector_impl = kind;
        self
    }

    pub fn max_exceptions(mut self, max: i64) -> Self {
        self.max_exceptions = max;
        self
    }

    pub fn max_cycles(mut self, max: i64) -> Self {
        self.max_cycles = max;
        self
    }

    pub fn conflict_resolver_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.conflict_resolver_verbosity = verbosity;
        self
    }

    pub fn version_selector(mut self, kind: VersionSelectorKind) -> Self {
        self.version_selector = kind;
        self
    }

    pub fn enforce_version_convergence(mut self, enforce: bool) -> Self {
        self.enforce_version_convergence = enforce;
        self
    }

    pub fn build(self) -> ResolverSession {
        ResolverSession {
            sync_context_factory: self.sync_context_factory,
            name_mapper: self.name_mapper,
            locks_dir_name: self.locks_dir_name,
            acquire_timeout: self.acquire_timeout,
            collector_impl: self.collector_impl,
            max_exceptions: self.max_exceptions,
            max_cycles: self.max_cycles,
            conflict_resolver_verbosity: self.conflict_resolver_verbosity,
            version_selector: self.version_selector,
            enforce_version_convergence: self.enforce_version_convergence,
            descriptor_reader: self.descriptor_reader,
            range_resolver: self.range_resolver,
            selector: self.selector,
            manager: self.manager,
            traverser: self.traverser,
            version_filter: self.version_filter,
        }
    }
}
