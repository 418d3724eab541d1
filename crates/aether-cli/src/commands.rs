//! Command dispatch and handlers.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use aether_core::coordinate::Artifact;
use aether_core::session::{ResolverSession, Verbosity, VersionSelectorKind};
use aether_core::spi::{AcceptAllSelector, AlwaysTraverse, NoopDependencyManager, NoopVersionFilter};
use aether_sync::{LockMode, LocalRwLockPrimitive, NameMapper, NamedLockRegistry, SyncContext};
use aether_util::errors::{AetherError, AetherResult};
use aether_util::progress::{spinner, status};
use miette::Result;

use crate::cli::{Cli, Command};
use crate::demo;

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            verbosity,
            version_selector,
            enforce_convergence,
        } => resolve(&verbosity, &version_selector, enforce_convergence).await,
        Command::Lock { coordinates, mode } => lock(&coordinates, &mode),
    }
}

async fn resolve(verbosity: &str, version_selector: &str, enforce_convergence: bool) -> Result<()> {
    let verbosity = Verbosity::from_str(&verbosity.to_uppercase())?;
    let version_selector = match version_selector {
        "nearest" => VersionSelectorKind::Nearest,
        "higher-version" => VersionSelectorKind::HigherVersion,
        other => {
            return Err(AetherError::InvalidConfiguration {
                key: "version-selector".to_string(),
                message: format!("unknown version selector `{other}`, expected nearest or higher-version"),
            }
            .into())
        }
    };

    let fixtures = demo::fixture_repository();
    let session = ResolverSession::builder(fixtures.clone(), fixtures)
        .selector(Arc::new(AcceptAllSelector))
        .manager(Arc::new(NoopDependencyManager))
        .traverser(Arc::new(AlwaysTraverse))
        .version_filter(Arc::new(NoopVersionFilter))
        .conflict_resolver_verbosity(verbosity)
        .version_selector(version_selector)
        .enforce_version_convergence(enforce_convergence)
        .build();

    let sp = spinner("Collecting dependencies...");
    let mut result = aether_collector::collect(&session, demo::request()).await?;
    aether_collector::ensure_no_errors(&result)?;
    sp.finish_and_clear();

    let report = aether_resolver::resolve(&session, &mut result.graph)?;

    status("Resolved", &format!("{} node(s)", result.graph.node_count()));
    println!("{report}");
    Ok(())
}

fn lock(coordinates: &[String], mode: &str) -> Result<()> {
    let mode = match mode {
        "shared" => LockMode::Shared,
        "exclusive" => LockMode::Exclusive,
        other => {
            return Err(AetherError::InvalidConfiguration {
                key: "mode".to_string(),
                message: format!("unknown lock mode `{other}`, expected shared or exclusive"),
            }
            .into())
        }
    };

    let artifacts: Vec<Artifact> = coordinates
        .iter()
        .map(|c| parse_coordinate(c))
        .collect::<AetherResult<_>>()?;

    let registry = Arc::new(NamedLockRegistry::new(|_key| Ok(LocalRwLockPrimitive::new())));
    let mut ctx = SyncContext::new(registry, NameMapper::Gaecv, None, mode, Duration::from_secs(30));
    ctx.acquire(&artifacts, &[])?;

    status("Locked", &format!("{} key(s)", ctx.held_keys().len()));
    for key in ctx.held_keys() {
        println!("  {key}");
    }
    Ok(())
}

fn parse_coordinate(spec: &str) -> AetherResult<Artifact> {
    let parts: Vec<&str> = spec.split(':').collect();
    match parts.as_slice() {
        [group, artifact, version] => Ok(Artifact::new(*group, *artifact, *version)),
        _ => Err(AetherError::Generic {
            message: format!("expected groupId:artifactId:version, got `{spec}`"),
        }
        .into()),
    }
}
