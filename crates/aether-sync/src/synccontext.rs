//! Scoped multi-lock acquisition over a set of keys with a fixed shared or
//! exclusive mode. Acquisition is incremental (repeated `acquire` calls are
//! allowed; already-held keys are skipped) and release always happens in
//! reverse acquisition order, including on drop, so a panic mid-build still
//! unwinds the locks correctly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aether_core::coordinate::Artifact;
use aether_util::errors::AetherResult;
use tracing::trace;

use crate::mode::{LockMode, OwnerId};
use crate::namemap::{MetadataKey, NameMapper};
use crate::registry::{LockHandle, LockPrimitive, NamedLockRegistry};

use std::sync::Arc;

pub struct SyncContext<P: LockPrimitive> {
    registry: Arc<NamedLockRegistry<P>>,
    mapper: NameMapper,
    basedir: Option<PathBuf>,
    mode: LockMode,
    owner: OwnerId,
    timeout: Duration,
    held: Vec<LockHandle<P>>,
}

impl<P: LockPrimitive> SyncContext<P> {
    pub fn new(
        registry: Arc<NamedLockRegistry<P>>,
        mapper: NameMapper,
        basedir: Option<&Path>,
        mode: LockMode,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            mapper,
            basedir: basedir.map(Path::to_path_buf),
            mode,
            owner: OwnerId::fresh(),
            timeout,
            held: Vec::new(),
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn held_keys(&self) -> Vec<&str> {
        self.held.iter().map(|h| h.key()).collect()
    }

    /// Resolve `artifacts`/`metadata` to lock keys via the configured name
    /// mapper and acquire any not already held by this context. On timeout
    /// or interruption, releases everything acquired *during this call* (in
    /// reverse order) before propagating the error; locks already held from
    /// a prior call are left untouched.
    pub fn acquire(&mut self, artifacts: &[Artifact], metadata: &[MetadataKey]) -> AetherResult<()> {
        let keys = self.mapper.keys(artifacts, metadata, self.basedir.as_deref());
        let mut newly_acquired = Vec::new();

        for key in &keys {
            if self.held.iter().any(|h| h.key() == key) {
                continue;
            }
            match self
                .registry
                .acquire(key, self.owner, self.mode, self.timeout)
            {
                Ok(handle) => {
                    trace!(lock.key = %key, mode = self.mode.as_str(), "acquired");
                    newly_acquired.push(handle);
                }
                Err(err) => {
                    while let Some(handle) = newly_acquired.pop() {
                        drop(handle);
                    }
                    return Err(err);
                }
            }
        }

        self.held.append(&mut newly_acquired);
        Ok(())
    }
}

impl<P: LockPrimitive> Drop for SyncContext<P> {
    fn drop(&mut self) {
        while let Some(handle) = self.held.pop() {
            trace!(lock.key = %handle.key(), "released");
            drop(handle);
        }
    }
}
