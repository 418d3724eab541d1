//! Reference-counted lock-instance registry keyed by opaque string.
//!
//! The map mutation itself is a short critical section: get-or-insert a
//! cloned `Arc<P>`, then release the map lock before calling into the
//! (potentially blocking) primitive. Releasing a handle decrements and,
//! iff the primitive reports itself idle and no other clone of the `Arc`
//! exists, evicts the entry — eviction is an optimization, never a
//! correctness requirement.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aether_util::errors::AetherResult;
use tracing::debug;

use crate::filelock_primitive::FileLockPrimitive;
use crate::mode::{LockMode, OwnerId};
use crate::rwlock_primitive::LocalRwLockPrimitive;

/// Shared contract between the in-process and file-backed primitives.
pub trait LockPrimitive: Send + Sync {
    fn acquire(&self, owner: OwnerId, mode: LockMode, timeout: Duration) -> AetherResult<()>;
    fn release(&self, owner: OwnerId, mode: LockMode);
    fn is_idle(&self) -> bool;
}

impl LockPrimitive for LocalRwLockPrimitive {
    fn acquire(&self, owner: OwnerId, mode: LockMode, timeout: Duration) -> AetherResult<()> {
        LocalRwLockPrimitive::acquire(self, owner, mode, timeout)
    }
    fn release(&self, owner: OwnerId, mode: LockMode) {
        LocalRwLockPrimitive::release(self, owner, mode)
    }
    fn is_idle(&self) -> bool {
        LocalRwLockPrimitive::is_idle(self)
    }
}

impl LockPrimitive for FileLockPrimitive {
    fn acquire(&self, owner: OwnerId, mode: LockMode, timeout: Duration) -> AetherResult<()> {
        FileLockPrimitive::acquire(self, owner, mode, timeout)
    }
    fn release(&self, owner: OwnerId, mode: LockMode) {
        FileLockPrimitive::release(self, owner, mode)
    }
    fn is_idle(&self) -> bool {
        FileLockPrimitive::is_idle(self)
    }
}

pub struct NamedLockRegistry<P: LockPrimitive> {
    entries: Mutex<HashMap<String, Arc<P>>>,
    factory: Box<dyn Fn(&str) -> AetherResult<P> + Send + Sync>,
}

impl<P: LockPrimitive> NamedLockRegistry<P> {
    pub fn new(factory: impl Fn(&str) -> AetherResult<P> + Send + Sync + 'static) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    pub fn acquire(
        self: &Arc<Self>,
        key: &str,
        owner: OwnerId,
        mode: LockMode,
        timeout: Duration,
    ) -> AetherResult<LockHandle<P>> {
        let primitive = {
            let mut entries = self.entries.lock().unwrap();
            match entries.get(key) {
                Some(existing) => Arc::clone(existing),
                None => {
                    let fresh = Arc::new((self.factory)(key)?);
                    debug!(lock.key = key, "creating lock instance");
                    entries.insert(key.to_string(), Arc::clone(&fresh));
                    fresh
                }
            }
        };

        primitive.acquire(owner, mode, timeout)?;
        Ok(LockHandle {
            registry: Arc::clone(self),
            key: key.to_string(),
            primitive,
            owner,
            mode,
        })
    }

    fn evict_if_idle(&self, key: &str, primitive: &Arc<P>) {
        if !primitive.is_idle() {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get(key) {
            if Arc::ptr_eq(entry, primitive) && Arc::strong_count(entry) == 2 {
                entries.remove(key);
                debug!(lock.key = key, "evicting idle lock instance");
            }
        }
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// RAII handle. Dropping it releases the underlying primitive and attempts
/// eviction of the registry entry if it has become idle.
pub struct LockHandle<P: LockPrimitive> {
    registry: Arc<NamedLockRegistry<P>>,
    key: String,
    primitive: Arc<P>,
    owner: OwnerId,
    mode: LockMode,
}

impl<P: LockPrimitive> LockHandle<P> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl<P: LockPrimitive> Drop for LockHandle<P> {
    fn drop(&mut self) {
        self.primitive.release(self.owner, self.mode);
        self.registry.evict_if_idle(&self.key, &self.primitive);
    }
}
