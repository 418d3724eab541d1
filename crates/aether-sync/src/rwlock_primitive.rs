//! In-process shared/exclusive lock backend.
//!
//! Unlimited concurrent shared holders; exclusive excludes all. Re-entrant
//! for the same owner: re-acquiring the same or a weaker mode bumps a
//! per-owner count. Upgrading shared -> exclusive within the same owner
//! fails fast with [`AetherError::ConflictingLockKind`] rather than
//! deadlocking; downgrading exclusive -> shared is allowed by acquiring a
//! shared handle before releasing the exclusive one.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use aether_util::errors::{AetherError, AetherResult};

use crate::mode::{LockMode, OwnerId};

#[derive(Default)]
struct State {
    shared_holders: HashMap<OwnerId, usize>,
    exclusive_holder: Option<(OwnerId, usize)>,
}

impl State {
    fn can_admit_shared(&self, owner: OwnerId) -> bool {
        match self.exclusive_holder {
            None => true,
            Some((holder, _)) => holder == owner,
        }
    }

    fn can_admit_exclusive(&self, owner: OwnerId) -> bool {
        match self.exclusive_holder {
            Some((holder, _)) => holder == owner,
            None => self.shared_holders.is_empty(),
        }
    }
}

pub struct LocalRwLockPrimitive {
    state: Mutex<State>,
    condvar: Condvar,
}

impl LocalRwLockPrimitive {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            condvar: Condvar::new(),
        }
    }

    pub fn acquire(&self, owner: OwnerId, mode: LockMode, timeout: Duration) -> AetherResult<()> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();

        // Upgrade shared -> exclusive within the same owner is a hard error,
        // not a wait: retrying would deadlock against itself.
        if mode == LockMode::Exclusive
            && state.shared_holders.contains_key(&owner)
            && state.exclusive_holder.map(|(h, _)| h) != Some(owner)
        {
            return Err(AetherError::ConflictingLockKind {
                key: String::new(),
                held: "shared",
                requested: "exclusive",
            }
            .into());
        }

        loop {
            let admitted = match mode {
                LockMode::Shared => state.can_admit_shared(owner),
                LockMode::Exclusive => state.can_admit_exclusive(owner),
            };
            if admitted {
                match mode {
                    LockMode::Shared => {
                        *state.shared_holders.entry(owner).or_insert(0) += 1;
                    }
                    LockMode::Exclusive => match &mut state.exclusive_holder {
                        Some((holder, count)) if *holder == owner => *count += 1,
                        _ => state.exclusive_holder = Some((owner, 1)),
                    },
                }
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(AetherError::LockTimeout {
                    key: String::new(),
                }
                .into());
            }
            let (guard, result) = self
                .condvar
                .wait_timeout(state, deadline - now)
                .unwrap();
            state = guard;
            if result.timed_out() {
                return Err(AetherError::LockTimeout {
                    key: String::new(),
                }
                .into());
            }
        }
    }

    pub fn release(&self, owner: OwnerId, mode: LockMode) {
        let mut state = self.state.lock().unwrap();
        match mode {
            LockMode::Shared => {
                if let Some(count) = state.shared_holders.get_mut(&owner) {
                    *count -= 1;
                    if *count == 0 {
                        state.shared_holders.remove(&owner);
                    }
                }
            }
            LockMode::Exclusive => {
                if let Some((holder, count)) = &mut state.exclusive_holder {
                    if *holder == owner {
                        *count -= 1;
                        if *count == 0 {
                            state.exclusive_holder = None;
                        }
                    }
                }
            }
        }
        drop(state);
        self.condvar.notify_all();
    }

    /// `true` once no shared or exclusive holder remains; used by the
    /// registry to decide whether this key's entry is eligible for eviction.
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.shared_holders.is_empty() && state.exclusive_holder.is_none()
    }
}

impl Default for LocalRwLockPrimitive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_shared_holders_admitted() {
        let lock = LocalRwLockPrimitive::new();
        let a = OwnerId::fresh();
        let b = OwnerId::fresh();
        lock.acquire(a, LockMode::Shared, Duration::from_millis(100)).unwrap();
        lock.acquire(b, LockMode::Shared, Duration::from_millis(100)).unwrap();
    }

    #[test]
    fn exclusive_excludes_shared() {
        let lock = LocalRwLockPrimitive::new();
        let a = OwnerId::fresh();
        let b = OwnerId::fresh();
        lock.acquire(a, LockMode::Exclusive, Duration::from_millis(100)).unwrap();
        let err = lock.acquire(b, LockMode::Shared, Duration::from_millis(50));
        assert!(err.is_err());
    }

    #[test]
    fn reentrant_exclusive_same_owner() {
        let lock = LocalRwLockPrimitive::new();
        let a = OwnerId::fresh();
        lock.acquire(a, LockMode::Exclusive, Duration::from_millis(100)).unwrap();
        lock.acquire(a, LockMode::Exclusive, Duration::from_millis(100)).unwrap();
        lock.release(a, LockMode::Exclusive);
        // still held once more
        let b = OwnerId::fresh();
        assert!(lock
            .acquire(b, LockMode::Shared, Duration::from_millis(50))
            .is_err());
        lock.release(a, LockMode::Exclusive);
        assert!(lock.is_idle());
    }

    #[test]
    fn upgrade_shared_to_exclusive_fails_with_other_shared_holders() {
        let lock = LocalRwLockPrimitive::new();
        let a = OwnerId::fresh();
        let b = OwnerId::fresh();
        lock.acquire(a, LockMode::Shared, Duration::from_millis(100)).unwrap();
        lock.acquire(b, LockMode::Shared, Duration::from_millis(100)).unwrap();
        let err = lock.acquire(a, LockMode::Exclusive, Duration::from_millis(50));
        assert!(err.is_err());
    }

    #[test]
    fn upgrade_shared_to_exclusive_fails_even_as_sole_holder() {
        let lock = LocalRwLockPrimitive::new();
        let a = OwnerId::fresh();
        lock.acquire(a, LockMode::Shared, Duration::from_millis(100)).unwrap();
        let err = lock.acquire(a, LockMode::Exclusive, Duration::from_millis(50));
        assert!(err.is_err());
    }

    #[test]
    fn downgrade_exclusive_to_shared_allowed() {
        let lock = LocalRwLockPrimitive::new();
        let a = OwnerId::fresh();
        lock.acquire(a, LockMode::Exclusive, Duration::from_millis(100)).unwrap();
        lock.acquire(a, LockMode::Shared, Duration::from_millis(100)).unwrap();
        lock.release(a, LockMode::Exclusive);
        // a still holds shared; a second shared holder should be admitted now
        let b = OwnerId::fresh();
        lock.acquire(b, LockMode::Shared, Duration::from_millis(100)).unwrap();
    }

    #[test]
    fn is_idle_after_full_release() {
        let lock = LocalRwLockPrimitive::new();
        let a = OwnerId::fresh();
        lock.acquire(a, LockMode::Shared, Duration::from_millis(100)).unwrap();
        assert!(!lock.is_idle());
        lock.release(a, LockMode::Shared);
        assert!(lock.is_idle());
    }
}
