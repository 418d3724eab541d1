//! Inter-process lock backend: a sentinel file under a configurable lock
//! directory, shared/exclusive mapped to the OS file-lock primitive via
//! [`fs2`]. Generalizes the `open_options.append(true)` + `lock_exclusive()`
//! sentinel-file pattern used for directory locking in package-manager
//! caches, extended here with shared-mode support and a timeout since
//! `fs2` has no native timeout API of its own.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fs2::FileExt;

use aether_util::errors::{AetherError, AetherResult};
use aether_util::fs::{ensure_dir, sanitize_path_segment};

use crate::mode::{LockMode, OwnerId};

/// Poll interval while waiting for an OS-level lock that another process
/// already holds. `fs2` exposes only blocking and try-variants, not a
/// timeout, so acquisition is a bounded `try_lock` retry loop.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct OpenLock {
    file: File,
    mode: LockMode,
    holders: Vec<OwnerId>,
}

pub struct FileLockPrimitive {
    path: PathBuf,
    state: Mutex<Option<OpenLock>>,
}

impl FileLockPrimitive {
    /// `basedir` is the canonicalized lock directory; `key` is the raw
    /// (unsanitized) lock key produced by the name mapper.
    pub fn new(basedir: &Path, key: &str) -> AetherResult<Self> {
        ensure_dir(basedir).map_err(AetherError::Io)?;
        let filename = format!("{}.lock", sanitize_path_segment(key));
        Ok(Self {
            path: basedir.join(filename),
            state: Mutex::new(None),
        })
    }

    pub fn acquire(&self, owner: OwnerId, mode: LockMode, timeout: Duration) -> AetherResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut guard = self.state.lock().unwrap();
                match guard.as_mut() {
                    Some(open) if open.holders.contains(&owner) => {
                        if open.mode == LockMode::Exclusive || mode == LockMode::Shared {
                            open.holders.push(owner);
                            return Ok(());
                        }
                        // shared-held owner asking for exclusive: reject, do not wait.
                        return Err(AetherError::ConflictingLockKind {
                            key: self.path.display().to_string(),
                            held: "shared",
                            requested: "exclusive",
                        }
                        .into());
                    }
                    Some(open) => {
                        // held by other in-process owners only if mode is compatible
                        if mode == LockMode::Shared && open.mode == LockMode::Shared {
                            open.holders.push(owner);
                            return Ok(());
                        }
                        // otherwise fall through to wait
                    }
                    None => {
                        let file = OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(&self.path)
                            .map_err(AetherError::Io)?;
                        let locked = match mode {
                            LockMode::Shared => file.try_lock_shared(),
                            LockMode::Exclusive => file.try_lock_exclusive(),
                        };
                        if locked.is_ok() {
                            *guard = Some(OpenLock {
                                file,
                                mode,
                                holders: vec![owner],
                            });
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(AetherError::LockTimeout {
                    key: self.path.display().to_string(),
                }
                .into());
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    pub fn release(&self, owner: OwnerId, _mode: LockMode) {
        let mut guard = self.state.lock().unwrap();
        if let Some(open) = guard.as_mut() {
            if let Some(pos) = open.holders.iter().position(|o| *o == owner) {
                open.holders.remove(pos);
            }
            if open.holders.is_empty() {
                let _ = FileExt::unlock(&open.file);
                *guard = None;
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state.lock().unwrap().is_none()
    }
}
