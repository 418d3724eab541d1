//! Named-lock registry, name mappers, and sync contexts coordinating
//! concurrent threads and processes around a shared local artifact cache.
//!
//! No direct precedent for cross-process coordination exists upstream of
//! this crate; the in-process primitive and registry/context orchestration
//! are original, and the file-lock primitive generalizes a sentinel-file
//! `fs2` locking pattern seen elsewhere in the ecosystem.

pub mod filelock_primitive;
pub mod mode;
pub mod namemap;
pub mod registry;
pub mod rwlock_primitive;
pub mod synccontext;

pub use filelock_primitive::FileLockPrimitive;
pub use mode::{LockMode, OwnerId};
pub use namemap::{MetadataKey, NameMapper};
pub use registry::{LockHandle, LockPrimitive, NamedLockRegistry};
pub use rwlock_primitive::LocalRwLockPrimitive;
pub use synccontext::SyncContext;
