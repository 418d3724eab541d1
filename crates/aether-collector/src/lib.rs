//! Recursive dependency graph collection.
//!
//! Walks a [`CollectRequest`] breadth-first, one depth level at a time:
//! version ranges are resolved, descriptors fetched (deduped and bounded
//! concurrently per level), relocations followed, and cycles detected,
//! producing a raw [`CollectResult`] for the conflict resolver to consume.
//! Scope derivation is deliberately not performed here — see the resolver.

pub mod collect;
pub mod fixtures;
pub mod pool;

pub use aether_core::request::{CollectRequest, CollectResult, CollectRoot, CollectionException, Cycle};
pub use collect::{collect, ensure_no_errors};
