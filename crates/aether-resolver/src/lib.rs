//! Conflict resolution over a collected dependency graph.
//!
//! Marks conflict groups (same coordinate, or linked via relocation/alias),
//! orders groups so a parent group resolves before its children, builds the
//! path-based view of the graph a group's winner is chosen from, and rewrites
//! the graph according to the configured verbosity. See [`resolve::resolve`].

pub mod marker;
pub mod path;
pub mod resolve;
pub mod selectors;
pub mod sorter;

pub use resolve::{resolve, ConflictReport, GroupResolution, LoserEntry};
