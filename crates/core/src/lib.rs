//! mergekit core library.
//!
//! This crate provides the text engine behind mergekit's merge workflows:
//! conflict-marker parsing, heuristic auto-resolution, reassembly of resolved
//! files, and line-based diff hunks for two-revision views. It performs no
//! I/O; callers read and write files and talk to version control.

pub mod config;
pub mod conflict;
pub mod diff;
pub mod errors;

// Re-exports for convenience.
pub use config::ResolverConfig;
pub use conflict::{ConflictRegion, ConflictResolver, Resolution};
pub use diff::{DiffEngine, DiffHunk};
