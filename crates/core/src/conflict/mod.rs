//! Conflict detection, auto-resolution, and reassembly.
//!
//! The conflict subsystem is responsible for:
//! 1. **Parsing** -- finding `<<<<<<<` / `=======` / `>>>>>>>` blocks in text.
//! 2. **Auto-resolution** -- running an ordered chain of heuristics over each
//!    block and recording which one fired.
//! 3. **Reassembly** -- rebuilding the file from resolved and unresolved blocks.

pub mod model;
pub mod parser;
pub mod resolver;
pub mod rules;

pub use model::{ConflictRegion, ConflictStats, MergeReadiness, Resolution};
pub use parser::{has_conflict_markers, parse_conflict_markers};
pub use resolver::ConflictResolver;
pub use rules::{Decision, RuleChain, RuleKind};
