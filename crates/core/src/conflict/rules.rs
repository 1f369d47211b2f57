//! Auto-resolution rules.
//!
//! Each rule is a predicate + action pair: it inspects one region and either
//! returns a [`Decision`] or declines. The rules run as an ordered chain and
//! the first decision wins, so order is part of the behaviour:
//!
//! | # | Rule | Resolution |
//! |---|------|------------|
//! | 1 | Current side empty, incoming not | `incoming` |
//! | 2 | Incoming side empty, current not | `current` |
//! | 3 | Identical after trimming | `current` |
//! | 4 | Identical after whitespace normalization | `current` |
//! | 5 | Base-aware (needs base content) | varies |
//! | 6 | Both sides only import statements | `both` / larger side |
//! | 7 | Both sides only comments | longer side |
//!
//! The rules are line and pattern based. They do not parse the language.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{CommentConfig, ResolverConfig, RulesConfig, ThreeWayConfig};

use super::model::{ConflictRegion, Resolution};

static IMPORT_PATTERN: OnceLock<Regex> = OnceLock::new();
static COMMENT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn import_pattern() -> &'static Regex {
    IMPORT_PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(?:import\b|(?:const|let|var)\s+.+=\s*require\s*\(|require\s*\(|export\s.*\bfrom\b|from\s+\S+\s+import\b)",
        )
        .expect("import pattern is valid")
    })
}

fn comment_pattern() -> &'static Regex {
    COMMENT_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?://|/\*|\*|#|<!--)").expect("comment pattern is valid")
    })
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// What a rule decided for a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub resolution: Resolution,
    pub reason: String,
}

impl Decision {
    fn new(resolution: Resolution, reason: impl Into<String>) -> Self {
        Self {
            resolution,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule kinds
// ---------------------------------------------------------------------------

/// The auto-resolution rules, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    PureAddition,
    PureDeletion,
    Identical,
    WhitespaceOnly,
    ThreeWay,
    ImportMerge,
    CommentBlock,
}

impl RuleKind {
    /// Precedence order. Earlier rules win.
    pub const ORDER: [RuleKind; 7] = [
        RuleKind::PureAddition,
        RuleKind::PureDeletion,
        RuleKind::Identical,
        RuleKind::WhitespaceOnly,
        RuleKind::ThreeWay,
        RuleKind::ImportMerge,
        RuleKind::CommentBlock,
    ];

    fn enabled(self, rules: &RulesConfig) -> bool {
        match self {
            Self::PureAddition => rules.pure_addition,
            Self::PureDeletion => rules.pure_deletion,
            Self::Identical => rules.identical,
            Self::WhitespaceOnly => rules.whitespace,
            Self::ThreeWay => rules.three_way,
            Self::ImportMerge => rules.imports,
            Self::CommentBlock => rules.comments,
        }
    }

    /// Run this rule alone against `region`.
    pub fn evaluate(self, region: &ConflictRegion, config: &ResolverConfig) -> Option<Decision> {
        let current = region.current_content.as_str();
        let incoming = region.incoming_content.as_str();
        match self {
            Self::PureAddition => pure_addition(current, incoming),
            Self::PureDeletion => pure_deletion(current, incoming),
            Self::Identical => identical(current, incoming),
            Self::WhitespaceOnly => whitespace_only(current, incoming),
            Self::ThreeWay => region
                .base_content
                .as_deref()
                .and_then(|base| three_way(base, current, incoming, &config.three_way)),
            Self::ImportMerge => import_merge(current, incoming),
            Self::CommentBlock => comment_block(current, incoming, &config.comments),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PureAddition => write!(f, "pure_addition"),
            Self::PureDeletion => write!(f, "pure_deletion"),
            Self::Identical => write!(f, "identical"),
            Self::WhitespaceOnly => write!(f, "whitespace_only"),
            Self::ThreeWay => write!(f, "three_way"),
            Self::ImportMerge => write!(f, "import_merge"),
            Self::CommentBlock => write!(f, "comment_block"),
        }
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// The enabled rules, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleChain {
    rules: Vec<RuleKind>,
}

impl RuleChain {
    /// Build the chain from the enable switches. Order is always
    /// [`RuleKind::ORDER`] with disabled rules removed.
    pub fn from_config(rules: &RulesConfig) -> Self {
        Self {
            rules: RuleKind::ORDER
                .into_iter()
                .filter(|kind| kind.enabled(rules))
                .collect(),
        }
    }

    pub fn rules(&self) -> &[RuleKind] {
        &self.rules
    }

    /// First rule that decides, with its decision.
    pub fn evaluate(
        &self,
        region: &ConflictRegion,
        config: &ResolverConfig,
    ) -> Option<(RuleKind, Decision)> {
        self.rules
            .iter()
            .find_map(|kind| kind.evaluate(region, config).map(|d| (*kind, d)))
    }
}

impl Default for RuleChain {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub(crate) fn pure_addition(current: &str, incoming: &str) -> Option<Decision> {
    (is_blank(current) && !is_blank(incoming)).then(|| {
        Decision::new(
            Resolution::Incoming,
            "Pure addition: only the incoming side has content",
        )
    })
}

pub(crate) fn pure_deletion(current: &str, incoming: &str) -> Option<Decision> {
    (!is_blank(current) && is_blank(incoming)).then(|| {
        Decision::new(
            Resolution::Current,
            "Pure deletion: only the current side has content",
        )
    })
}

pub(crate) fn identical(current: &str, incoming: &str) -> Option<Decision> {
    (current.trim() == incoming.trim()).then(|| {
        Decision::new(
            Resolution::Current,
            "Identical content on both sides",
        )
    })
}

/// Normalize for whitespace-insensitive comparison.
///
/// CRLF becomes LF, then every whitespace run (tabs, trailing spaces and
/// newlines included) collapses to one space and the ends are trimmed.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.replace("\r\n", "\n")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn whitespace_only(current: &str, incoming: &str) -> Option<Decision> {
    (normalize_whitespace(current) == normalize_whitespace(incoming)).then(|| {
        Decision::new(
            Resolution::Current,
            "Sides differ only in whitespace",
        )
    })
}

pub(crate) fn three_way(
    base: &str,
    current: &str,
    incoming: &str,
    config: &ThreeWayConfig,
) -> Option<Decision> {
    let b = base.trim();
    let c = current.trim();
    let i = incoming.trim();

    if c == b && i != b {
        return Some(Decision::new(
            Resolution::Incoming,
            "Three-way: current side unchanged from base, incoming side modified",
        ));
    }
    if i == b && c != b {
        return Some(Decision::new(
            Resolution::Current,
            "Three-way: incoming side unchanged from base, current side modified",
        ));
    }
    if c == i && c != b {
        return Some(Decision::new(
            Resolution::Current,
            "Three-way: both sides made the same change",
        ));
    }
    if changes_look_disjoint(base, current, incoming, config) {
        return Some(Decision::new(
            Resolution::Both,
            "Three-way: changes on each side appear not to overlap",
        ));
    }
    None
}

/// Approximate "non-overlapping" gate.
///
/// Fails when either side's line count strays from the base's by more than
/// `max_line_delta`. Otherwise each side must keep at least
/// `min_shared_ratio` of the base's line count as lines (trimmed) that also
/// appear somewhere in the base. Membership ignores position, so edits to the
/// same logical line can pass and disjoint edits of very different size can
/// fail.
pub(crate) fn changes_look_disjoint(
    base: &str,
    current: &str,
    incoming: &str,
    config: &ThreeWayConfig,
) -> bool {
    let base_lines: Vec<&str> = base.split('\n').collect();
    let current_lines: Vec<&str> = current.split('\n').collect();
    let incoming_lines: Vec<&str> = incoming.split('\n').collect();

    if current_lines.len().abs_diff(base_lines.len()) > config.max_line_delta
        || incoming_lines.len().abs_diff(base_lines.len()) > config.max_line_delta
    {
        return false;
    }

    let base_set: HashSet<&str> = base_lines.iter().map(|l| l.trim()).collect();
    let shared = |lines: &[&str]| lines.iter().filter(|l| base_set.contains(l.trim())).count();

    let threshold = base_lines.len() as f64 * config.min_shared_ratio;
    shared(&current_lines[..]) as f64 >= threshold
        && shared(&incoming_lines[..]) as f64 >= threshold
}

/// Non-blank lines, trimmed, if every one of them matches `pattern`.
fn lines_matching<'a>(text: &'a str, pattern: &Regex) -> Option<Vec<&'a str>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    (!lines.is_empty() && lines.iter().all(|l| pattern.is_match(l))).then_some(lines)
}

pub(crate) fn import_merge(current: &str, incoming: &str) -> Option<Decision> {
    let pattern = import_pattern();
    let current_imports = lines_matching(current, pattern)?;
    let incoming_imports = lines_matching(incoming, pattern)?;

    let current_set: HashSet<&str> = current_imports.iter().copied().collect();
    if !incoming_imports.iter().any(|l| current_set.contains(l)) {
        return Some(Decision::new(
            Resolution::Both,
            "Import statements: sides add distinct imports, keeping both",
        ));
    }

    match current_imports.len().cmp(&incoming_imports.len()) {
        std::cmp::Ordering::Greater => Some(Decision::new(
            Resolution::Current,
            "Import statements: current side has more imports",
        )),
        std::cmp::Ordering::Less => Some(Decision::new(
            Resolution::Incoming,
            "Import statements: incoming side has more imports",
        )),
        std::cmp::Ordering::Equal => None,
    }
}

pub(crate) fn comment_block(
    current: &str,
    incoming: &str,
    config: &CommentConfig,
) -> Option<Decision> {
    let pattern = comment_pattern();
    lines_matching(current, pattern)?;
    lines_matching(incoming, pattern)?;

    let current_len = current.trim().chars().count();
    let incoming_len = incoming.trim().chars().count();
    let longer = current_len.max(incoming_len) as f64;

    if (current_len.abs_diff(incoming_len) as f64) <= longer * config.length_tolerance {
        return Some(Decision::new(
            Resolution::Current,
            "Comment block: sides are of similar length, keeping current",
        ));
    }
    if current_len > incoming_len {
        Some(Decision::new(
            Resolution::Current,
            "Comment block: current side is more detailed",
        ))
    } else {
        Some(Decision::new(
            Resolution::Incoming,
            "Comment block: incoming side is more detailed",
        ))
    }
}
