//! Line-based diff hunks between two revisions of a file.
//!
//! This is deliberately not an LCS / Myers diff. Both inputs are walked with
//! two cursors in lockstep:
//!
//! - equal lines advance both cursors; if a hunk is open the line is recorded
//!   as unchanged and the hunk is closed,
//! - differing lines become a `removed` + `added` pair (never an in-place
//!   edit),
//! - once one side runs out, the other side's remaining lines are all
//!   `removed` or all `added`.
//!
//! Every contiguous run of differences therefore becomes its own hunk. An
//! insertion in the middle of a file shifts the cursors out of step, so every
//! line after it is reported as changed.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of a line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Unchanged,
    Added,
    Removed,
}

impl LineKind {
    /// Unified-diff prefix character.
    pub fn prefix(self) -> char {
        match self {
            Self::Unchanged => ' ',
            Self::Added => '+',
            Self::Removed => '-',
        }
    }
}

/// One line of a hunk. Line numbers are 1-based and only present on the
/// side(s) the line belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<usize>,
}

/// A contiguous run of differences.
///
/// `old_lines` / `new_lines` count only removed / added lines; the trailing
/// unchanged line that closes a hunk is not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    fn open(old_index: usize, new_index: usize) -> Self {
        Self {
            old_start: old_index + 1,
            old_lines: 0,
            new_start: new_index + 1,
            new_lines: 0,
            lines: Vec::new(),
        }
    }

    fn push_removed(&mut self, content: &str, old_index: usize) {
        self.old_lines += 1;
        self.lines.push(DiffLine {
            kind: LineKind::Removed,
            content: content.to_string(),
            old_line_number: Some(old_index + 1),
            new_line_number: None,
        });
    }

    fn push_added(&mut self, content: &str, new_index: usize) {
        self.new_lines += 1;
        self.lines.push(DiffLine {
            kind: LineKind::Added,
            content: content.to_string(),
            old_line_number: None,
            new_line_number: Some(new_index + 1),
        });
    }

    fn push_unchanged(&mut self, content: &str, old_index: usize, new_index: usize) {
        self.lines.push(DiffLine {
            kind: LineKind::Unchanged,
            content: content.to_string(),
            old_line_number: Some(old_index + 1),
            new_line_number: Some(new_index + 1),
        });
    }

    /// `@@ -old_start,old_lines +new_start,new_lines @@`
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

/// Stateless hunk generator.
pub struct DiffEngine;

impl DiffEngine {
    /// Compute the hunks that turn `old_content` into `new_content`.
    ///
    /// Identical inputs produce no hunks.
    pub fn generate_hunks(old_content: &str, new_content: &str) -> Vec<DiffHunk> {
        let old_lines: Vec<&str> = old_content.split('\n').collect();
        let new_lines: Vec<&str> = new_content.split('\n').collect();

        let mut hunks = Vec::new();
        let mut current: Option<DiffHunk> = None;
        let (mut i, mut j) = (0, 0);

        while i < old_lines.len() || j < new_lines.len() {
            let old_line = old_lines.get(i).copied();
            let new_line = new_lines.get(j).copied();

            match (old_line, new_line) {
                (Some(o), Some(n)) if o == n => {
                    if let Some(mut hunk) = current.take() {
                        hunk.push_unchanged(o, i, j);
                        hunks.push(hunk);
                    }
                    i += 1;
                    j += 1;
                }
                (Some(o), Some(n)) => {
                    let hunk = current.get_or_insert_with(|| DiffHunk::open(i, j));
                    hunk.push_removed(o, i);
                    hunk.push_added(n, j);
                    i += 1;
                    j += 1;
                }
                (Some(o), None) => {
                    current
                        .get_or_insert_with(|| DiffHunk::open(i, j))
                        .push_removed(o, i);
                    i += 1;
                }
                (None, Some(n)) => {
                    current
                        .get_or_insert_with(|| DiffHunk::open(i, j))
                        .push_added(n, j);
                    j += 1;
                }
                (None, None) => break,
            }
        }

        if let Some(hunk) = current {
            hunks.push(hunk);
        }

        debug!(
            old_lines = old_lines.len(),
            new_lines = new_lines.len(),
            hunks = hunks.len(),
            "generated diff hunks"
        );
        hunks
    }
}

/// Render hunks as unified-diff body text (headers and prefixed lines, no
/// file header).
pub fn render_unified(hunks: &[DiffHunk]) -> String {
    let mut out = String::new();
    for hunk in hunks {
        out.push_str(&hunk.header());
        out.push('\n');
        for line in &hunk.lines {
            out.push(line.kind.prefix());
            out.push_str(&line.content);
            out.push('\n');
        }
    }
    out
}
