//! Data types for conflict regions and their resolution state.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Which content a resolved region is replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Keep the local ("ours") side.
    Current,
    /// Take the incoming ("theirs") side.
    Incoming,
    /// Current lines followed by incoming lines.
    Both,
    /// Freeform text supplied by the user.
    Manual,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Incoming => write!(f, "incoming"),
            Self::Both => write!(f, "both"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConflictRegion
// ---------------------------------------------------------------------------

/// One `<<<<<<<` / `=======` / `>>>>>>>` block found in a file.
///
/// Regions are plain records: resolving one produces a new region rather than
/// mutating the original, so a list of regions can be pushed through several
/// passes and compared afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRegion {
    /// 0-based line index of the opening marker.
    pub start_line: usize,
    /// 0-based line index of the closing marker (inclusive).
    pub end_line: usize,
    /// Lines between the opening marker and the separator.
    pub current_content: String,
    /// Lines between the separator and the closing marker.
    pub incoming_content: String,
    /// Common-ancestor text, when the caller could obtain one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_content: Option<String>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Set when a heuristic, not a person, picked the resolution.
    #[serde(default)]
    pub auto_resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resolve_reason: Option<String>,
    /// Replacement text for [`Resolution::Manual`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_content: Option<String>,
}

impl ConflictRegion {
    /// Create an unresolved region.
    pub fn new(
        start_line: usize,
        end_line: usize,
        current_content: impl Into<String>,
        incoming_content: impl Into<String>,
    ) -> Self {
        Self {
            start_line,
            end_line,
            current_content: current_content.into(),
            incoming_content: incoming_content.into(),
            base_content: None,
            is_resolved: false,
            resolution: None,
            auto_resolved: false,
            auto_resolve_reason: None,
            manual_content: None,
        }
    }

    /// Attach common-ancestor content.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_content = Some(base.into());
        self
    }

    /// Return a copy resolved by a heuristic, carrying the reason it fired.
    pub fn auto_resolved(&self, resolution: Resolution, reason: impl Into<String>) -> Self {
        Self {
            is_resolved: true,
            resolution: Some(resolution),
            auto_resolved: true,
            auto_resolve_reason: Some(reason.into()),
            manual_content: None,
            ..self.clone()
        }
    }

    /// Return a copy resolved by an explicit user choice.
    pub fn resolved_by_user(&self, resolution: Resolution, manual: Option<String>) -> Self {
        Self {
            is_resolved: true,
            resolution: Some(resolution),
            auto_resolved: false,
            auto_resolve_reason: None,
            manual_content: manual,
            ..self.clone()
        }
    }

    /// The resolution, but only when the region's state is consistent.
    ///
    /// A region flagged resolved without a resolution (or the reverse) is
    /// treated as unresolved.
    pub fn effective_resolution(&self) -> Option<Resolution> {
        if self.is_resolved {
            self.resolution
        } else {
            None
        }
    }

    /// Number of lines the region spans, markers included.
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// The original marker block, sliced out of the file's lines.
    ///
    /// Returns `None` if the region does not fit inside `lines`.
    pub fn marker_lines<'a>(&self, lines: &'a [&'a str]) -> Option<&'a [&'a str]> {
        if self.start_line > self.end_line {
            return None;
        }
        lines.get(self.start_line..=self.end_line)
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Resolution counts over a list of regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictStats {
    pub total: usize,
    pub resolved: usize,
    pub auto_resolved: usize,
    pub manually_resolved: usize,
    pub unresolved: usize,
}

impl std::fmt::Display for ConflictStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} total, {} resolved ({} auto, {} manual), {} unresolved",
            self.total, self.resolved, self.auto_resolved, self.manually_resolved, self.unresolved
        )
    }
}

/// Whether a merge may be completed, and why not if it may not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReadiness {
    pub can_complete: bool,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_region_is_unresolved() {
        let region = ConflictRegion::new(2, 6, "a", "b");
        assert!(!region.is_resolved);
        assert_eq!(region.resolution, None);
        assert!(!region.auto_resolved);
        assert_eq!(region.line_span(), 5);
    }

    #[test]
    fn test_auto_resolved_is_functional_update() {
        let region = ConflictRegion::new(0, 4, "a", "a");
        let resolved = region.auto_resolved(Resolution::Current, "identical");

        assert!(!region.is_resolved);
        assert!(resolved.is_resolved);
        assert!(resolved.auto_resolved);
        assert_eq!(resolved.resolution, Some(Resolution::Current));
        assert_eq!(resolved.auto_resolve_reason.as_deref(), Some("identical"));
        assert_eq!(resolved.current_content, "a");
    }

    #[test]
    fn test_user_resolution_clears_reason() {
        let region = ConflictRegion::new(0, 4, "a", "b").auto_resolved(Resolution::Both, "x");
        let resolved = region.resolved_by_user(Resolution::Manual, Some("c".into()));
        assert!(!resolved.auto_resolved);
        assert_eq!(resolved.auto_resolve_reason, None);
        assert_eq!(resolved.manual_content.as_deref(), Some("c"));
    }

    #[test]
    fn test_effective_resolution_requires_consistency() {
        let mut region = ConflictRegion::new(0, 4, "a", "b");
        region.is_resolved = true;
        assert_eq!(region.effective_resolution(), None);

        region.is_resolved = false;
        region.resolution = Some(Resolution::Incoming);
        assert_eq!(region.effective_resolution(), None);
    }

    #[test]
    fn test_marker_lines() {
        let lines = vec!["x", "<<<<<<< HEAD", "a", "=======", "b", ">>>>>>> f"];
        let region = ConflictRegion::new(1, 5, "a", "b");
        assert_eq!(region.marker_lines(&lines).unwrap().len(), 5);

        let out_of_range = ConflictRegion::new(4, 9, "a", "b");
        assert!(out_of_range.marker_lines(&lines).is_none());
    }

    #[test]
    fn test_json_shape() {
        let region = ConflictRegion::new(0, 4, "a", "b").auto_resolved(Resolution::Both, "merged");
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["startLine"], 0);
        assert_eq!(json["currentContent"], "a");
        assert_eq!(json["resolution"], "both");
        assert_eq!(json["autoResolved"], true);
        assert!(json.get("baseContent").is_none());

        let back: ConflictRegion = serde_json::from_value(json).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn test_stats_display() {
        let stats = ConflictStats {
            total: 3,
            resolved: 2,
            auto_resolved: 1,
            manually_resolved: 1,
            unresolved: 1,
        };
        assert_eq!(
            stats.to_string(),
            "3 total, 2 resolved (1 auto, 1 manual), 1 unresolved"
        );
    }
}
