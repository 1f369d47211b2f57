//! Conflict resolution: auto-resolution pass, state queries and reassembly.
//!
//! The [`ConflictResolver`] holds only its configuration. Every operation
//! takes regions in and hands new regions (or text) back, so concurrent calls
//! on unrelated inputs never interact. Reading and writing files, and
//! serializing work on the same file, is the caller's job.

use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::errors::ConflictError;

use super::model::{ConflictRegion, ConflictStats, MergeReadiness, Resolution};
use super::parser::parse_conflict_markers;
use super::rules::RuleChain;

/// Detects conflicts, auto-resolves what the heuristics allow and rebuilds
/// the file.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    config: ResolverConfig,
    chain: RuleChain,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl ConflictResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let chain = RuleChain::from_config(&config.rules);
        Self { config, chain }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Detection
    // -----------------------------------------------------------------------

    /// Parse every well-formed conflict block in `content`.
    pub fn detect_conflicts(&self, content: &str) -> Vec<ConflictRegion> {
        parse_conflict_markers(content)
    }

    /// Attach one optional base text per region, by position.
    pub fn attach_bases(
        regions: &[ConflictRegion],
        bases: &[Option<String>],
    ) -> Result<Vec<ConflictRegion>, ConflictError> {
        if regions.len() != bases.len() {
            return Err(ConflictError::BaseCountMismatch {
                regions: regions.len(),
                bases: bases.len(),
            });
        }

        Ok(regions
            .iter()
            .zip(bases)
            .map(|(region, base)| match base {
                Some(base) => region.clone().with_base(base.as_str()),
                None => region.clone(),
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Auto-resolution
    // -----------------------------------------------------------------------

    /// Run the rule chain over every unresolved region.
    ///
    /// Already-resolved regions pass through untouched. Regions no rule
    /// decides stay unresolved.
    pub fn resolve_non_conflicting_changes(&self, regions: &[ConflictRegion]) -> Vec<ConflictRegion> {
        info!(regions = regions.len(), "auto-resolving conflicts");

        let resolved: Vec<ConflictRegion> = regions.iter().map(|r| self.auto_resolve(r)).collect();

        let auto = resolved
            .iter()
            .zip(regions)
            .filter(|(after, before)| after.is_resolved && !before.is_resolved)
            .count();
        info!(auto_resolved = auto, "auto-resolution complete");
        resolved
    }

    /// Run the rule chain over a single region.
    pub fn auto_resolve(&self, region: &ConflictRegion) -> ConflictRegion {
        if region.is_resolved {
            return region.clone();
        }

        match self.chain.evaluate(region, &self.config) {
            Some((rule, decision)) => {
                debug!(
                    start_line = region.start_line,
                    rule = %rule,
                    resolution = %decision.resolution,
                    "rule fired"
                );
                region.auto_resolved(decision.resolution, decision.reason)
            }
            None => {
                debug!(
                    start_line = region.start_line,
                    "no rule applies, manual resolution required"
                );
                region.clone()
            }
        }
    }

    /// Resolve a region with an explicit user choice.
    ///
    /// [`Resolution::Manual`] needs replacement text, so it must go through
    /// [`resolve_manually`](Self::resolve_manually) instead.
    pub fn resolve_with(
        region: &ConflictRegion,
        resolution: Resolution,
    ) -> Result<ConflictRegion, ConflictError> {
        if resolution == Resolution::Manual {
            return Err(ConflictError::InvalidResolution {
                line: region.start_line,
                detail: "manual resolution requires replacement content".into(),
            });
        }
        debug!(start_line = region.start_line, %resolution, "resolved by user");
        Ok(region.resolved_by_user(resolution, None))
    }

    /// Resolve a region with freeform text written by the user.
    pub fn resolve_manually(region: &ConflictRegion, content: impl Into<String>) -> ConflictRegion {
        debug!(start_line = region.start_line, "resolved manually");
        region.resolved_by_user(Resolution::Manual, Some(content.into()))
    }

    /// Apply [`resolve_with`](Self::resolve_with) to the region at `index`.
    pub fn resolve_at(
        regions: &[ConflictRegion],
        index: usize,
        resolution: Resolution,
    ) -> Result<Vec<ConflictRegion>, ConflictError> {
        let target = regions.get(index).ok_or(ConflictError::RegionNotFound {
            index,
            count: regions.len(),
        })?;
        let resolved = Self::resolve_with(target, resolution)?;

        let mut out = regions.to_vec();
        out[index] = resolved;
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // State queries
    // -----------------------------------------------------------------------

    pub fn is_conflict_resolved(region: &ConflictRegion) -> bool {
        region.is_resolved && region.resolution.is_some()
    }

    /// `true` only for a non-empty list whose regions are all resolved.
    ///
    /// An empty list returns `false`: "nothing detected" must be handled by
    /// the caller rather than read as "ready to merge".
    pub fn all_conflicts_resolved(regions: &[ConflictRegion]) -> bool {
        !regions.is_empty() && regions.iter().all(Self::is_conflict_resolved)
    }

    pub fn can_complete_merge(regions: &[ConflictRegion]) -> MergeReadiness {
        let unresolved = regions
            .iter()
            .filter(|r| !Self::is_conflict_resolved(r))
            .count();

        if unresolved == 0 {
            MergeReadiness {
                can_complete: true,
                reason: "All conflicts resolved".into(),
            }
        } else {
            MergeReadiness {
                can_complete: false,
                reason: format!(
                    "{} unresolved conflict{} remaining",
                    unresolved,
                    if unresolved == 1 { "" } else { "s" }
                ),
            }
        }
    }

    pub fn conflict_stats(regions: &[ConflictRegion]) -> ConflictStats {
        let mut stats = ConflictStats {
            total: regions.len(),
            ..ConflictStats::default()
        };
        for region in regions {
            if Self::is_conflict_resolved(region) {
                stats.resolved += 1;
                if region.auto_resolved {
                    stats.auto_resolved += 1;
                } else {
                    stats.manually_resolved += 1;
                }
            } else {
                stats.unresolved += 1;
            }
        }
        stats
    }

    // -----------------------------------------------------------------------
    // Reassembly
    // -----------------------------------------------------------------------

    /// Rebuild `content` with each resolved region replaced by its chosen
    /// lines. Unresolved (or inconsistent) regions keep their original marker
    /// block verbatim.
    pub fn apply_conflict_resolution(content: &str, regions: &[ConflictRegion]) -> String {
        let lines: Vec<&str> = content.split('\n').collect();

        let mut ordered: Vec<&ConflictRegion> = regions.iter().collect();
        ordered.sort_by_key(|r| r.start_line);

        let mut out: Vec<&str> = Vec::with_capacity(lines.len());
        let mut cursor = 0;

        for region in ordered {
            if region.start_line < cursor {
                warn!(
                    start_line = region.start_line,
                    "region overlaps a previous region, skipping"
                );
                continue;
            }
            let Some(block) = region.marker_lines(&lines) else {
                warn!(
                    start_line = region.start_line,
                    end_line = region.end_line,
                    "region does not fit the content, skipping"
                );
                continue;
            };

            out.extend_from_slice(&lines[cursor..region.start_line]);

            match region.effective_resolution() {
                Some(Resolution::Current) => push_side(&mut out, &region.current_content),
                Some(Resolution::Incoming) => push_side(&mut out, &region.incoming_content),
                Some(Resolution::Both) => {
                    push_side(&mut out, &region.current_content);
                    push_side(&mut out, &region.incoming_content);
                }
                Some(Resolution::Manual) => match region.manual_content.as_deref() {
                    Some(manual) => push_side(&mut out, manual),
                    None => push_side(&mut out, &region.current_content),
                },
                None => {
                    if region.is_resolved != region.resolution.is_some() {
                        warn!(
                            start_line = region.start_line,
                            "inconsistent resolution state, keeping markers"
                        );
                    }
                    out.extend_from_slice(block);
                }
            }

            cursor = region.end_line + 1;
        }

        out.extend_from_slice(&lines[cursor..]);
        out.join("\n")
    }
}

/// Append a side's lines, or nothing if it is blank.
fn push_side<'a>(out: &mut Vec<&'a str>, side: &'a str) {
    if !side.trim().is_empty() {
        out.extend(side.split('\n'));
    }
}
