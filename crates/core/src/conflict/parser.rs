//! Conflict marker parsing.
//!
//! Scans text for the canonical `<<<<<<<` / `=======` / `>>>>>>>` block shape
//! produced by merge tooling. Marker lines may carry trailing labels (branch
//! names, refs); only the prefix matters. Blocks missing a separator or a
//! closing marker are skipped rather than reported, so one damaged block does
//! not hide the others.

use tracing::{debug, info};

use super::model::ConflictRegion;

pub const START_MARKER: &str = "<<<<<<<";
pub const SEPARATOR_MARKER: &str = "=======";
pub const END_MARKER: &str = ">>>>>>>";

/// Parse every well-formed conflict block in `content`, in file order.
pub fn parse_conflict_markers(content: &str) -> Vec<ConflictRegion> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut regions = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if !lines[i].starts_with(START_MARKER) {
            i += 1;
            continue;
        }

        let start = i;
        let Some(separator) = find_marker(&lines, start + 1, SEPARATOR_MARKER) else {
            debug!(line = start, "conflict start without separator, skipping");
            i = start + 1;
            continue;
        };
        let Some(end) = find_marker(&lines, separator + 1, END_MARKER) else {
            debug!(line = start, "conflict start without end marker, skipping");
            i = start + 1;
            continue;
        };

        regions.push(ConflictRegion::new(
            start,
            end,
            lines[start + 1..separator].join("\n"),
            lines[separator + 1..end].join("\n"),
        ));
        i = end + 1;
    }

    info!(
        lines = lines.len(),
        regions = regions.len(),
        "parsed conflict markers"
    );
    regions
}

/// Quick check for an opening marker anywhere in `content`.
pub fn has_conflict_markers(content: &str) -> bool {
    content
        .split('\n')
        .any(|line| line.starts_with(START_MARKER))
}

fn find_marker(lines: &[&str], from: usize, marker: &str) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| line.starts_with(marker))
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers() {
        assert!(parse_conflict_markers("fn main() {}\n").is_empty());
        assert!(parse_conflict_markers("").is_empty());
        assert!(!has_conflict_markers("a\nb\n"));
    }

    #[test]
    fn test_single_region() {
        let content = "before\n<<<<<<< HEAD\nours\n=======\ntheirs\n>>>>>>> feature\nafter";
        let regions = parse_conflict_markers(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].start_line, 1);
        assert_eq!(regions[0].end_line, 5);
        assert_eq!(regions[0].current_content, "ours");
        assert_eq!(regions[0].incoming_content, "theirs");
        assert!(!regions[0].is_resolved);
        assert!(has_conflict_markers(content));
    }

    #[test]
    fn test_multiline_sides() {
        let content = "<<<<<<< HEAD\na\nb\n=======\nc\nd\ne\n>>>>>>> other\n";
        let regions = parse_conflict_markers(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].current_content, "a\nb");
        assert_eq!(regions[0].incoming_content, "c\nd\ne");
    }

    #[test]
    fn test_empty_side() {
        let content = "<<<<<<< HEAD\n=======\nadded\n>>>>>>> other";
        let regions = parse_conflict_markers(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].current_content, "");
        assert_eq!(regions[0].incoming_content, "added");
    }

    #[test]
    fn test_multiple_regions_in_order() {
        let content = "\
<<<<<<< HEAD
one
=======
uno
>>>>>>> es
middle
<<<<<<< HEAD
two
=======
dos
>>>>>>> es";
        let regions = parse_conflict_markers(content);
        assert_eq!(regions.len(), 2);
        assert_eq!((regions[0].start_line, regions[0].end_line), (0, 4));
        assert_eq!((regions[1].start_line, regions[1].end_line), (6, 10));
        assert_eq!(regions[1].incoming_content, "dos");
    }

    #[test]
    fn test_missing_separator_yields_nothing() {
        let content = "<<<<<<< HEAD\nours\n>>>>>>> feature\n";
        assert!(parse_conflict_markers(content).is_empty());
    }

    #[test]
    fn test_missing_end_marker_yields_nothing() {
        let content = "<<<<<<< HEAD\nours\n=======\ntheirs\n";
        assert!(parse_conflict_markers(content).is_empty());
    }

    #[test]
    fn test_unterminated_start_before_valid_block() {
        // The stray opener borrows the later separator/end, then scanning
        // resumes after the first block's end marker.
        let content = "<<<<<<< stray\nx\n<<<<<<< HEAD\na\n=======\nb\n>>>>>>> f";
        let regions = parse_conflict_markers(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].start_line, 0);
        assert_eq!(regions[0].current_content, "x\n<<<<<<< HEAD\na");
    }

    #[test]
    fn test_malformed_block_after_valid_one() {
        let content = "<<<<<<< HEAD\na\n=======\nb\n>>>>>>> f\n<<<<<<< HEAD\nc\n";
        let regions = parse_conflict_markers(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].end_line, 4);
    }

    #[test]
    fn test_marker_labels_ignored() {
        let content = "<<<<<<< HEAD (local)\na\n======= \nb\n>>>>>>> 1a2b3c (incoming)";
        let regions = parse_conflict_markers(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].current_content, "a");
        assert_eq!(regions[0].incoming_content, "b");
    }
}
