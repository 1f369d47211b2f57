//! Terminal styling for mergekit output.

use console::Style;

use mergekit_core::conflict::ConflictStats;
use mergekit_core::diff::{DiffHunk, LineKind};

/// Green checkmark prefix.
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Red cross prefix.
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Yellow warning prefix.
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// Resolution summary with resolved counts in green and the unresolved
/// count in yellow when non-zero.
pub fn stats(stats: &ConflictStats) -> String {
    let resolved = Style::new().green().apply_to(format!(
        "{} resolved ({} auto, {} manual)",
        stats.resolved, stats.auto_resolved, stats.manually_resolved
    ));
    let unresolved_style = if stats.unresolved > 0 {
        Style::new().yellow().bold()
    } else {
        Style::new().dim()
    };
    let unresolved = unresolved_style.apply_to(format!("{} unresolved", stats.unresolved));
    format!("{} total, {}, {}", stats.total, resolved, unresolved)
}

/// One hunk in unified form: cyan header, red removals, green additions.
pub fn hunk(hunk: &DiffHunk) -> String {
    let mut out = Style::new().cyan().apply_to(hunk.header()).to_string();
    out.push('\n');
    for line in &hunk.lines {
        let text = format!("{}{}", line.kind.prefix(), line.content);
        let styled = match line.kind {
            LineKind::Added => Style::new().green().apply_to(text).to_string(),
            LineKind::Removed => Style::new().red().apply_to(text).to_string(),
            LineKind::Unchanged => text,
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}
