//! mergekit command-line tool.
//!
//! Drives the core engine against files on disk: list conflict blocks,
//! auto-resolve what the heuristics allow and write the result back, show
//! line diffs between two revisions, and generate / validate configuration.

mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mergekit_core::config::ResolverConfig;
use mergekit_core::conflict::{ConflictRegion, ConflictResolver, Resolution};
use mergekit_core::diff::{render_unified, DiffEngine};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// mergekit command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "mergekit",
    version,
    about = "Detect, auto-resolve and inspect merge conflicts"
)]
struct Cli {
    /// Path to a TOML resolver configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the conflict blocks in a file.
    Detect {
        /// File containing conflict markers.
        file: PathBuf,

        /// Print regions as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Auto-resolve conflict blocks in a file.
    Resolve {
        /// File containing conflict markers.
        file: PathBuf,

        /// Write the reassembled content back to the file.
        #[arg(short, long)]
        write: bool,

        /// Resolve whatever the heuristics leave with this side.
        #[arg(long, value_enum)]
        accept: Option<AcceptSide>,

        /// Print regions as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show line-level hunks between two files.
    Diff {
        /// Old revision.
        old: PathBuf,

        /// New revision.
        new: PathBuf,

        /// Print hunks as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./mergekit.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AcceptSide {
    Current,
    Incoming,
    Both,
}

impl From<AcceptSide> for Resolution {
    fn from(side: AcceptSide) -> Self {
        match side {
            AcceptSide::Current => Resolution::Current,
            AcceptSide::Incoming => Resolution::Incoming,
            AcceptSide::Both => Resolution::Both,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", style::error(&format!("Error: {:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Init { output } => cmd_init(&output).map(|_| ExitCode::SUCCESS),
        Commands::Validate => cmd_validate(cli.config.as_deref()).map(|_| ExitCode::SUCCESS),
        Commands::Diff { old, new, json } => cmd_diff(&old, &new, json).map(|_| ExitCode::SUCCESS),
        Commands::Detect { file, json } => {
            let resolver = build_resolver(cli.config.as_deref())?;
            cmd_detect(&resolver, &file, json).map(|_| ExitCode::SUCCESS)
        }
        Commands::Resolve {
            file,
            write,
            accept,
            json,
        } => {
            let resolver = build_resolver(cli.config.as_deref())?;
            let complete = cmd_resolve(&resolver, &file, write, accept, json)?;
            Ok(if complete {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn build_resolver(config_path: Option<&Path>) -> Result<ConflictResolver> {
    let config = match config_path {
        Some(path) => {
            ResolverConfig::load_and_validate(path).context("failed to load configuration file")?
        }
        None => {
            debug!("no configuration file given, using defaults");
            ResolverConfig::default()
        }
    };
    Ok(ConflictResolver::new(config))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    let default_config = r#"# mergekit resolver configuration
# Every value below is the default; delete what you do not change.

# Auto-resolution rules, applied in this fixed order. The first rule that
# decides a conflict wins. Set a rule to false to take it out of the chain.
[rules]
pure_addition = true
pure_deletion = true
identical = true
whitespace = true
three_way = true
imports = true
comments = true

# Base-aware rule: when both sides changed, accept both only if neither
# side's line count moved more than max_line_delta from the base and each
# still shares min_shared_ratio of the base's lines.
[three_way]
max_line_delta = 5
min_shared_ratio = 0.5

# Comment rule: keep the current side when lengths differ by at most this
# fraction, otherwise keep the longer side.
[comments]
length_tolerance = 0.1
"#;

    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, default_config).context("failed to write config file")?;

    println!(
        "{}",
        style::success(&format!("Default configuration written to {}", output.display()))
    );
    println!();
    println!("Next steps:");
    println!("  1. Edit the config file to tune the resolution rules");
    println!(
        "  2. Validate with: mergekit validate --config {}",
        output.display()
    );
    println!(
        "  3. Resolve a file: mergekit resolve --config {} <file>",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: Option<&Path>) -> Result<()> {
    let Some(config_path) = config_path else {
        anyhow::bail!("no configuration file given; pass --config <path>");
    };

    println!("Validating configuration: {}", config_path.display());
    println!();

    let config =
        ResolverConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    match config.validate() {
        Ok(()) => println!("  [OK] All values are in range"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    let chain = mergekit_core::conflict::RuleChain::from_config(&config.rules);
    let rules: Vec<String> = chain.rules().iter().map(|r| r.to_string()).collect();

    println!();
    println!("Configuration summary:");
    println!("  Enabled rules    : {}", rules.join(", "));
    println!("  Max line delta   : {}", config.three_way.max_line_delta);
    println!("  Min shared ratio : {}", config.three_way.min_shared_ratio);
    println!("  Comment tolerance: {}", config.comments.length_tolerance);
    println!();
    println!("{}", style::success("Configuration is valid."));

    Ok(())
}

fn cmd_detect(resolver: &ConflictResolver, file: &Path, json: bool) -> Result<()> {
    let content = read_file(file)?;
    let regions = resolver.detect_conflicts(&content);

    if json {
        println!("{}", serde_json::to_string_pretty(&regions)?);
        return Ok(());
    }

    if regions.is_empty() {
        println!("{}", style::success("No conflict markers found"));
        return Ok(());
    }

    println!(
        "{}",
        style::header(&format!("Conflicts in {} ({})", file.display(), regions.len()))
    );
    println!("{}", region_table(&regions));
    Ok(())
}

fn cmd_resolve(
    resolver: &ConflictResolver,
    file: &Path,
    write: bool,
    accept: Option<AcceptSide>,
    json: bool,
) -> Result<bool> {
    let content = read_file(file)?;
    let detected = resolver.detect_conflicts(&content);

    if detected.is_empty() {
        if !json {
            println!("{}", style::success("No conflict markers found"));
        } else {
            println!("[]");
        }
        return Ok(true);
    }

    let mut regions = resolver.resolve_non_conflicting_changes(&detected);

    if let Some(side) = accept {
        let resolution = Resolution::from(side);
        regions = regions
            .iter()
            .map(|r| {
                if ConflictResolver::is_conflict_resolved(r) {
                    Ok(r.clone())
                } else {
                    ConflictResolver::resolve_with(r, resolution)
                }
            })
            .collect::<Result<_, _>>()?;
    }

    let stats = ConflictResolver::conflict_stats(&regions);
    let readiness = ConflictResolver::can_complete_merge(&regions);
    info!(file = %file.display(), %stats, "resolution pass finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&regions)?);
    } else {
        println!(
            "{}",
            style::header(&format!("Conflicts in {} ({})", file.display(), regions.len()))
        );
        println!("{}", region_table(&regions));
        println!();
        println!("  {}", style::stats(&stats));
    }

    if write {
        // Re-read right before reassembly so a concurrent edit is not
        // silently overwritten.
        let latest = read_file(file)?;
        if latest != content {
            anyhow::bail!(
                "{} changed while resolving; re-run the command",
                file.display()
            );
        }
        let merged = ConflictResolver::apply_conflict_resolution(&latest, &regions);
        std::fs::write(file, merged)
            .with_context(|| format!("failed to write {}", file.display()))?;
        if !json {
            println!("  {}", style::success(&format!("Wrote {}", file.display())));
        }
    }

    if readiness.can_complete {
        if !json {
            println!("  {}", style::success("Ready to complete merge"));
        }
        Ok(true)
    } else {
        if !json {
            println!(
                "  {}",
                style::warn(&format!("Manual resolution needed: {}", readiness.reason))
            );
        }
        Ok(false)
    }
}

fn cmd_diff(old: &Path, new: &Path, json: bool) -> Result<()> {
    let old_content = read_file(old)?;
    let new_content = read_file(new)?;
    let hunks = DiffEngine::generate_hunks(&old_content, &new_content);

    if json {
        println!("{}", serde_json::to_string_pretty(&hunks)?);
        return Ok(());
    }

    if hunks.is_empty() {
        println!("{}", style::dim("Files are identical"));
        return Ok(());
    }

    println!("--- {}", old.display());
    println!("+++ {}", new.display());
    if console::Term::stdout().is_term() {
        for hunk in &hunks {
            print!("{}", style::hunk(hunk));
        }
    } else {
        print!("{}", render_unified(&hunks));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn region_table(regions: &[ConflictRegion]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Lines", "Current", "Incoming", "Status"]);

    for (idx, region) in regions.iter().enumerate() {
        let status = match region.effective_resolution() {
            Some(resolution) if region.auto_resolved => format!(
                "{} (auto: {})",
                resolution,
                region.auto_resolve_reason.as_deref().unwrap_or("-")
            ),
            Some(resolution) => resolution.to_string(),
            None => "unresolved".to_string(),
        };

        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(format!("{}-{}", region.start_line + 1, region.end_line + 1)),
            Cell::new(preview(&region.current_content, 40)),
            Cell::new(preview(&region.incoming_content, 40)),
            Cell::new(status),
        ]);
    }

    table
}

/// First non-blank line, truncated, with a count of the remaining lines.
fn preview(content: &str, max_len: usize) -> String {
    let total = content.lines().count();
    let first = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let first = truncate(first.trim(), max_len);
    if total > 1 {
        format!("{} (+{} lines)", first, total - 1)
    } else if first.is_empty() {
        "(empty)".to_string()
    } else {
        first
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer line of text", 10), "a longe...");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("", 10), "(empty)");
        assert_eq!(preview("one", 10), "one");
        assert_eq!(preview("\none\ntwo", 10), "one (+2 lines)");
    }

    #[test]
    fn test_cli_parses_resolve() {
        let cli = Cli::try_parse_from([
            "mergekit",
            "resolve",
            "src/lib.rs",
            "--write",
            "--accept",
            "incoming",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve { write, accept, .. } => {
                assert!(write);
                assert!(matches!(accept, Some(AcceptSide::Incoming)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "<<<<<<< HEAD\nx\n=======\nx\n>>>>>>> b\n").unwrap();

        let complete = cmd_resolve(&ConflictResolver::default(), &path, true, None, true).unwrap();
        assert!(complete);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn test_resolve_accept_fills_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.txt");
        std::fs::write(&path, "<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> b").unwrap();

        let complete = cmd_resolve(
            &ConflictResolver::default(),
            &path,
            true,
            Some(AcceptSide::Incoming),
            true,
        )
        .unwrap();
        assert!(complete);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "y");
    }

    #[test]
    fn test_resolve_unresolved_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.txt");
        let original = "<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> b";
        std::fs::write(&path, original).unwrap();

        let complete = cmd_resolve(&ConflictResolver::default(), &path, true, None, true).unwrap();
        assert!(!complete);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mergekit.toml");
        cmd_init(&path).unwrap();
        let written = ResolverConfig::load_and_validate(&path).unwrap();
        assert_eq!(written, ResolverConfig::default());
        assert!(cmd_init(&path).is_err());
    }
}
