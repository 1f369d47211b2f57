//! TOML-based configuration for the conflict resolver.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock heuristic pipeline. The config only tunes the heuristics; it never
//! changes the order in which the rules run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level resolver configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Which auto-resolution rules take part in the chain.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Tuning for the base-aware (three-way) rule.
    #[serde(default)]
    pub three_way: ThreeWayConfig,

    /// Tuning for the comment-block rule.
    #[serde(default)]
    pub comments: CommentConfig,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Enable / disable switches for each rule in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_true")]
    pub pure_addition: bool,
    #[serde(default = "default_true")]
    pub pure_deletion: bool,
    #[serde(default = "default_true")]
    pub identical: bool,
    #[serde(default = "default_true")]
    pub whitespace: bool,
    #[serde(default = "default_true")]
    pub three_way: bool,
    #[serde(default = "default_true")]
    pub imports: bool,
    #[serde(default = "default_true")]
    pub comments: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            pure_addition: true,
            pure_deletion: true,
            identical: true,
            whitespace: true,
            three_way: true,
            imports: true,
            comments: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Three-way
// ---------------------------------------------------------------------------

/// Thresholds for the "non-overlapping changes" gate of the three-way rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeWayConfig {
    /// Maximum difference in line count between either side and the base.
    #[serde(default = "default_max_line_delta")]
    pub max_line_delta: usize,

    /// Fraction of the base's line count each side must still share with it.
    #[serde(default = "default_min_shared_ratio")]
    pub min_shared_ratio: f64,
}

fn default_max_line_delta() -> usize {
    5
}
fn default_min_shared_ratio() -> f64 {
    0.5
}

impl Default for ThreeWayConfig {
    fn default() -> Self {
        Self {
            max_line_delta: default_max_line_delta(),
            min_shared_ratio: default_min_shared_ratio(),
        }
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Tuning for the comment-block rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Relative length difference under which the current side is kept.
    #[serde(default = "default_length_tolerance")]
    pub length_tolerance: f64,
}

fn default_length_tolerance() -> f64 {
    0.1
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            length_tolerance: default_length_tolerance(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl ResolverConfig {
    /// Load a [`ResolverConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading resolver configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: ResolverConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!(?config, "configuration parsed successfully");
        Ok(config)
    }

    /// Validate that all values are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.three_way.min_shared_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::InvalidValue {
                field: "three_way.min_shared_ratio".into(),
                detail: format!("must be between 0 and 1, got {}", ratio),
            });
        }

        let tolerance = self.comments.length_tolerance;
        if !(0.0..1.0).contains(&tolerance) {
            return Err(ConfigError::InvalidValue {
                field: "comments.length_tolerance".into(),
                detail: format!("must be at least 0 and below 1, got {}", tolerance),
            });
        }

        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[rules]
imports = false
comments = true

[three_way]
max_line_delta = 2
min_shared_ratio = 0.75

[comments]
length_tolerance = 0.2
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: ResolverConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert!(!config.rules.imports);
        assert!(config.rules.pure_addition);
        assert_eq!(config.three_way.max_line_delta, 2);
        assert_eq!(config.three_way.min_shared_ratio, 0.75);
        assert_eq!(config.comments.length_tolerance, 0.2);
    }

    #[test]
    fn test_defaults() {
        let config: ResolverConfig = toml::from_str("").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.three_way.max_line_delta, 5);
        assert_eq!(config.three_way.min_shared_ratio, 0.5);
        assert_eq!(config.comments.length_tolerance, 0.1);
        assert!(config.rules.whitespace);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mergekit.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = ResolverConfig::load_and_validate(&path).expect("load failed");
        assert_eq!(config.three_way.max_line_delta, 2);
    }

    #[test]
    fn test_file_not_found() {
        let result = ResolverConfig::load_from_file("/nonexistent/mergekit.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[three_way]\nmax_line_delta = \"five\"\n").unwrap();

        let result = ResolverConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = ResolverConfig::default();
        config.three_way.min_shared_ratio = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "three_way.min_shared_ratio"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let mut config = ResolverConfig::default();
        config.comments.length_tolerance = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "comments.length_tolerance"
        ));
    }
}
