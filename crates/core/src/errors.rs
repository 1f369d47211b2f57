//! Error types for the mergekit core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.
//!
//! Problems with the *shape* of conflicted text (unterminated markers,
//! regions nobody can auto-resolve) are not errors: they are reported in the
//! returned data. The errors here cover caller mistakes and configuration.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Conflict errors
// ---------------------------------------------------------------------------

/// Errors from explicit (caller-driven) conflict resolution requests.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// The caller asked for a region index that was not detected.
    #[error("conflict region {index} not found ({count} regions detected)")]
    RegionNotFound { index: usize, count: usize },

    /// The requested resolution cannot be applied this way.
    #[error("invalid resolution for conflict at line {line}: {detail}")]
    InvalidResolution { line: usize, detail: String },

    /// Base contents were supplied for a different number of regions.
    #[error("base content supplied for {bases} regions but {regions} were detected")]
    BaseCountMismatch { regions: usize, bases: usize },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ConflictError::RegionNotFound { index: 3, count: 2 };
        assert_eq!(
            err.to_string(),
            "conflict region 3 not found (2 regions detected)"
        );

        let err = ConflictError::BaseCountMismatch {
            regions: 2,
            bases: 1,
        };
        assert!(err.to_string().contains("1 regions"));

        let err = ConfigError::InvalidValue {
            field: "three_way.min_shared_ratio".into(),
            detail: "must be between 0 and 1".into(),
        };
        assert!(err.to_string().contains("min_shared_ratio"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let err: CoreError = ConfigError::FileNotFound("/tmp/x.toml".into()).into();
        assert!(matches!(err, CoreError::Config(_)));

        let err: CoreError = ConflictError::InvalidResolution {
            line: 0,
            detail: "manual".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}
