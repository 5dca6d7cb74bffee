use thiserror::Error;

/// Invalid configuration values. These are always detected before any point is processed, so a run
/// that fails with a `ConfigError` has produced no output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("eps must be a finite value greater than zero (got {0})")]
    InvalidEps(f64),
    #[error("min_points must be at least 1 (got {0})")]
    InvalidMinPoints(usize),
    #[error("the set of target classification codes must not be empty")]
    EmptyClassSet,
    #[error("'{0}' is not a valid classification code (expected an integer in 0..=255)")]
    UnknownClassCode(String),
    #[error("EPSG code must be greater than zero")]
    InvalidEpsg,
    #[error("search radius must be a finite value greater than zero (got {0})")]
    InvalidRadius(f64),
}
