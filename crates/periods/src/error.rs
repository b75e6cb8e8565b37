//! Error types for period loading and evaluation.

/// Errors that can occur while loading or evaluating time periods.
#[derive(Debug, thiserror::Error)]
pub enum PeriodError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Period validation error (e.g. empty name, duplicate names).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed `HH:MM-HH:MM` range.
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    /// A period excludes a name that is not defined.
    #[error("period '{period}' excludes unknown period '{excluded}'")]
    UnknownExclude { period: String, excluded: String },

    /// Exclusion chain too deep, usually a cycle.
    #[error("exclusion chain too deep while evaluating period '{period}'")]
    ExcludeDepth { period: String },

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for period operations.
pub type Result<T> = std::result::Result<T, PeriodError>;
