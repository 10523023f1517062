//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for servicemap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Source file could not be parsed. Non-fatal during analysis: the file
    /// is logged and left out of the service totals.
    #[error("Parse error in {file}:{line}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// `create_plan` was called without an architecture analysis
    #[error("Planning precondition failed: {0}")]
    PlanningPrecondition(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A configured detection pattern does not compile
    #[error("Invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Glob pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a parse error with location
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_includes_location() {
        let err = Error::parse("svc/app.py", 7, "unexpected token");
        assert_eq!(err.to_string(), "Parse error in svc/app.py:7: unexpected token");
        assert!(err.is_parse());
    }

    #[test]
    fn test_context_wraps_message() {
        let result: Result<()> = Err(Error::PlanningPrecondition("no analysis".into()));
        let err = result.context("creating plan").unwrap_err();
        assert_eq!(
            err.to_string(),
            "creating plan: Planning precondition failed: no analysis"
        );
    }
}
