//! Error types for the Contract Engine.
//!
//! The core calculations never fail: degenerate input degrades to a default
//! value. These errors cover the surrounding concerns, such as configuration
//! loading, strict parsing and validation of contract terms.

use thiserror::Error;

/// The main error type for the Contract Engine.
///
/// # Example
///
/// ```
/// use contract_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/contract.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/contract.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No settings exist for the requested document kind.
    #[error("Document kind not configured: {kind}")]
    DocumentNotConfigured {
        /// The document kind that has no settings.
        kind: String,
    },

    /// A contract term was invalid or inconsistent.
    #[error("Invalid contract term '{field}': {message}")]
    InvalidTerms {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A date range string could not be parsed.
    #[error("Invalid date range '{input}': {message}")]
    InvalidRange {
        /// The text that failed to parse.
        input: String,
        /// A description of the parse failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
