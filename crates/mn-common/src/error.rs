//! Error types for the multinomial workspace.
//!
//! Every failure carries:
//! - a stable error code for machine parsing
//! - a category for grouping
//! - a message naming the violated constraint
//!
//! Errors serialize to structured JSON through [`StructuredError`]:
//! ```json
//! {
//!   "code": 30,
//!   "category": "sample",
//!   "message": "counts do not sum to n",
//!   "context": { "constraint": "sum_mismatch" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for multinomial operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Construction-time parameterization and config file errors.
    Config,
    /// Distribution parameters outside their support.
    Parameter,
    /// Count samples outside the distribution's support.
    Sample,
    /// Statistics that are undefined for some batch element.
    Statistic,
    /// Incompatible or malformed array shapes.
    Shape,
    /// File I/O and deserialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Parameter => write!(f, "parameter"),
            ErrorCategory::Sample => write!(f, "sample"),
            ErrorCategory::Statistic => write!(f, "statistic"),
            ErrorCategory::Shape => write!(f, "shape"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Which constraint a count sample violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleConstraint {
    /// Some count is below zero.
    Negative,
    /// Counts along the class axis do not add up to `n`.
    SumMismatch,
    /// Some count is not integer-valued.
    NonInteger,
}

impl std::fmt::Display for SampleConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleConstraint::Negative => write!(f, "counts has negative components"),
            SampleConstraint::SumMismatch => write!(f, "counts do not sum to n"),
            SampleConstraint::NonInteger => write!(f, "counts have non-integer components"),
        }
    }
}

/// Unified error type.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid config file {}: {message}", path.display())]
    ConfigFile { path: PathBuf, message: String },

    // Parameter errors (20-29)
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    // Sample errors (30-39)
    #[error("invalid sample: {0}")]
    SampleConstraint(SampleConstraint),

    // Statistic errors (40-49)
    #[error("{statistic} is undefined for batch member {batch_index}")]
    UndefinedStatistic {
        statistic: &'static str,
        batch_index: usize,
    },

    // Shape errors (50-59)
    #[error("shape error: {0}")]
    Shape(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Parameter errors
    /// - 30-39: Sample errors
    /// - 40-49: Statistic errors
    /// - 50-59: Shape errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Configuration(_) => 10,
            Error::ConfigFile { .. } => 11,
            Error::InvalidParameter { .. } => 20,
            Error::SampleConstraint(_) => 30,
            Error::UndefinedStatistic { .. } => 40,
            Error::Shape(_) => 50,
            Error::Io(_) => 60,
            Error::Toml(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration(_) | Error::ConfigFile { .. } => ErrorCategory::Config,
            Error::InvalidParameter { .. } => ErrorCategory::Parameter,
            Error::SampleConstraint(_) => ErrorCategory::Sample,
            Error::UndefinedStatistic { .. } => ErrorCategory::Statistic,
            Error::Shape(_) => ErrorCategory::Shape,
            Error::Io(_) | Error::Toml(_) => ErrorCategory::Io,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "Configuration Error",
            Error::ConfigFile { .. } => "Invalid Config File",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::SampleConstraint(_) => "Sample Constraint Violated",
            Error::UndefinedStatistic { .. } => "Undefined Statistic",
            Error::Shape(_) => "Shape Mismatch",
            Error::Io(_) => "I/O Error",
            Error::Toml(_) => "TOML Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Additional structured context (parameter name, batch index, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ConfigFile { path, .. } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::InvalidParameter { name, .. } => {
                context.insert("parameter".to_string(), serde_json::json!(name));
            }
            Error::SampleConstraint(constraint) => {
                context.insert("constraint".to_string(), serde_json::json!(constraint));
            }
            Error::UndefinedStatistic {
                statistic,
                batch_index,
            } => {
                context.insert("statistic".to_string(), serde_json::json!(statistic));
                context.insert("batch_index".to_string(), serde_json::json!(batch_index));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Configuration("both".into()).code(), 10);
        assert_eq!(Error::invalid_parameter("n", "negative").code(), 20);
        assert_eq!(Error::SampleConstraint(SampleConstraint::Negative).code(), 30);
        assert_eq!(Error::Shape("mismatch".into()).code(), 50);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::Configuration("test".into()).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::SampleConstraint(SampleConstraint::SumMismatch).category(),
            ErrorCategory::Sample
        );
        assert_eq!(
            Error::UndefinedStatistic {
                statistic: "mean",
                batch_index: 0
            }
            .category(),
            ErrorCategory::Statistic
        );
    }

    #[test]
    fn test_messages_name_the_constraint() {
        let err = Error::SampleConstraint(SampleConstraint::SumMismatch);
        assert!(err.to_string().contains("counts do not sum to n"));

        let err = Error::invalid_parameter("n", "n has negative components");
        assert!(err.to_string().contains("n has negative components"));

        let err = Error::UndefinedStatistic {
            statistic: "variance",
            batch_index: 3,
        };
        assert_eq!(err.to_string(), "variance is undefined for batch member 3");
    }

    #[test]
    fn test_structured_error_from_error() {
        let err = Error::SampleConstraint(SampleConstraint::NonInteger);
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 30);
        assert_eq!(structured.category, ErrorCategory::Sample);
        assert_eq!(
            structured.context.get("constraint"),
            Some(&serde_json::json!("non_integer"))
        );
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::UndefinedStatistic {
            statistic: "mean",
            batch_index: 2,
        };
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":40"#));
        assert!(json.contains(r#""category":"statistic""#));
        assert!(json.contains(r#""batch_index":2"#));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Config.to_string(), "config");
        assert_eq!(ErrorCategory::Sample.to_string(), "sample");
    }
}
