//! Structured error handling for strata
//!
//! Provides a unified error type with:
//! - Error codes for programmatic handling
//! - Structured error output (JSON-friendly)
//! - Context preservation through error chains
//!
//! # Error Categories
//!
//! - Rule definition (1xxx): ill-formed rules, recursion through negation
//! - Evaluation (2xxx): failures while running a prepared rule set
//! - Configuration (7xxx): config file and profile problems
//! - Internal (9xxx): broken engine invariants
//!
//! Expression failures are not represented here. They are `EvalError`s and
//! never leave the binding they occurred in.
//!
//! # Example
//!
//! ```rust,ignore
//! use strata::error::{StrataError, ErrorCode};
//!
//! fn check(var: &str, bound: bool) -> Result<(), StrataError> {
//!     if !bound {
//!         return Err(StrataError::not_well_formed("head uses an unbound variable")
//!             .with_context("variable", var));
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Rule definition errors (1xxx)
    /// A variable is used before it is bound, or assigned twice
    NotWellFormed = 1001,
    /// A dependency cycle passes through a negation
    IllegalRecursion = 1002,

    // Evaluation errors (2xxx)
    /// A stratum needed more rounds than configured
    RoundLimitExceeded = 2001,

    // Config errors (7xxx)
    /// Generic config error
    ConfigError = 7000,
    /// Config file not found
    ConfigNotFound = 7001,
    /// Invalid config syntax
    InvalidConfigSyntax = 7002,
    /// Unknown profile
    UnknownProfile = 7003,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
    /// A head template was instantiated with a variable left in it
    InternalConsistency = 9001,
    /// Stratification failed to settle within its bound
    StratumBoundExceeded = 9002,
}

/// Broad grouping of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    RuleDefinition,
    Evaluation,
    Config,
    Internal,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::NotWellFormed => "Rule is not well-formed",
            ErrorCode::IllegalRecursion => "Recursion through negation",

            ErrorCode::RoundLimitExceeded => "Round limit exceeded",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not found",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::UnknownProfile => "Unknown profile",

            ErrorCode::InternalError => "Internal error",
            ErrorCode::InternalConsistency => "Internal consistency failure",
            ErrorCode::StratumBoundExceeded => "Stratum bound exceeded",
        }
    }

    /// The category this code belongs to, derived from its numeric range
    pub fn category(&self) -> ErrorCategory {
        match self.code() / 1000 {
            1 => ErrorCategory::RuleDefinition,
            2 => ErrorCategory::Evaluation,
            7 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    /// Source location (file:line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for strata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrataError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StrataError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods
    // ========================================================================

    /// A rule that uses a variable before binding it, or binds one twice
    pub fn not_well_formed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotWellFormed, message)
    }

    /// A dependency cycle through a negative edge
    ///
    /// `path` lists the rules of the cycle in dependency order, starting and
    /// ending with the same rule.
    pub fn illegal_recursion(path: &[String]) -> Self {
        Self::new(
            ErrorCode::IllegalRecursion,
            "rule set is not stratifiable: dependency cycle through negation",
        )
        .with_context("path", path.join(" -> "))
        .with_hint("Break the cycle or move the negated pattern onto a predicate no rule in the cycle derives")
    }

    /// A head template that was still not concrete after substitution
    pub fn internal_consistency(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalConsistency, message)
    }

    /// Stratification failed to reach a fixpoint within its bound
    pub fn stratum_bound_exceeded(bound: usize) -> Self {
        Self::new(
            ErrorCode::StratumBoundExceeded,
            format!("stratification did not settle within {} iterations", bound),
        )
    }

    /// A stratum did not reach its fixpoint within the configured rounds
    pub fn round_limit_exceeded(stratum: usize, limit: usize) -> Self {
        Self::new(
            ErrorCode::RoundLimitExceeded,
            format!("stratum {} still deriving after {} rounds", stratum, limit),
        )
        .with_hint("Raise engine.max_rounds_per_stratum, or set it to 0 for no limit")
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    /// Add source location
    pub fn at(mut self, location: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.location = Some(location.into());
        self
    }

    /// Add a hint for resolving the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Look up a context field
    pub fn context_field(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.fields.get(key))
            .map(String::as_str)
    }

    /// Check if the error was caused by the rules or configuration supplied
    /// by the caller, rather than by the engine itself
    pub fn is_user_error(&self) -> bool {
        self.category() != ErrorCategory::Internal
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL_ERROR","message":"{}"}}"#, self.message)
        })
    }

    /// Convert to pretty JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

impl fmt::Display for StrataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if let Some(ref loc) = ctx.location {
                write!(f, " at {}", loc)?;
            }
            for (key, value) in &ctx.fields {
                write!(f, "\n  {}: {}", key, value)?;
            }
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for StrataError {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::ConfigNotFound,
            _ => ErrorCode::ConfigError,
        };
        StrataError::new(code, err.to_string())
    }
}

impl From<toml::de::Error> for StrataError {
    fn from(err: toml::de::Error) -> Self {
        StrataError::config(err.to_string()).with_code(ErrorCode::InvalidConfigSyntax)
    }
}

impl From<ConfigError> for StrataError {
    fn from(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::NotFound(..) => ErrorCode::ConfigNotFound,
            ConfigError::ParseError(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::UnknownProfile(_) => ErrorCode::UnknownProfile,
            _ => ErrorCode::ConfigError,
        };
        let err = StrataError::new(code, err.to_string());
        if code == ErrorCode::UnknownProfile {
            err.with_hint("Available profiles: default, strict, debug")
        } else {
            err
        }
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using StrataError
pub type StrataResult<T> = Result<T, StrataError>;

// ============================================================================
// Tests
// ============================================================================
