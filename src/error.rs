use thiserror::Error;

/// Result type for porting operations.
pub type Result<T> = std::result::Result<T, PortError>;

/// Everything that can make a generation call fail.
///
/// Every variant carries enough context for the caller to decide whether to
/// retry with another language or packaging mode, or to reject the model.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PortError {
    #[error("unrecognized model family '{family}'")]
    UnknownFamily { family: String },

    #[error("unrecognized target language '{key}'")]
    UnknownLanguage { key: String },

    #[error("unrecognized packaging mode '{mode}'")]
    UnknownMode { mode: String },

    #[error("unrecognized prediction method '{method}'")]
    UnknownMethod { method: String },

    #[error("packaging mode '{mode}' is not supported for {family} in language '{language}'")]
    UnsupportedMode {
        family: String,
        language: String,
        mode: String,
    },

    #[error("method '{method}' is not available for this {family} estimator")]
    UnsupportedMethod { family: String, method: String },

    #[error("language '{language}' has no template '{key}'")]
    MissingTemplate { language: String, key: String },

    #[error("template '{key}' of language '{language}' uses unbound placeholder '{placeholder}'")]
    UnboundPlaceholder {
        language: String,
        key: String,
        placeholder: String,
    },

    #[error("{family} estimator is not fitted: {reason}")]
    NotFitted { family: String, reason: String },

    #[error("malformed value at {path}: {reason}")]
    MalformedValue { path: String, reason: String },

    #[error("literal {value} cannot be represented in language '{language}': {reason}")]
    LiteralOverflow {
        language: String,
        value: String,
        reason: String,
    },
}

impl PortError {
    pub fn not_fitted(family: &str, reason: impl Into<String>) -> Self {
        PortError::NotFitted {
            family: family.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        PortError::MalformedValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short stable identifier of the error kind, used in CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            PortError::UnknownFamily { .. } => "unknown-family",
            PortError::UnknownLanguage { .. } => "unknown-language",
            PortError::UnknownMode { .. } => "unknown-mode",
            PortError::UnknownMethod { .. } => "unknown-method",
            PortError::UnsupportedMode { .. } => "unsupported-mode",
            PortError::UnsupportedMethod { .. } => "unsupported-method",
            PortError::MissingTemplate { .. } => "missing-template",
            PortError::UnboundPlaceholder { .. } => "unbound-placeholder",
            PortError::NotFitted { .. } => "not-fitted",
            PortError::MalformedValue { .. } => "malformed-value",
            PortError::LiteralOverflow { .. } => "literal-overflow",
        }
    }
}
