use thiserror::Error;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging.
///
/// Action-level failures (malformed arguments, unknown action, unknown collection)
/// are not errors at this level: they travel inside an `ActionResult`.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("{provider} credential missing: set {env_var}")]
    MissingCredential { provider: String, env_var: String },

    #[error("Unknown LLM provider '{name}' (expected one of: {expected})")]
    UnknownProvider { name: String, expected: String },

    #[error("Invalid value '{value}' for setting {key}")]
    InvalidSetting { key: String, value: String },

    #[error("Failed to build {provider} client: {message}")]
    ProviderBuild { provider: String, message: String },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Field '{field_name}' exceeds max length of {max_length} (actual: {actual_length})")]
    FieldTooLong { field_name: String, max_length: usize, actual_length: usize },

    // ── Conversation errors ──────────────────────────────────────────────────
    #[error("A reply is still in progress, wait for it to finish")]
    TurnInProgress,

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn invalid_setting(key: impl Into<String>, value: impl Into<String>) -> Self {
        AppError::InvalidSetting { key: key.into(), value: value.into() }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AppError::MissingCredential { .. }
                | AppError::UnknownProvider { .. }
                | AppError::InvalidSetting { .. }
                | AppError::ProviderBuild { .. }
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::EmptyField { .. } | AppError::FieldTooLong { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, AppError::TurnInProgress)
    }
}
