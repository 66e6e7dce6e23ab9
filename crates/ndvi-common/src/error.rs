//! Error types for the NDVI engine.

use thiserror::Error;

/// Result type alias using NdviError.
pub type NdviResult<T> = Result<T, NdviError>;

/// Primary error type for NDVI quality, caching and analytics operations.
#[derive(Debug, Error)]
pub enum NdviError {
    // === Contract Violations ===
    #[error("Invalid confidence weights: {0}")]
    InvalidWeights(String),

    #[error("Deviation undefined: historical mean is zero")]
    UndefinedDeviation,

    #[error("Invalid TTL for '{key}': must be greater than zero and at most 365 days")]
    InvalidTtl { key: String },

    #[error("Invalid configuration value for '{param}': {message}")]
    InvalidConfig { param: String, message: String },

    // === Cache Errors ===
    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl NdviError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            NdviError::InvalidWeights(_) => "INVALID_WEIGHTS",
            NdviError::UndefinedDeviation => "UNDEFINED_DEVIATION",
            NdviError::InvalidTtl { .. } => "INVALID_TTL",
            NdviError::InvalidConfig { .. } => "INVALID_CONFIG",
            NdviError::CacheError(_) => "CACHE_ERROR",
            NdviError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the error comes from caller input rather than infrastructure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            NdviError::InvalidWeights(_)
                | NdviError::UndefinedDeviation
                | NdviError::InvalidTtl { .. }
                | NdviError::InvalidConfig { .. }
        )
    }

    pub fn invalid_config(param: impl Into<String>, message: impl Into<String>) -> Self {
        NdviError::InvalidConfig {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for NdviError {
    fn from(err: serde_json::Error) -> Self {
        NdviError::Serialization(format!("JSON error: {}", err))
    }
}
