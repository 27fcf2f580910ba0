//! Error handling for fartgen
//!
//! Every failure a render can meet is classified here. The orchestrator uses
//! `kind()` for error events and `is_recoverable()` to decide whether a caller
//! may try again.

use thiserror::Error;

/// Result type alias for fartgen operations
pub type Result<T> = std::result::Result<T, FartgenError>;

/// Main error type for fartgen operations
#[derive(Error, Debug)]
pub enum FartgenError {
    // Request Errors
    #[error("Invalid parameter '{field}': got {value}, expected {expected}")]
    Validation {
        field: String,
        value: String,
        expected: String,
    },

    // Asset Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("No sample assets registered for category '{category}'")]
    MissingAsset { category: String },

    // Processing Errors
    #[error("Transform produced invalid audio (NaN/Inf) during {step}")]
    TransformInstability { step: String },

    #[error("Render exceeded its {budget_ms}ms budget after {stage} ({elapsed_ms}ms elapsed)")]
    Timeout {
        stage: String,
        elapsed_ms: u64,
        budget_ms: u64,
    },

    #[error("Render cancelled after {stage}")]
    Cancelled { stage: String },

    // Collaborator Errors
    #[error("Encoding failed: {reason}")]
    Encode { reason: String },

    #[error("Upload failed: {reason}")]
    Upload { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FartgenError {
    /// Shorthand for a parameter validation failure
    pub fn validation(
        field: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        FartgenError::Validation {
            field: field.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FartgenError::Validation { .. } => "VALIDATION_ERROR",
            FartgenError::FileNotFound { .. } => "FILE_NOT_FOUND",
            FartgenError::InvalidAudio { .. } => "INVALID_AUDIO",
            FartgenError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            FartgenError::MissingAsset { .. } => "MISSING_ASSET",
            FartgenError::TransformInstability { .. } => "TRANSFORM_INSTABILITY",
            FartgenError::Timeout { .. } => "TIMEOUT",
            FartgenError::Cancelled { .. } => "CANCELLED",
            FartgenError::Encode { .. } => "ENCODE_ERROR",
            FartgenError::Upload { .. } => "UPLOAD_ERROR",
            FartgenError::Config { .. } => "CONFIG_ERROR",
            FartgenError::Io(_) => "IO_ERROR",
            FartgenError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Error kind as reported in `{stage: "error"}` progress events
    pub fn kind(&self) -> &'static str {
        match self {
            FartgenError::Validation { .. } => "validation",
            FartgenError::FileNotFound { .. }
            | FartgenError::InvalidAudio { .. }
            | FartgenError::UnsupportedFormat { .. } => "load",
            FartgenError::MissingAsset { .. } => "missing_asset",
            FartgenError::TransformInstability { .. } => "transform_instability",
            FartgenError::Timeout { .. } => "timeout",
            FartgenError::Cancelled { .. } => "cancelled",
            FartgenError::Encode { .. } => "encode",
            FartgenError::Upload { .. } => "upload",
            FartgenError::Config { .. } => "config",
            FartgenError::Io(_) => "io",
            FartgenError::Serialization(_) => "serialization",
        }
    }

    /// Check if the caller may retry the request that produced this error
    ///
    /// Validation and missing-asset failures are final: retrying the same
    /// request against the same store cannot succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FartgenError::TransformInstability { .. }
                | FartgenError::Encode { .. }
                | FartgenError::Upload { .. }
                | FartgenError::Io(_)
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            FartgenError::Validation { .. } => vec![
                "Check the parameter against its documented range",
                "Ranges: duration 0.5-10.0s, wetness 0-10, pitch 0-10, reverb/distortion 0.0-1.0",
            ],
            FartgenError::FileNotFound { .. } => vec![
                "Check the sample library path is correct",
                "Verify the configured sample files haven't been moved",
            ],
            FartgenError::InvalidAudio { .. } | FartgenError::UnsupportedFormat { .. } => vec![
                "Re-export the sample as 16/24-bit PCM or 32-bit float WAV",
                "Only mono and stereo samples are supported",
            ],
            FartgenError::MissingAsset { .. } => vec![
                "Add at least one WAV file to every preset category directory",
                "Categories: squeaker, rumbler, stutterer, classic, wet",
            ],
            FartgenError::TransformInstability { .. } => vec![
                "Try again with a different seed",
                "The render degrades to the untransformed sample when retries fail",
            ],
            FartgenError::Timeout { .. } => vec![
                "Raise render_timeout_secs in the engine configuration",
                "Request a shorter duration or a lower sample rate",
            ],
            FartgenError::Encode { .. } | FartgenError::Upload { .. } => vec![
                "Retry the export; the rendered waveform is unaffected",
                "Check the output directory is writable",
            ],
            _ => vec![],
        }
    }
}
