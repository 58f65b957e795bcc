//! Error types for Cookery.
//!
//! Uses thiserror for structured errors with context. The split follows the
//! failure taxonomy of the cooking pipeline:
//! - Buffer errors are programmer/caller mistakes (bad dimensions, bad indices)
//! - Operation errors come from the lossy codec collaborator
//! - Pipeline errors are entry-point failures of the real-time loop
//!
//! Unknown recipe tokens and malformed parameters are *not* errors; they are
//! reported through logs and [`CookReport`](crate::execution::CookReport).

use thiserror::Error;

/// Top-level error type for Cookery.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum CookError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cooking cancelled after {completed} step(s)")]
    Cancelled { completed: usize },

    #[error("{0}")]
    Other(String),
}

/// Errors raised by [`PixelBuffer`](crate::core::PixelBuffer) construction and access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Buffer dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("Raw pixel length mismatch: expected {expected} bytes, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Pixel ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Errors from applying a single operation.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Lossy encode failed at quality {quality}: {error}")]
    Encode { quality: u8, error: String },

    #[error("Lossy decode failed: {0}")]
    Decode(String),

    #[error("Codec returned {got_width}x{got_height}, expected {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Errors from the real-time frame pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Errors loading or validating a [`CookConfig`](crate::core::CookConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {error}")]
    Read { path: String, error: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl OperationError {
    /// Check if this error came from the lossy codec collaborator.
    pub fn is_codec_failure(&self) -> bool {
        matches!(
            self,
            OperationError::Encode { .. }
                | OperationError::Decode(_)
                | OperationError::DimensionMismatch { .. }
        )
    }
}

impl PipelineError {
    /// Check if this error prevents the pipeline from ever becoming active.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::SourceUnavailable(_))
    }
}

/// Result type alias for Cookery operations.
pub type CookResult<T> = Result<T, CookError>;

/// Result type alias for single-operation application.
pub type OperationResult<T> = Result<T, OperationError>;

/// Result type alias for real-time pipeline transitions.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_error_display() {
        let error = BufferError::OutOfBounds {
            x: 10,
            y: 2,
            width: 4,
            height: 4,
        };
        assert_eq!(error.to_string(), "Pixel (10, 2) is outside a 4x4 buffer");
    }

    #[test]
    fn test_codec_failure_classification() {
        assert!(OperationError::Decode("truncated".to_string()).is_codec_failure());
        let buffer = OperationError::Buffer(BufferError::ZeroDimension { width: 0, height: 1 });
        assert!(!buffer.is_codec_failure());
    }

    #[test]
    fn test_conversion_into_cook_error() {
        let error: CookError = PipelineError::SourceUnavailable("camera denied".to_string()).into();
        assert!(matches!(error, CookError::Pipeline(ref e) if e.is_fatal()));
        assert!(error.to_string().contains("camera denied"));
    }
}
