//! Core types for the Cookery pipeline.
//!
//! This module contains the foundational pieces every other module builds on:
//! - The RGBA pixel buffer
//! - Error types
//! - Configuration
//! - The active-buffer workspace and its retargeting guard

pub mod buffer;
pub mod config;
pub mod context;
pub mod error;

// Re-export commonly used types
pub use buffer::{PixelBuffer, CHANNELS};
pub use config::CookConfig;
pub use context::{Retarget, Workspace};
pub use error::{
    BufferError, ConfigError, CookError, CookResult, OperationError, OperationResult,
    PipelineError, PipelineResult,
};
