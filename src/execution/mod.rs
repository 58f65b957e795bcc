//! Recipe execution.
//!
//! This module runs recipes against pixel buffers and reports progress.

pub mod executor;
pub mod progress;

pub use executor::{CookReport, Kitchen, SkippedStep};
pub use progress::{CancelToken, ProgressCallback, ProgressTracker, ProgressUpdate, SkipReason};
