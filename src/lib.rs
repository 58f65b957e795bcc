//! # Cookery - Recipe-driven Image Degradation
//!
//! Cookery "cooks" images: it runs an ordered recipe of lossy, glitchy pixel
//! operations (saturation blowout, JPEG crunch, contrast, pixelation, edge
//! detection, noise, normalization) over a buffer. Recipes are plain text,
//! can be generated at random and replay the same transformation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cookery::prelude::*;
//!
//! let mut kitchen = Kitchen::new(CookConfig::default().with_seed(7));
//! let mut buffer = cookery::io::load_image("input.png", 800)?;
//!
//! let recipe = Recipe::parse("-modulate 300 10\n-resize 40\n-quality 12\n");
//! let report = kitchen.apply(&mut buffer, &recipe)?;
//! println!("{}", report.effective);
//!
//! cookery::io::export_jpeg(&buffer, "output.jpg", 92)?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: pixel buffer, errors, configuration, workspace retargeting
//! - [`operations`]: the operation catalog and its pixel math
//! - [`recipe`]: recipe text format and random generation
//! - [`execution`]: the recipe executor and progress reporting
//! - [`realtime`]: per-frame cooking state machine
//! - [`io`]: ingestion and JPEG export

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod io;
pub mod operations;
pub mod realtime;
pub mod recipe;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use cookery::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use crate::core::buffer::PixelBuffer;
    pub use crate::core::config::CookConfig;
    pub use crate::core::context::{Retarget, Workspace};
    pub use crate::core::error::{
        BufferError, ConfigError, CookError, CookResult, OperationError, PipelineError,
    };

    // Operations
    pub use crate::operations::{
        Category, JpegCodec, LossyCodec, Operation, OperationCatalog, OperationInfo, Params,
    };

    // Recipes
    pub use crate::recipe::{Recipe, RecipeStep, StepOperation};

    // Execution
    pub use crate::execution::{CancelToken, CookReport, Kitchen, ProgressUpdate, SkipReason};

    // Real-time
    pub use crate::realtime::{
        BufferSink, FrameSink, FrameSource, PipelineState, RealtimePipeline, RecipeRegister,
        StillFrameSource, StopReason, TickOutcome,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
