//! Recipe executor.
//!
//! A [`Kitchen`] owns everything a recipe needs besides the pixels: the
//! random source, the lossy codec and the configuration. Steps run strictly
//! in order on the caller's buffer. Unknown tokens are skipped with a
//! warning; a step without a usable parameter gets one drawn at random.

use crate::core::buffer::PixelBuffer;
use crate::core::config::CookConfig;
use crate::core::error::{CookError, CookResult, OperationResult};
use crate::execution::progress::{
    CancelToken, ProgressCallback, ProgressTracker, ProgressUpdate, SkipReason,
};
use crate::operations::{JpegCodec, LossyCodec, Operation, Params};
use crate::recipe::{self, Recipe, RecipeStep};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A recipe step that was not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    /// Position in the input recipe.
    pub index: usize,
    /// Token as it appeared.
    pub token: String,
}

/// Outcome of applying a recipe.
#[derive(Debug, Clone, Default)]
pub struct CookReport {
    /// Steps actually applied, with the parameters they ran with.
    pub effective: Recipe,
    /// Steps skipped because their token is not in the catalog.
    pub skipped: Vec<SkippedStep>,
    /// Wall time spent applying steps.
    pub duration: Duration,
}

impl CookReport {
    /// Number of applied steps.
    pub fn applied(&self) -> usize {
        self.effective.len()
    }

    /// Whether any step was skipped.
    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Applies recipes and single operations to pixel buffers.
pub struct Kitchen {
    config: CookConfig,
    rng: StdRng,
    codec: Box<dyn LossyCodec>,
    progress_callback: Option<Arc<ProgressCallback>>,
    cancel: CancelToken,
}

impl std::fmt::Debug for Kitchen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kitchen")
            .field("config", &self.config)
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Kitchen {
    /// Create a kitchen with the JPEG codec. Seeds from `config.seed` when set.
    pub fn new(config: CookConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Kitchen built with an invalid config: {e}");
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng,
            codec: Box::new(JpegCodec),
            progress_callback: None,
            cancel: CancelToken::new(),
        }
    }

    /// Replace the lossy codec used by `-quality`.
    pub fn with_codec(mut self, codec: impl LossyCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Replace the random source.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Receive progress events for every recipe run.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Share a cancellation flag, checked between steps.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &CookConfig {
        &self.config
    }

    /// The cancellation flag.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Mutable access to the random source.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Resolve and apply one operation; returns its canonical token with
    /// effective parameters, e.g. `-resize 37`.
    pub fn apply_operation(
        &mut self,
        buffer: &mut PixelBuffer,
        operation: Operation,
        parameter: Option<i64>,
    ) -> OperationResult<String> {
        let params = operation.resolve(parameter, None, &mut self.rng, &self.config);
        self.apply_params(buffer, &params)?;
        Ok(params.token())
    }

    /// Apply fully resolved parameters.
    pub fn apply_params(&mut self, buffer: &mut PixelBuffer, params: &Params) -> OperationResult<()> {
        params.apply(buffer, &mut self.rng, self.codec.as_ref())
    }

    /// Apply every step of `recipe` to `buffer` in order.
    ///
    /// An empty recipe leaves the buffer untouched. The first failing step
    /// aborts the run and leaves the buffer with the steps before it applied.
    pub fn apply(&mut self, buffer: &mut PixelBuffer, recipe: &Recipe) -> CookResult<CookReport> {
        let start = Instant::now();
        let mut tracker =
            ProgressTracker::new(recipe.len()).with_callback(self.progress_callback.clone());
        tracker.start();

        let mut report = CookReport::default();
        for (index, step) in recipe.iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::info!("Cooking cancelled before step {index}");
                tracker.cancelled();
                return Err(CookError::Cancelled {
                    completed: report.applied(),
                });
            }

            tracker.step_started(index, step.operation.token());
            let Some(params) = self.resolve_step(step) else {
                log::warn!("Skipping unknown operation '{}'", step.operation.token());
                tracker.step_skipped(index, step.operation.token(), SkipReason::UnknownOperation);
                report.skipped.push(SkippedStep {
                    index,
                    token: step.operation.token().to_string(),
                });
                continue;
            };

            let step_start = Instant::now();
            if let Err(e) = self.apply_params(buffer, &params) {
                log::error!("Step {index} ({params}) failed: {e}");
                tracker.report_error(index, e.to_string());
                return Err(e.into());
            }
            let elapsed = step_start.elapsed();
            log::debug!("Step {index}: {params} in {elapsed:?}");
            tracker.step_applied(index, params.token(), elapsed.as_millis() as u64);
            report.effective.push(params);
        }

        report.duration = start.elapsed();
        tracker.complete();
        Ok(report)
    }

    /// Draw a random recipe of `count` steps.
    pub fn generate_random(&mut self, count: usize) -> Recipe {
        recipe::generate_random(count, &mut self.rng, &self.config)
    }

    /// Draw a light recipe for real-time use.
    pub fn generate_light(&mut self) -> Recipe {
        recipe::generate_light(&mut self.rng, &self.config)
    }

    /// Generate `config.iterations` random steps and apply them.
    ///
    /// The returned report's `effective` recipe replays the cook.
    pub fn cook_random(&mut self, buffer: &mut PixelBuffer) -> CookResult<CookReport> {
        let recipe = self.generate_random(self.config.iterations);
        self.apply(buffer, &recipe)
    }

    fn resolve_step(&mut self, step: &RecipeStep) -> Option<Params> {
        let operation = step.known()?;
        Some(operation.resolve(step.parameter, step.offset, &mut self.rng, &self.config))
    }
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::new(CookConfig::default())
    }
}
