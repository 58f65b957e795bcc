//! Real-time frame pipeline.
//!
//! ```text
//! Idle --start--> Active --pause--> Paused
//!   ^               |  ^--resume------'
//!   '----stop-------'  (also on cancel, surface loss or source loss)
//! ```
//!
//! The caller drives the loop by calling [`RealtimePipeline::tick`] once per
//! display refresh. Each tick captures a frame into a scratch buffer, reads
//! the recipe register afresh, cooks the scratch buffer through a retargeted
//! [`Workspace`] and letterboxes the result into the sink's viewport. A
//! failing recipe never kills the loop: the raw frame gets a fixed contrast
//! boost instead.

mod register;
mod source;

pub use crate::execution::CancelToken;
pub use register::RecipeRegister;
pub use source::{BufferSink, FrameSink, FrameSource, StillFrameSource};

use crate::core::buffer::PixelBuffer;
use crate::core::context::Workspace;
use crate::core::error::{CookError, PipelineError, PipelineResult};
use crate::execution::Kitchen;
use crate::operations::{letterbox, Operation};

/// Lifecycle state of a [`RealtimePipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// No source held, no frames produced.
    Idle,
    /// Producing a frame on every tick.
    Active,
    /// Source held, ticks do nothing.
    Paused,
}

impl PipelineState {
    /// Lowercase name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Active => "active",
            PipelineState::Paused => "paused",
        }
    }
}

/// Why the pipeline returned to idle on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancel token was set.
    Cancelled,
    /// The sink reported no viewport.
    SurfaceLost,
    /// The source failed to deliver a frame.
    SourceLost,
}

/// Result of one [`RealtimePipeline::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was presented.
    Presented {
        /// Recipe steps applied to the frame.
        applied: usize,
        /// The recipe failed and the fallback contrast was used.
        fallback: bool,
    },
    /// Nothing to do in the current state.
    Idle,
    /// Paused; nothing was captured.
    Paused,
    /// The pipeline stopped itself during this tick.
    Stopped(StopReason),
}

/// Frame counters since the last start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames handed to the sink.
    pub frames_presented: u64,
    /// Frames that fell back to plain contrast.
    pub fallback_frames: u64,
}

/// Drives a [`FrameSource`] through recipes into a [`FrameSink`].
pub struct RealtimePipeline<S: FrameSource, K: FrameSink> {
    source: S,
    sink: K,
    kitchen: Kitchen,
    register: RecipeRegister,
    cancel: CancelToken,
    state: PipelineState,
    scratch: Option<PixelBuffer>,
    stats: PipelineStats,
}

impl<S: FrameSource, K: FrameSink> RealtimePipeline<S, K> {
    /// Build an idle pipeline. The kitchen's cancel token becomes the pipeline's.
    pub fn new(source: S, sink: K, kitchen: Kitchen) -> Self {
        let cancel = kitchen.cancel_token().clone();
        Self {
            source,
            sink,
            kitchen,
            register: RecipeRegister::new(),
            cancel,
            state: PipelineState::Idle,
            scratch: None,
            stats: PipelineStats::default(),
        }
    }

    /// Use an existing register, typically shared with an editor.
    pub fn with_register(mut self, register: RecipeRegister) -> Self {
        self.register = register;
        self
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Handle to the recipe register.
    pub fn register(&self) -> &RecipeRegister {
        &self.register
    }

    /// Handle to the cancel token.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Frame counters.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// The frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The display sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Mutable access to the display sink.
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// `Idle -> Active`. Opens the source and seeds an empty register with a
    /// light recipe. A source failure leaves the pipeline idle.
    pub fn start(&mut self) -> PipelineResult<()> {
        self.expect_state("start", PipelineState::Idle)?;
        self.source.open()?;

        if self.register.is_blank() {
            let recipe = self.kitchen.generate_light();
            log::info!("Seeded live recipe with {} light step(s)", recipe.len());
            self.register.set_recipe(&recipe);
        }

        self.cancel.reset();
        self.stats = PipelineStats::default();
        self.state = PipelineState::Active;
        log::info!("Real-time pipeline started");
        Ok(())
    }

    /// `Active -> Paused`.
    pub fn pause(&mut self) -> PipelineResult<()> {
        self.expect_state("pause", PipelineState::Active)?;
        self.state = PipelineState::Paused;
        Ok(())
    }

    /// `Paused -> Active`.
    pub fn resume(&mut self) -> PipelineResult<()> {
        self.expect_state("resume", PipelineState::Paused)?;
        self.state = PipelineState::Active;
        Ok(())
    }

    /// Return to idle and release the source. Stopping an idle pipeline is a no-op.
    pub fn stop(&mut self) {
        if self.state == PipelineState::Idle {
            return;
        }
        self.source.close();
        self.scratch = None;
        self.state = PipelineState::Idle;
        log::info!(
            "Real-time pipeline stopped after {} frame(s)",
            self.stats.frames_presented
        );
    }

    /// Produce one frame if active.
    ///
    /// `workspace` keeps its canvas; the frame is cooked in a scratch buffer
    /// swapped in for the duration of the recipe.
    pub fn tick(&mut self, workspace: &mut Workspace) -> PipelineResult<TickOutcome> {
        let state = self.state;
        match state {
            PipelineState::Idle => return Ok(TickOutcome::Idle),
            _ if self.cancel.is_cancelled() => return Ok(self.halt(StopReason::Cancelled)),
            PipelineState::Paused => return Ok(TickOutcome::Paused),
            PipelineState::Active => {}
        }

        let viewport = match self.sink.viewport() {
            Some((w, h)) if w > 0 && h > 0 => (w, h),
            _ => return Ok(self.halt(StopReason::SurfaceLost)),
        };
        let Some((width, height)) = self.source.frame_size() else {
            return Ok(self.halt(StopReason::SourceLost));
        };

        let mut scratch = match self.scratch.take() {
            Some(buffer) if buffer.dimensions() == (width, height) => buffer,
            _ => match PixelBuffer::new(width, height) {
                Ok(buffer) => buffer,
                Err(e) => {
                    log::warn!("Frame source reported an unusable size: {e}");
                    return Ok(self.halt(StopReason::SourceLost));
                }
            },
        };
        if let Err(e) = self.source.capture(&mut scratch) {
            log::warn!("Frame capture failed: {e}");
            return Ok(self.halt(StopReason::SourceLost));
        }
        let raw = scratch.clone();

        let recipe = self.register.recipe();
        let result = workspace.retarget(&mut scratch).cook(&recipe, &mut self.kitchen);

        let outcome = match result {
            Ok(report) => TickOutcome::Presented {
                applied: report.applied(),
                fallback: false,
            },
            Err(CookError::Cancelled { .. }) => {
                self.scratch = Some(scratch);
                return Ok(self.halt(StopReason::Cancelled));
            }
            Err(e) => {
                log::warn!("Recipe failed on live frame, using fallback contrast: {e}");
                scratch = raw;
                let value = self.kitchen.config().fallback_contrast;
                if let Err(e) =
                    self.kitchen
                        .apply_operation(&mut scratch, Operation::Contrast, Some(value))
                {
                    log::warn!("Fallback contrast failed: {e}");
                }
                self.stats.fallback_frames += 1;
                TickOutcome::Presented {
                    applied: 0,
                    fallback: true,
                }
            }
        };

        let framed = letterbox(&scratch, viewport, self.kitchen.config().background)?;
        self.scratch = Some(scratch);
        if let Err(e) = self.sink.present(&framed) {
            log::warn!("Presenting frame failed: {e}");
            return Ok(self.halt(StopReason::SurfaceLost));
        }
        self.stats.frames_presented += 1;
        Ok(outcome)
    }

    fn halt(&mut self, reason: StopReason) -> TickOutcome {
        log::info!("Stopping real-time pipeline: {reason:?}");
        self.stop();
        TickOutcome::Stopped(reason)
    }

    fn expect_state(&self, action: &'static str, expected: PipelineState) -> PipelineResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PipelineError::InvalidTransition {
                action,
                state: self.state.name(),
            })
        }
    }
}

impl<S: FrameSource, K: FrameSink> Drop for RealtimePipeline<S, K> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CookConfig;
    use crate::core::error::{OperationError, OperationResult};
    use crate::operations::LossyCodec;

    struct IdentityCodec;

    impl LossyCodec for IdentityCodec {
        fn round_trip(&self, buffer: &PixelBuffer, _quality: f64) -> OperationResult<PixelBuffer> {
            Ok(buffer.clone())
        }
    }

    struct FailingCodec;

    impl LossyCodec for FailingCodec {
        fn round_trip(&self, _buffer: &PixelBuffer, _quality: f64) -> OperationResult<PixelBuffer> {
            Err(OperationError::Encode {
                quality: 1,
                error: "encoder unavailable".to_string(),
            })
        }
    }

    struct DeniedSource;

    impl FrameSource for DeniedSource {
        fn open(&mut self) -> PipelineResult<()> {
            Err(PipelineError::SourceUnavailable("permission denied".to_string()))
        }

        fn frame_size(&self) -> Option<(u32, u32)> {
            None
        }

        fn capture(&mut self, _frame: &mut PixelBuffer) -> PipelineResult<()> {
            unreachable!("never opened")
        }

        fn close(&mut self) {}
    }

    /// Opens fine, then reports a fixed size and optionally refuses to capture.
    struct FlakySource {
        size: (u32, u32),
        capture_fails: bool,
        open: bool,
    }

    impl FlakySource {
        fn new(size: (u32, u32), capture_fails: bool) -> Self {
            Self {
                size,
                capture_fails,
                open: false,
            }
        }
    }

    impl FrameSource for FlakySource {
        fn open(&mut self) -> PipelineResult<()> {
            self.open = true;
            Ok(())
        }

        fn frame_size(&self) -> Option<(u32, u32)> {
            self.open.then_some(self.size)
        }

        fn capture(&mut self, frame: &mut PixelBuffer) -> PipelineResult<()> {
            if self.capture_fails {
                return Err(PipelineError::SourceUnavailable("device unplugged".to_string()));
            }
            frame.fill(GRAY);
            Ok(())
        }

        fn close(&mut self) {
            self.open = false;
        }
    }

    struct BrokenSink;

    impl FrameSink for BrokenSink {
        fn viewport(&self) -> Option<(u32, u32)> {
            Some((8, 6))
        }

        fn present(&mut self, _frame: &PixelBuffer) -> PipelineResult<()> {
            Err(PipelineError::SourceUnavailable("surface destroyed".to_string()))
        }
    }

    const GRAY: [u8; 4] = [100, 100, 100, 255];

    fn kitchen() -> Kitchen {
        Kitchen::new(CookConfig::default().with_seed(21)).with_codec(IdentityCodec)
    }

    fn still_pipeline(recipe: &str) -> RealtimePipeline<StillFrameSource, BufferSink> {
        let source = StillFrameSource::new(PixelBuffer::filled(8, 6, GRAY).unwrap());
        RealtimePipeline::new(source, BufferSink::new(8, 6), kitchen())
            .with_register(RecipeRegister::with_text(recipe))
    }

    fn workspace() -> Workspace {
        Workspace::new(PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap())
    }

    #[test]
    fn test_source_failure_keeps_idle() {
        let mut pipeline = RealtimePipeline::new(DeniedSource, BufferSink::new(4, 4), kitchen());
        let err = pipeline.start().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.tick(&mut workspace()).unwrap(), TickOutcome::Idle);
    }

    #[test]
    fn test_state_transitions() {
        let mut pipeline = still_pipeline("-edge\n");
        assert!(matches!(
            pipeline.pause(),
            Err(PipelineError::InvalidTransition { action: "pause", state: "idle" })
        ));

        pipeline.start().unwrap();
        assert!(pipeline.source().is_open());
        assert!(pipeline.start().is_err());

        pipeline.pause().unwrap();
        assert_eq!(pipeline.state(), PipelineState::Paused);
        assert_eq!(pipeline.tick(&mut workspace()).unwrap(), TickOutcome::Paused);
        assert_eq!(pipeline.sink().presented(), 0);

        pipeline.resume().unwrap();
        assert_eq!(pipeline.state(), PipelineState::Active);

        pipeline.stop();
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.source().is_open());
    }

    #[test]
    fn test_blank_register_seeded_with_light_recipe() {
        let mut pipeline = still_pipeline("");
        pipeline.start().unwrap();
        let steps = pipeline.register().recipe().len();
        assert!((4..=7).contains(&steps));

        let mut kept = still_pipeline("-normalize\n");
        kept.start().unwrap();
        assert_eq!(kept.register().snapshot(), "-normalize\n");
    }

    #[test]
    fn test_tick_presents_viewport_frame_and_keeps_canvas() {
        let mut pipeline = still_pipeline("-contrast 120\n-edge\n");
        let mut workspace = workspace();
        let canvas = workspace.active().clone();

        pipeline.start().unwrap();
        let outcome = pipeline.tick(&mut workspace).unwrap();
        assert_eq!(outcome, TickOutcome::Presented { applied: 2, fallback: false });
        assert_eq!(workspace.active(), &canvas);
        assert_eq!(pipeline.sink().last_frame().unwrap().dimensions(), (8, 6));
        assert_eq!(pipeline.stats().frames_presented, 1);
    }

    #[test]
    fn test_letterboxed_into_wider_viewport() {
        let source = StillFrameSource::new(PixelBuffer::filled(4, 4, GRAY).unwrap());
        let mut pipeline = RealtimePipeline::new(source, BufferSink::new(12, 4), kitchen())
            .with_register(RecipeRegister::with_text("-contrast 0\n"));
        pipeline.start().unwrap();
        pipeline.tick(&mut workspace()).unwrap();

        let frame = pipeline.sink().last_frame().unwrap();
        assert_eq!(frame.dimensions(), (12, 4));
        assert_eq!(frame.get_pixel(0, 0).unwrap(), [17, 17, 17, 255]);
        assert_eq!(frame.get_pixel(6, 2).unwrap(), GRAY);
        assert_eq!(frame.get_pixel(11, 3).unwrap(), [17, 17, 17, 255]);
    }

    #[test]
    fn test_recipe_edits_apply_next_tick() {
        let mut pipeline = still_pipeline("-contrast 0\n");
        let mut workspace = workspace();
        pipeline.start().unwrap();

        pipeline.tick(&mut workspace).unwrap();
        assert_eq!(pipeline.sink().last_frame().unwrap().get_pixel(0, 0).unwrap(), GRAY);

        let editor = pipeline.register().clone();
        editor.set("-contrast 200\n");
        pipeline.tick(&mut workspace).unwrap();
        assert_ne!(pipeline.sink().last_frame().unwrap().get_pixel(0, 0).unwrap(), GRAY);
    }

    #[test]
    fn test_failing_recipe_falls_back_to_contrast() {
        let source = StillFrameSource::new(PixelBuffer::filled(8, 6, GRAY).unwrap());
        let failing = Kitchen::new(CookConfig::default().with_seed(3)).with_codec(FailingCodec);
        let mut pipeline = RealtimePipeline::new(source, BufferSink::new(8, 6), failing)
            .with_register(RecipeRegister::with_text("-normalize\n-quality 20\n"));
        pipeline.start().unwrap();

        for _ in 0..3 {
            let outcome = pipeline.tick(&mut workspace()).unwrap();
            assert_eq!(outcome, TickOutcome::Presented { applied: 0, fallback: true });
        }
        assert_eq!(pipeline.state(), PipelineState::Active);
        assert_eq!(pipeline.stats().fallback_frames, 3);

        let mut expected = PixelBuffer::filled(8, 6, GRAY).unwrap();
        kitchen()
            .apply_operation(&mut expected, Operation::Contrast, Some(40))
            .unwrap();
        assert_eq!(pipeline.sink().last_frame().unwrap(), &expected);
    }

    #[test]
    fn test_cancel_stops_on_next_tick() {
        let mut pipeline = still_pipeline("-edge\n");
        pipeline.start().unwrap();
        pipeline.cancel_token().cancel();

        let outcome = pipeline.tick(&mut workspace()).unwrap();
        assert_eq!(outcome, TickOutcome::Stopped(StopReason::Cancelled));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.source().is_open());

        pipeline.start().unwrap();
        assert!(!pipeline.cancel_token().is_cancelled());
    }

    #[test]
    fn test_surface_loss_stops() {
        let mut pipeline = still_pipeline("-edge\n");
        pipeline.start().unwrap();
        pipeline.sink_mut().detach();
        let outcome = pipeline.tick(&mut workspace()).unwrap();
        assert_eq!(outcome, TickOutcome::Stopped(StopReason::SurfaceLost));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn test_zero_sized_frame_stops_with_source_lost() {
        let source = FlakySource::new((0, 480), false);
        let mut pipeline = RealtimePipeline::new(source, BufferSink::new(8, 6), kitchen())
            .with_register(RecipeRegister::with_text("-edge\n"));
        pipeline.start().unwrap();

        let outcome = pipeline.tick(&mut workspace()).unwrap();
        assert_eq!(outcome, TickOutcome::Stopped(StopReason::SourceLost));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.source().open);
        assert_eq!(pipeline.tick(&mut workspace()).unwrap(), TickOutcome::Idle);
    }

    #[test]
    fn test_capture_failure_stops_with_source_lost() {
        let source = FlakySource::new((8, 6), true);
        let mut pipeline = RealtimePipeline::new(source, BufferSink::new(8, 6), kitchen())
            .with_register(RecipeRegister::with_text("-edge\n"));
        pipeline.start().unwrap();

        let outcome = pipeline.tick(&mut workspace()).unwrap();
        assert_eq!(outcome, TickOutcome::Stopped(StopReason::SourceLost));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.source().open);
        assert_eq!(pipeline.sink().presented(), 0);
    }

    #[test]
    fn test_present_failure_stops_with_surface_lost() {
        let source = FlakySource::new((8, 6), false);
        let mut pipeline = RealtimePipeline::new(source, BrokenSink, kitchen())
            .with_register(RecipeRegister::with_text("-contrast 50\n"));
        pipeline.start().unwrap();

        let outcome = pipeline.tick(&mut workspace()).unwrap();
        assert_eq!(outcome, TickOutcome::Stopped(StopReason::SurfaceLost));
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.stats().frames_presented, 0);
    }

    #[test]
    fn test_inverted_light_steps_still_start() {
        let config = CookConfig {
            light_steps: [7, 4],
            ..CookConfig::default()
        }
        .with_seed(5);
        let source = StillFrameSource::new(PixelBuffer::filled(4, 4, GRAY).unwrap());
        let mut pipeline = RealtimePipeline::new(
            source,
            BufferSink::new(4, 4),
            Kitchen::new(config).with_codec(IdentityCodec),
        );
        pipeline.start().unwrap();
        assert!((4..=7).contains(&pipeline.register().recipe().len()));
    }
}
