//! Progress tracking and cooperative cancellation for recipe execution.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// Execution has started.
    Started {
        total_steps: usize,
    },
    /// A step is about to run.
    StepStarted {
        index: usize,
        token: String,
    },
    /// A step ran; `token` carries the effective parameters.
    StepApplied {
        index: usize,
        token: String,
        duration_ms: u64,
    },
    /// A step was not run.
    StepSkipped {
        index: usize,
        token: String,
        reason: SkipReason,
    },
    /// Execution has completed.
    Completed {
        total_duration_ms: u64,
        steps_applied: usize,
        steps_skipped: usize,
    },
    /// Execution was cancelled between steps.
    Cancelled,
    /// A step failed.
    Error {
        index: usize,
        message: String,
    },
}

/// Reason why a step was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Token is not in the catalog.
    UnknownOperation,
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Shared stop flag, checked between steps and between frames.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag so the token can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Counts steps for one recipe run and forwards events to a callback.
pub struct ProgressTracker {
    total_steps: usize,
    applied_steps: AtomicU64,
    skipped_steps: AtomicU64,
    start_time: Option<Instant>,
    callback: Option<Arc<ProgressCallback>>,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new(total_steps: usize) -> Self {
        Self {
            total_steps,
            applied_steps: AtomicU64::new(0),
            skipped_steps: AtomicU64::new(0),
            start_time: None,
            callback: None,
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: Option<Arc<ProgressCallback>>) -> Self {
        self.callback = callback;
        self
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started {
            total_steps: self.total_steps,
        });
    }

    /// Report that a step has started.
    pub fn step_started(&self, index: usize, token: &str) {
        self.send_update(ProgressUpdate::StepStarted {
            index,
            token: token.to_string(),
        });
    }

    /// Report that a step was applied.
    pub fn step_applied(&self, index: usize, token: String, duration_ms: u64) {
        self.applied_steps.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::StepApplied {
            index,
            token,
            duration_ms,
        });
    }

    /// Report that a step was skipped.
    pub fn step_skipped(&self, index: usize, token: &str, reason: SkipReason) {
        self.skipped_steps.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::StepSkipped {
            index,
            token: token.to_string(),
            reason,
        });
    }

    /// Report a failed step.
    pub fn report_error(&self, index: usize, message: String) {
        self.send_update(ProgressUpdate::Error { index, message });
    }

    /// Report cancellation.
    pub fn cancelled(&self) {
        self.send_update(ProgressUpdate::Cancelled);
    }

    /// Complete tracking.
    pub fn complete(&self) {
        let duration = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Completed {
            total_duration_ms: duration,
            steps_applied: self.applied_steps.load(Ordering::Relaxed) as usize,
            steps_skipped: self.skipped_steps.load(Ordering::Relaxed) as usize,
        });
    }

    /// Get current progress percentage.
    pub fn progress_percent(&self) -> f32 {
        if self.total_steps == 0 {
            return 100.0;
        }
        let applied = self.applied_steps.load(Ordering::Relaxed);
        let skipped = self.skipped_steps.load(Ordering::Relaxed);
        ((applied + skipped) as f32 / self.total_steps as f32) * 100.0
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }
}
