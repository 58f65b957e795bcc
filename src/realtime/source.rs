//! Frame source and display sink collaborators.

use crate::core::buffer::PixelBuffer;
use crate::core::error::{PipelineError, PipelineResult};

/// A live producer of frames, such as a camera.
pub trait FrameSource {
    /// Acquire the device. Failure keeps the pipeline idle.
    fn open(&mut self) -> PipelineResult<()>;

    /// Current frame dimensions. `None` until the source is open.
    fn frame_size(&self) -> Option<(u32, u32)>;

    /// Write one frame into `frame`, which is already sized to [`frame_size`](Self::frame_size).
    fn capture(&mut self, frame: &mut PixelBuffer) -> PipelineResult<()>;

    /// Release the device. Must be safe to call more than once.
    fn close(&mut self);
}

/// Where cooked frames are displayed.
pub trait FrameSink {
    /// Destination size; `None` once the display surface is gone.
    fn viewport(&self) -> Option<(u32, u32)>;

    /// Show one viewport-sized frame.
    fn present(&mut self, frame: &PixelBuffer) -> PipelineResult<()>;
}

/// Replays a single still image as if it were a camera.
#[derive(Debug, Clone)]
pub struct StillFrameSource {
    image: PixelBuffer,
    open: bool,
}

impl StillFrameSource {
    /// Serve `image` on every capture.
    pub fn new(image: PixelBuffer) -> Self {
        Self { image, open: false }
    }

    /// Whether the source is currently open.
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl FrameSource for StillFrameSource {
    fn open(&mut self) -> PipelineResult<()> {
        self.open = true;
        Ok(())
    }

    fn frame_size(&self) -> Option<(u32, u32)> {
        self.open.then(|| self.image.dimensions())
    }

    fn capture(&mut self, frame: &mut PixelBuffer) -> PipelineResult<()> {
        if !self.open {
            return Err(PipelineError::SourceUnavailable("still source is closed".to_string()));
        }
        frame.write_raw(self.image.as_raw())?;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Keeps the most recent frame in memory.
#[derive(Debug, Clone)]
pub struct BufferSink {
    viewport: Option<(u32, u32)>,
    last: Option<PixelBuffer>,
    presented: usize,
}

impl BufferSink {
    /// A sink with a fixed viewport.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Some((width, height)),
            last: None,
            presented: 0,
        }
    }

    /// Simulate the display surface going away.
    pub fn detach(&mut self) {
        self.viewport = None;
    }

    /// The last presented frame.
    pub fn last_frame(&self) -> Option<&PixelBuffer> {
        self.last.as_ref()
    }

    /// Take ownership of the last presented frame.
    pub fn take_last_frame(&mut self) -> Option<PixelBuffer> {
        self.last.take()
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl FrameSink for BufferSink {
    fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    fn present(&mut self, frame: &PixelBuffer) -> PipelineResult<()> {
        self.last = Some(frame.clone());
        self.presented += 1;
        Ok(())
    }
}
