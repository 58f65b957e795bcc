//! Active-buffer workspace and scoped retargeting.
//!
//! A [`Workspace`] owns the persistent canvas that interactive cooking works
//! on. [`Workspace::retarget`] temporarily swaps another buffer in as the
//! active one, for example a per-frame scratch buffer, and swaps it back when
//! the returned [`Retarget`] guard drops. Restoration happens on every exit
//! path: normal return, `?` early return, or a panic unwinding through the
//! guard.
//!
//! The binding is owned and borrowed explicitly, so two pipelines never share
//! an active buffer by accident.

use crate::core::buffer::PixelBuffer;
use crate::core::error::CookResult;
use crate::execution::{CookReport, Kitchen};
use crate::recipe::Recipe;
use std::ops::{Deref, DerefMut};

/// Holds the active buffer that recipes are cooked against.
#[derive(Debug, Clone)]
pub struct Workspace {
    active: PixelBuffer,
}

impl Workspace {
    /// Start with `canvas` as the active buffer.
    pub fn new(canvas: PixelBuffer) -> Self {
        Self { active: canvas }
    }

    /// The active buffer.
    pub fn active(&self) -> &PixelBuffer {
        &self.active
    }

    /// Mutable access to the active buffer.
    pub fn active_mut(&mut self) -> &mut PixelBuffer {
        &mut self.active
    }

    /// Replace the canvas, returning the previous one.
    pub fn replace(&mut self, canvas: PixelBuffer) -> PixelBuffer {
        std::mem::replace(&mut self.active, canvas)
    }

    /// Consume the workspace and return its canvas.
    pub fn into_active(self) -> PixelBuffer {
        self.active
    }

    /// Apply `recipe` to whatever buffer is currently active.
    pub fn cook(&mut self, recipe: &Recipe, kitchen: &mut Kitchen) -> CookResult<CookReport> {
        kitchen.apply(&mut self.active, recipe)
    }

    /// Make `target` the active buffer until the guard drops.
    ///
    /// While the guard lives, `target` holds the previous canvas; on drop the
    /// two are swapped back, so `target` ends up with whatever was cooked.
    pub fn retarget<'a>(&'a mut self, target: &'a mut PixelBuffer) -> Retarget<'a> {
        std::mem::swap(&mut self.active, target);
        log::trace!("Retargeted workspace to {:?}", self.active.dimensions());
        Retarget {
            workspace: self,
            parked: target,
        }
    }
}

/// Scope guard returned by [`Workspace::retarget`].
pub struct Retarget<'a> {
    workspace: &'a mut Workspace,
    parked: &'a mut PixelBuffer,
}

impl Deref for Retarget<'_> {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        &*self.workspace
    }
}

impl DerefMut for Retarget<'_> {
    fn deref_mut(&mut self) -> &mut Workspace {
        &mut *self.workspace
    }
}

impl Drop for Retarget<'_> {
    fn drop(&mut self) {
        std::mem::swap(&mut self.workspace.active, &mut *self.parked);
        log::trace!("Restored workspace to {:?}", self.workspace.active.dimensions());
    }
}
