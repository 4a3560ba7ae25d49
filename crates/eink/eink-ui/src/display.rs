//! Display driver abstraction.
//!
//! The frame loop draws into the driver's canvas and then submits one merged
//! [`UpdateRegion`] per frame. A driver decides how that maps onto the panel
//! (partial refresh with the requested waveform, full flash, ...).

use embedded_graphics::prelude::Size;

use crate::canvas::{Canvas, MemoryCanvas};
use crate::error::DisplayError;
use crate::region::UpdateRegion;

/// A panel the frame loop can draw to.
pub trait DisplayDriver {
    /// Drawing surface type.
    type Canvas: Canvas;

    /// Panel size in pixels. Fixed for the lifetime of the driver.
    fn size(&self) -> Size;

    /// Surface the render tree draws into.
    fn canvas(&mut self) -> &mut Self::Canvas;

    /// Refresh `region` of the panel from the canvas contents.
    fn submit(&mut self, region: &UpdateRegion) -> Result<(), DisplayError>;
}

/// Headless display that keeps every submitted region.
///
/// Used for tests, benchmarks and running apps without hardware.
#[derive(Debug, Clone)]
pub struct MemoryDisplay {
    canvas: MemoryCanvas,
    submitted: Vec<UpdateRegion>,
}

impl MemoryDisplay {
    /// Blank display of `size`.
    pub fn new(size: Size) -> Self {
        Self {
            canvas: MemoryCanvas::new(size),
            submitted: Vec::new(),
        }
    }

    /// Current frame contents.
    pub fn frame(&self) -> &MemoryCanvas {
        &self.canvas
    }

    /// Every region submitted so far, oldest first.
    pub fn submitted(&self) -> &[UpdateRegion] {
        &self.submitted
    }

    /// Forget recorded submissions.
    pub fn clear_submitted(&mut self) {
        self.submitted.clear();
    }
}

impl DisplayDriver for MemoryDisplay {
    type Canvas = MemoryCanvas;

    fn size(&self) -> Size {
        embedded_graphics::geometry::OriginDimensions::size(&self.canvas)
    }

    fn canvas(&mut self) -> &mut Self::Canvas {
        &mut self.canvas
    }

    fn submit(&mut self, region: &UpdateRegion) -> Result<(), DisplayError> {
        tracing::trace!(?region, "memory display refresh");
        self.submitted.push(*region);
        Ok(())
    }
}
