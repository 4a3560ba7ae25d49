//! Update regions: which screen area to refresh and how.
//!
//! Every draw and cleanup step returns an [`UpdateRegion`]. Regions from a
//! whole frame are merged with `|=` and the result is submitted to the
//! display once.
//!
//! # Merge rules
//!
//! - An empty region is the identity: merging it changes nothing.
//! - Otherwise the rectangles are unioned, flags are OR-ed and the
//!   higher-quality [`Waveform`] wins (`GC16 > GC16Fast > DU`).
//!
//! ```rust
//! use eink_ui::region::{UpdateRegion, UpdateFlags, Waveform};
//! use embedded_graphics::prelude::{Point, Size};
//! use embedded_graphics::primitives::Rectangle;
//!
//! let mut frame = UpdateRegion::default();
//! frame |= UpdateRegion::with_waveform(
//!     Rectangle::new(Point::new(0, 0), Size::new(10, 10)),
//!     Waveform::DU,
//! );
//! frame |= UpdateRegion::new(Rectangle::new(Point::new(20, 0), Size::new(10, 10)));
//!
//! assert_eq!(frame.rect.size, Size::new(30, 10));
//! assert_eq!(frame.waveform, Waveform::GC16Fast);
//! assert_eq!(frame.flags, UpdateFlags::empty());
//! ```

use core::ops::{BitOr, BitOrAssign};

use embedded_graphics::primitives::Rectangle;

use crate::geometry;

/// Panel refresh waveform.
///
/// Ordered by quality: merging two regions keeps the higher one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Waveform {
    /// Direct update: fastest, black and white only. Used for erasing.
    DU,
    /// Fast grayscale update.
    GC16Fast,
    /// Full grayscale update with the best quality.
    GC16,
}

bitflags::bitflags! {
    /// Extra refresh behavior requested for a region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UpdateFlags: u8 {
        /// Block until the panel finished refreshing.
        const SYNC = 1;
        /// Flash the area to clear ghosting.
        const FULL_REFRESH = 2;
    }
}

/// A screen rectangle plus how it should be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRegion {
    /// Area to refresh. Zero-sized means nothing to refresh.
    pub rect: Rectangle,
    /// Waveform to refresh with.
    pub waveform: Waveform,
    /// Extra behavior.
    pub flags: UpdateFlags,
}

impl UpdateRegion {
    /// Region refreshed with the default fast grayscale waveform.
    pub const fn new(rect: Rectangle) -> Self {
        Self::with_waveform(rect, Waveform::GC16Fast)
    }

    /// Region with an explicit waveform.
    pub const fn with_waveform(rect: Rectangle, waveform: Waveform) -> Self {
        Self {
            rect,
            waveform,
            flags: UpdateFlags::empty(),
        }
    }

    /// High quality flashing refresh that waits for completion.
    pub const fn full_refresh(rect: Rectangle) -> Self {
        Self {
            rect,
            waveform: Waveform::GC16,
            flags: UpdateFlags::SYNC.union(UpdateFlags::FULL_REFRESH),
        }
    }

    /// Returns `true` if there is nothing to refresh.
    pub const fn is_empty(&self) -> bool {
        geometry::is_empty(&self.rect)
    }
}

impl Default for UpdateRegion {
    fn default() -> Self {
        Self::new(Rectangle::zero())
    }
}

impl BitOrAssign for UpdateRegion {
    fn bitor_assign(&mut self, other: Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }
        self.rect = geometry::union(&self.rect, &other.rect);
        self.flags |= other.flags;
        self.waveform = self.waveform.max(other.waveform);
    }
}

impl BitOr for UpdateRegion {
    type Output = Self;

    fn bitor(mut self, other: Self) -> Self {
        self |= other;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::{Point, Size};

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_empty_is_identity() {
        let r = UpdateRegion::full_refresh(rect(1, 2, 3, 4));
        assert_eq!(UpdateRegion::default() | r, r);
        assert_eq!(r | UpdateRegion::default(), r);
        // An empty region's waveform and flags never leak into the merge
        let empty_gc16 = UpdateRegion::full_refresh(Rectangle::zero());
        let du = UpdateRegion::with_waveform(rect(0, 0, 5, 5), Waveform::DU);
        assert_eq!(du | empty_gc16, du);
    }

    #[test]
    fn test_waveform_priority() {
        let a = UpdateRegion::with_waveform(rect(0, 0, 5, 5), Waveform::DU);
        let b = UpdateRegion::new(rect(5, 5, 5, 5));
        let c = UpdateRegion::with_waveform(rect(0, 0, 1, 1), Waveform::GC16);
        assert_eq!((a | b).waveform, Waveform::GC16Fast);
        assert_eq!((a | c).waveform, Waveform::GC16);
        assert_eq!((a | b).rect, rect(0, 0, 10, 10));
    }

    #[test]
    fn test_flags_or() {
        let mut a = UpdateRegion::new(rect(0, 0, 5, 5));
        a.flags = UpdateFlags::SYNC;
        let b = UpdateRegion::full_refresh(rect(0, 0, 1, 1));
        assert_eq!((a | b).flags, UpdateFlags::SYNC | UpdateFlags::FULL_REFRESH);
    }

    #[test]
    fn test_default_is_empty() {
        let r = UpdateRegion::default();
        assert!(r.is_empty());
        assert_eq!(r.waveform, Waveform::GC16Fast);
        assert!(r.flags.is_empty());
    }
}
