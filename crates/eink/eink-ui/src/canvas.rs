//! Drawing surface used by render objects.
//!
//! [`Canvas`] is the small, object-safe set of drawing operations the
//! widgets need. Any `embedded-graphics` [`DrawTarget`] over [`Gray4`] is a
//! canvas, so a real panel driver, the desktop emulator and the in-memory
//! [`MemoryCanvas`] used by tests are interchangeable.
//!
//! # Example
//!
//! ```rust
//! use eink_ui::canvas::{Canvas, MemoryCanvas, BACKGROUND, FOREGROUND};
//! use embedded_graphics::prelude::{Point, Size};
//! use embedded_graphics::primitives::Rectangle;
//!
//! let mut canvas = MemoryCanvas::new(Size::new(32, 32));
//! canvas.fill_rect(Rectangle::new(Point::new(4, 4), Size::new(8, 8)), FOREGROUND);
//! assert_eq!(canvas.pixel(Point::new(5, 5)), Some(FOREGROUND));
//! assert_eq!(canvas.pixel(Point::new(20, 20)), Some(BACKGROUND));
//! ```

use core::convert::Infallible;
use core::fmt;

use embedded_graphics::{
    mono_font::{ascii::FONT_9X18, MonoFont, MonoTextStyle},
    pixelcolor::{Gray4, GrayColor},
    prelude::*,
    primitives::{PointsIter, PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
    text::{Baseline, Text},
};

/// Color of cleared screen areas.
pub const BACKGROUND: Gray4 = <Gray4 as GrayColor>::WHITE;

/// Color of text and outlines.
pub const FOREGROUND: Gray4 = <Gray4 as GrayColor>::BLACK;

/// Font used for all text.
pub const FONT: &MonoFont<'static> = &FONT_9X18;

/// Pixel size of `text` rendered in [`FONT`] on a single line.
///
/// ```rust
/// use eink_ui::canvas::text_size;
/// use embedded_graphics::prelude::Size;
///
/// assert_eq!(text_size("abc"), Size::new(27, 18));
/// assert_eq!(text_size(""), Size::new(0, 18));
/// ```
pub fn text_size(text: &str) -> Size {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    let advance = FONT
        .character_size
        .width
        .saturating_add(FONT.character_spacing);
    let width = advance
        .saturating_mul(chars)
        .saturating_sub(if chars > 0 { FONT.character_spacing } else { 0 });
    Size::new(width, FONT.character_size.height)
}

/// Drawing operations available to render objects.
///
/// Operations never fail: drawing errors from the underlying target are
/// logged and the pixels are skipped.
pub trait Canvas {
    /// Fill `rect` with `color`.
    fn fill_rect(&mut self, rect: Rectangle, color: Gray4);

    /// Draw a one pixel outline just inside `rect`.
    fn stroke_rect(&mut self, rect: Rectangle, color: Gray4);

    /// Draw `text` with its top-left corner at `origin`, clipped to `clip`.
    fn draw_text(&mut self, text: &str, origin: Point, clip: Rectangle);

    /// Set a single pixel.
    fn set_pixel(&mut self, point: Point, color: Gray4);
}

impl<D> Canvas for D
where
    D: DrawTarget<Color = Gray4>,
    D::Error: fmt::Debug,
{
    fn fill_rect(&mut self, rect: Rectangle, color: Gray4) {
        if let Err(err) = self.fill_solid(&rect, color) {
            tracing::warn!(?err, "fill_rect failed");
        }
    }

    fn stroke_rect(&mut self, rect: Rectangle, color: Gray4) {
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(color)
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        if let Err(err) = rect.into_styled(style).draw(self) {
            tracing::warn!(?err, "stroke_rect failed");
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, clip: Rectangle) {
        let style = MonoTextStyle::new(FONT, FOREGROUND);
        let result =
            Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.clipped(&clip));
        if let Err(err) = result {
            tracing::warn!(?err, "draw_text failed");
        }
    }

    fn set_pixel(&mut self, point: Point, color: Gray4) {
        if let Err(err) = Pixel(point, color).draw(self) {
            tracing::warn!(?err, "set_pixel failed");
        }
    }
}

/// Heap-backed [`Gray4`] pixel buffer.
///
/// Starts filled with [`BACKGROUND`]. Used as the frame of
/// [`crate::display::MemoryDisplay`] and as the source of
/// [`crate::widgets::Image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCanvas {
    size: Size,
    pixels: Vec<Gray4>,
}

impl MemoryCanvas {
    /// Blank canvas of `size`.
    pub fn new(size: Size) -> Self {
        let len = (size.width as usize).saturating_mul(size.height as usize);
        Self {
            size,
            pixels: vec![BACKGROUND; len],
        }
    }

    /// Canvas whose pixels are produced by `f(x, y)`.
    pub fn from_fn(size: Size, mut f: impl FnMut(u32, u32) -> Gray4) -> Self {
        let mut canvas = Self::new(size);
        for y in 0..size.height {
            for x in 0..size.width {
                if let Some(i) = canvas.index_of(x, y) {
                    if let Some(px) = canvas.pixels.get_mut(i) {
                        *px = f(x, y);
                    }
                }
            }
        }
        canvas
    }

    /// Pixel at `point`, `None` outside the canvas.
    pub fn pixel(&self, point: Point) -> Option<Gray4> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        self.pixels.get(self.index_of(x, y)?).copied()
    }

    /// Number of pixels inside `rect` that differ from [`BACKGROUND`].
    pub fn inked_pixels(&self, rect: &Rectangle) -> usize {
        rect.points()
            .filter(|p| matches!(self.pixel(*p), Some(c) if c != BACKGROUND))
            .count()
    }

    fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        (y as usize)
            .checked_mul(self.size.width as usize)?
            .checked_add(x as usize)
    }
}

impl OriginDimensions for MemoryCanvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for MemoryCanvas {
    type Color = Gray4;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if let Some(px) = self.index_of(x, y).and_then(|i| self.pixels.get_mut(i)) {
                *px = color;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_new_canvas_is_blank() {
        let canvas = MemoryCanvas::new(Size::new(10, 10));
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 10, 10)), 0);
        assert_eq!(canvas.pixel(Point::new(10, 0)), None);
        assert_eq!(canvas.pixel(Point::new(-1, 0)), None);
    }

    #[test]
    fn test_fill_clips_to_canvas() {
        let mut canvas = MemoryCanvas::new(Size::new(10, 10));
        canvas.fill_rect(rect(5, 5, 20, 20), FOREGROUND);
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 10, 10)), 25);
    }

    #[test]
    fn test_stroke_stays_inside() {
        let mut canvas = MemoryCanvas::new(Size::new(20, 20));
        canvas.stroke_rect(rect(2, 2, 10, 10), FOREGROUND);
        assert_eq!(canvas.pixel(Point::new(2, 2)), Some(FOREGROUND));
        assert_eq!(canvas.pixel(Point::new(11, 11)), Some(FOREGROUND));
        assert_eq!(canvas.pixel(Point::new(12, 12)), Some(BACKGROUND));
        assert_eq!(canvas.pixel(Point::new(6, 6)), Some(BACKGROUND));
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 20, 20)), 36);
    }

    #[test]
    fn test_text_is_clipped() {
        let mut canvas = MemoryCanvas::new(Size::new(100, 40));
        let clip = rect(0, 0, 9, 18);
        canvas.draw_text("WW", Point::zero(), clip);
        assert!(canvas.inked_pixels(&clip) > 0);
        assert_eq!(canvas.inked_pixels(&rect(9, 0, 91, 40)), 0);
    }

    #[test]
    fn test_from_fn() {
        let canvas = MemoryCanvas::from_fn(Size::new(4, 2), |x, _| {
            if x < 2 {
                FOREGROUND
            } else {
                BACKGROUND
            }
        });
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 4, 2)), 4);
        assert_eq!(canvas.pixel(Point::new(3, 1)), Some(BACKGROUND));
    }
}
