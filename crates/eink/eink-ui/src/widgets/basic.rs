//! Leaf widgets: solid fills, text and images, plus the clearing wrapper.

use std::rc::Rc;

use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::prelude::{OriginDimensions, Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::canvas::{text_size, Canvas, MemoryCanvas, BACKGROUND};
use crate::geometry::{self, Constraints};
use crate::region::{UpdateRegion, Waveform};
use crate::render::{RenderObject, RenderState};
use crate::widget::Widget;

/// Fills all the space it is given with one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colored {
    /// Fill color.
    pub color: Gray4,
}

impl Colored {
    /// Solid fill.
    pub const fn new(color: Gray4) -> Self {
        Self { color }
    }
}

impl Widget for Colored {
    type Render = ColoredRenderObject;

    fn create_render_object(&self) -> Self::Render {
        ColoredRenderObject {
            state: RenderState::new(),
            color: self.color,
        }
    }

    fn update(&self, render: &mut Self::Render) {
        if render.color != self.color {
            render.color = self.color;
            render.mark_needs_draw(true);
        }
    }
}

/// Render object behind [`Colored`].
#[derive(Debug)]
pub struct ColoredRenderObject {
    state: RenderState,
    color: Gray4,
}

impl RenderObject for ColoredRenderObject {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        constraints.max_or(Size::zero())
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        canvas.fill_rect(rect, self.color);
        UpdateRegion::new(rect)
    }
}

/// Single line of text, centered in its area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Content.
    pub text: String,
}

impl Text {
    /// Text widget.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Widget for Text {
    type Render = TextRenderObject;

    fn create_render_object(&self) -> Self::Render {
        TextRenderObject {
            state: RenderState::new(),
            text: self.text.clone(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        if render.text == self.text {
            return;
        }
        if render.text.chars().count() != self.text.chars().count() {
            render.mark_needs_layout();
        }
        render.text.clone_from(&self.text);
        render.mark_needs_draw(true);
    }
}

/// Render object behind [`Text`].
#[derive(Debug)]
pub struct TextRenderObject {
    state: RenderState,
    text: String,
}

impl TextRenderObject {
    /// Current content.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl RenderObject for TextRenderObject {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        constraints.constrain(text_size(&self.text))
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let text_rect = geometry::center_in(&rect, text_size(&self.text));
        canvas.fill_rect(rect, BACKGROUND);
        canvas.draw_text(&self.text, text_rect.top_left, rect);
        // In-place content refreshes take the fast waveform
        let waveform = if self.state.is_full_draw() {
            Waveform::GC16Fast
        } else {
            Waveform::DU
        };
        UpdateRegion::with_waveform(rect, waveform)
    }
}

/// Bitmap scaled into its area.
///
/// Keeps the aspect ratio and centers the result unless `stretch` is set.
#[derive(Debug, Clone)]
pub struct Image {
    source: Rc<MemoryCanvas>,
    stretch: bool,
}

impl Image {
    /// Aspect-preserving image.
    pub fn new(source: Rc<MemoryCanvas>) -> Self {
        Self {
            source,
            stretch: false,
        }
    }

    /// Fill the whole area, distorting if needed.
    #[must_use]
    pub fn stretched(mut self) -> Self {
        self.stretch = true;
        self
    }
}

impl Widget for Image {
    type Render = ImageRenderObject;

    fn create_render_object(&self) -> Self::Render {
        ImageRenderObject {
            state: RenderState::new(),
            source: Rc::clone(&self.source),
            stretch: self.stretch,
        }
    }

    fn update(&self, render: &mut Self::Render) {
        if !Rc::ptr_eq(&render.source, &self.source) {
            if render.source.size() != self.source.size() {
                render.mark_needs_layout();
            }
            render.source = Rc::clone(&self.source);
            render.mark_needs_draw(true);
        }
        if render.stretch != self.stretch {
            render.stretch = self.stretch;
            render.mark_needs_draw(true);
        }
    }
}

/// Render object behind [`Image`].
#[derive(Debug)]
pub struct ImageRenderObject {
    state: RenderState,
    source: Rc<MemoryCanvas>,
    stretch: bool,
}

impl ImageRenderObject {
    fn target_rect(&self, rect: &Rectangle) -> Rectangle {
        let src = self.source.size();
        if self.stretch || src.width == 0 || src.height == 0 {
            return *rect;
        }
        let (w, h) = (u64::from(rect.size.width), u64::from(rect.size.height));
        let (sw, sh) = (u64::from(src.width), u64::from(src.height));
        // Fit the limiting axis, scale the other to match.
        let fitted = if w.saturating_mul(sh) <= h.saturating_mul(sw) {
            Size::new(rect.size.width, ratio(w, sh, sw))
        } else {
            Size::new(ratio(h, sw, sh), rect.size.height)
        };
        geometry::center_in(rect, fitted)
    }
}

/// `value * num / den`, zero for a zero denominator.
fn ratio(value: u64, num: u64, den: u64) -> u32 {
    let scaled = value.saturating_mul(num).checked_div(den).unwrap_or(0);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

impl RenderObject for ImageRenderObject {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        constraints.constrain(self.source.size())
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        canvas.fill_rect(rect, BACKGROUND);
        let target = self.target_rect(&rect);
        let src = self.source.size();
        let (tw, th) = (u64::from(target.size.width), u64::from(target.size.height));
        for ty in 0..target.size.height {
            let sy = ratio(u64::from(ty), u64::from(src.height), th);
            for tx in 0..target.size.width {
                let sx = ratio(u64::from(tx), u64::from(src.width), tw);
                let source_point = Point::new(
                    i32::try_from(sx).unwrap_or(i32::MAX),
                    i32::try_from(sy).unwrap_or(i32::MAX),
                );
                if let Some(color) = self.source.pixel(source_point) {
                    canvas.set_pixel(geometry::offset(target.top_left, tx, ty), color);
                }
            }
        }
        UpdateRegion::new(rect)
    }
}

/// Clears its area before the child paints on a full draw.
#[derive(Debug, Clone)]
pub struct Cleared<C> {
    /// Wrapped widget.
    pub child: C,
}

impl<C: Widget> Cleared<C> {
    /// Wrap `child`.
    pub fn new(child: C) -> Self {
        Self { child }
    }
}

impl<C: Widget> Widget for Cleared<C> {
    type Render = ClearedRenderObject<C::Render>;

    fn create_render_object(&self) -> Self::Render {
        ClearedRenderObject {
            state: RenderState::new(),
            child: self.child.create_render_object(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        self.child.update(&mut render.child);
    }
}

/// Render object behind [`Cleared`].
#[derive(Debug)]
pub struct ClearedRenderObject<R> {
    state: RenderState,
    child: R,
}

impl<R: RenderObject> RenderObject for ClearedRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        self.child.layout(constraints)
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let mut region = UpdateRegion::default();
        if self.state.is_full_draw() {
            canvas.fill_rect(rect, BACKGROUND);
            region = UpdateRegion::new(rect);
        }
        region |= self.child.draw(rect, canvas);
        region
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        visitor(&self.child);
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        visitor(&mut self.child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::FOREGROUND;
    use crate::geometry::UNBOUNDED;
    use embedded_graphics::pixelcolor::GrayColor;

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_colored_fills_max_or_min() {
        let mut ro = Colored::new(Gray4::BLACK).create_render_object();
        assert_eq!(
            ro.layout(Constraints::loose(Size::new(40, 30))),
            Size::new(40, 30)
        );
        let mut ro = Colored::new(Gray4::BLACK).create_render_object();
        let c = Constraints::new(Size::new(3, 4), Size::new(UNBOUNDED, 30));
        assert_eq!(ro.layout(c), Size::new(3, 30));
    }

    #[test]
    fn test_colored_update_marks_only_on_change() {
        let widget = Colored::new(Gray4::BLACK);
        let mut ro = widget.create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(10, 10));
        ro.layout(Constraints::tight(Size::new(10, 10)));
        ro.draw(rect(0, 0, 10, 10), &mut canvas);
        ro.reset();
        assert!(!ro.needs_draw());

        widget.update(&mut ro);
        assert!(!ro.needs_draw());

        Colored::new(Gray4::WHITE).update(&mut ro);
        assert!(ro.needs_draw());
    }

    #[test]
    fn test_text_layout_and_update_marks() {
        let mut ro = Text::new("abc").create_render_object();
        let size = ro.layout(Constraints::loose(Size::new(100, 100)));
        assert_eq!(size, text_size("abc"));
        ro.reset();
        assert!(!ro.needs_layout());

        // Same length: draw only
        Text::new("xyz").update(&mut ro);
        assert!(!ro.needs_layout());
        assert!(ro.needs_draw());

        // Different length: layout too
        Text::new("abcd").update(&mut ro);
        assert!(ro.needs_layout());
        assert_eq!(ro.text(), "abcd");
    }

    #[test]
    fn test_text_clamped_to_constraints() {
        let mut ro = Text::new("a long label").create_render_object();
        assert_eq!(
            ro.layout(Constraints::loose(Size::new(20, 10))),
            Size::new(20, 10)
        );
    }

    #[test]
    fn test_text_draws_inside_rect() {
        let mut ro = Text::new("hi").create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(60, 40));
        ro.layout(Constraints::tight(Size::new(40, 20)));
        let region = ro.draw(rect(10, 10, 40, 20), &mut canvas);
        assert_eq!(region.rect, rect(10, 10, 40, 20));
        assert!(canvas.inked_pixels(&rect(10, 10, 40, 20)) > 0);
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 60, 10)), 0);
        assert_eq!(region.waveform, Waveform::GC16Fast);
    }

    #[test]
    fn test_text_partial_redraw_uses_du() {
        let mut ro = Text::new("hi").create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(40, 20));
        let size = ro.layout(Constraints::loose(Size::new(40, 20)));
        ro.draw(rect(0, 0, size.width, size.height), &mut canvas);
        ro.reset();

        ro.mark_needs_draw(false);
        let region = ro.draw(rect(0, 0, size.width, size.height), &mut canvas);
        assert_eq!(region.waveform, Waveform::DU);
        assert!(canvas.inked_pixels(&region.rect) > 0);
    }

    #[test]
    fn test_image_preserves_aspect() {
        let source = Rc::new(MemoryCanvas::from_fn(Size::new(2, 1), |_, _| FOREGROUND));
        let mut ro = Image::new(source.clone()).create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(20, 20));
        ro.layout(Constraints::tight(Size::new(20, 20)));
        ro.draw(rect(0, 0, 20, 20), &mut canvas);
        // 20x10 band centered vertically
        assert_eq!(canvas.inked_pixels(&rect(0, 5, 20, 10)), 200);
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 20, 5)), 0);

        let mut ro = Image::new(source).stretched().create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(20, 20));
        ro.layout(Constraints::tight(Size::new(20, 20)));
        ro.draw(rect(0, 0, 20, 20), &mut canvas);
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 20, 20)), 400);
    }

    #[test]
    fn test_cleared_clears_on_full_draw() {
        let mut ro = Cleared::new(Text::new("")).create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(10, 10));
        canvas.fill_rect(rect(0, 0, 10, 10), FOREGROUND);
        ro.layout(Constraints::tight(Size::new(10, 10)));
        let region = ro.draw(rect(0, 0, 10, 10), &mut canvas);
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 10, 10)), 0);
        assert_eq!(region.rect, rect(0, 0, 10, 10));
    }
}
