//! Overlaid children.

use eink_input::Event;
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::canvas::Canvas;
use crate::context::AppContext;
use crate::geometry::{self, Constraints};
use crate::region::UpdateRegion;
use crate::render::{cleanup_default, RenderObject, RenderState};
use crate::widget::{update_children, Widget};

/// Children drawn on top of each other, first at the bottom.
///
/// Every child gets the same constraints and is placed at the top-left
/// corner; the stack is as large as its largest child. Pointer input goes to
/// the topmost child under the pointer only.
#[derive(Debug, Clone)]
pub struct Stack<W> {
    children: Vec<W>,
}

impl<W: Widget> Stack<W> {
    /// Stack `children`, bottom first.
    pub fn new(children: Vec<W>) -> Self {
        Self { children }
    }
}

impl<W: Widget> Widget for Stack<W> {
    type Render = StackRenderObject<W::Render>;

    fn create_render_object(&self) -> Self::Render {
        StackRenderObject {
            state: RenderState::new(),
            children: self
                .children
                .iter()
                .map(|w| w.create_render_object())
                .collect(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        if update_children(&mut render.children, &self.children) {
            render.mark_needs_layout();
            render.mark_needs_draw(true);
        }
    }
}

/// Render object behind [`Stack`].
#[derive(Debug)]
pub struct StackRenderObject<R> {
    state: RenderState,
    children: Vec<R>,
}

impl<R: RenderObject> StackRenderObject<R> {
    /// Child render objects, bottom first.
    pub fn children(&self) -> &[R] {
        &self.children
    }
}

impl<R: RenderObject> RenderObject for StackRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        let mut size = constraints.min;
        for child in &mut self.children {
            let child_size = child.layout(constraints);
            size = Size::new(
                size.width.max(child_size.width),
                size.height.max(child_size.height),
            );
        }
        size
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let mut region = UpdateRegion::default();
        for child in &mut self.children {
            let child_rect = Rectangle::new(rect.top_left, child.size());
            // Whatever was painted below overwrote this child's pixels.
            if !region.is_empty() && geometry::intersects(&region.rect, &child_rect) {
                child.mark_needs_draw(true);
            }
            region |= child.draw(child_rect, canvas);
        }
        region
    }

    fn cleanup(&mut self, canvas: &mut dyn Canvas) -> UpdateRegion {
        if self.state.is_full_draw() {
            return cleanup_default(self, canvas);
        }
        let erased: Vec<UpdateRegion> = self
            .children
            .iter_mut()
            .map(|child| child.cleanup(&mut *canvas))
            .collect();
        // An erase wipes every overlapping layer, not only the one that moved.
        for (i, wiped) in erased.iter().enumerate() {
            if wiped.is_empty() {
                continue;
            }
            for (j, child) in self.children.iter_mut().enumerate() {
                if j != i && geometry::intersects(&wiped.rect, &child.rect()) {
                    child.mark_needs_draw(true);
                }
            }
        }
        erased.into_iter().fold(UpdateRegion::default(), |acc, r| acc | r)
    }

    fn handle_input(&mut self, event: &Event, app: &mut AppContext) {
        let Some(location) = event.location() else {
            for child in &mut self.children {
                child.handle_input(event, app);
            }
            return;
        };
        let top = self
            .children
            .iter_mut()
            .rev()
            .find(|child| geometry::contains(&child.rect(), location));
        if let Some(child) = top {
            child.handle_input(event, app);
        }
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        for child in &self.children {
            visitor(child);
        }
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        for child in &mut self.children {
            visitor(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::MemoryCanvas;
    use crate::widgets::{Colored, Sized};
    use embedded_graphics::pixelcolor::{Gray4, GrayColor};
    use embedded_graphics::prelude::Point;

    fn block(w: u32, h: u32, color: Gray4) -> Sized<Colored> {
        Sized::new(Size::new(w, h), Colored::new(color))
    }

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_size_is_largest_child() {
        let widget = Stack::new(vec![
            block(10, 30, Gray4::BLACK),
            block(20, 5, Gray4::BLACK),
        ]);
        let mut ro = widget.create_render_object();
        assert_eq!(
            ro.layout(Constraints::loose(Size::new(100, 100))),
            Size::new(20, 30)
        );
    }

    #[test]
    fn test_later_child_paints_on_top() {
        let widget = Stack::new(vec![
            block(10, 10, Gray4::BLACK),
            block(5, 5, Gray4::WHITE),
        ]);
        let mut ro = widget.create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(10, 10));
        let size = ro.layout(Constraints::loose(Size::new(10, 10)));
        ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 10, 10)), 100 - 25);
    }

    #[test]
    fn test_bottom_redraw_repaints_overlapping_top() {
        let widgets = vec![block(10, 10, Gray4::BLACK), block(5, 5, Gray4::WHITE)];
        let mut ro = Stack::new(widgets).create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(10, 10));
        let size = ro.layout(Constraints::loose(Size::new(10, 10)));
        ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
        ro.reset();

        // Only the bottom child changes
        let widgets = vec![block(10, 10, Gray4::new(8)), block(5, 5, Gray4::WHITE)];
        Stack::new(widgets).update(&mut ro);
        ro.layout(Constraints::loose(Size::new(10, 10)));
        ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
        assert_eq!(canvas.pixel(Point::new(1, 1)), Some(Gray4::WHITE));
        assert_eq!(canvas.pixel(Point::new(8, 8)), Some(Gray4::new(8)));
    }

    #[test]
    fn test_shrinking_top_restores_bottom() {
        let constraints = Constraints::loose(Size::new(10, 10));
        let widgets = vec![block(10, 10, Gray4::BLACK), block(6, 6, Gray4::new(8))];
        let mut ro = Stack::new(widgets).create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(10, 10));
        let size = ro.layout(constraints);
        ro.cleanup(&mut canvas);
        ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
        ro.reset();

        let widgets = vec![block(10, 10, Gray4::BLACK), block(2, 2, Gray4::new(8))];
        Stack::new(widgets).update(&mut ro);
        ro.layout(constraints);
        let mut region = ro.cleanup(&mut canvas);
        region |= ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);

        assert_eq!(region.rect, rect(0, 0, 10, 10));
        assert_eq!(canvas.inked_pixels(&rect(0, 0, 10, 10)), 100);
        assert_eq!(canvas.pixel(Point::new(4, 4)), Some(Gray4::BLACK));
        assert_eq!(canvas.pixel(Point::new(1, 1)), Some(Gray4::new(8)));
    }
}
