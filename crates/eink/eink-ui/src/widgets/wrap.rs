//! Flow layout.
//!
//! Children are packed along the main axis into runs. A child that would
//! overflow the available main extent starts a new run instead; a child that
//! fits exactly stays in the current one. Runs stack across the axis and the
//! whole block is centered in the widget's area.

use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::canvas::Canvas;
use crate::geometry::{self, Constraints, UNBOUNDED};
use crate::region::UpdateRegion;
use crate::render::{RenderObject, RenderState};
use crate::widget::{update_children, Widget};
use crate::widgets::Axis;

/// Children flowed into runs.
#[derive(Debug, Clone)]
pub struct Wrap<W> {
    axis: Axis,
    children: Vec<W>,
}

impl<W: Widget> Wrap<W> {
    /// Runs left to right, stacked top to bottom.
    pub fn new(children: Vec<W>) -> Self {
        Self::with_axis(Axis::Horizontal, children)
    }

    /// Runs along `axis`.
    pub fn with_axis(axis: Axis, children: Vec<W>) -> Self {
        Self { axis, children }
    }
}

impl<W: Widget> Widget for Wrap<W> {
    type Render = WrapRenderObject<W::Render>;

    fn create_render_object(&self) -> Self::Render {
        WrapRenderObject {
            state: RenderState::new(),
            axis: self.axis,
            children: self
                .children
                .iter()
                .map(|w| w.create_render_object())
                .collect(),
            positions: Vec::new(),
            block: Size::zero(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        let mut relayout = render.axis != self.axis;
        render.axis = self.axis;
        relayout |= update_children(&mut render.children, &self.children);
        if relayout {
            render.mark_needs_layout();
            render.mark_needs_draw(true);
        }
    }
}

/// Render object behind [`Wrap`].
#[derive(Debug)]
pub struct WrapRenderObject<R> {
    state: RenderState,
    axis: Axis,
    children: Vec<R>,
    // (main, cross) of each child inside the block
    positions: Vec<(u32, u32)>,
    block: Size,
}

impl<R: RenderObject> WrapRenderObject<R> {
    /// Child render objects in order.
    pub fn children(&self) -> &[R] {
        &self.children
    }

    /// Number of runs produced by the last layout.
    pub fn run_count(&self) -> usize {
        let mut runs = 0usize;
        let mut last = None;
        for &(_, cross) in &self.positions {
            if last != Some(cross) {
                runs = runs.saturating_add(1);
                last = Some(cross);
            }
        }
        runs
    }
}

impl<R: RenderObject> RenderObject for WrapRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        let axis = self.axis;
        let max_main = axis.main(constraints.max);
        let child_constraints =
            Constraints::loose(axis.size(UNBOUNDED, axis.cross(constraints.max)));

        let previous = std::mem::take(&mut self.positions);
        let previous_block = self.block;
        let mut block_main = 0u32;
        let mut run_offset = 0u32;
        let mut run_main = 0u32;
        let mut run_cross = 0u32;
        let mut run_len = 0usize;
        let mut moved = false;
        for child in &mut self.children {
            let before = child.size();
            let size = child.layout(child_constraints);
            moved |= size != before;

            let main = axis.main(size);
            if run_len > 0 && run_main.saturating_add(main) > max_main {
                block_main = block_main.max(run_main);
                run_offset = run_offset.saturating_add(run_cross);
                run_main = 0;
                run_cross = 0;
                run_len = 0;
            }
            self.positions.push((run_main, run_offset));
            run_main = run_main.saturating_add(main);
            run_cross = run_cross.max(axis.cross(size));
            run_len = run_len.saturating_add(1);
        }
        block_main = block_main.max(run_main);
        self.block = axis.size(block_main, run_offset.saturating_add(run_cross));
        moved |= self.positions != previous || self.block != previous_block;

        if moved {
            self.mark_needs_draw(true);
        }
        constraints.constrain(self.block)
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let origin = geometry::center_in(&rect, self.block).top_left;
        let mut region = UpdateRegion::default();
        for (child, &(main, cross)) in self.children.iter_mut().zip(&self.positions) {
            let child_origin = self.axis.offset(origin, main, cross);
            region |= child.draw(Rectangle::new(child_origin, child.size()), canvas);
        }
        region
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
    use crate::render::PaintState;
    use crate::widgets::{Colored, Sized};
    use embedded_graphics::pixelcolor::{Gray4, GrayColor};
    use embedded_graphics::prelude::Point;

    fn blocks(n: usize) -> Vec<Sized<Colored>> {
        (0..n)
            .map(|_| Sized::new(Size::new(10, 10), Colored::new(Gray4::BLACK)))
            .collect()
    }

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_wraps_on_overflow() {
        let mut ro = Wrap::new(blocks(3)).create_render_object();
        let size = ro.layout(Constraints::loose(Size::new(25, 100)));
        assert_eq!(size, Size::new(20, 20));
        assert_eq!(ro.run_count(), 2);
    }

    #[test]
    fn test_exact_fit_stays_in_run() {
        let mut ro = Wrap::new(blocks(3)).create_render_object();
        let size = ro.layout(Constraints::loose(Size::new(30, 100)));
        assert_eq!(size, Size::new(30, 10));
        assert_eq!(ro.run_count(), 1);
    }

    #[test]
    fn test_oversized_first_child_has_its_own_run() {
        let widgets = vec![
            Sized::new(Size::new(50, 10), Colored::new(Gray4::BLACK)),
            Sized::new(Size::new(10, 10), Colored::new(Gray4::BLACK)),
        ];
        let mut ro = Wrap::new(widgets).create_render_object();
        let size = ro.layout(Constraints::loose(Size::new(30, 100)));
        assert_eq!(size, Size::new(30, 20));
        assert_eq!(ro.run_count(), 2);
    }

    #[test]
    fn test_block_is_centered() {
        let mut ro = Wrap::new(blocks(3)).create_render_object();
        let size = ro.layout(Constraints::tight(Size::new(40, 40)));
        assert_eq!(size, Size::new(40, 40));

        let mut canvas = MemoryCanvas::new(Size::new(40, 40));
        ro.draw(rect(0, 0, 40, 40), &mut canvas);
        // Block is 30x10, centered
        assert_eq!(ro.children()[0].rect(), rect(5, 15, 10, 10));
        assert_eq!(ro.children()[2].rect(), rect(25, 15, 10, 10));
    }

    #[test]
    fn test_vertical_runs() {
        let mut ro = Wrap::with_axis(Axis::Vertical, blocks(3)).create_render_object();
        let size = ro.layout(Constraints::loose(Size::new(100, 20)));
        assert_eq!(size, Size::new(20, 20));

        let mut canvas = MemoryCanvas::new(Size::new(100, 100));
        ro.draw(rect(0, 0, 20, 20), &mut canvas);
        assert_eq!(ro.children()[1].rect(), rect(0, 10, 10, 10));
        assert_eq!(ro.children()[2].rect(), rect(10, 0, 10, 10));
    }

    #[test]
    fn test_reflow_redraws_moved_children() {
        let mut ro = Wrap::new(blocks(3)).create_render_object();
        let mut canvas = MemoryCanvas::new(Size::new(30, 30));
        let size = ro.layout(Constraints::loose(Size::new(30, 30)));
        ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
        ro.reset();
        assert_eq!(ro.run_count(), 1);

        let size = ro.layout(Constraints::loose(Size::new(25, 30)));
        assert_eq!(ro.run_count(), 2);
        assert_eq!(ro.children()[2].state().paint(), PaintState::Full);

        let region = ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
        assert_eq!(ro.children()[2].rect(), rect(0, 10, 10, 10));
        assert_eq!(region.rect, rect(0, 0, 20, 20));
    }
}
