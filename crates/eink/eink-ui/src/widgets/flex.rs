//! Row and column layout.
//!
//! Children are placed one after another along the main axis, each laid out
//! with loose constraints bounded by the space the previous children left.
//! The cross size is the largest child's, and the main size is the sum of
//! the children plus the gaps between them.
//!
//! ```rust
//! use eink_ui::geometry::Constraints;
//! use eink_ui::render::RenderObject;
//! use eink_ui::widget::Widget;
//! use eink_ui::widgets::{Flex, Text};
//! use embedded_graphics::prelude::Size;
//!
//! let row = Flex::row(vec![Text::new("a"), Text::new("bc")]).gap(4);
//! let mut render = row.create_render_object();
//! let size = render.layout(Constraints::loose(Size::new(200, 100)));
//! assert_eq!(size, Size::new(9 + 4 + 18, 18));
//! ```

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::canvas::Canvas;
use crate::geometry::{self, Constraints, UNBOUNDED};
use crate::region::UpdateRegion;
use crate::render::{RenderObject, RenderState};
use crate::widget::{update_children, Widget};

/// Layout direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// Extent of `size` along this axis.
    pub const fn main(self, size: Size) -> u32 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of `size` across this axis.
    pub const fn cross(self, size: Size) -> u32 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Size with the given main and cross extents.
    pub const fn size(self, main: u32, cross: u32) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }

    /// `origin` moved `main` along and `cross` across the axis.
    pub fn offset(self, origin: Point, main: u32, cross: u32) -> Point {
        let size = self.size(main, cross);
        geometry::offset(origin, size.width, size.height)
    }
}

/// Children in a row or a column.
#[derive(Debug, Clone)]
pub struct Flex<W> {
    axis: Axis,
    gap: u32,
    children: Vec<W>,
}

impl<W: Widget> Flex<W> {
    /// Children along `axis`.
    pub fn new(axis: Axis, children: Vec<W>) -> Self {
        Self {
            axis,
            gap: 0,
            children,
        }
    }

    /// Children left to right.
    pub fn row(children: Vec<W>) -> Self {
        Self::new(Axis::Horizontal, children)
    }

    /// Children top to bottom.
    pub fn column(children: Vec<W>) -> Self {
        Self::new(Axis::Vertical, children)
    }

    /// Set the gap between children
    #[must_use]
    pub fn gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }
}

impl<W: Widget> Widget for Flex<W> {
    type Render = FlexRenderObject<W::Render>;

    fn create_render_object(&self) -> Self::Render {
        FlexRenderObject {
            state: RenderState::new(),
            axis: self.axis,
            gap: self.gap,
            children: self
                .children
                .iter()
                .map(|w| w.create_render_object())
                .collect(),
            offsets: Vec::new(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        let mut relayout = render.axis != self.axis || render.gap != self.gap;
        render.axis = self.axis;
        render.gap = self.gap;
        relayout |= update_children(&mut render.children, &self.children);
        if relayout {
            render.mark_needs_layout();
            render.mark_needs_draw(true);
        }
    }
}

/// Render object behind [`Flex`].
#[derive(Debug)]
pub struct FlexRenderObject<R> {
    state: RenderState,
    axis: Axis,
    gap: u32,
    children: Vec<R>,
    offsets: Vec<u32>,
}

impl<R: RenderObject> FlexRenderObject<R> {
    /// Child render objects in order.
    pub fn children(&self) -> &[R] {
        &self.children
    }
}

impl<R: RenderObject> RenderObject for FlexRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        let axis = self.axis;
        let max_main = axis.main(constraints.max);
        let max_cross = axis.cross(constraints.max);

        self.offsets.clear();
        let mut used = 0u32;
        let mut cross = 0u32;
        let mut moved = false;
        for (i, child) in self.children.iter_mut().enumerate() {
            if i > 0 {
                used = used.saturating_add(self.gap);
            }
            let remaining = if max_main == UNBOUNDED {
                UNBOUNDED
            } else {
                max_main.saturating_sub(used)
            };
            let before = child.size();
            let size = child.layout(Constraints::loose(axis.size(remaining, max_cross)));
            moved |= size != before;
            self.offsets.push(used);
            used = used.saturating_add(axis.main(size));
            cross = cross.max(axis.cross(size));
        }
        // A resized child shifts every sibling after it.
        if moved {
            self.mark_needs_draw(true);
        }
        constraints.constrain(axis.size(used, cross))
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let mut region = UpdateRegion::default();
        for (child, &offset) in self.children.iter_mut().zip(&self.offsets) {
            let origin = self.axis.offset(rect.top_left, offset, 0);
            region |= child.draw(Rectangle::new(origin, child.size()), canvas);
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
