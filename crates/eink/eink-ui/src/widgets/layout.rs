//! Single-child layout widgets.
//!
//! Each one transforms the constraints on the way down, lays out its child,
//! and positions the child inside its own area on the way up.
//!
//! # Components
//!
//! - [`Padding`] - empty space around the child
//! - [`Border`] - outline around the child
//! - [`Sized`] - fixed width and/or height
//! - [`Center`] - child centered in all available space
//! - [`container`] - margin, border and inner padding in one call

use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::canvas::{Canvas, FOREGROUND};
use crate::geometry::{self, Constraints, Insets};
use crate::region::{UpdateRegion, Waveform};
use crate::render::{RenderObject, RenderState};
use crate::widget::Widget;

/// Empty space around a child.
#[derive(Debug, Clone)]
pub struct Padding<C> {
    /// Space on each edge.
    pub insets: Insets,
    /// Wrapped widget.
    pub child: C,
}

impl<C: Widget> Padding<C> {
    /// Pad `child` by `insets`.
    pub fn new(insets: Insets, child: C) -> Self {
        Self { insets, child }
    }

    /// Same padding on every edge.
    pub fn all(value: u32, child: C) -> Self {
        Self::new(Insets::all(value), child)
    }
}

impl<C: Widget> Widget for Padding<C> {
    type Render = PaddingRenderObject<C::Render>;

    fn create_render_object(&self) -> Self::Render {
        PaddingRenderObject {
            state: RenderState::new(),
            insets: self.insets,
            child: self.child.create_render_object(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        if render.insets != self.insets {
            render.insets = self.insets;
            render.mark_needs_layout();
            render.mark_needs_draw(true);
        }
        self.child.update(&mut render.child);
    }
}

/// Render object behind [`Padding`].
#[derive(Debug)]
pub struct PaddingRenderObject<R> {
    state: RenderState,
    insets: Insets,
    child: R,
}

impl<R: RenderObject> RenderObject for PaddingRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        let child = self.child.layout(constraints.inset(self.insets));
        constraints.expand(child, self.insets)
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let origin = geometry::offset(rect.top_left, self.insets.left, self.insets.top);
        self.child
            .draw(Rectangle::new(origin, self.child.size()), canvas)
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        visitor(&self.child);
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        visitor(&mut self.child);
    }
}

/// Rectangle outline around a child.
///
/// The outline is `width` pixels thick and drawn inside the widget's area,
/// so the child sits `width` pixels in from every edge.
#[derive(Debug, Clone)]
pub struct Border<C> {
    /// Line thickness in pixels.
    pub width: u32,
    /// Line color.
    pub color: Gray4,
    /// Wrapped widget.
    pub child: C,
}

impl<C: Widget> Border<C> {
    /// Black border of `width` pixels.
    pub fn new(width: u32, child: C) -> Self {
        Self {
            width,
            color: FOREGROUND,
            child,
        }
    }

    /// Set the line color
    #[must_use]
    pub fn color(mut self, color: Gray4) -> Self {
        self.color = color;
        self
    }
}

impl<C: Widget> Widget for Border<C> {
    type Render = BorderRenderObject<C::Render>;

    fn create_render_object(&self) -> Self::Render {
        BorderRenderObject {
            state: RenderState::new(),
            width: self.width,
            color: self.color,
            child: self.child.create_render_object(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        if render.width != self.width {
            render.width = self.width;
            render.mark_needs_layout();
            render.mark_needs_draw(true);
        }
        if render.color != self.color {
            render.color = self.color;
            // A full draw erases the child area too
            render.mark_needs_draw(true);
        }
        self.child.update(&mut render.child);
    }
}

/// Render object behind [`Border`].
#[derive(Debug)]
pub struct BorderRenderObject<R> {
    state: RenderState,
    width: u32,
    color: Gray4,
    child: R,
}

impl<R: RenderObject> RenderObject for BorderRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        let insets = Insets::all(self.width);
        let child = self.child.layout(constraints.inset(insets));
        constraints.expand(child, insets)
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let mut region = UpdateRegion::default();
        if self.state.is_full_draw() {
            for inset in 0..self.width {
                canvas.stroke_rect(Insets::all(inset).shrink(rect), self.color);
            }
            region = UpdateRegion::with_waveform(rect, Waveform::DU);
        }
        let origin = geometry::offset(rect.top_left, self.width, self.width);
        region |= self
            .child
            .draw(Rectangle::new(origin, self.child.size()), canvas);
        region
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        visitor(&self.child);
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        visitor(&mut self.child);
    }
}

/// Forces the child to a fixed width and/or height.
///
/// A fixed axis is still clamped into the incoming constraints; an axis left
/// as `None` passes the constraints through.
#[derive(Debug, Clone)]
pub struct Sized<C> {
    /// Fixed width, if any.
    pub width: Option<u32>,
    /// Fixed height, if any.
    pub height: Option<u32>,
    /// Wrapped widget.
    pub child: C,
}

impl<C: Widget> Sized<C> {
    /// Fix both axes.
    pub fn new(size: Size, child: C) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
            child,
        }
    }

    /// Fix the width only.
    pub fn width(width: u32, child: C) -> Self {
        Self {
            width: Some(width),
            height: None,
            child,
        }
    }

    /// Fix the height only.
    pub fn height(height: u32, child: C) -> Self {
        Self {
            width: None,
            height: Some(height),
            child,
        }
    }
}

impl<C: Widget> Widget for Sized<C> {
    type Render = SizedRenderObject<C::Render>;

    fn create_render_object(&self) -> Self::Render {
        SizedRenderObject {
            state: RenderState::new(),
            width: self.width,
            height: self.height,
            child: self.child.create_render_object(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        if render.width != self.width || render.height != self.height {
            render.width = self.width;
            render.height = self.height;
            render.mark_needs_layout();
        }
        self.child.update(&mut render.child);
    }
}

/// Render object behind [`Sized`].
#[derive(Debug)]
pub struct SizedRenderObject<R> {
    state: RenderState,
    width: Option<u32>,
    height: Option<u32>,
    child: R,
}

impl<R: RenderObject> RenderObject for SizedRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        let fixed = constraints.constrain(Size::new(
            self.width.unwrap_or(0),
            self.height.unwrap_or(0),
        ));
        let mut inner = constraints;
        if self.width.is_some() {
            inner.min.width = fixed.width;
            inner.max.width = fixed.width;
        }
        if self.height.is_some() {
            inner.min.height = fixed.height;
            inner.max.height = fixed.height;
        }
        let child = self.child.layout(inner);
        inner.constrain(child)
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        self.child
            .draw(Rectangle::new(rect.top_left, self.child.size()), canvas)
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        visitor(&self.child);
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        visitor(&mut self.child);
    }
}

/// Takes all available space and centers the child in it.
#[derive(Debug, Clone)]
pub struct Center<C> {
    /// Wrapped widget.
    pub child: C,
}

impl<C: Widget> Center<C> {
    /// Center `child`.
    pub fn new(child: C) -> Self {
        Self { child }
    }
}

impl<C: Widget> Widget for Center<C> {
    type Render = CenterRenderObject<C::Render>;

    fn create_render_object(&self) -> Self::Render {
        CenterRenderObject {
            state: RenderState::new(),
            child: self.child.create_render_object(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        self.child.update(&mut render.child);
    }
}

/// Render object behind [`Center`].
#[derive(Debug)]
pub struct CenterRenderObject<R> {
    state: RenderState,
    child: R,
}

impl<R: RenderObject> RenderObject for CenterRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        let child = self.child.layout(Constraints::loose(constraints.max));
        constraints.max_or(child)
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        let child_rect = geometry::center_in(&rect, self.child.size());
        self.child.draw(child_rect, canvas)
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        visitor(&self.child);
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        visitor(&mut self.child);
    }
}

/// Result of [`container`].
pub type Container<C> = Padding<Border<Padding<C>>>;

/// `child` padded by `padding`, outlined by a `border` pixel line and kept
/// `margin` away from the surrounding widgets.
///
/// ```rust
/// use eink_ui::geometry::{Constraints, Insets};
/// use eink_ui::render::RenderObject;
/// use eink_ui::widget::Widget;
/// use eink_ui::widgets::{container, Text};
/// use embedded_graphics::prelude::Size;
///
/// let boxed = container(Text::new("ok"), Insets::all(4), 2, Insets::all(6));
/// let mut render = boxed.create_render_object();
/// let size = render.layout(Constraints::loose(Size::new(200, 200)));
/// // 18x18 text plus 2 * (4 + 2 + 6) on each axis
/// assert_eq!(size, Size::new(42, 42));
/// ```
pub fn container<C: Widget>(
    child: C,
    margin: Insets,
    border: u32,
    padding: Insets,
) -> Container<C> {
    Padding::new(margin, Border::new(border, Padding::new(padding, child)))
}
