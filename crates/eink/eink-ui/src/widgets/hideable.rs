//! Show or hide a subtree without losing it.

use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::canvas::Canvas;
use crate::geometry::Constraints;
use crate::region::UpdateRegion;
use crate::render::{RenderObject, RenderState};
use crate::widget::Widget;

/// A child that can be hidden.
///
/// While hidden the child keeps its render object (and so its state) but is
/// not laid out, drawn or given input, and the widget takes its minimum
/// size. Showing it again forgets the areas the child painted before it was
/// hidden and requests a full quality refresh of its area.
#[derive(Debug, Clone)]
pub struct Hideable<C> {
    /// Whether the child is on screen.
    pub visible: bool,
    /// Wrapped widget.
    pub child: C,
}

impl<C: Widget> Hideable<C> {
    /// Child with the given visibility.
    pub fn new(visible: bool, child: C) -> Self {
        Self { visible, child }
    }

    /// Visible child.
    pub fn shown(child: C) -> Self {
        Self::new(true, child)
    }

    /// Hidden child.
    pub fn hidden(child: C) -> Self {
        Self::new(false, child)
    }
}

impl<C: Widget> Widget for Hideable<C> {
    type Render = HideableRenderObject<C::Render>;

    fn create_render_object(&self) -> Self::Render {
        HideableRenderObject {
            state: RenderState::new(),
            visible: self.visible,
            refresh: false,
            child: self.child.create_render_object(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        self.child.update(&mut render.child);
        if render.visible == self.visible {
            return;
        }
        tracing::trace!(id = render.state.id(), visible = self.visible, "visibility changed");
        render.visible = self.visible;
        render.state.mark_layout();
        render.state.mark_paint(true);
        if self.visible {
            render.child.invalidate_rects();
            render.child.mark_needs_layout();
            render.child.mark_needs_draw(true);
            render.refresh = true;
        }
    }
}

/// Render object behind [`Hideable`].
#[derive(Debug)]
pub struct HideableRenderObject<R> {
    state: RenderState,
    visible: bool,
    refresh: bool,
    child: R,
}

impl<R> HideableRenderObject<R> {
    /// Returns `true` if the child is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl<R: RenderObject> RenderObject for HideableRenderObject<R> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        if self.visible {
            self.child.layout(constraints)
        } else {
            constraints.min
        }
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        if !self.visible {
            return UpdateRegion::default();
        }
        let mut region = self
            .child
            .draw(Rectangle::new(rect.top_left, self.child.size()), canvas);
        if std::mem::take(&mut self.refresh) {
            region |= UpdateRegion::full_refresh(rect);
        }
        region
    }

    // Hidden children are invisible to every tree walk.
    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        if self.visible {
            visitor(&self.child);
        }
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        if self.visible {
            visitor(&mut self.child);
        }
    }
}
