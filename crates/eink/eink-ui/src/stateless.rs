//! Widgets built purely from their configuration.

use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::build::BuildContext;
use crate::canvas::Canvas;
use crate::context::AppContext;
use crate::geometry::Constraints;
use crate::region::UpdateRegion;
use crate::render::{RenderObject, RenderState};
use crate::widget::{BuildSlots, Widget};

/// A widget whose subtree is a function of its own fields.
///
/// Rebuilt whenever a new configuration arrives from the parent.
pub trait StatelessWidget: Clone + 'static {
    /// Widget returned by [`StatelessWidget::build`].
    type Child: Widget;

    /// Describe the subtree.
    fn build(&self, app: &mut AppContext, context: &BuildContext<'_>) -> Self::Child;
}

/// Adapts a [`StatelessWidget`] into a [`Widget`].
#[derive(Debug, Clone)]
pub struct Stateless<W>(pub W);

impl<W: StatelessWidget> Widget for Stateless<W> {
    type Render = StatelessRenderObject<W>;

    fn create_render_object(&self) -> Self::Render {
        let mut state = RenderState::new();
        state.mark_rebuild();
        StatelessRenderObject {
            state,
            widget: self.0.clone(),
            slots: BuildSlots::new(),
            child: None,
        }
    }

    fn update(&self, render: &mut Self::Render) {
        render.widget = self.0.clone();
        render.state.mark_rebuild();
    }
}

/// Render object behind [`Stateless`].
pub struct StatelessRenderObject<W: StatelessWidget> {
    state: RenderState,
    widget: W,
    slots: BuildSlots<W::Child>,
    child: Option<<W::Child as Widget>::Render>,
}

impl<W: StatelessWidget> StatelessRenderObject<W> {
    /// Built child render object, once built.
    pub fn child(&self) -> Option<&<W::Child as Widget>::Render> {
        self.child.as_ref()
    }
}

impl<W: StatelessWidget> RenderObject for StatelessRenderObject<W> {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        match self.child.as_mut() {
            Some(child) => child.layout(constraints),
            None => constraints.min,
        }
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        match self.child.as_mut() {
            Some(child) => child.draw(rect, canvas),
            None => UpdateRegion::default(),
        }
    }

    fn do_rebuild(&mut self, app: &mut AppContext, build: &BuildContext<'_>) {
        let built = self.widget.build(app, build);
        self.slots.apply(built, &mut self.child);
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        if let Some(child) = self.child.as_ref() {
            visitor(child);
        }
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        if let Some(child) = self.child.as_mut() {
            visitor(child);
        }
    }
}
