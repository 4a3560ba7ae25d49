//! Type-erased widgets.
//!
//! [`DynamicWidget`] lets a build function return different widget types
//! from one call site (a placeholder while loading, a list afterwards...).
//! When the concrete type stays the same the child is updated in place; when
//! it changes the child render object is replaced and the area it painted is
//! erased on the next cleanup.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::canvas::{Canvas, BACKGROUND};
use crate::geometry::{self, Constraints};
use crate::region::{UpdateRegion, Waveform};
use crate::render::{cleanup_default, PaintState, RenderObject, RenderState};
use crate::widget::Widget;

trait ErasedWidget {
    fn widget_type(&self) -> TypeId;
    fn create(&self) -> Box<dyn RenderObject>;
    fn update_erased(&self, render: &mut dyn RenderObject) -> bool;
}

struct Erased<W>(W);

impl<W: Widget> ErasedWidget for Erased<W> {
    fn widget_type(&self) -> TypeId {
        TypeId::of::<W>()
    }

    fn create(&self) -> Box<dyn RenderObject> {
        Box::new(self.0.create_render_object())
    }

    fn update_erased(&self, render: &mut dyn RenderObject) -> bool {
        match render.as_any_mut().downcast_mut::<W::Render>() {
            Some(render) => {
                self.0.update(render);
                true
            }
            None => false,
        }
    }
}

/// A widget of any type.
#[derive(Clone)]
pub struct DynamicWidget {
    inner: Rc<dyn ErasedWidget>,
}

impl DynamicWidget {
    /// Erase `widget`.
    pub fn new<W: Widget>(widget: W) -> Self {
        Self {
            inner: Rc::new(Erased(widget)),
        }
    }
}

impl fmt::Debug for DynamicWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicWidget")
            .field("type", &self.inner.widget_type())
            .finish()
    }
}

impl Widget for DynamicWidget {
    type Render = DynamicRenderObject;

    fn create_render_object(&self) -> Self::Render {
        DynamicRenderObject {
            state: RenderState::new(),
            child: self.inner.create(),
            widget_type: self.inner.widget_type(),
            last_rect: Rectangle::zero(),
            just_changed: false,
        }
    }

    fn update(&self, render: &mut Self::Render) {
        let same_type = render.widget_type == self.inner.widget_type();
        if same_type && self.inner.update_erased(render.child.as_mut()) {
            return;
        }
        tracing::debug!(id = render.state.id(), "dynamic child type changed");
        render.child = self.inner.create();
        render.widget_type = self.inner.widget_type();
        render.just_changed = true;
        render.state.mark_layout();
    }
}

/// Render object behind [`DynamicWidget`].
pub struct DynamicRenderObject {
    state: RenderState,
    child: Box<dyn RenderObject>,
    widget_type: TypeId,
    last_rect: Rectangle,
    just_changed: bool,
}

impl DynamicRenderObject {
    /// Current child.
    pub fn child(&self) -> &dyn RenderObject {
        self.child.as_ref()
    }
}

impl RenderObject for DynamicRenderObject {
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
        // Cleanup already ran this frame, here or in a fully redrawn ancestor.
        self.just_changed = false;
        if self.child.state().paint() != PaintState::Clean {
            self.last_rect = rect;
        }
        self.child.draw(rect, canvas)
    }

    fn cleanup(&mut self, canvas: &mut dyn Canvas) -> UpdateRegion {
        if !self.just_changed {
            return cleanup_default(self, canvas);
        }
        self.just_changed = false;
        let mut region = UpdateRegion::default();
        if !geometry::is_empty(&self.last_rect) {
            canvas.fill_rect(self.last_rect, BACKGROUND);
            region = UpdateRegion::with_waveform(self.last_rect, Waveform::DU);
        }
        region
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        visitor(self.child.as_ref());
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        visitor(self.child.as_mut());
    }
}

/// Conversion into [`DynamicWidget`].
pub trait WidgetExt: Widget + Sized {
    /// Erase the widget type.
    fn into_dynamic(self) -> DynamicWidget {
        DynamicWidget::new(self)
    }
}

impl<W: Widget> WidgetExt for W {}
