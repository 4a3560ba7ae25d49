//! Tap and key callbacks, and the button built from them.

use std::fmt;
use std::rc::Rc;

use eink_input::{Event, KeyState, PenPhase, TouchPhase};
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::canvas::Canvas;
use crate::context::AppContext;
use crate::geometry::{self, Constraints, Insets};
use crate::region::UpdateRegion;
use crate::render::{dispatch_to_children, RenderObject, RenderState};
use crate::widget::Widget;
use crate::widgets::{container, Container, Text};

type Callback = Rc<dyn Fn(&mut AppContext)>;
type KeyCallback = Rc<dyn Fn(u16, &mut AppContext)>;

/// Callbacks of a [`GestureDetector`].
#[derive(Clone, Default)]
pub struct Gestures {
    on_tap: Option<Callback>,
    on_key_down: Option<KeyCallback>,
    on_key_up: Option<KeyCallback>,
}

impl Gestures {
    /// No callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a finger or the pen lifts inside the widget.
    #[must_use]
    pub fn on_tap(mut self, f: impl Fn(&mut AppContext) + 'static) -> Self {
        self.on_tap = Some(Rc::new(f));
        self
    }

    /// Called with the key code when a key is pressed.
    #[must_use]
    pub fn on_key_down(mut self, f: impl Fn(u16, &mut AppContext) + 'static) -> Self {
        self.on_key_down = Some(Rc::new(f));
        self
    }

    /// Called with the key code when a key is released.
    #[must_use]
    pub fn on_key_up(mut self, f: impl Fn(u16, &mut AppContext) + 'static) -> Self {
        self.on_key_up = Some(Rc::new(f));
        self
    }

    fn dispatch(&self, event: &Event, rect: &Rectangle, app: &mut AppContext) {
        match event {
            Event::Touch(touch) if touch.phase == TouchPhase::Up => {
                if geometry::contains(rect, touch.location) {
                    if let Some(on_tap) = &self.on_tap {
                        on_tap(app);
                    }
                }
            }
            Event::Pen(pen) if pen.phase == PenPhase::TouchUp => {
                if geometry::contains(rect, pen.location) {
                    if let Some(on_tap) = &self.on_tap {
                        on_tap(app);
                    }
                }
            }
            Event::Key(key) => {
                let callback = match key.state {
                    KeyState::Press => self.on_key_down.as_ref(),
                    KeyState::Release => self.on_key_up.as_ref(),
                    KeyState::Repeat => None,
                };
                if let Some(callback) = callback {
                    callback(key.code, app);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Debug for Gestures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gestures")
            .field("on_tap", &self.on_tap.is_some())
            .field("on_key_down", &self.on_key_down.is_some())
            .field("on_key_up", &self.on_key_up.is_some())
            .finish()
    }
}

/// Runs callbacks for input landing on its child.
///
/// Input is passed on to the child first, so nested detectors fire
/// innermost first.
#[derive(Debug, Clone)]
pub struct GestureDetector<C> {
    /// Wrapped widget.
    pub child: C,
    /// Callbacks.
    pub gestures: Gestures,
}

impl<C: Widget> GestureDetector<C> {
    /// Detector with the given callbacks.
    pub fn new(child: C, gestures: Gestures) -> Self {
        Self { child, gestures }
    }

    /// Detector with only a tap callback.
    pub fn tap(child: C, on_tap: impl Fn(&mut AppContext) + 'static) -> Self {
        Self::new(child, Gestures::new().on_tap(on_tap))
    }
}

impl<C: Widget> Widget for GestureDetector<C> {
    type Render = GestureDetectorRenderObject<C::Render>;

    fn create_render_object(&self) -> Self::Render {
        GestureDetectorRenderObject {
            state: RenderState::new(),
            gestures: self.gestures.clone(),
            child: self.child.create_render_object(),
        }
    }

    fn update(&self, render: &mut Self::Render) {
        render.gestures = self.gestures.clone();
        self.child.update(&mut render.child);
    }
}

/// Render object behind [`GestureDetector`].
#[derive(Debug)]
pub struct GestureDetectorRenderObject<R> {
    state: RenderState,
    gestures: Gestures,
    child: R,
}

impl<R: RenderObject> RenderObject for GestureDetectorRenderObject<R> {
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
        self.child.draw(rect, canvas)
    }

    fn handle_input(&mut self, event: &Event, app: &mut AppContext) {
        dispatch_to_children(self, event, app);
        let rect = self.state.rect();
        self.gestures.dispatch(event, &rect, app);
    }

    fn visit_children(&self, visitor: &mut dyn FnMut(&dyn RenderObject)) {
        visitor(&self.child);
    }

    fn visit_children_mut(&mut self, visitor: &mut dyn FnMut(&mut dyn RenderObject)) {
        visitor(&mut self.child);
    }
}

/// Widget returned by [`button`].
pub type Button = GestureDetector<Container<Text>>;

/// Outlined text label that calls `on_tap` when tapped.
pub fn button(label: impl Into<String>, on_tap: impl Fn(&mut AppContext) + 'static) -> Button {
    GestureDetector::tap(
        container(Text::new(label), Insets::all(1), 2, Insets::all(2)),
        on_tap,
    )
}
