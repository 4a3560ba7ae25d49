//! Widgets with persistent state.
//!
//! A [`StatefulWidget`] creates a [`State`] once, the first time it appears.
//! Later widget updates keep that state; only [`StateHandle::set_state`]
//! changes it, which schedules a rebuild for the next frame.
//!
//! # Example
//!
//! ```rust
//! use eink_ui::stateful::{BuildScope, State, Stateful, StatefulWidget};
//! use eink_ui::widgets::{button, Button};
//!
//! #[derive(Clone)]
//! struct Counter;
//!
//! struct CounterState {
//!     count: u32,
//! }
//!
//! impl StatefulWidget for Counter {
//!     type State = CounterState;
//!     fn create_state(&self) -> CounterState {
//!         CounterState { count: 0 }
//!     }
//! }
//!
//! impl State for CounterState {
//!     type Widget = Counter;
//!     type Child = Button;
//!
//!     fn build(&self, scope: &mut BuildScope<'_, Self>) -> Button {
//!         let handle = scope.handle();
//!         button(format!("count {}", self.count), move |_app| {
//!             handle.set_state(|s| s.count += 1);
//!         })
//!     }
//! }
//!
//! let _widget = Stateful(Counter);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::build::BuildContext;
use crate::canvas::Canvas;
use crate::context::AppContext;
use crate::geometry::Constraints;
use crate::region::UpdateRegion;
use crate::render::{RenderObject, RenderState};
use crate::widget::{BuildSlots, Widget};

type Mutation<S> = Box<dyn FnOnce(&mut S)>;

/// Shared storage for one state value.
pub(crate) struct StateCell<S> {
    state: RefCell<S>,
    pending: RefCell<Vec<Mutation<S>>>,
    dirty: Cell<bool>,
}

impl<S> StateCell<S> {
    fn new(state: S) -> Self {
        Self {
            state: RefCell::new(state),
            pending: RefCell::new(Vec::new()),
            dirty: Cell::new(false),
        }
    }

    fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    fn apply_pending(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        if pending.is_empty() {
            return;
        }
        match self.state.try_borrow_mut() {
            Ok(mut state) => pending.into_iter().for_each(|f| f(&mut state)),
            Err(_) => self.pending.borrow_mut().extend(pending),
        }
    }
}

/// Weak handle to a stateful widget's state.
///
/// Outlives the widget safely: once the render object is gone every call is
/// a no-op.
pub struct StateHandle<S> {
    cell: Weak<StateCell<S>>,
}

impl<S: 'static> StateHandle<S> {
    pub(crate) fn new(cell: &Rc<StateCell<S>>) -> Self {
        Self {
            cell: Rc::downgrade(cell),
        }
    }

    /// Mutate the state and schedule a rebuild. If the state is borrowed
    /// right now (during its own build) the mutation runs before the next
    /// build instead. Returns `false` if the widget no longer exists.
    pub fn set_state(&self, f: impl FnOnce(&mut S) + 'static) -> bool {
        let Some(cell) = self.cell.upgrade() else {
            return false;
        };
        match cell.state.try_borrow_mut() {
            Ok(mut state) => f(&mut state),
            Err(_) => cell.pending.borrow_mut().push(Box::new(f)),
        }
        cell.dirty.set(true);
        true
    }

    /// Read the state. `None` if the widget is gone or the state is being
    /// mutated.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        let cell = self.cell.upgrade()?;
        let state = cell.state.try_borrow().ok()?;
        Some(f(&state))
    }

    /// Returns `true` while the owning render object exists.
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

impl<S> Clone for StateHandle<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
        }
    }
}

impl<S> fmt::Debug for StateHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("alive", &(self.cell.strong_count() > 0))
            .finish()
    }
}

/// Widget configuration whose state persists across rebuilds.
pub trait StatefulWidget: Clone + 'static {
    /// Persistent state type.
    type State: State<Widget = Self>;

    /// Create the state. Called once per render object.
    fn create_state(&self) -> Self::State;
}

/// State of a [`StatefulWidget`].
pub trait State: Sized + 'static {
    /// Owning widget type.
    type Widget: StatefulWidget<State = Self>;

    /// Widget produced by [`State::build`].
    type Child: Widget;

    /// One-time setup before the first build. Timers and notification
    /// handlers are usually registered here.
    fn init(&mut self, _scope: &mut BuildScope<'_, Self>) {}

    /// Describe the subtree for the current state.
    fn build(&self, scope: &mut BuildScope<'_, Self>) -> Self::Child;
}

/// What [`State::init`] and [`State::build`] can reach.
pub struct BuildScope<'a, S: State> {
    app: &'a mut AppContext,
    context: &'a BuildContext<'a>,
    widget: &'a S::Widget,
    handle: StateHandle<S>,
}

impl<'a, S: State> BuildScope<'a, S> {
    /// Application context.
    pub fn app(&mut self) -> &mut AppContext {
        self.app
    }

    /// Build context of this widget.
    pub fn context(&self) -> &BuildContext<'a> {
        self.context
    }

    /// Current widget configuration.
    pub fn widget(&self) -> &S::Widget {
        self.widget
    }

    /// Handle for mutating this state from callbacks.
    pub fn handle(&self) -> StateHandle<S> {
        self.handle.clone()
    }
}

/// Adapts a [`StatefulWidget`] into a [`Widget`].
#[derive(Debug, Clone)]
pub struct Stateful<W>(pub W);

impl<W: StatefulWidget> Widget for Stateful<W> {
    type Render = StatefulRenderObject<W>;

    fn create_render_object(&self) -> Self::Render {
        StatefulRenderObject::new(self.0.clone())
    }

    fn update(&self, render: &mut Self::Render) {
        render.widget = self.0.clone();
        render.state.mark_rebuild();
    }
}

type ChildOf<W> = <<W as StatefulWidget>::State as State>::Child;

/// Render object behind [`Stateful`].
pub struct StatefulRenderObject<W: StatefulWidget> {
    state: RenderState,
    widget: W,
    cell: Rc<StateCell<W::State>>,
    initialized: bool,
    slots: BuildSlots<ChildOf<W>>,
    child: Option<<ChildOf<W> as Widget>::Render>,
}

impl<W: StatefulWidget> StatefulRenderObject<W> {
    fn new(widget: W) -> Self {
        let cell = Rc::new(StateCell::new(widget.create_state()));
        let mut state = RenderState::new();
        state.mark_rebuild();
        Self {
            state,
            widget,
            cell,
            initialized: false,
            slots: BuildSlots::new(),
            child: None,
        }
    }

    /// Handle to this object's state.
    pub fn handle(&self) -> StateHandle<W::State> {
        StateHandle::new(&self.cell)
    }

    /// Built child render object, once built.
    pub fn child(&self) -> Option<&<ChildOf<W> as Widget>::Render> {
        self.child.as_ref()
    }

    fn run_build(&mut self, app: &mut AppContext, build: &BuildContext<'_>) {
        let handle = StateHandle::new(&self.cell);
        self.cell.apply_pending();

        if !self.initialized {
            self.initialized = true;
            let mut scope = BuildScope {
                app: &mut *app,
                context: build,
                widget: &self.widget,
                handle: handle.clone(),
            };
            match self.cell.state.try_borrow_mut() {
                Ok(mut state) => state.init(&mut scope),
                Err(_) => tracing::warn!(id = self.state.id(), "state busy during init"),
            }
            self.cell.apply_pending();
        }

        let built = {
            let Ok(state) = self.cell.state.try_borrow() else {
                tracing::warn!(id = self.state.id(), "state busy during build");
                self.state.mark_rebuild();
                return;
            };
            let mut scope = BuildScope {
                app,
                context: build,
                widget: &self.widget,
                handle,
            };
            state.build(&mut scope)
        };
        self.slots.apply(built, &mut self.child);
    }
}

impl<W: StatefulWidget> RenderObject for StatefulRenderObject<W> {
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

    fn rebuild(&mut self, app: &mut AppContext, build: &BuildContext<'_>) {
        let requested = self.state.take_rebuild();
        let changed = self.cell.take_dirty();
        if requested || changed {
            self.run_build(app, build);
        }
        let inner = build.with_state(self.cell.clone());
        if let Some(child) = self.child.as_mut() {
            child.rebuild(app, &inner);
        }
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
