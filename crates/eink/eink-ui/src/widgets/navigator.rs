//! Page stack.
//!
//! A [`Navigator`] shows a stack of overlay entries, the last one on top.
//! Widgets below it reach it through their build context with
//! [`Navigator::of`] and push or pop pages from callbacks.

use std::fmt;
use std::rc::Rc;

use crate::build::BuildContext;
use crate::dynamic::DynamicWidget;
use crate::stateful::{BuildScope, State, StateHandle, Stateful, StatefulWidget};
use crate::widget::Widget;
use crate::widgets::Stack;

/// One layer of a [`Navigator`].
#[derive(Clone)]
pub struct OverlayEntry {
    builder: Rc<dyn Fn() -> DynamicWidget>,
}

impl OverlayEntry {
    /// Layer showing `widget`.
    pub fn new<W: Widget + Clone>(widget: W) -> Self {
        Self::builder(move || DynamicWidget::new(widget.clone()))
    }

    /// Layer whose widget is produced by `builder` on every rebuild.
    pub fn builder(builder: impl Fn() -> DynamicWidget + 'static) -> Self {
        Self {
            builder: Rc::new(builder),
        }
    }

    fn build(&self) -> DynamicWidget {
        (self.builder)()
    }
}

impl fmt::Debug for OverlayEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayEntry").finish_non_exhaustive()
    }
}

/// Stack of pages. See the module docs.
#[derive(Debug, Clone)]
pub struct Navigator {
    initial: Vec<OverlayEntry>,
}

impl Navigator {
    /// Navigator starting with `root` as its only page.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<W: Widget + Clone>(root: W) -> Stateful<Self> {
        Self::with_entries(vec![OverlayEntry::new(root)])
    }

    /// Navigator starting with `entries`, bottom first.
    pub fn with_entries(entries: Vec<OverlayEntry>) -> Stateful<Self> {
        Stateful(Self { initial: entries })
    }

    /// Nearest enclosing navigator.
    pub fn of(context: &BuildContext<'_>) -> Option<NavigatorHandle> {
        context.find_state::<NavigatorState>().map(NavigatorHandle)
    }
}

impl StatefulWidget for Navigator {
    type State = NavigatorState;

    fn create_state(&self) -> NavigatorState {
        NavigatorState {
            entries: Vec::new(),
        }
    }
}

/// State of a [`Navigator`].
#[derive(Debug)]
pub struct NavigatorState {
    entries: Vec<OverlayEntry>,
}

impl State for NavigatorState {
    type Widget = Navigator;
    type Child = Stack<DynamicWidget>;

    fn init(&mut self, scope: &mut BuildScope<'_, Self>) {
        self.entries = scope.widget().initial.clone();
    }

    fn build(&self, _scope: &mut BuildScope<'_, Self>) -> Self::Child {
        Stack::new(self.entries.iter().map(OverlayEntry::build).collect())
    }
}

/// Push and pop pages of a [`Navigator`] from callbacks.
#[derive(Debug, Clone)]
pub struct NavigatorHandle(StateHandle<NavigatorState>);

impl NavigatorHandle {
    /// Show `entry` on top. Returns `false` if the navigator is gone.
    pub fn push(&self, entry: OverlayEntry) -> bool {
        self.0.set_state(move |nav| nav.entries.push(entry))
    }

    /// Remove the top page. Returns `false` if the navigator is gone.
    pub fn pop(&self) -> bool {
        self.0.set_state(|nav| {
            if nav.entries.pop().is_none() {
                tracing::warn!("pop on an empty navigator");
            }
        })
    }

    /// Number of pages, `None` if the navigator is gone or busy.
    pub fn depth(&self) -> Option<usize> {
        self.0.read(|nav| nav.entries.len())
    }
}
