//! Build context: the chain of enclosing stateful widgets.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::stateful::{StateCell, StateHandle};

/// Passed down the tree during rebuild. Each stateful ancestor pushes a link
/// holding its state, so descendants can find it with
/// [`BuildContext::find_state`].
#[derive(Clone, Default)]
pub struct BuildContext<'a> {
    parent: Option<&'a BuildContext<'a>>,
    state: Option<Rc<dyn Any>>,
}

impl BuildContext<'static> {
    /// Context at the root of the tree.
    pub fn root() -> Self {
        Self {
            parent: None,
            state: None,
        }
    }
}

impl<'a> BuildContext<'a> {
    /// Child context carrying `state`.
    pub(crate) fn with_state(&'a self, state: Rc<dyn Any>) -> BuildContext<'a> {
        BuildContext {
            parent: Some(self),
            state: Some(state),
        }
    }

    /// Nearest enclosing stateful widget whose state is `S`.
    pub fn find_state<S: 'static>(&self) -> Option<StateHandle<S>> {
        let mut link = Some(self);
        while let Some(ctx) = link {
            if let Some(state) = &ctx.state {
                if let Ok(cell) = Rc::clone(state).downcast::<StateCell<S>>() {
                    return Some(StateHandle::new(&cell));
                }
            }
            link = ctx.parent;
        }
        None
    }

    /// Number of stateful ancestors.
    pub fn depth(&self) -> usize {
        let mut depth = 0usize;
        let mut link = Some(self);
        while let Some(ctx) = link {
            if ctx.state.is_some() {
                depth = depth.saturating_add(1);
            }
            link = ctx.parent;
        }
        depth
    }
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("depth", &self.depth())
            .finish()
    }
}
