//! Widgets: cheap immutable descriptions of the tree.
//!
//! A [`Widget`] is rebuilt freely on every state change. The first time a
//! widget appears at a position it creates its render object; afterwards a
//! new widget of the same type only [`Widget::update`]s the existing object,
//! which keeps its layout and paint state and marks just what changed.

use crate::render::RenderObject;

/// Immutable description of a render object.
pub trait Widget: 'static {
    /// Render object this widget creates and updates.
    type Render: RenderObject;

    /// Create the render object for the first appearance.
    fn create_render_object(&self) -> Self::Render;

    /// Bring an existing render object in line with this description,
    /// marking layout or paint only where something differs.
    fn update(&self, render: &mut Self::Render);
}

/// Two build result slots that alternate between rebuilds.
///
/// The fresh result lands in the inactive slot, updates (or creates) the
/// child render object, and only then is the previous result dropped.
#[derive(Debug)]
pub struct BuildSlots<W> {
    slots: [Option<W>; 2],
    current: usize,
}

impl<W: Widget> BuildSlots<W> {
    /// Both slots empty.
    pub fn new() -> Self {
        Self {
            slots: [None, None],
            current: 0,
        }
    }

    /// Most recent build result.
    pub fn current(&self) -> Option<&W> {
        self.slots.get(self.current).and_then(Option::as_ref)
    }

    /// Install `built` and reconcile `child` against it.
    pub fn apply(&mut self, built: W, child: &mut Option<W::Render>) {
        let next = 1usize.saturating_sub(self.current);
        let [first, second] = &mut self.slots;
        let (fresh, previous) = if next == 0 {
            (first, second)
        } else {
            (second, first)
        };
        let widget = fresh.insert(built);
        match child {
            Some(render) => widget.update(render),
            None => *child = Some(widget.create_render_object()),
        }
        *previous = None;
        self.current = next;
    }
}

impl<W: Widget> Default for BuildSlots<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconcile a list of child render objects against fresh widgets, by
/// position.
///
/// Children at positions present in both are updated in place. Surplus
/// children are dropped, missing ones created. Returns `true` if the count
/// changed, in which case the caller must mark itself for layout and a full
/// draw.
pub fn update_children<W: Widget>(children: &mut Vec<W::Render>, widgets: &[W]) -> bool {
    let before = children.len();
    children.truncate(widgets.len());
    for (render, widget) in children.iter_mut().zip(widgets) {
        widget.update(render);
    }
    if let Some(extra) = widgets.get(before..) {
        children.extend(extra.iter().map(|w| w.create_render_object()));
    }
    children.len() != before
}
