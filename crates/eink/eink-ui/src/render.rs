//! Render object protocol.
//!
//! Render objects form the persistent tree behind the widgets. Each frame
//! the tree is walked in fixed phases:
//!
//! 1. **rebuild**: composite objects re-run their build functions.
//! 2. **layout**: sizes flow up from constraints flowing down.
//! 3. **cleanup**: objects that will be fully repainted erase their old area.
//! 4. **draw**: dirty objects paint and report the area they touched.
//! 5. **reset**: per-frame caches are dropped.
//!
//! # Dirty state
//!
//! Every object carries a [`PaintState`] that only escalates between draws
//! (`Clean` -> `Partial` -> `Full`) plus a layout flag and a rebuild flag.
//! Whether a subtree needs layout or drawing is the OR over its nodes; the
//! answer is cached per frame so repeated queries are cheap.
//!
//! # Implementing
//!
//! An implementation provides [`RenderObject::state`],
//! [`RenderObject::state_mut`], [`RenderObject::do_layout`] and
//! [`RenderObject::do_draw`], and overrides the visitors if it has children.
//! The provided methods implement caching, dirty propagation and the
//! contract checks.

use std::any::Any;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use eink_input::Event;
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::build::BuildContext;
use crate::canvas::{Canvas, BACKGROUND};
use crate::context::AppContext;
use crate::geometry::{self, Constraints, UNBOUNDED};
use crate::region::{UpdateRegion, Waveform};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// How much of an object must be repainted at the next draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaintState {
    /// Nothing to repaint.
    Clean,
    /// Content changed inside an unchanged frame.
    Partial,
    /// Everything, including the area the object covered before.
    Full,
}

/// Bookkeeping shared by every render object.
#[derive(Debug)]
pub struct RenderState {
    id: u64,
    rect: Rectangle,
    size: Size,
    constraints: Option<Constraints>,
    paint: PaintState,
    needs_layout: bool,
    needs_rebuild: bool,
    layout_cache: Cell<Option<bool>>,
    draw_cache: Cell<Option<bool>>,
}

impl RenderState {
    /// Fresh state: needs layout and a full draw.
    pub fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(id, "render object created");
        Self {
            id,
            rect: Rectangle::zero(),
            size: Size::zero(),
            constraints: None,
            paint: PaintState::Full,
            needs_layout: true,
            needs_rebuild: false,
            layout_cache: Cell::new(None),
            draw_cache: Cell::new(None),
        }
    }

    /// Process-unique id, for logging.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Area painted by the last draw. Zero before the first draw.
    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    /// Size produced by the last layout.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Pending repaint.
    pub fn paint(&self) -> PaintState {
        self.paint
    }

    /// Returns `true` if the pending repaint is [`PaintState::Full`].
    pub fn is_full_draw(&self) -> bool {
        self.paint == PaintState::Full
    }

    /// Returns `true` if this object itself asked for a rebuild.
    pub fn wants_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Escalate this object's own paint state. Never downgrades.
    pub fn mark_paint(&mut self, full: bool) {
        let requested = if full {
            PaintState::Full
        } else {
            PaintState::Partial
        };
        self.paint = self.paint.max(requested);
        self.draw_cache.set(None);
    }

    /// Flag this object's own layout as stale.
    pub fn mark_layout(&mut self) {
        self.needs_layout = true;
        self.layout_cache.set(None);
    }

    /// Flag this object for rebuild.
    pub fn mark_rebuild(&mut self) {
        self.needs_rebuild = true;
    }

    /// Clear and return the rebuild flag.
    pub fn take_rebuild(&mut self) -> bool {
        std::mem::replace(&mut self.needs_rebuild, false)
    }

    /// Forget the painted area.
    pub fn clear_rect(&mut self) {
        self.rect = Rectangle::zero();
    }

    fn clear_caches(&self) {
        self.layout_cache.set(None);
        self.draw_cache.set(None);
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RenderState {
    fn drop(&mut self) {
        tracing::trace!(id = self.id, "render object dropped");
    }
}

/// Upcast to [`Any`] for downcasting trait objects.
pub trait AsAny: Any {
    /// `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A node of the persistent render tree. See the module docs.
pub trait RenderObject: AsAny {
    /// Shared bookkeeping.
    fn state(&self) -> &RenderState;

    /// Shared bookkeeping, mutably.
    fn state_mut(&mut self) -> &mut RenderState;

    /// Compute a size within `constraints`, laying out children as needed.
    fn do_layout(&mut self, constraints: Constraints) -> Size;

    /// Paint into `rect` and return the area that needs refreshing.
    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion;

    /// Re-run this object's build step. Only composite objects override it.
    fn do_rebuild(&mut self, _app: &mut AppContext, _build: &BuildContext<'_>) {}

    /// Visit direct children.
    fn visit_children(&self, _visitor: &mut dyn FnMut(&dyn RenderObject)) {}

    /// Visit direct children mutably.
    fn visit_children_mut(&mut self, _visitor: &mut dyn FnMut(&mut dyn RenderObject)) {}

    /// React to an input event. The default forwards pointer events to the
    /// children whose last painted area contains the location and key events
    /// to every child.
    fn handle_input(&mut self, event: &Event, app: &mut AppContext) {
        dispatch_to_children(self, event, app);
    }

    /// Erase areas that will be fully repainted this frame.
    fn cleanup(&mut self, canvas: &mut dyn Canvas) -> UpdateRegion {
        cleanup_default(self, canvas)
    }

    /// Lay out with caching.
    ///
    /// Re-runs [`RenderObject::do_layout`] only if the subtree is dirty or
    /// `constraints` differ from the last call. A size change marks the
    /// object for a full draw.
    ///
    /// # Panics
    ///
    /// Panics if the produced size is unbounded or outside `constraints`.
    fn layout(&mut self, constraints: Constraints) -> Size {
        let same_constraints = self.state().constraints == Some(constraints);
        if same_constraints && !self.needs_layout() {
            return self.state().size;
        }

        let size = self.do_layout(constraints);
        assert!(
            size.width != UNBOUNDED && size.height != UNBOUNDED,
            "layout produced an unbounded size {size:?}"
        );
        assert!(
            constraints.contains(size),
            "layout produced {size:?} outside {constraints:?}"
        );

        let resized = size != self.state().size;
        let state = self.state_mut();
        state.size = size;
        state.constraints = Some(constraints);
        state.needs_layout = false;
        state.layout_cache.set(Some(false));
        if resized {
            self.mark_needs_draw(true);
        }
        size
    }

    /// Draw if anything in the subtree is dirty.
    fn draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        if !self.needs_draw() {
            return UpdateRegion::default();
        }
        self.state_mut().rect = rect;
        let region = self.do_draw(rect, canvas);
        let state = self.state_mut();
        state.paint = PaintState::Clean;
        state.draw_cache.set(None);
        region
    }

    /// Run pending build steps in this subtree, top-down.
    fn rebuild(&mut self, app: &mut AppContext, build: &BuildContext<'_>) {
        if self.state_mut().take_rebuild() {
            self.do_rebuild(app, build);
        }
        self.visit_children_mut(&mut |child| child.rebuild(&mut *app, build));
    }

    /// Drop per-frame caches in this subtree.
    fn reset(&mut self) {
        self.state().clear_caches();
        self.visit_children_mut(&mut |child| child.reset());
    }

    /// Returns `true` if anything in the subtree needs layout. Cached until
    /// the next [`RenderObject::reset`] or mark.
    fn needs_layout(&self) -> bool {
        if let Some(cached) = self.state().layout_cache.get() {
            return cached;
        }
        let mut dirty = self.state().needs_layout;
        if !dirty {
            self.visit_children(&mut |child| dirty = dirty || child.needs_layout());
        }
        self.state().layout_cache.set(Some(dirty));
        dirty
    }

    /// Returns `true` if anything in the subtree needs drawing. Cached until
    /// the next [`RenderObject::reset`] or mark.
    fn needs_draw(&self) -> bool {
        if let Some(cached) = self.state().draw_cache.get() {
            return cached;
        }
        let mut dirty = self.state().paint != PaintState::Clean;
        if !dirty {
            self.visit_children(&mut |child| dirty = dirty || child.needs_draw());
        }
        self.state().draw_cache.set(Some(dirty));
        dirty
    }

    /// Flag this subtree's layout as stale.
    fn mark_needs_layout(&mut self) {
        self.state_mut().mark_layout();
        self.visit_children_mut(&mut |child| child.mark_needs_layout());
    }

    /// Escalate the paint state of this subtree.
    fn mark_needs_draw(&mut self, full: bool) {
        self.state_mut().mark_paint(full);
        self.visit_children_mut(&mut |child| child.mark_needs_draw(full));
    }

    /// Flag this object for rebuild on the next frame.
    fn mark_needs_rebuild(&mut self) {
        self.state_mut().mark_rebuild();
    }

    /// Forget painted areas in this subtree so nothing is erased on its
    /// behalf.
    fn invalidate_rects(&mut self) {
        self.state_mut().clear_rect();
        self.visit_children_mut(&mut |child| child.invalidate_rects());
    }

    /// Area painted by the last draw.
    fn rect(&self) -> Rectangle {
        self.state().rect()
    }

    /// Size produced by the last layout.
    fn size(&self) -> Size {
        self.state().size()
    }
}

/// Default cleanup: a fully dirty object erases its previous area with the
/// fast black and white waveform, anything else asks its children.
pub fn cleanup_default<R: RenderObject + ?Sized>(
    node: &mut R,
    canvas: &mut dyn Canvas,
) -> UpdateRegion {
    if node.state().is_full_draw() {
        let rect = node.state().rect();
        if geometry::is_empty(&rect) {
            return UpdateRegion::default();
        }
        canvas.fill_rect(rect, BACKGROUND);
        return UpdateRegion::with_waveform(rect, Waveform::DU);
    }
    let mut region = UpdateRegion::default();
    node.visit_children_mut(&mut |child| region |= child.cleanup(&mut *canvas));
    region
}

/// Default input routing. See [`RenderObject::handle_input`].
pub fn dispatch_to_children<R: RenderObject + ?Sized>(
    node: &mut R,
    event: &Event,
    app: &mut AppContext,
) {
    let location = event.location();
    node.visit_children_mut(&mut |child| {
        let hit = location.map_or(true, |p| geometry::contains(&child.rect(), p));
        if hit {
            child.handle_input(event, &mut *app);
        }
    });
}
