//! Layout caching and region merging invariants.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::cell::Cell;
use std::rc::Rc;

use eink_ui::canvas::MemoryCanvas;
use eink_ui::geometry::{self, Constraints, Insets};
use eink_ui::widgets::{Border, Colored, Flex, Padding, Sized, Text, Wrap};
use eink_ui::{
    Canvas, PaintState, RenderObject, RenderState, UpdateFlags, UpdateRegion, Waveform, Widget,
};
use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use proptest::prelude::*;

// ============================================================================
// Counting leaf
// ============================================================================

#[derive(Default)]
struct Counts {
    layouts: Cell<u32>,
    draws: Cell<u32>,
}

#[derive(Clone)]
struct Probe {
    counts: Rc<Counts>,
}

struct ProbeRenderObject {
    state: RenderState,
    counts: Rc<Counts>,
}

impl Widget for Probe {
    type Render = ProbeRenderObject;

    fn create_render_object(&self) -> ProbeRenderObject {
        ProbeRenderObject {
            state: RenderState::new(),
            counts: self.counts.clone(),
        }
    }

    fn update(&self, _render: &mut ProbeRenderObject) {}
}

impl RenderObject for ProbeRenderObject {
    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn do_layout(&mut self, constraints: Constraints) -> Size {
        self.counts.layouts.set(self.counts.layouts.get() + 1);
        constraints.constrain(Size::new(10, 10))
    }

    fn do_draw(&mut self, rect: Rectangle, canvas: &mut dyn Canvas) -> UpdateRegion {
        self.counts.draws.set(self.counts.draws.get() + 1);
        canvas.fill_rect(rect, Gray4::BLACK);
        UpdateRegion::new(rect)
    }
}

fn probe() -> (Padding<Probe>, Rc<Counts>) {
    let counts = Rc::new(Counts::default());
    (
        Padding::all(
            2,
            Probe {
                counts: counts.clone(),
            },
        ),
        counts,
    )
}

#[test]
fn test_clean_tree_is_not_laid_out_or_drawn_again() {
    let (widget, counts) = probe();
    let mut ro = widget.create_render_object();
    let mut canvas = MemoryCanvas::new(Size::new(50, 50));
    let constraints = Constraints::loose(Size::new(50, 50));

    let size = ro.layout(constraints);
    let rect = Rectangle::new(Point::zero(), size);
    assert_eq!(ro.draw(rect, &mut canvas).rect, Rectangle::new(Point::new(2, 2), Size::new(10, 10)));
    ro.reset();

    assert_eq!(ro.layout(constraints), size);
    assert!(ro.draw(rect, &mut canvas).is_empty());
    assert_eq!(counts.layouts.get(), 1);
    assert_eq!(counts.draws.get(), 1);
}

#[test]
fn test_new_constraints_relayout() {
    let (widget, counts) = probe();
    let mut ro = widget.create_render_object();
    let mut canvas = MemoryCanvas::new(Size::new(50, 50));
    let size = ro.layout(Constraints::loose(Size::new(50, 50)));
    ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
    ro.reset();
    assert_eq!(ro.state().paint(), PaintState::Clean);

    assert_eq!(ro.layout(Constraints::tight(Size::new(8, 8))), Size::new(8, 8));
    assert_eq!(counts.layouts.get(), 2);
    // The leaf shrank from 10x10 to 4x4, so it is fully repainted
    assert_eq!(ro.state().paint(), PaintState::Full);
}

#[test]
fn test_dirty_flags_propagate_and_only_escalate() {
    let (widget, counts) = probe();
    let mut ro = widget.create_render_object();
    let mut canvas = MemoryCanvas::new(Size::new(50, 50));
    let size = ro.layout(Constraints::loose(Size::new(50, 50)));
    ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
    ro.reset();
    assert!(!ro.needs_draw());

    ro.mark_needs_draw(true);
    ro.mark_needs_draw(false);
    assert_eq!(ro.state().paint(), PaintState::Full);
    assert!(ro.needs_draw());

    ro.draw(Rectangle::new(Point::zero(), size), &mut canvas);
    assert!(!ro.needs_draw());
    assert_eq!(counts.draws.get(), 2);
}

// ============================================================================
// Generated trees
// ============================================================================

fn constraints() -> impl Strategy<Value = Constraints> {
    (0u32..120, 0u32..120, 0u32..120, 0u32..120).prop_map(|(w, h, dw, dh)| {
        Constraints::new(Size::new(w, h), Size::new(w + dw, h + dh))
    })
}

fn blocks() -> impl Strategy<Value = Vec<Sized<Colored>>> {
    prop::collection::vec((1u32..60, 1u32..60), 0..12).prop_map(|sizes| {
        sizes
            .into_iter()
            .map(|(w, h)| Sized::new(Size::new(w, h), Colored::new(Gray4::BLACK)))
            .collect()
    })
}

fn rect() -> impl Strategy<Value = Rectangle> {
    (-50i32..50, -50i32..50, 0u32..60, 0u32..60)
        .prop_map(|(x, y, w, h)| Rectangle::new(Point::new(x, y), Size::new(w, h)))
}

fn waveform() -> impl Strategy<Value = Waveform> {
    prop_oneof![Just(Waveform::DU), Just(Waveform::GC16Fast), Just(Waveform::GC16)]
}

fn region() -> impl Strategy<Value = UpdateRegion> {
    (rect(), waveform(), 0u8..4).prop_map(|(r, w, bits)| UpdateRegion {
        flags: UpdateFlags::from_bits_truncate(bits),
        ..UpdateRegion::with_waveform(r, w)
    })
}

proptest! {
    #[test]
    fn prop_wrap_in_decorations_respects_constraints(
        c in constraints(),
        children in blocks(),
        pad in 0u32..10,
        border in 0u32..4,
    ) {
        let widget = Padding::new(Insets::all(pad), Border::new(border, Wrap::new(children)));
        let mut ro = widget.create_render_object();
        let size = ro.layout(c);
        prop_assert!(c.contains(size));

        ro.reset();
        prop_assert_eq!(ro.layout(c), size);
        prop_assert!(!ro.needs_layout());
    }

    #[test]
    fn prop_flex_respects_constraints(
        c in constraints(),
        labels in prop::collection::vec("[a-z]{0,8}", 0..6),
        gap in 0u32..8,
    ) {
        let widget = Flex::row(labels.into_iter().map(Text::new).collect()).gap(gap);
        let mut ro = widget.create_render_object();
        let size = ro.layout(c);
        prop_assert!(c.contains(size));
    }

    #[test]
    fn prop_merged_region_covers_both(
        a in rect(),
        b in rect(),
        wa in waveform(),
        wb in waveform(),
    ) {
        let ra = UpdateRegion::with_waveform(a, wa);
        let rb = UpdateRegion::with_waveform(b, wb);
        let merged = ra | rb;
        if !(ra.is_empty() && rb.is_empty()) {
            prop_assert_eq!(merged, rb | ra);
        }

        for (r, w) in [(a, wa), (b, wb)] {
            if !geometry::is_empty(&r) {
                prop_assert_eq!(geometry::union(&merged.rect, &r), merged.rect);
                prop_assert!(merged.waveform >= w);
            }
        }
        if ra.is_empty() && rb.is_empty() {
            prop_assert!(merged.is_empty());
        }
    }

    #[test]
    fn prop_region_merge_is_associative(a in region(), b in region(), c in region()) {
        prop_assert_eq!((a | b) | c, a | (b | c));
    }
}
