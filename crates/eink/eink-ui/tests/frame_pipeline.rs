//! Whole frames through [`App`] on a headless display.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use eink_input::{
    DeviceClass, Event, InputError, InputManager, InputSource, TouchEvent, TouchPhase, Transform,
};
use eink_ui::display::MemoryDisplay;
use eink_ui::widgets::{
    button, Border, Center, Colored, Flex, Navigator, NavigatorHandle, OverlayEntry, Sized, Stack, Text,
};
use eink_ui::{
    App, AppContext, BuildContext, BuildScope, RenderObject, State, StateHandle, Stateful,
    StatefulWidget, Stateless, StatelessWidget, Waveform, WidgetExt,
};
use embedded_graphics::pixelcolor::{Gray4, GrayColor};
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

// ============================================================================
// Helpers
// ============================================================================

/// Replays scripted batches, then reports disconnection.
struct Scripted {
    batches: VecDeque<Vec<Event>>,
}

impl Scripted {
    fn new(batches: impl IntoIterator<Item = Vec<Event>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }

    fn idle() -> Self {
        Self::new([vec![]])
    }
}

impl InputSource for Scripted {
    fn wait_for_input(&mut self, _timeout: Option<Duration>) -> Result<Vec<Event>, InputError> {
        self.batches.pop_front().ok_or(InputError::Disconnected)
    }
}

fn tap(x: i32, y: i32) -> Vec<Event> {
    let at = Point::new(x, y);
    vec![
        TouchEvent::new(TouchPhase::Down, 0, at).into(),
        TouchEvent::new(TouchPhase::Up, 0, at).into(),
    ]
}

fn screen(width: u32, height: u32) -> Rectangle {
    Rectangle::new(Point::zero(), Size::new(width, height))
}

// ============================================================================
// Stateful counter
// ============================================================================

#[derive(Clone)]
struct Counter {
    handle: Rc<RefCell<Option<StateHandle<CounterState>>>>,
}

struct CounterState {
    count: u32,
}

impl StatefulWidget for Counter {
    type State = CounterState;

    fn create_state(&self) -> CounterState {
        CounterState { count: 0 }
    }
}

impl State for CounterState {
    type Widget = Counter;
    type Child = Flex<Text>;

    fn init(&mut self, scope: &mut BuildScope<'_, Self>) {
        *scope.widget().handle.borrow_mut() = Some(scope.handle());
    }

    fn build(&self, _scope: &mut BuildScope<'_, Self>) -> Flex<Text> {
        Flex::column(vec![
            Text::new("title"),
            Text::new(format!("count {}", self.count)),
        ])
    }
}

fn counter() -> (Counter, Rc<RefCell<Option<StateHandle<CounterState>>>>) {
    let handle = Rc::new(RefCell::new(None));
    (
        Counter {
            handle: handle.clone(),
        },
        handle,
    )
}

#[test]
fn test_state_change_refreshes_only_changed_text() {
    let (widget, handle) = counter();
    let mut display = MemoryDisplay::new(Size::new(200, 100));
    let mut app = App::new(Stateful(widget));

    let first = app.render_frame(&mut display).unwrap();
    assert!(!first.is_empty());
    app.process_input(&mut Scripted::idle()).unwrap();

    let handle = handle.borrow().clone().unwrap();
    assert!(handle.set_state(|s| s.count += 1));

    let region = app.render_frame(&mut display).unwrap();
    // "count 1" is 7 glyphs of 9x18, below the 18 px title
    let counter_rect = Rectangle::new(Point::new(0, 18), Size::new(63, 18));
    assert_eq!(region.rect, counter_rect);
    assert_eq!(region.waveform, Waveform::GC16Fast);
    assert!(display.frame().inked_pixels(&counter_rect) > 0);
    assert_eq!(display.submitted().len(), 2);
}

#[test]
fn test_state_survives_parent_update() {
    let (widget, handle) = counter();
    let mut display = MemoryDisplay::new(Size::new(200, 100));
    let mut app = App::new(Stateful(widget.clone()));
    app.render_frame(&mut display).unwrap();
    app.process_input(&mut Scripted::idle()).unwrap();

    let state = handle.borrow().clone().unwrap();
    state.set_state(|s| s.count = 5);
    app.render_frame(&mut display).unwrap();
    app.process_input(&mut Scripted::idle()).unwrap();

    app.set_root(&Stateful(widget));
    app.render_frame(&mut display).unwrap();

    assert!(state.is_alive());
    assert_eq!(state.read(|s| s.count), Some(5));
    let texts = app.root().child().unwrap().children();
    assert_eq!(texts[1].text(), "count 5");
}

// ============================================================================
// Dynamic type swap
// ============================================================================

#[derive(Clone)]
struct Swap {
    show_text: bool,
}

impl StatelessWidget for Swap {
    type Child = eink_ui::DynamicWidget;

    fn build(&self, _app: &mut AppContext, _context: &BuildContext<'_>) -> Self::Child {
        if self.show_text {
            Text::new("hello").into_dynamic()
        } else {
            Sized::new(Size::new(20, 10), Colored::new(Gray4::BLACK)).into_dynamic()
        }
    }
}

#[test]
fn test_type_swap_erases_previous_area() {
    let mut display = MemoryDisplay::new(Size::new(100, 50));
    let mut app = App::new(Center::new(Stateless(Swap { show_text: true })));
    app.render_frame(&mut display).unwrap();
    app.process_input(&mut Scripted::idle()).unwrap();

    let text_rect = Rectangle::new(Point::new(27, 16), Size::new(45, 18));
    assert!(display.frame().inked_pixels(&text_rect) > 0);

    app.set_root(&Center::new(Stateless(Swap { show_text: false })));
    let region = app.render_frame(&mut display).unwrap();

    let block = Rectangle::new(Point::new(40, 20), Size::new(20, 10));
    assert_eq!(region.rect, text_rect);
    assert_eq!(region.waveform, Waveform::GC16Fast);
    // Only the new block is left inside the old text area
    assert_eq!(display.frame().inked_pixels(&text_rect), 200);
    assert_eq!(display.frame().inked_pixels(&block), 200);
}

// ============================================================================
// Composites repainting clean children
// ============================================================================

#[test]
fn test_border_color_change_repaints_child() {
    let mut display = MemoryDisplay::new(Size::new(40, 40));
    let mut app = App::new(Border::new(2, Colored::new(Gray4::BLACK)));
    app.render_frame(&mut display).unwrap();
    app.process_input(&mut Scripted::idle()).unwrap();

    let interior = Rectangle::new(Point::new(2, 2), Size::new(36, 36));
    assert_eq!(display.frame().inked_pixels(&interior), 1296);

    app.set_root(&Border::new(2, Colored::new(Gray4::BLACK)).color(Gray4::new(8)));
    let region = app.render_frame(&mut display).unwrap();

    assert_eq!(region.rect, screen(40, 40));
    assert_eq!(display.frame().inked_pixels(&interior), 1296);
    assert_eq!(display.frame().pixel(Point::zero()), Some(Gray4::new(8)));
}

#[test]
fn test_shrinking_overlay_text_restores_layer_below() {
    let layers = |label: &str| {
        Stack::new(vec![
            Colored::new(Gray4::BLACK).into_dynamic(),
            Center::new(Text::new(label)).into_dynamic(),
        ])
    };
    let mut display = MemoryDisplay::new(Size::new(120, 40));
    let mut app = App::new(layers("wide text"));
    app.render_frame(&mut display).unwrap();
    app.process_input(&mut Scripted::idle()).unwrap();

    // Left part of the old 81x18 text area at (19, 11), clear of the new "x"
    let vacated = Rectangle::new(Point::new(20, 11), Size::new(30, 18));
    assert!(display.frame().inked_pixels(&vacated) < 540);

    app.set_root(&layers("x"));
    let region = app.render_frame(&mut display).unwrap();

    assert_eq!(region.rect, screen(120, 40));
    assert_eq!(display.frame().inked_pixels(&vacated), 540);
}

// ============================================================================
// Timers and notifications
// ============================================================================

#[test]
fn test_repeating_timer_drives_loop_until_stop() {
    let mut display = MemoryDisplay::new(Size::new(10, 10));
    let mut input = InputManager::new();
    let _touch = input.open_class(DeviceClass::Touch, Transform::IDENTITY);

    let ticks = Rc::new(Cell::new(0u32));
    let counter = ticks.clone();
    let mut app = App::new(Text::new(""));
    app.context_mut().add_timer(
        Duration::ZERO,
        Some(Duration::from_millis(1)),
        move |ctx| {
            counter.set(counter.get() + 1);
            if counter.get() == 3 {
                ctx.stop();
            }
        },
    );

    app.run(&mut display, &mut input).unwrap();
    assert_eq!(ticks.get(), 3);
    assert!(app.context().frame() >= 3);
}

#[test]
fn test_notification_from_worker_thread_stops_loop() {
    let mut display = MemoryDisplay::new(Size::new(10, 10));
    let mut input = InputManager::new();

    let received = Rc::new(Cell::new(None));
    let sink = received.clone();
    let mut app = App::new(Text::new(""));
    app.context_mut().on_notification(move |value: u32, ctx| {
        sink.set(Some(value));
        ctx.stop();
    });

    let notifier = app.context().notifier::<u32>();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        notifier.notify(7)
    });

    app.run(&mut display, &mut input).unwrap();
    assert!(worker.join().unwrap());
    assert_eq!(received.get(), Some(7));
}

// ============================================================================
// Navigator
// ============================================================================

#[derive(Clone)]
struct Home {
    navigator: Rc<RefCell<Option<NavigatorHandle>>>,
}

impl StatelessWidget for Home {
    type Child = eink_ui::widgets::Button;

    fn build(&self, _app: &mut AppContext, context: &BuildContext<'_>) -> Self::Child {
        let navigator = Navigator::of(context);
        *self.navigator.borrow_mut() = navigator.clone();
        button("open", move |_| {
            if let Some(navigator) = &navigator {
                navigator.push(OverlayEntry::new(Colored::new(Gray4::BLACK)));
            }
        })
    }
}

#[test]
fn test_tap_pushes_page_and_pop_restores_home() {
    let slot = Rc::new(RefCell::new(None));
    let home = Stateless(Home {
        navigator: slot.clone(),
    });
    let mut display = MemoryDisplay::new(Size::new(100, 50));
    let mut app = App::new(Navigator::new(home));

    app.render_frame(&mut display).unwrap();
    let home_ink = display.frame().inked_pixels(&screen(100, 50));
    assert!(home_ink > 0 && home_ink < 5000);

    app.process_input(&mut Scripted::new([tap(50, 25)])).unwrap();
    let pushed = app.render_frame(&mut display).unwrap();
    assert_eq!(pushed.rect, screen(100, 50));
    assert_eq!(app.root().child().unwrap().children().len(), 2);
    assert_eq!(display.frame().inked_pixels(&screen(100, 50)), 5000);

    let navigator = slot.borrow().clone().unwrap();
    assert_eq!(navigator.depth(), Some(2));
    app.process_input(&mut Scripted::idle()).unwrap();
    assert!(navigator.pop());

    let popped = app.render_frame(&mut display).unwrap();
    assert_eq!(popped.rect, screen(100, 50));
    assert_eq!(app.root().child().unwrap().children().len(), 1);
    assert_eq!(display.frame().inked_pixels(&screen(100, 50)), home_ink);
}

#[test]
fn test_root_object_keeps_identity_across_frames() {
    let mut display = MemoryDisplay::new(Size::new(40, 20));
    let mut app = App::new(Text::new("a"));
    app.render_frame(&mut display).unwrap();
    let id = app.root().state().id();

    app.process_input(&mut Scripted::idle()).unwrap();
    app.set_root(&Text::new("b"));
    let region = app.render_frame(&mut display).unwrap();

    assert_eq!(app.root().state().id(), id);
    assert_eq!(app.root().text(), "b");
    assert_eq!(region.rect, screen(40, 20));
}
