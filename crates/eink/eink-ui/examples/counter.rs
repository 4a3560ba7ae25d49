//! Counter Demo
//!
//! Runs a stateful counter on a headless display. A background thread plays
//! the part of the kernel: it taps the button twice, presses volume up once
//! and finally the power key, which quits.
//!
//! ```bash
//! RUST_LOG=eink_ui=debug cargo run -p eink-ui --example counter
//! ```

use std::thread;
use std::time::Duration;

use eink_input::raw::{
    RawEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_TRACKING_ID, TRACKING_ID_NONE,
};
use eink_input::{Capabilities, InputManager, ReportSender, Transform};
use eink_ui::display::MemoryDisplay;
use eink_ui::widgets::{button, Center, Flex, GestureDetector, Gestures, Text};
use eink_ui::{App, BuildScope, DynamicWidget, State, Stateful, StatefulWidget, WidgetExt};
use embedded_graphics::prelude::Size;
use tracing_subscriber::EnvFilter;

const KEY_VOLUMEUP: u16 = 115;
const KEY_POWER: u16 = 116;

#[derive(Clone)]
struct Counter;

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
    type Child = GestureDetector<Center<Flex<DynamicWidget>>>;

    fn build(&self, scope: &mut BuildScope<'_, Self>) -> Self::Child {
        let on_tap = scope.handle();
        let on_key = scope.handle();

        let page = Center::new(
            Flex::column(vec![
                Text::new(format!("count {}", self.count)).into_dynamic(),
                button("+1", move |_| {
                    on_tap.set_state(|s| s.count += 1);
                })
                .into_dynamic(),
            ])
            .gap(4),
        );

        GestureDetector::new(
            page,
            Gestures::new().on_key_down(move |code, app| match code {
                KEY_VOLUMEUP => {
                    on_key.set_state(|s| s.count += 1);
                }
                KEY_POWER => app.stop(),
                _ => {}
            }),
        )
    }
}

fn tap(touch: &ReportSender, x: i32, y: i32) -> Result<(), eink_input::InputError> {
    touch.send_all(&[
        RawEvent::abs(ABS_MT_TRACKING_ID, 1),
        RawEvent::abs(ABS_MT_POSITION_X, x),
        RawEvent::abs(ABS_MT_POSITION_Y, y),
        RawEvent::syn(),
    ])?;
    touch.send_all(&[RawEvent::abs(ABS_MT_TRACKING_ID, TRACKING_ID_NONE), RawEvent::syn()])
}

fn press(keys: &ReportSender, code: u16) -> Result<(), eink_input::InputError> {
    keys.send_all(&[RawEvent::key(code, 1), RawEvent::syn()])?;
    keys.send_all(&[RawEvent::key(code, 0), RawEvent::syn()])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut display = MemoryDisplay::new(Size::new(300, 200));
    let mut input = InputManager::new();
    let touch = input.open(Capabilities::TOUCH, Transform::IDENTITY);
    let keys = input.open(Capabilities::KEYS, Transform::IDENTITY);

    // "count 0" is 63x18 and the button 28x28, 4 px apart, centered on
    // 300x200: the button spans (118, 97) to (146, 125).
    let script = thread::spawn(move || -> Result<(), eink_input::InputError> {
        let pause = || thread::sleep(Duration::from_millis(50));
        pause();
        tap(&touch, 132, 111)?;
        pause();
        tap(&touch, 132, 111)?;
        pause();
        press(&keys, KEY_VOLUMEUP)?;
        pause();
        press(&keys, KEY_POWER)
    });

    let mut app = App::new(Stateful(Counter));
    app.run(&mut display, &mut input)?;
    script.join().map_err(|_| "input script panicked")??;

    let refreshes = display.submitted().len();
    tracing::info!(
        frames = app.context().frame(),
        refreshes,
        "counter finished"
    );
    for region in display.submitted() {
        println!(
            "{:>4}x{:<4} at ({:>3}, {:>3})  {:?}",
            region.rect.size.width,
            region.rect.size.height,
            region.rect.top_left.x,
            region.rect.top_left.y,
            region.waveform
        );
    }
    Ok(())
}
