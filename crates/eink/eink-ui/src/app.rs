//! Frame driver.
//!
//! [`App`] owns the render tree and the [`AppContext`] and runs the loop one
//! frame at a time:
//!
//! 1. hand queued notifications to their handlers
//! 2. rebuild dirty composites
//! 3. lay out against the display size
//! 4. erase stale areas, then draw
//! 5. submit the merged region, if any
//! 6. wait for input until the next timer is due
//! 7. fire due timers
//! 8. feed touches to the gesture handler, if installed
//! 9. dispatch the remaining events into the tree
//! 10. drop per-frame caches
//!
//! Steps 1 to 5 are [`App::render_frame`], 6 to 10 [`App::process_input`].
//!
//! # Example
//!
//! ```rust
//! use eink_input::InputManager;
//! use eink_ui::display::MemoryDisplay;
//! use eink_ui::widgets::{Center, Text};
//! use eink_ui::App;
//! use embedded_graphics::prelude::Size;
//!
//! let mut display = MemoryDisplay::new(Size::new(200, 100));
//! let mut app = App::new(Center::new(Text::new("hello")));
//!
//! let region = app.render_frame(&mut display)?;
//! assert!(!region.is_empty());
//! assert_eq!(display.submitted().len(), 1);
//!
//! // Nothing changed: nothing submitted
//! let mut input = InputManager::new();
//! app.context_mut().add_timer(std::time::Duration::ZERO, None, |_| {});
//! app.process_input(&mut input)?;
//! app.render_frame(&mut display)?;
//! assert_eq!(display.submitted().len(), 1);
//! # Ok::<(), eink_ui::AppError>(())
//! ```

use std::fmt;
use std::time::Instant;

use eink_input::{Gesture, GestureController, InputSource};
use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;

use crate::build::BuildContext;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::display::DisplayDriver;
use crate::error::AppError;
use crate::geometry::Constraints;
use crate::region::UpdateRegion;
use crate::render::RenderObject;
use crate::widget::Widget;

type GestureHandler = Box<dyn FnMut(Gesture, &mut AppContext)>;

struct Recognizer {
    controller: GestureController,
    handler: GestureHandler,
}

/// A render tree bound to its context. See the module docs.
pub struct App<W: Widget> {
    root: W::Render,
    context: AppContext,
    config: AppConfig,
    recognizer: Option<Recognizer>,
}

impl<W: Widget> App<W> {
    /// Build the render tree for `widget` with the default configuration.
    pub fn new(widget: W) -> Self {
        Self::with_config(widget, AppConfig::DEFAULT)
    }

    /// Build the render tree for `widget`.
    pub fn with_config(widget: W, config: AppConfig) -> Self {
        Self {
            root: widget.create_render_object(),
            context: AppContext::new(),
            config,
            recognizer: None,
        }
    }

    /// Recognize multi-finger gestures and pass them to `handler`.
    ///
    /// Once installed, touch events are consumed by the recognizer and no
    /// longer reach the tree. Pen and key events are unaffected.
    pub fn on_gesture(&mut self, handler: impl FnMut(Gesture, &mut AppContext) + 'static) {
        self.recognizer = Some(Recognizer {
            controller: GestureController::new(self.config.gestures),
            handler: Box::new(handler),
        });
    }

    /// Replace the root widget configuration.
    pub fn set_root(&mut self, widget: &W) {
        widget.update(&mut self.root);
    }

    /// Root render object.
    pub fn root(&self) -> &W::Render {
        &self.root
    }

    /// Application context.
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Application context, mutably.
    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.context
    }

    /// Active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Rebuild, lay out, clean up, draw and submit. Returns the submitted
    /// region, empty if nothing changed.
    pub fn render_frame<D: DisplayDriver>(&mut self, display: &mut D) -> Result<UpdateRegion, AppError> {
        let delivered = self.context.dispatch_notifications();
        if delivered > 0 {
            tracing::trace!(delivered, "notifications dispatched");
        }

        self.root.rebuild(&mut self.context, &BuildContext::root());
        let size = self.root.layout(Constraints::tight(display.size()));

        let canvas = display.canvas();
        let mut region = self.root.cleanup(canvas);
        region |= self.root.draw(Rectangle::new(Point::zero(), size), canvas);

        if !region.is_empty() {
            tracing::debug!(
                frame = self.context.frame(),
                x = region.rect.top_left.x,
                y = region.rect.top_left.y,
                width = region.rect.size.width,
                height = region.rect.size.height,
                waveform = ?region.waveform,
                flags = ?region.flags,
                "submitting update"
            );
            display.submit(&region)?;
        }
        Ok(region)
    }

    /// Wait for input or the next timer, fire timers and dispatch events.
    pub fn process_input<I: InputSource + ?Sized>(&mut self, input: &mut I) -> Result<(), AppError> {
        let timeout = self
            .config
            .wait_timeout(self.context.next_timeout(Instant::now()));
        let events = input.wait_for_input(timeout)?;

        let fired = self.context.check_timers(Instant::now());
        if fired > 0 {
            tracing::trace!(fired, "timers fired");
        }

        let events = match self.recognizer.as_mut() {
            Some(recognizer) => {
                let (gestures, rest) = recognizer.controller.handle_events(&events);
                if let Some(slots) = input.active_slots() {
                    recognizer.controller.sync(slots);
                }
                for gesture in gestures {
                    tracing::debug!(?gesture, "gesture recognized");
                    (recognizer.handler)(gesture, &mut self.context);
                }
                rest
            }
            None => events,
        };

        for event in &events {
            self.root.handle_input(event, &mut self.context);
        }

        self.root.reset();
        self.context.end_frame();
        Ok(())
    }

    /// Run frames until [`AppContext::stop`] is called or a device fails.
    pub fn run<D, I>(&mut self, display: &mut D, input: &mut I) -> Result<(), AppError>
    where
        D: DisplayDriver,
        I: InputSource + ?Sized,
    {
        if let Some(waker) = input.waker() {
            self.context.set_waker(waker);
        }
        let size = display.size();
        tracing::debug!(?size, "frame loop started");
        while !self.context.should_stop() {
            self.render_frame(display)?;
            // A notification handler may have stopped the loop.
            if self.context.should_stop() {
                break;
            }
            self.process_input(input)?;
        }
        tracing::debug!(frames = self.context.frame(), "frame loop stopped");
        Ok(())
    }
}

impl<W: Widget> fmt::Debug for App<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("context", &self.context)
            .field("config", &self.config)
            .field("gestures", &self.recognizer.is_some())
            .finish_non_exhaustive()
    }
}

/// Run `widget` on `display` until stopped.
pub fn run_app<W, D, I>(widget: W, display: &mut D, input: &mut I) -> Result<(), AppError>
where
    W: Widget,
    D: DisplayDriver,
    I: InputSource + ?Sized,
{
    App::new(widget).run(display, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDisplay;
    use crate::region::Waveform;
    use crate::widgets::{Colored, Text};
    use eink_input::{DeviceClass, Event, InputError, InputManager, SlotMask, Transform};
    use eink_input::{TouchEvent, TouchPhase};
    use embedded_graphics::pixelcolor::{Gray4, GrayColor};
    use embedded_graphics::prelude::Size;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    /// Replays scripted batches, then reports disconnection.
    struct Scripted {
        batches: VecDeque<Vec<Event>>,
        slots: Option<SlotMask>,
    }

    impl InputSource for Scripted {
        fn wait_for_input(&mut self, _timeout: Option<Duration>) -> Result<Vec<Event>, InputError> {
            self.batches.pop_front().ok_or(InputError::Disconnected)
        }

        fn active_slots(&self) -> Option<SlotMask> {
            self.slots
        }
    }

    fn touch(phase: TouchPhase, slot: usize, x: i32, y: i32) -> Event {
        TouchEvent::new(phase, slot, Point::new(x, y)).into()
    }

    #[test]
    fn test_first_frame_covers_display() {
        let mut display = MemoryDisplay::new(Size::new(40, 20));
        let mut app = App::new(Colored::new(Gray4::BLACK));
        let region = app.render_frame(&mut display).unwrap();
        assert_eq!(region.rect, Rectangle::new(Point::zero(), Size::new(40, 20)));
        assert_eq!(region.waveform, Waveform::GC16Fast);
        assert_eq!(display.submitted().len(), 1);
    }

    #[test]
    fn test_idle_frame_submits_nothing() {
        let mut display = MemoryDisplay::new(Size::new(40, 20));
        let mut app = App::new(Text::new("x"));
        let mut input = Scripted {
            batches: VecDeque::from([vec![]]),
            slots: None,
        };
        app.render_frame(&mut display).unwrap();
        app.process_input(&mut input).unwrap();
        let region = app.render_frame(&mut display).unwrap();
        assert!(region.is_empty());
        assert_eq!(display.submitted().len(), 1);
        assert_eq!(app.context().frame(), 1);
    }

    #[test]
    fn test_run_stops_on_disconnect() {
        let mut display = MemoryDisplay::new(Size::new(10, 10));
        let mut input = Scripted {
            batches: VecDeque::new(),
            slots: None,
        };
        let result = run_app(Text::new(""), &mut display, &mut input);
        assert!(matches!(result, Err(AppError::Input(InputError::Disconnected))));
    }

    #[test]
    fn test_timer_stops_loop() {
        let mut display = MemoryDisplay::new(Size::new(10, 10));
        let mut input = InputManager::new();
        let _touch = input.open_class(DeviceClass::Touch, Transform::IDENTITY);
        let mut app = App::new(Text::new(""));
        app.context_mut()
            .add_timer(Duration::from_millis(1), None, |ctx| ctx.stop());
        app.run(&mut display, &mut input).unwrap();
        assert!(app.context().should_stop());
    }

    #[test]
    fn test_gesture_handler_consumes_touches() {
        let taps = Rc::new(Cell::new(0usize));
        let counter = taps.clone();
        let mut app = App::new(Text::new(""));
        app.on_gesture(move |gesture, _| {
            if matches!(gesture, Gesture::Tap(_)) {
                counter.set(counter.get() + 1);
            }
        });
        let mut input = Scripted {
            batches: VecDeque::from([vec![
                touch(TouchPhase::Down, 0, 5, 5),
                touch(TouchPhase::Up, 0, 5, 5),
            ]]),
            slots: Some(SlotMask::EMPTY),
        };
        app.process_input(&mut input).unwrap();
        assert_eq!(taps.get(), 1);
    }
}
