//! Input decoding for e-ink tablets.
//!
//! Turns raw kernel input reports into normalized touch, pen and key events
//! and recognizes multi-finger gestures.
//!
//! # Layers
//!
//! - [`raw`]: report triples and the codes the decoders understand.
//! - [`device`]: one decoder per device class (touch, pen, key).
//! - [`manager`]: multiplexes devices and provides the blocking
//!   [`InputSource::wait_for_input`] the frame loop sleeps in.
//! - [`gesture`]: tap/swipe/pinch recognition over touch events.
//!
//! # Example
//!
//! ```
//! use eink_input::raw::{RawEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_TRACKING_ID};
//! use eink_input::{Capabilities, Event, InputManager, InputSource, Transform};
//!
//! let mut input = InputManager::new();
//! let touch = input.open(Capabilities::TOUCH, Transform::IDENTITY);
//!
//! touch.send_all(&[
//!     RawEvent::abs(ABS_MT_TRACKING_ID, 1),
//!     RawEvent::abs(ABS_MT_POSITION_X, 300),
//!     RawEvent::abs(ABS_MT_POSITION_Y, 400),
//!     RawEvent::syn(),
//! ])?;
//!
//! let events = input.wait_for_input(None)?;
//! assert!(matches!(events.as_slice(), [Event::Touch(_)]));
//! # Ok::<(), eink_input::InputError>(())
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod gesture;
pub mod manager;
pub mod raw;

pub use config::GestureConfig;
pub use device::{Decoder, DeviceClass, KeyDecoder, PenDecoder, SlotMask, TouchDecoder};
pub use error::InputError;
pub use event::{
    Event, KeyEvent, KeyState, PenEvent, PenPhase, TouchEvent, TouchPhase, Transform, MAX_SLOTS,
};
pub use gesture::{
    Gesture, GestureController, Pinch, PinchDirection, Swipe, SwipeDirection, Tap,
};
pub use manager::{DeviceId, InputManager, InputSource, ReportSender, Waker};
pub use raw::{Capabilities, RawEvent};
