//! Multi-finger gesture recognition.
//!
//! [`GestureController`] consumes touch events and recognizes taps, swipes
//! and pinches. It tracks one record per slot (active flag, start and
//! current position) and moves between two states:
//!
//! - **Idle**: no multi-finger gesture in progress. Lifting the last finger
//!   produces a [`Tap`] carrying the number of fingers that were down when
//!   the latest finger landed.
//! - **Tracking**: enough fingers moved past the start threshold and the
//!   movement was classified. Lifting the last finger produces that gesture.
//!
//! Either way the controller returns to Idle once no finger is down.
//!
//! # Classification
//!
//! When any active finger's displacement reaches the threshold on either
//! axis while at least [`GestureConfig::min_fingers`] are down, the per-slot
//! displacements are examined. If they all agree in sign on X (all
//! non-negative or all non-positive), or all agree in sign on Y, the
//! movement is a swipe; otherwise it is a pinch. A swipe's direction comes
//! from the triggering finger: horizontal if `|dx| > |dy|`, else vertical. A
//! pinch is `Out` when the fingers spread further from their centroid than
//! where they started, `In` otherwise.

use embedded_graphics::prelude::Point;

use crate::config::GestureConfig;
use crate::device::SlotMask;
use crate::event::{Event, TouchEvent, TouchPhase, MAX_SLOTS};

/// Swipe direction in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwipeDirection {
    /// Towards smaller X.
    Left,
    /// Towards larger X.
    Right,
    /// Towards smaller Y.
    Up,
    /// Towards larger Y.
    Down,
}

/// Pinch direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinchDirection {
    /// Fingers moving together.
    In,
    /// Fingers moving apart.
    Out,
}

/// Touch released without a multi-finger gesture starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    /// Fingers down right after the latest touch-down.
    pub fingers: usize,
    /// Where the last lifted finger first touched.
    pub position: Point,
}

/// Multi-finger movement in one common direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
    /// Direction of the triggering finger.
    pub direction: SwipeDirection,
    /// Average start position of the fingers down at classification.
    pub start_position: Point,
    /// Where the last finger lifted.
    pub end_position: Point,
    /// Fingers down at classification.
    pub fingers: usize,
}

/// Multi-finger movement towards or away from a common center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pinch {
    /// Spread direction.
    pub direction: PinchDirection,
    /// Average start position of the fingers down at classification.
    pub position: Point,
    /// Fingers down at classification.
    pub fingers: usize,
}

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// See [`Tap`].
    Tap(Tap),
    /// See [`Swipe`].
    Swipe(Swipe),
    /// See [`Pinch`].
    Pinch(Pinch),
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotTrack {
    active: bool,
    start: Point,
    current: Point,
}

impl SlotTrack {
    fn delta(&self) -> Point {
        self.current - self.start
    }
}

/// Touch gesture state machine. See the module docs.
#[derive(Debug, Clone)]
pub struct GestureController {
    config: GestureConfig,
    slots: [SlotTrack; MAX_SLOTS],
    tap_fingers: usize,
    in_progress: Option<Gesture>,
}

impl GestureController {
    /// Create an idle controller.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            slots: [SlotTrack::default(); MAX_SLOTS],
            tap_fingers: 0,
            in_progress: None,
        }
    }

    /// Active tuning.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Fingers currently down.
    pub fn active_fingers(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Gesture classified but not yet finished, if any.
    pub fn in_progress(&self) -> Option<&Gesture> {
        self.in_progress.as_ref()
    }

    /// Returns `true` while no multi-finger gesture is being tracked.
    pub fn is_idle(&self) -> bool {
        self.in_progress.is_none()
    }

    /// Feed a batch of events.
    ///
    /// Touch events are consumed. Returns the gestures completed by the batch
    /// and every non-touch event, in order.
    pub fn handle_events(&mut self, events: &[Event]) -> (Vec<Gesture>, Vec<Event>) {
        let mut gestures = Vec::new();
        let mut unhandled = Vec::new();
        for event in events {
            match event {
                Event::Touch(touch) => gestures.extend(self.handle_touch(touch)),
                other => unhandled.push(*other),
            }
        }
        (gestures, unhandled)
    }

    /// Feed a single touch event. Returns a gesture when this event completed
    /// one.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Option<Gesture> {
        match event.phase {
            TouchPhase::Down => {
                self.touch_down(event);
                None
            }
            TouchPhase::Move => {
                self.touch_move(event);
                None
            }
            TouchPhase::Up => self.touch_up(event),
        }
    }

    /// Reconcile with the slots the device reports as in contact.
    ///
    /// A slot believed active locally but inactive on the device is dropped.
    /// If that leaves no finger down, any in-progress gesture is discarded
    /// without being reported.
    pub fn sync(&mut self, device: SlotMask) {
        let mut dropped = false;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.active && !device.contains(index) {
                slot.active = false;
                dropped = true;
            }
        }
        if dropped {
            tracing::warn!(
                remaining = self.active_fingers(),
                "touch state out of sync with device"
            );
            if self.active_fingers() == 0 {
                self.reset();
            }
        }
    }

    /// Return to Idle, forgetting any in-progress gesture.
    pub fn reset(&mut self) {
        self.in_progress = None;
        self.tap_fingers = 0;
    }

    fn touch_down(&mut self, event: &TouchEvent) {
        let Some(slot) = self.slots.get_mut(event.slot) else {
            return;
        };
        slot.active = true;
        slot.start = event.location;
        slot.current = event.location;
        let fingers = self.active_fingers();
        self.tap_fingers = fingers;
        tracing::debug!(slot = event.slot, fingers, "touch down");
    }

    fn touch_move(&mut self, event: &TouchEvent) {
        let Some(slot) = self.slots.get_mut(event.slot) else {
            return;
        };
        if !slot.active {
            return;
        }
        slot.current = event.location;
        let moved = *slot;

        if self.in_progress.is_some() || self.active_fingers() < self.config.min_fingers {
            return;
        }
        let trigger = if self.past_threshold(moved.delta()) {
            Some(moved.delta())
        } else {
            self.slots
                .iter()
                .filter(|s| s.active)
                .map(SlotTrack::delta)
                .find(|d| self.past_threshold(*d))
        };
        if let Some(delta) = trigger {
            let gesture = self.classify(delta);
            tracing::debug!(?gesture, "gesture started");
            self.in_progress = Some(gesture);
        }
    }

    fn touch_up(&mut self, event: &TouchEvent) -> Option<Gesture> {
        let slot = self.slots.get_mut(event.slot)?;
        if !slot.active {
            return None;
        }
        slot.active = false;
        let start = slot.start;
        let remaining = self.active_fingers();
        tracing::debug!(slot = event.slot, remaining, "touch up");
        if remaining > 0 {
            return None;
        }

        let gesture = match self.in_progress.take() {
            None => Gesture::Tap(Tap {
                fingers: self.tap_fingers,
                position: start,
            }),
            Some(Gesture::Swipe(mut swipe)) => {
                swipe.end_position = event.location;
                Gesture::Swipe(swipe)
            }
            Some(other) => other,
        };
        self.reset();
        Some(gesture)
    }

    fn past_threshold(&self, delta: Point) -> bool {
        let threshold = self.config.start_threshold;
        delta.x.unsigned_abs() >= threshold || delta.y.unsigned_abs() >= threshold
    }

    fn classify(&self, trigger: Point) -> Gesture {
        let active = || self.slots.iter().filter(|s| s.active);
        let fingers = active().count();
        let position = centroid(active().map(|s| s.start));

        let deltas = || active().map(SlotTrack::delta);
        let is_swipe = deltas().all(|d| d.x >= 0)
            || deltas().all(|d| d.x <= 0)
            || deltas().all(|d| d.y >= 0)
            || deltas().all(|d| d.y <= 0);

        if is_swipe {
            let direction = if trigger.x.unsigned_abs() > trigger.y.unsigned_abs() {
                if trigger.x > 0 {
                    SwipeDirection::Right
                } else {
                    SwipeDirection::Left
                }
            } else if trigger.y > 0 {
                SwipeDirection::Down
            } else {
                SwipeDirection::Up
            };
            Gesture::Swipe(Swipe {
                direction,
                start_position: position,
                end_position: position,
                fingers,
            })
        } else {
            let before = spread(active().map(|s| s.start));
            let after = spread(active().map(|s| s.current));
            let direction = if after > before {
                PinchDirection::Out
            } else {
                PinchDirection::In
            };
            Gesture::Pinch(Pinch {
                direction,
                position,
                fingers,
            })
        }
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(GestureConfig::DEFAULT)
    }
}

/// Mean of the points, `(0, 0)` for none.
fn centroid(points: impl Iterator<Item = Point>) -> Point {
    let (mut sx, mut sy, mut n) = (0i64, 0i64, 0i64);
    for p in points {
        sx = sx.saturating_add(i64::from(p.x));
        sy = sy.saturating_add(i64::from(p.y));
        n = n.saturating_add(1);
    }
    if n == 0 {
        return Point::zero();
    }
    // Mean of i32 values fits in i32.
    let x = i32::try_from(sx.checked_div(n).unwrap_or(0)).unwrap_or(0);
    let y = i32::try_from(sy.checked_div(n).unwrap_or(0)).unwrap_or(0);
    Point::new(x, y)
}

/// Sum of squared distances from the centroid.
fn spread(points: impl Iterator<Item = Point> + Clone) -> i64 {
    let center = centroid(points.clone());
    points
        .map(|p| {
            let dx = i64::from(p.x).saturating_sub(i64::from(center.x));
            let dy = i64::from(p.y).saturating_sub(i64::from(center.y));
            dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
        })
        .fold(0i64, i64::saturating_add)
}
