//! Normalized input events.
//!
//! Decoders turn raw report batches into one of three event families. All
//! locations are in screen pixels: each decoder applies its device
//! [`Transform`] before emitting.

use embedded_graphics::prelude::Point;

/// Number of multi-touch slots tracked per touch device.
pub const MAX_SLOTS: usize = 32;

/// Phase of a touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TouchPhase {
    /// Finger landed.
    Down,
    /// Finger lifted.
    Up,
    /// Finger moved, or any other update to a live contact.
    Move,
}

/// A single-slot touch update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    /// What happened to the contact.
    pub phase: TouchPhase,
    /// Contact id assigned by the device.
    pub id: i32,
    /// Slot index in `0..MAX_SLOTS`.
    pub slot: usize,
    /// Screen location.
    pub location: Point,
    /// Contact pressure, device units.
    pub pressure: i32,
}

impl TouchEvent {
    /// A contact update with zero pressure.
    pub const fn new(phase: TouchPhase, slot: usize, location: Point) -> Self {
        Self {
            phase,
            id: 0,
            slot,
            location,
            pressure: 0,
        }
    }
}

impl Default for TouchEvent {
    fn default() -> Self {
        Self::new(TouchPhase::Move, 0, Point::zero())
    }
}

/// Which transition a pen batch carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PenPhase {
    /// Tip touched the surface.
    TouchDown,
    /// Tip left the surface.
    TouchUp,
    /// Tool came into proximity.
    ToolClose,
    /// Tool left proximity.
    ToolLeave,
    /// Position, pressure or distance update.
    Move,
}

/// A pen digitizer update.
///
/// Proximity and contact are tracked separately: `in_range` and `touching`
/// always describe the pen after this batch, `phase` names the transition the
/// batch carried (the last one when a batch carried several).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenEvent {
    /// Transition carried by this batch.
    pub phase: PenPhase,
    /// Tool is within sensing distance.
    pub in_range: bool,
    /// Tip is on the surface.
    pub touching: bool,
    /// Screen location.
    pub location: Point,
    /// Hover distance, device units.
    pub distance: i32,
    /// Tip pressure, device units.
    pub pressure: i32,
}

impl Default for PenEvent {
    fn default() -> Self {
        Self {
            phase: PenPhase::Move,
            in_range: false,
            touching: false,
            location: Point::zero(),
            distance: 0,
            pressure: 0,
        }
    }
}

/// Key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyState {
    /// Key released.
    Release,
    /// Key pressed.
    Press,
    /// Auto-repeat while held.
    Repeat,
}

impl KeyState {
    /// Map an `EV_KEY` value. Values outside `0..=2` are malformed.
    pub const fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Release),
            1 => Some(Self::Press),
            2 => Some(Self::Repeat),
            _ => None,
        }
    }
}

/// A key update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    /// Transition.
    pub state: KeyState,
    /// Key code.
    pub code: u16,
}

/// Any normalized input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Multi-touch panel update.
    Touch(TouchEvent),
    /// Pen digitizer update.
    Pen(PenEvent),
    /// Button or key update.
    Key(KeyEvent),
}

impl Event {
    /// Screen location for pointer events, `None` for keys.
    pub const fn location(&self) -> Option<Point> {
        match self {
            Self::Touch(ev) => Some(ev.location),
            Self::Pen(ev) => Some(ev.location),
            Self::Key(_) => None,
        }
    }

    /// Returns `true` for touch events.
    pub const fn is_touch(&self) -> bool {
        matches!(self, Self::Touch(_))
    }
}

impl From<TouchEvent> for Event {
    fn from(ev: TouchEvent) -> Self {
        Self::Touch(ev)
    }
}

impl From<PenEvent> for Event {
    fn from(ev: PenEvent) -> Self {
        Self::Pen(ev)
    }
}

impl From<KeyEvent> for Event {
    fn from(ev: KeyEvent) -> Self {
        Self::Key(ev)
    }
}

/// Affine map from device coordinates to screen coordinates.
///
/// `screen = matrix * device + offset`, with an integer 2x2 matrix so the
/// usual panel rotations and mirrors are exact.
///
/// # Example
///
/// ```
/// use eink_input::Transform;
/// use embedded_graphics::prelude::Point;
///
/// // Panel mounted with the X axis mirrored across a 1404 px wide screen
/// let t = Transform::new([[-1, 0], [0, 1]], Point::new(1404, 0));
/// assert_eq!(t.apply(Point::new(4, 10)), Point::new(1400, 10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    matrix: [[i32; 2]; 2],
    offset: Point,
}

impl Transform {
    /// No-op mapping.
    pub const IDENTITY: Self = Self {
        matrix: [[1, 0], [0, 1]],
        offset: Point::zero(),
    };

    /// Create a transform from a row-major matrix and an offset.
    pub const fn new(matrix: [[i32; 2]; 2], offset: Point) -> Self {
        Self { matrix, offset }
    }

    /// Map a device point to screen space.
    pub fn apply(&self, p: Point) -> Point {
        let [[a, b], [c, d]] = self.matrix;
        Point::new(
            a.saturating_mul(p.x)
                .saturating_add(b.saturating_mul(p.y))
                .saturating_add(self.offset.x),
            c.saturating_mul(p.x)
                .saturating_add(d.saturating_mul(p.y))
                .saturating_add(self.offset.y),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
