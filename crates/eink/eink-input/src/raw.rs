//! Raw kernel input reports.
//!
//! Devices deliver a stream of `(kind, code, value)` triples terminated by a
//! synchronization marker. The decoders in [`crate::device`] accumulate the
//! triples of one batch and emit normalized events when the marker arrives.
//!
//! Only the codes the decoders understand are named here; the numeric values
//! match the Linux evdev ABI so a reader thread can forward `input_event`
//! records without translation.

/// Synchronization marker kind.
pub const EV_SYN: u16 = 0x00;
/// Key and button kind.
pub const EV_KEY: u16 = 0x01;
/// Absolute axis kind.
pub const EV_ABS: u16 = 0x03;

/// End of a report batch.
pub const SYN_REPORT: u16 = 0x00;

/// Single-touch X position (pen digitizer).
pub const ABS_X: u16 = 0x00;
/// Single-touch Y position (pen digitizer).
pub const ABS_Y: u16 = 0x01;
/// Pen pressure.
pub const ABS_PRESSURE: u16 = 0x18;
/// Pen hover distance.
pub const ABS_DISTANCE: u16 = 0x19;

/// Multi-touch slot selector.
pub const ABS_MT_SLOT: u16 = 0x2f;
/// Multi-touch X position of the selected slot.
pub const ABS_MT_POSITION_X: u16 = 0x35;
/// Multi-touch Y position of the selected slot.
pub const ABS_MT_POSITION_Y: u16 = 0x36;
/// Multi-touch contact id of the selected slot; `-1` lifts the contact.
pub const ABS_MT_TRACKING_ID: u16 = 0x39;
/// Multi-touch pressure of the selected slot.
pub const ABS_MT_PRESSURE: u16 = 0x3a;

/// Pen tool entered or left proximity.
pub const BTN_TOOL_PEN: u16 = 0x140;
/// Pen tip contact.
pub const BTN_TOUCH: u16 = 0x14a;

/// Tracking id value that marks a lifted contact.
pub const TRACKING_ID_NONE: i32 = -1;

/// One `(kind, code, value)` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawEvent {
    /// Report kind (`EV_SYN`, `EV_KEY`, `EV_ABS`, ...).
    pub kind: u16,
    /// Kind-specific code.
    pub code: u16,
    /// Report value.
    pub value: i32,
}

impl RawEvent {
    /// Create a report.
    pub const fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Absolute axis report.
    pub const fn abs(code: u16, value: i32) -> Self {
        Self::new(EV_ABS, code, value)
    }

    /// Key or button report.
    pub const fn key(code: u16, value: i32) -> Self {
        Self::new(EV_KEY, code, value)
    }

    /// Batch terminator.
    pub const fn syn() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    /// Returns `true` for the batch terminator.
    pub const fn is_sync(&self) -> bool {
        self.kind == EV_SYN && self.code == SYN_REPORT
    }
}

/// Capability bits a device advertises when opened.
///
/// Used only for [`crate::DeviceClass::detect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    /// Device reports absolute axes.
    pub absolute: bool,
    /// Device reports the multi-touch slot axis.
    pub multitouch_slots: bool,
}

impl Capabilities {
    /// Multi-touch panel.
    pub const TOUCH: Self = Self {
        absolute: true,
        multitouch_slots: true,
    };

    /// Absolute-axis pointer without slots (pen digitizer).
    pub const PEN: Self = Self {
        absolute: true,
        multitouch_slots: false,
    };

    /// Buttons only.
    pub const KEYS: Self = Self {
        absolute: false,
        multitouch_slots: false,
    };
}
