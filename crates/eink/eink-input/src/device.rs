//! Per-device report decoders.
//!
//! Each opened device gets one [`Decoder`] picked by [`DeviceClass::detect`].
//! A decoder accumulates raw reports until the batch terminator and then
//! pushes zero or more normalized [`Event`]s. Reports a decoder does not
//! understand are ignored; a malformed report never aborts the stream.

use embedded_graphics::prelude::Point;

use crate::event::{
    Event, KeyEvent, KeyState, PenEvent, PenPhase, TouchEvent, TouchPhase, Transform, MAX_SLOTS,
};
use crate::raw::{
    Capabilities, RawEvent, ABS_DISTANCE, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_PRESSURE,
    ABS_MT_SLOT, ABS_MT_TRACKING_ID, ABS_PRESSURE, ABS_X, ABS_Y, BTN_TOOL_PEN, BTN_TOUCH, EV_ABS,
    EV_KEY, TRACKING_ID_NONE,
};

/// Kind of input device, decided once when the device is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceClass {
    /// Multi-touch panel with slot reporting.
    Touch,
    /// Absolute pointer without slots.
    Pen,
    /// Anything else.
    Key,
}

impl DeviceClass {
    /// Classify a device from its capabilities.
    ///
    /// Absolute axes plus the multi-touch slot axis mean touch, absolute axes
    /// alone mean pen, everything else is treated as a key device.
    pub const fn detect(caps: &Capabilities) -> Self {
        match (caps.absolute, caps.multitouch_slots) {
            (true, true) => Self::Touch,
            (true, false) => Self::Pen,
            _ => Self::Key,
        }
    }

    /// Build the decoder for this class.
    pub fn decoder(self, transform: Transform) -> Box<dyn Decoder + Send> {
        match self {
            Self::Touch => Box::new(TouchDecoder::new(transform)),
            Self::Pen => Box::new(PenDecoder::new(transform)),
            Self::Key => Box::new(KeyDecoder::new()),
        }
    }
}

/// Set of slot indices, one bit per slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SlotMask(u32);

// SlotMask holds exactly one bit per slot.
const _: () = assert!(MAX_SLOTS == u32::BITS as usize);

impl SlotMask {
    /// No slot set.
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if `slot` is in the set. Out-of-range slots never are.
    pub const fn contains(&self, slot: usize) -> bool {
        match Self::bit(slot) {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }

    /// Add or remove `slot`. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, active: bool) {
        if let Some(bit) = Self::bit(slot) {
            if active {
                self.0 |= bit;
            } else {
                self.0 &= !bit;
            }
        }
    }

    /// Slots in either set.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of slots in the set.
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Returns `true` if no slot is set.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    const fn bit(slot: usize) -> Option<u32> {
        if slot < MAX_SLOTS {
            Some(1 << slot)
        } else {
            None
        }
    }
}

impl FromIterator<usize> for SlotMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for slot in iter {
            mask.set(slot, true);
        }
        mask
    }
}

/// Turns one device's raw reports into normalized events.
pub trait Decoder {
    /// Class this decoder handles.
    fn class(&self) -> DeviceClass;

    /// Feed one report. Events are pushed to `out` only on the batch
    /// terminator.
    fn feed(&mut self, raw: RawEvent, out: &mut Vec<Event>);

    /// Slots the device currently reports as in contact. `None` for devices
    /// without slots.
    fn active_slots(&self) -> Option<SlotMask> {
        None
    }
}

/// Multi-touch slot protocol decoder.
///
/// Keeps the latest record of every slot. Slot selection, contact id,
/// position and pressure reports mark the selected slot changed; at the batch
/// terminator every changed slot is emitted once, in the order it was first
/// touched within the batch, and its stored phase falls back to
/// [`TouchPhase::Move`].
#[derive(Debug, Clone)]
pub struct TouchDecoder {
    transform: Transform,
    slots: [TouchEvent; MAX_SLOTS],
    current: usize,
    changed: heapless::Vec<usize, MAX_SLOTS>,
    active: SlotMask,
}

impl TouchDecoder {
    /// Create a decoder mapping device coordinates through `transform`.
    pub fn new(transform: Transform) -> Self {
        let mut slots = [TouchEvent::default(); MAX_SLOTS];
        for (index, slot) in slots.iter_mut().enumerate() {
            slot.slot = index;
        }
        Self {
            transform,
            slots,
            current: 0,
            changed: heapless::Vec::new(),
            active: SlotMask::EMPTY,
        }
    }

    fn mark_changed(&mut self) {
        if !self.changed.contains(&self.current) {
            // Capacity equals the slot count and entries are unique.
            let _ = self.changed.push(self.current);
        }
    }

    fn flush(&mut self, out: &mut Vec<Event>) {
        for &index in self.changed.iter() {
            if let Some(slot) = self.slots.get_mut(index) {
                let mut ev = *slot;
                ev.location = self.transform.apply(slot.location);
                out.push(Event::Touch(ev));
                slot.phase = TouchPhase::Move;
            }
        }
        self.changed.clear();
    }
}

impl Decoder for TouchDecoder {
    fn class(&self) -> DeviceClass {
        DeviceClass::Touch
    }

    fn feed(&mut self, raw: RawEvent, out: &mut Vec<Event>) {
        if raw.is_sync() {
            self.flush(out);
            return;
        }
        if raw.kind != EV_ABS {
            return;
        }

        if raw.code == ABS_MT_SLOT {
            match usize::try_from(raw.value) {
                Ok(slot) if slot < MAX_SLOTS => {
                    self.current = slot;
                    self.mark_changed();
                }
                _ => tracing::warn!(slot = raw.value, "ignoring out-of-range touch slot"),
            }
            return;
        }

        let current = self.current;
        let Some(slot) = self.slots.get_mut(current) else {
            return;
        };
        match raw.code {
            ABS_MT_TRACKING_ID => {
                if raw.value == TRACKING_ID_NONE {
                    slot.phase = TouchPhase::Up;
                    self.active.set(current, false);
                } else {
                    slot.phase = TouchPhase::Down;
                    slot.id = raw.value;
                    self.active.set(current, true);
                }
            }
            ABS_MT_POSITION_X => slot.location.x = raw.value,
            ABS_MT_POSITION_Y => slot.location.y = raw.value,
            ABS_MT_PRESSURE => slot.pressure = raw.value,
            _ => return,
        }
        self.mark_changed();
    }

    fn active_slots(&self) -> Option<SlotMask> {
        Some(self.active)
    }
}

/// Pen digitizer decoder.
///
/// Position, distance and pressure accumulate across batches. Every batch
/// terminator emits the pending record, then its phase resets to
/// [`PenPhase::Move`].
#[derive(Debug, Clone, Default)]
pub struct PenDecoder {
    transform: Transform,
    pending: PenEvent,
    device_location: Point,
}

impl PenDecoder {
    /// Create a decoder mapping device coordinates through `transform`.
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }
}

impl Decoder for PenDecoder {
    fn class(&self) -> DeviceClass {
        DeviceClass::Pen
    }

    fn feed(&mut self, raw: RawEvent, out: &mut Vec<Event>) {
        if raw.is_sync() {
            let mut ev = self.pending;
            ev.location = self.transform.apply(self.device_location);
            out.push(Event::Pen(ev));
            self.pending.phase = PenPhase::Move;
            return;
        }

        match (raw.kind, raw.code) {
            (EV_ABS, ABS_X) => self.device_location.x = raw.value,
            (EV_ABS, ABS_Y) => self.device_location.y = raw.value,
            (EV_ABS, ABS_DISTANCE) => self.pending.distance = raw.value,
            (EV_ABS, ABS_PRESSURE) => self.pending.pressure = raw.value,
            (EV_KEY, BTN_TOOL_PEN) => {
                let close = raw.value != 0;
                self.pending.in_range = close;
                self.pending.phase = if close {
                    PenPhase::ToolClose
                } else {
                    PenPhase::ToolLeave
                };
            }
            (EV_KEY, BTN_TOUCH) => {
                let down = raw.value != 0;
                self.pending.touching = down;
                self.pending.phase = if down {
                    PenPhase::TouchDown
                } else {
                    PenPhase::TouchUp
                };
            }
            _ => {}
        }
    }
}

/// Key decoder. Holds a single pending key record, emitted at the batch
/// terminator.
#[derive(Debug, Clone, Default)]
pub struct KeyDecoder {
    pending: Option<KeyEvent>,
}

impl KeyDecoder {
    /// Create a key decoder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for KeyDecoder {
    fn class(&self) -> DeviceClass {
        DeviceClass::Key
    }

    fn feed(&mut self, raw: RawEvent, out: &mut Vec<Event>) {
        if raw.is_sync() {
            if let Some(ev) = self.pending.take() {
                out.push(Event::Key(ev));
            }
            return;
        }
        if raw.kind != EV_KEY {
            return;
        }
        match KeyState::from_value(raw.value) {
            Some(state) => {
                self.pending = Some(KeyEvent {
                    state,
                    code: raw.code,
                })
            }
            None => tracing::warn!(code = raw.code, value = raw.value, "ignoring malformed key report"),
        }
    }
}
