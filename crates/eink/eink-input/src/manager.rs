//! Device multiplexing and the blocking input wait.
//!
//! Reader threads (or tests) push raw reports through a [`ReportSender`];
//! the UI thread calls [`InputManager::wait_for_input`], which blocks until
//! something arrives or the timeout passes, then decodes everything queued.
//! A [`Waker`] lets other threads interrupt the wait without sending input.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::device::{Decoder, DeviceClass, SlotMask};
use crate::error::InputError;
use crate::event::{Event, Transform};
use crate::raw::{Capabilities, RawEvent};

/// Handle naming an opened device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum Message {
    Report(DeviceId, RawEvent),
    Failed(DeviceId, std::io::Error),
    Wake,
}

/// Producer side of one opened device.
#[derive(Clone)]
pub struct ReportSender {
    device: DeviceId,
    tx: Sender<Message>,
}

impl ReportSender {
    /// Device this sender feeds.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Queue one raw report.
    pub fn send(&self, raw: RawEvent) -> Result<(), InputError> {
        self.tx
            .send(Message::Report(self.device, raw))
            .map_err(|_| InputError::Disconnected)
    }

    /// Queue a sequence of raw reports.
    pub fn send_all(&self, raws: &[RawEvent]) -> Result<(), InputError> {
        raws.iter().try_for_each(|raw| self.send(*raw))
    }

    /// Report a fatal read failure. The next wait returns it as an error.
    pub fn fail(&self, error: std::io::Error) -> Result<(), InputError> {
        self.tx
            .send(Message::Failed(self.device, error))
            .map_err(|_| InputError::Disconnected)
    }
}

impl fmt::Debug for ReportSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportSender")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

/// Interrupts a pending [`InputManager::wait_for_input`] from any thread.
#[derive(Clone)]
pub struct Waker {
    tx: Sender<Message>,
}

impl Waker {
    /// Wake the waiting thread. Has no effect once the manager is dropped.
    pub fn wake(&self) {
        let _ = self.tx.send(Message::Wake);
    }
}

impl fmt::Debug for Waker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Waker")
    }
}

/// Source of normalized input for the frame loop.
pub trait InputSource {
    /// Block until input arrives, a wake is requested, or `timeout` passes.
    /// `None` waits indefinitely. An empty result is not an error.
    fn wait_for_input(&mut self, timeout: Option<Duration>) -> Result<Vec<Event>, InputError>;

    /// Slots the touch hardware reports as in contact, if there is a touch
    /// device.
    fn active_slots(&self) -> Option<SlotMask> {
        None
    }

    /// A handle that can interrupt the wait from another thread.
    fn waker(&mut self) -> Option<Waker> {
        None
    }
}

/// Owns the decoders of every opened device.
pub struct InputManager {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    devices: BTreeMap<DeviceId, Box<dyn Decoder + Send>>,
    next_id: u32,
    waker_issued: bool,
}

impl InputManager {
    /// Manager with no devices.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            devices: BTreeMap::new(),
            next_id: 0,
            waker_issued: false,
        }
    }

    /// Open a device, picking its decoder from `caps`.
    pub fn open(&mut self, caps: Capabilities, transform: Transform) -> ReportSender {
        self.open_class(DeviceClass::detect(&caps), transform)
    }

    /// Open a device of a known class.
    pub fn open_class(&mut self, class: DeviceClass, transform: Transform) -> ReportSender {
        let device = DeviceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.devices.insert(device, class.decoder(transform));
        tracing::debug!(%device, ?class, "opened input device");
        ReportSender {
            device,
            tx: self.tx.clone(),
        }
    }

    /// Stop decoding a device. Reports still queued for it are dropped.
    pub fn close(&mut self, device: DeviceId) -> bool {
        let closed = self.devices.remove(&device).is_some();
        if closed {
            tracing::debug!(%device, "closed input device");
        }
        closed
    }

    /// Class of an open device.
    pub fn device_class(&self, device: DeviceId) -> Option<DeviceClass> {
        self.devices.get(&device).map(|d| d.class())
    }

    /// Number of open devices.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn dispatch(&mut self, message: Message, out: &mut Vec<Event>) -> Result<(), InputError> {
        match message {
            Message::Report(device, raw) => match self.devices.get_mut(&device) {
                Some(decoder) => decoder.feed(raw, out),
                None => tracing::trace!(%device, "dropping report for closed device"),
            },
            Message::Failed(device, source) => {
                tracing::warn!(%device, error = %source, "input device failed");
                return Err(InputError::Device { device, source });
            }
            Message::Wake => {}
        }
        Ok(())
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for InputManager {
    fn wait_for_input(&mut self, timeout: Option<Duration>) -> Result<Vec<Event>, InputError> {
        let first = match timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => return Ok(Vec::new()),
                Err(RecvTimeoutError::Disconnected) => return Err(InputError::Disconnected),
            },
            None => {
                if self.devices.is_empty() && !self.waker_issued {
                    // Nothing could ever end this wait.
                    return Err(InputError::Disconnected);
                }
                self.rx.recv().map_err(|_| InputError::Disconnected)?
            }
        };

        let mut events = Vec::new();
        self.dispatch(first, &mut events)?;
        while let Ok(message) = self.rx.try_recv() {
            self.dispatch(message, &mut events)?;
        }
        Ok(events)
    }

    fn active_slots(&self) -> Option<SlotMask> {
        self.devices
            .values()
            .filter_map(|d| d.active_slots())
            .reduce(SlotMask::union)
    }

    fn waker(&mut self) -> Option<Waker> {
        self.waker_issued = true;
        Some(Waker {
            tx: self.tx.clone(),
        })
    }
}

impl fmt::Debug for InputManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputManager")
            .field("devices", &self.devices.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{ABS_MT_POSITION_X, ABS_MT_TRACKING_ID};

    #[test]
    fn test_open_assigns_distinct_ids() {
        let mut mgr = InputManager::new();
        let a = mgr.open(Capabilities::TOUCH, Transform::IDENTITY);
        let b = mgr.open(Capabilities::KEYS, Transform::IDENTITY);
        assert_ne!(a.device(), b.device());
        assert_eq!(mgr.device_class(a.device()), Some(DeviceClass::Touch));
        assert_eq!(mgr.device_class(b.device()), Some(DeviceClass::Key));
        assert_eq!(mgr.device_count(), 2);
    }

    #[test]
    fn test_timeout_returns_empty() {
        let mut mgr = InputManager::new();
        let _keys = mgr.open(Capabilities::KEYS, Transform::IDENTITY);
        let events = mgr.wait_for_input(Some(Duration::from_millis(1)));
        assert!(matches!(events, Ok(ref e) if e.is_empty()));
    }

    #[test]
    fn test_wait_without_sources_is_disconnected() {
        let mut mgr = InputManager::new();
        assert!(matches!(
            mgr.wait_for_input(None),
            Err(InputError::Disconnected)
        ));
    }

    #[test]
    fn test_queued_reports_decoded_together() {
        let mut mgr = InputManager::new();
        let touch = mgr.open(Capabilities::TOUCH, Transform::IDENTITY);
        touch
            .send_all(&[
                RawEvent::abs(ABS_MT_TRACKING_ID, 1),
                RawEvent::abs(ABS_MT_POSITION_X, 12),
                RawEvent::syn(),
                RawEvent::abs(ABS_MT_POSITION_X, 14),
                RawEvent::syn(),
            ])
            .unwrap();
        let events = mgr.wait_for_input(None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(mgr.active_slots().map(|m| m.count()), Some(1));
    }

    #[test]
    fn test_wake_returns_no_events() {
        let mut mgr = InputManager::new();
        let waker = mgr.waker().unwrap();
        waker.wake();
        assert_eq!(mgr.wait_for_input(None).unwrap(), vec![]);
    }

    #[test]
    fn test_device_failure_is_reported() {
        let mut mgr = InputManager::new();
        let pen = mgr.open(Capabilities::PEN, Transform::IDENTITY);
        pen.fail(std::io::Error::other("unplugged")).unwrap();
        let err = mgr.wait_for_input(None).unwrap_err();
        assert!(matches!(err, InputError::Device { device, .. } if device == pen.device()));
    }

    #[test]
    fn test_closed_device_reports_dropped() {
        let mut mgr = InputManager::new();
        let keys = mgr.open(Capabilities::KEYS, Transform::IDENTITY);
        assert!(mgr.close(keys.device()));
        keys.send_all(&[RawEvent::key(116, 1), RawEvent::syn()]).unwrap();
        assert_eq!(
            mgr.wait_for_input(Some(Duration::from_millis(1))).unwrap(),
            vec![]
        );
    }
}
