//! Application context: timers, cross-thread notifications and the stop
//! flag.
//!
//! One [`AppContext`] lives for the whole run and is handed mutably to build
//! functions, input handlers and timer callbacks.
//!
//! # Timers
//!
//! Timers fire from the frame loop, never from another thread. A timer is
//! due when its deadline is not later than the time passed to
//! [`AppContext::check_timers`]; due timers fire in deadline order, ties in
//! the order they were added. A repeating timer is re-armed relative to the
//! check time, so a late check does not make it fire repeatedly to catch up.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::{Duration, Instant};
//! use eink_ui::AppContext;
//!
//! let mut app = AppContext::new();
//! let fired = Rc::new(Cell::new(0));
//! let counter = fired.clone();
//! let start = Instant::now();
//! app.add_timer_at(start + Duration::from_millis(10), None, move |_| {
//!     counter.set(counter.get() + 1)
//! });
//!
//! app.check_timers(start);
//! assert_eq!(fired.get(), 0);
//! app.check_timers(start + Duration::from_millis(10));
//! assert_eq!(fired.get(), 1);
//! ```
//!
//! # Notifications
//!
//! Work running on other threads reports back through a [`Notifier`]. Values
//! are queued and handed to the handler registered with
//! [`AppContext::on_notification`] at the start of the next frame, on the
//! UI thread.

use std::any::{Any, TypeId};
use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use eink_input::Waker;

type TimerCallback = Box<dyn FnMut(&mut AppContext)>;
type NotificationHandler = Box<dyn FnMut(Box<dyn Any + Send>, &mut AppContext)>;

struct Timer {
    deadline: Instant,
    seq: u64,
    repeat: Option<Duration>,
    enabled: Rc<Cell<bool>>,
    callback: TimerCallback,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    // Reversed so the max-heap pops the earliest deadline, then the oldest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Handle to a scheduled timer.
///
/// Dropping the handle does not cancel the timer; call
/// [`TimerHandle::disable`].
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    enabled: Weak<Cell<bool>>,
}

impl TimerHandle {
    /// Cancel the timer. It will not fire again. No-op if it already
    /// finished.
    pub fn disable(&self) {
        if let Some(enabled) = self.enabled.upgrade() {
            enabled.set(false);
        }
    }

    /// Returns `true` while the timer is scheduled and enabled.
    pub fn is_active(&self) -> bool {
        self.enabled.upgrade().is_some_and(|e| e.get())
    }
}

/// Sends values of type `T` to the UI thread from anywhere.
pub struct Notifier<T> {
    tx: Sender<Box<dyn Any + Send>>,
    waker: Arc<Mutex<Option<Waker>>>,
    _marker: PhantomData<fn(T)>,
}

impl<T: Send + 'static> Notifier<T> {
    /// Queue `value` and wake the frame loop. Returns `false` once the
    /// application is gone.
    pub fn notify(&self, value: T) -> bool {
        if self.tx.send(Box::new(value)).is_err() {
            return false;
        }
        if let Ok(waker) = self.waker.lock() {
            if let Some(waker) = waker.as_ref() {
                waker.wake();
            }
        }
        true
    }
}

impl<T> Clone for Notifier<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            waker: Arc::clone(&self.waker),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

/// Per-run services. See the module docs.
pub struct AppContext {
    timers: BinaryHeap<Timer>,
    next_seq: u64,
    stop: bool,
    frame: u64,
    notify_tx: Sender<Box<dyn Any + Send>>,
    notify_rx: Receiver<Box<dyn Any + Send>>,
    handlers: HashMap<TypeId, NotificationHandler>,
    waker: Arc<Mutex<Option<Waker>>>,
}

impl AppContext {
    /// Context with no timers and no handlers.
    pub fn new() -> Self {
        let (notify_tx, notify_rx) = mpsc::channel();
        Self {
            timers: BinaryHeap::new(),
            next_seq: 0,
            stop: false,
            frame: 0,
            notify_tx,
            notify_rx,
            handlers: HashMap::new(),
            waker: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedule `callback` after `delay`, repeating every `repeat` if given.
    pub fn add_timer(
        &mut self,
        delay: Duration,
        repeat: Option<Duration>,
        callback: impl FnMut(&mut AppContext) + 'static,
    ) -> TimerHandle {
        let deadline = Instant::now()
            .checked_add(delay)
            .unwrap_or_else(Instant::now);
        self.add_timer_at(deadline, repeat, callback)
    }

    /// Schedule `callback` at `deadline`, repeating every `repeat` if given.
    pub fn add_timer_at(
        &mut self,
        deadline: Instant,
        repeat: Option<Duration>,
        callback: impl FnMut(&mut AppContext) + 'static,
    ) -> TimerHandle {
        let enabled = Rc::new(Cell::new(true));
        let handle = TimerHandle {
            enabled: Rc::downgrade(&enabled),
        };
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.timers.push(Timer {
            deadline,
            seq,
            repeat,
            enabled,
            callback: Box::new(callback),
        });
        handle
    }

    /// Time until the earliest enabled timer is due, zero if one is overdue,
    /// `None` without timers.
    pub fn next_timeout(&mut self, now: Instant) -> Option<Duration> {
        self.drop_disabled();
        self.timers
            .peek()
            .map(|t| t.deadline.saturating_duration_since(now))
    }

    /// Fire every timer due at `now`. Returns how many fired.
    pub fn check_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0usize;
        let mut rearmed = Vec::new();
        while let Some(top) = self.timers.peek() {
            if top.deadline > now {
                break;
            }
            let Some(mut timer) = self.timers.pop() else {
                break;
            };
            if !timer.enabled.get() {
                continue;
            }
            tracing::trace!(seq = timer.seq, "timer fired");
            (timer.callback)(self);
            fired = fired.saturating_add(1);

            match timer.repeat {
                Some(interval) if timer.enabled.get() => {
                    timer.deadline = now.checked_add(interval).unwrap_or(now);
                    rearmed.push(timer);
                }
                _ => {}
            }
        }
        self.timers.extend(rearmed);
        fired
    }

    /// Number of scheduled, enabled timers.
    pub fn timer_count(&self) -> usize {
        self.timers.iter().filter(|t| t.enabled.get()).count()
    }

    /// Ask the frame loop to exit after the current iteration.
    pub fn stop(&mut self) {
        tracing::debug!(frame = self.frame, "stop requested");
        self.stop = true;
    }

    /// Returns `true` once [`AppContext::stop`] was called.
    pub fn should_stop(&self) -> bool {
        self.stop
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// A sender for `T` values, usable from any thread.
    pub fn notifier<T: Send + 'static>(&self) -> Notifier<T> {
        Notifier {
            tx: self.notify_tx.clone(),
            waker: Arc::clone(&self.waker),
            _marker: PhantomData,
        }
    }

    /// Handle every `T` sent through a [`Notifier<T>`]. Replaces any previous
    /// handler for `T`.
    pub fn on_notification<T: Send + 'static>(
        &mut self,
        mut handler: impl FnMut(T, &mut AppContext) + 'static,
    ) {
        let erased: NotificationHandler = Box::new(move |payload, app| {
            if let Ok(value) = payload.downcast::<T>() {
                handler(*value, app);
            }
        });
        self.handlers.insert(TypeId::of::<T>(), erased);
    }

    /// Hand queued notifications to their handlers. Returns how many were
    /// delivered.
    pub fn dispatch_notifications(&mut self) -> usize {
        let mut delivered = 0usize;
        while let Ok(payload) = self.notify_rx.try_recv() {
            let kind = (*payload).type_id();
            // Taken out so the handler can borrow the context mutably.
            let Some(mut handler) = self.handlers.remove(&kind) else {
                tracing::debug!("dropping notification without handler");
                continue;
            };
            handler(payload, self);
            self.handlers.entry(kind).or_insert(handler);
            delivered = delivered.saturating_add(1);
        }
        delivered
    }

    /// Install the waker used to interrupt the input wait on notification.
    pub fn set_waker(&mut self, waker: Waker) {
        if let Ok(mut slot) = self.waker.lock() {
            *slot = Some(waker);
        }
    }

    pub(crate) fn end_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    fn drop_disabled(&mut self) {
        while self.timers.peek().is_some_and(|t| !t.enabled.get()) {
            self.timers.pop();
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("timers", &self.timers.len())
            .field("stop", &self.stop)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
