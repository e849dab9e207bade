//! Virtual-time timer queue.
//!
//! Every delayed or recurring callback in Perch lives in a [`Timers`] queue
//! owned by the [`Runtime`](crate::Runtime). Scheduling returns a
//! [`TimerHandle`] that the caller owns; cancelling consumes it. Time only
//! moves when the runtime advances the queue, which makes timer-driven
//! behaviour fully deterministic in tests.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};
use web_time::Duration;

new_key_type! {
    pub struct TimerId;
}

/// Intervals shorter than this are clamped, so a zero period cannot spin
/// `advance` forever.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

type Callback = Rc<RefCell<dyn FnMut()>>;

struct Entry {
    deadline: Duration,
    seq: u64,
    period: Option<Duration>,
    callback: Callback,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerStats {
    pub scheduled: u64,
    pub fired: u64,
    pub cancelled: u64,
}

#[derive(Default)]
struct TimerQueue {
    now: Duration,
    seq: u64,
    entries: SlotMap<TimerId, Entry>,
    stats: TimerStats,
}

impl TimerQueue {
    fn insert(&mut self, deadline: Duration, period: Option<Duration>, callback: Callback) -> TimerId {
        self.seq += 1;
        self.stats.scheduled += 1;
        self.entries.insert(Entry {
            deadline,
            seq: self.seq,
            period,
            callback,
        })
    }
}

/// Shared handle to a timer queue.
#[derive(Clone, Default)]
pub struct Timers(Rc<RefCell<TimerQueue>>);

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on this queue's clock.
    pub fn now(&self) -> Duration {
        self.0.borrow().now
    }

    /// Run `f` once, `delay` from now.
    pub fn set_timeout(&self, delay: Duration, f: impl FnOnce() + 'static) -> TimerHandle {
        let mut f = Some(f);
        let callback: Callback = Rc::new(RefCell::new(move || {
            if let Some(f) = f.take() {
                f()
            }
        }));
        let id = {
            let mut q = self.0.borrow_mut();
            let deadline = q.now + delay;
            q.insert(deadline, None, callback)
        };
        self.handle(id)
    }

    /// Run `f` every `period`, first at `now + period`.
    pub fn set_interval(&self, period: Duration, f: impl FnMut() + 'static) -> TimerHandle {
        let period = if period < MIN_PERIOD {
            log::warn!("set_interval: period {period:?} clamped to {MIN_PERIOD:?}");
            MIN_PERIOD
        } else {
            period
        };
        let callback: Callback = Rc::new(RefCell::new(f));
        let id = {
            let mut q = self.0.borrow_mut();
            let deadline = q.now + period;
            q.insert(deadline, Some(period), callback)
        };
        self.handle(id)
    }

    fn handle(&self, id: TimerId) -> TimerHandle {
        TimerHandle {
            id,
            queue: Rc::downgrade(&self.0),
        }
    }

    /// Scheduled timers that may still fire.
    pub fn pending(&self) -> usize {
        self.0.borrow().entries.len()
    }

    pub fn stats(&self) -> TimerStats {
        self.0.borrow().stats
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.0.borrow().entries.values().map(|e| e.deadline).min()
    }

    /// Fire the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Returns `false` when nothing is due.
    ///
    /// Only one callback runs per call so the caller can commit state
    /// between firings. A timer cancelled by an earlier callback is no
    /// longer in the queue and is never invoked.
    pub fn fire_next(&self, until: Duration) -> bool {
        let callback = {
            let mut q = self.0.borrow_mut();
            let q = &mut *q;
            let Some(id) = q
                .entries
                .iter()
                .filter(|(_, e)| e.deadline <= until)
                .min_by_key(|(_, e)| (e.deadline, e.seq))
                .map(|(id, _)| id)
            else {
                return false;
            };

            let entry = &mut q.entries[id];
            q.now = q.now.max(entry.deadline);
            let callback = entry.callback.clone();
            let period = entry.period;
            match period {
                Some(period) => {
                    q.seq += 1;
                    entry.deadline += period;
                    entry.seq = q.seq;
                }
                None => {
                    q.entries.remove(id);
                }
            }
            q.stats.fired += 1;
            callback
        };

        (&mut *callback.borrow_mut())();
        true
    }

    /// Move the clock forward to `until` without firing anything.
    pub fn settle(&self, until: Duration) {
        let mut q = self.0.borrow_mut();
        q.now = q.now.max(until);
    }
}

/// Ownership of one scheduled callback.
///
/// Not cloneable: whoever holds the handle is responsible for cancelling
/// it. Dropping a handle leaves the timer scheduled.
#[must_use = "dropping a TimerHandle leaves the timer running; cancel it in a cleanup"]
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    queue: Weak<RefCell<TimerQueue>>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn is_pending(&self) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        let pending = queue.borrow().entries.contains_key(self.id);
        pending
    }

    /// Returns `true` if the timer was still scheduled.
    pub fn cancel(self) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        let mut q = queue.borrow_mut();
        if q.entries.remove(self.id).is_some() {
            q.stats.cancelled += 1;
            true
        } else {
            false
        }
    }
}
