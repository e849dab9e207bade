use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{SchedulingError, StateCell};

enum CleanupState {
    Pending(Box<dyn FnOnce()>),
    Done,
}

/// The teardown half of an effect.
///
/// Cloneable so it can be handed to more than one owner, but the closure
/// runs at most once. A second `run` is a scheduling error.
#[derive(Clone)]
pub struct Cleanup(Rc<RefCell<CleanupState>>);

impl Cleanup {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(CleanupState::Pending(Box::new(f)))))
    }

    pub fn try_run(&self) -> Result<(), SchedulingError> {
        let prev = std::mem::replace(&mut *self.0.borrow_mut(), CleanupState::Done);
        match prev {
            CleanupState::Pending(f) => {
                f();
                Ok(())
            }
            CleanupState::Done => Err(SchedulingError::CleanupRepeated),
        }
    }

    pub fn run(&self) {
        if let Err(e) = self.try_run() {
            log::error!("Cleanup::run: {e}");
        }
    }

    pub fn has_run(&self) -> bool {
        matches!(*self.0.borrow(), CleanupState::Done)
    }
}

/// Helper to build the cleanup returned from an effect.
pub fn on_cleanup(f: impl FnOnce() + 'static) -> Option<Cleanup> {
    Some(Cleanup::new(f))
}

/// One comparison key of a dependency list.
///
/// Primitives compare by value; shared handles compare by address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DepKey {
    Unit,
    Bool(bool),
    Int(i128),
    Char(char),
    Str(String),
    Ptr(usize),
}

pub trait Dep {
    fn dep_key(&self) -> DepKey;
}

pub type Deps = SmallVec<[DepKey; 4]>;

impl Dep for () {
    fn dep_key(&self) -> DepKey {
        DepKey::Unit
    }
}

impl Dep for bool {
    fn dep_key(&self) -> DepKey {
        DepKey::Bool(*self)
    }
}

impl Dep for char {
    fn dep_key(&self) -> DepKey {
        DepKey::Char(*self)
    }
}

impl Dep for str {
    fn dep_key(&self) -> DepKey {
        DepKey::Str(self.to_owned())
    }
}

impl Dep for String {
    fn dep_key(&self) -> DepKey {
        DepKey::Str(self.clone())
    }
}

macro_rules! impl_int_dep {
    ($($t:ty),+) => {
        $(impl Dep for $t {
            fn dep_key(&self) -> DepKey {
                DepKey::Int(*self as i128)
            }
        })+
    };
}

impl_int_dep!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: Dep + ?Sized> Dep for &T {
    fn dep_key(&self) -> DepKey {
        (**self).dep_key()
    }
}

impl<T: ?Sized> Dep for Rc<T> {
    fn dep_key(&self) -> DepKey {
        DepKey::Ptr(Rc::as_ptr(self) as *const () as usize)
    }
}

impl<T> Dep for StateCell<T> {
    fn dep_key(&self) -> DepKey {
        DepKey::Ptr(self.addr())
    }
}

/// Build a [`Deps`] list: `deps![running, label.as_str()]`.
#[macro_export]
macro_rules! deps {
    () => {
        $crate::effects::Deps::new()
    };
    ($($d:expr),+ $(,)?) => {{
        let mut d = $crate::effects::Deps::new();
        $(d.push($crate::effects::Dep::dep_key(&$d));)+
        d
    }};
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectStats {
    pub runs: usize,
    pub cleanups: usize,
}

type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

struct EffectSlot {
    deps: Deps,
    cleanup: Option<Cleanup>,
    // A run happened whose cleanup phase has not.
    live: bool,
}

impl EffectSlot {
    fn clean(&mut self, stats: &mut EffectStats) {
        if !std::mem::take(&mut self.live) {
            return;
        }
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.run();
        }
        stats.cleanups += 1;
    }
}

struct PendingEffect {
    slot: usize,
    deps: Deps,
    run: EffectFn,
}

/// Per-instance effect table, keyed by declaration order.
///
/// A render pass calls [`begin_pass`](Self::begin_pass), then
/// [`register`](Self::register) once per declared effect. Effects whose
/// dependencies changed are queued and run by [`commit`](Self::commit)
/// after the pass has produced its view.
#[derive(Default)]
pub struct EffectScheduler {
    slots: Vec<EffectSlot>,
    cursor: usize,
    pending: Vec<PendingEffect>,
    stats: EffectStats,
}

impl EffectScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_pass(&mut self) {
        self.cursor = 0;
        self.pending.clear();
    }

    pub fn register(&mut self, deps: Deps, run: impl FnOnce() -> Option<Cleanup> + 'static) {
        let slot = self.cursor;
        self.cursor += 1;

        let changed = match self.slots.get(slot) {
            None => true,
            Some(prev) if prev.deps.len() != deps.len() => {
                log::error!(
                    "{}",
                    SchedulingError::DependencyLengthChanged {
                        slot,
                        before: prev.deps.len(),
                        after: deps.len(),
                    }
                );
                true
            }
            Some(prev) => prev.deps != deps,
        };

        if changed {
            self.pending.push(PendingEffect {
                slot,
                deps,
                run: Box::new(run),
            });
        }
    }

    /// Run queued effects in declaration order, each preceded by the
    /// previous cleanup of its slot.
    pub fn commit(&mut self) {
        if self.cursor < self.slots.len() {
            log::warn!(
                "render pass declared {} effects, previous passes declared {}",
                self.cursor,
                self.slots.len()
            );
        }

        for PendingEffect { slot, deps, run } in std::mem::take(&mut self.pending) {
            if let Some(prev) = self.slots.get_mut(slot) {
                prev.clean(&mut self.stats);
            }

            let cleanup = run();
            self.stats.runs += 1;

            let entry = EffectSlot {
                deps,
                cleanup,
                live: true,
            };
            if slot < self.slots.len() {
                self.slots[slot] = entry;
            } else {
                self.slots.push(entry);
            }
        }
    }

    /// Run every outstanding cleanup. Called once when the owner unmounts.
    pub fn teardown(&mut self) {
        self.pending.clear();
        for slot in &mut self.slots {
            slot.clean(&mut self.stats);
        }
    }

    pub fn stats(&self) -> EffectStats {
        self.stats
    }

    /// Effects that have run and not yet been cleaned up.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.live).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
