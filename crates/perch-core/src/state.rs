use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::SchedulingError;

pub type SubId = usize;

/// Liveness and dirtiness of a mounted component instance, shared with every
/// cell it owns.
pub(crate) struct Owner {
    dirty: Cell<bool>,
    mounted: Cell<bool>,
}

impl Owner {
    pub(crate) fn new() -> Self {
        Self {
            dirty: Cell::new(false),
            mounted: Cell::new(true),
        }
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub(crate) fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub(crate) fn unmount(&self) {
        self.mounted.set(false);
        self.dirty.set(false);
    }
}

/// A versioned piece of component state.
///
/// Cloning a `StateCell` clones the handle, not the value. Writes replace the
/// value wholesale and bump the version; the owning instance (if any) is
/// marked dirty and re-rendered at the end of the current tick.
pub struct StateCell<T>(Rc<Shared<T>>);

struct Shared<T> {
    inner: RefCell<Inner<T>>,
    subs: RefCell<Vec<(SubId, Rc<dyn Fn(&T)>)>>,
    next_sub: Cell<SubId>,
    // Set for the whole of a write, including subscriber notification.
    writing: Cell<bool>,
}

struct Inner<T> {
    value: T,
    version: u64,
    owner: Option<Rc<Owner>>,
}

impl<T> StateCell<T> {
    /// A free-standing cell with no owning instance.
    pub fn new(value: T) -> Self {
        Self::with_owner(value, None)
    }

    pub(crate) fn with_owner(value: T, owner: Option<Rc<Owner>>) -> Self {
        Self(Rc::new(Shared {
            inner: RefCell::new(Inner {
                value,
                version: 0,
                owner,
            }),
            subs: RefCell::new(Vec::new()),
            next_sub: Cell::new(0),
            writing: Cell::new(false),
        }))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.inner.borrow().value.clone()
    }

    /// Borrowing read, for values that are expensive or impossible to clone.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.inner.borrow().value)
    }

    pub fn version(&self) -> u64 {
        self.0.inner.borrow().version
    }

    pub fn set(&self, value: T) {
        if let Err(e) = self.try_set(value) {
            log::error!("StateCell::set: {e}");
        }
    }

    /// Replace the value with `f(previous)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        if let Err(e) = self.try_update(f) {
            log::error!("StateCell::update: {e}");
        }
    }

    pub fn try_set(&self, value: T) -> Result<(), SchedulingError> {
        self.commit(move |_| value)
    }

    pub fn try_update(&self, f: impl FnOnce(&T) -> T) -> Result<(), SchedulingError> {
        self.commit(f)
    }

    /// Call `f` with the new value after every accepted write. Subscribers
    /// may read the cell; a write from inside one is rejected.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        let id = self.0.next_sub.get();
        self.0.next_sub.set(id + 1);
        self.0.subs.borrow_mut().push((id, Rc::new(f)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubId) -> bool {
        let mut subs = self.0.subs.borrow_mut();
        let before = subs.len();
        subs.retain(|(sub, _)| *sub != id);
        subs.len() != before
    }

    /// Identity of the underlying storage, used for by-reference dependency keys.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    fn commit(&self, f: impl FnOnce(&T) -> T) -> Result<(), SchedulingError> {
        if self.0.writing.replace(true) {
            return Err(SchedulingError::ReentrantWrite {
                version: self.version(),
            });
        }
        let out = self.write(f);
        self.0.writing.set(false);
        out
    }

    fn write(&self, f: impl FnOnce(&T) -> T) -> Result<(), SchedulingError> {
        let next = {
            let inner = self.0.inner.borrow();
            if let Some(owner) = &inner.owner
                && !owner.is_mounted()
            {
                return Err(SchedulingError::WriteAfterTeardown {
                    version: inner.version,
                });
            }
            f(&inner.value)
        };

        let owner = {
            let mut inner = self.0.inner.borrow_mut();
            inner.value = next;
            inner.version += 1;
            inner.owner.clone()
        };
        if let Some(owner) = owner {
            owner.mark_dirty();
        }

        // Snapshot so a subscriber may subscribe or unsubscribe.
        let subs: Vec<Rc<dyn Fn(&T)>> = self.0.subs.borrow().iter().map(|(_, f)| f.clone()).collect();
        let inner = self.0.inner.borrow();
        for s in subs {
            s(&inner.value);
        }
        Ok(())
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.inner.borrow();
        f.debug_struct("StateCell")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

pub fn state<T>(t: T) -> StateCell<T> {
    StateCell::new(t)
}
