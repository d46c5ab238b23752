//! Reactive Cells
//!
//! Primitive state. Reading a cell inside a tracked computation subscribes
//! that computation; writing it re-runs every dependent effect before the
//! write returns.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::runtime::{self, NodeId, Source, Subscribers};

pub(crate) struct SignalInner<T> {
    id: NodeId,
    value: RefCell<T>,
    subscribers: Subscribers,
}

impl<T> Source for SignalInner<T> {
    fn unsubscribe(&self, subscriber: NodeId) {
        self.subscribers.remove(subscriber);
    }
}

/// A readable and writable reactive cell.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Creates a cell holding `initial`.
pub fn signal<T: 'static>(initial: T) -> Signal<T> {
    Signal::new(initial)
}

/// Creates a cell and returns its read and write halves.
pub fn cell<T: 'static>(initial: T) -> (ReadSignal<T>, WriteSignal<T>) {
    Signal::new(initial).split()
}

impl<T: 'static> Signal<T> {
    pub fn new(initial: T) -> Self {
        Signal {
            inner: Rc::new(SignalInner {
                id: runtime::next_id(),
                value: RefCell::new(initial),
                subscribers: Subscribers::default(),
            }),
        }
    }

    fn track(&self) {
        self.inner
            .subscribers
            .track_read(self.inner.id, self.inner.clone());
    }

    /// Reads the value, subscribing the running computation.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.inner.value.borrow().clone()
    }

    /// Reads the value without subscribing anything.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Borrows the value for the duration of `f`, subscribing the running
    /// computation.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.inner.value.borrow())
    }

    /// Stores `value`. Writing a value equal to the current one is a no-op,
    /// which keeps effects that write back idempotent values from looping.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        self.changed();
    }

    /// Mutates the value in place and always notifies dependents.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.changed();
    }

    fn changed(&self) {
        self.inner.subscribers.notify_all();
        runtime::flush();
    }

    /// Number of computations currently depending on this cell.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            signal: self.clone(),
        }
    }

    pub fn write_only(&self) -> WriteSignal<T> {
        WriteSignal {
            signal: self.clone(),
        }
    }

    pub fn split(self) -> (ReadSignal<T>, WriteSignal<T>) {
        (self.read_only(), self.write_only())
    }
}

/// Read half of a cell.
pub struct ReadSignal<T> {
    signal: Signal<T>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        ReadSignal {
            signal: self.signal.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.signal.fmt(f)
    }
}

impl<T: 'static> ReadSignal<T> {
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.signal.get()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.signal.get_untracked()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }
}

/// Write half of a cell.
pub struct WriteSignal<T> {
    signal: Signal<T>,
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        WriteSignal {
            signal: self.signal.clone(),
        }
    }
}

impl<T: 'static> WriteSignal<T> {
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        self.signal.set(value)
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.signal.update(f)
    }
}
