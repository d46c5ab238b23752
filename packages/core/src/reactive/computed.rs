//! Computed Cells
//!
//! Derived values, memoized until a dependency changes and recomputed on the
//! next read.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use super::runtime::{self, NodeId, Source, Subscriber, Subscribers};

struct ComputedInner<T> {
    id: NodeId,
    f: Box<dyn Fn() -> T>,
    value: RefCell<Option<T>>,
    stale: Cell<bool>,
    computing: Cell<bool>,
    sources: RefCell<IndexMap<NodeId, Rc<dyn Source>>>,
    subscribers: Subscribers,
}

impl<T> ComputedInner<T> {
    fn release_sources(&self) {
        let sources = std::mem::take(&mut *self.sources.borrow_mut());
        for source in sources.values() {
            source.unsubscribe(self.id);
        }
    }
}

impl<T> Source for ComputedInner<T> {
    fn unsubscribe(&self, subscriber: NodeId) {
        self.subscribers.remove(subscriber);
    }
}

impl<T> Subscriber for ComputedInner<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn track(&self, id: NodeId, source: Rc<dyn Source>) {
        self.sources.borrow_mut().entry(id).or_insert(source);
    }

    fn notify(self: Rc<Self>) {
        if self.stale.replace(true) {
            return;
        }
        // Re-tracked on the next read.
        self.release_sources();
        self.subscribers.notify_all();
    }

    fn run(self: Rc<Self>) {}
}

/// Read handle of a derived value.
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Computed {
            inner: self.inner.clone(),
        }
    }
}

/// Creates a derived cell computed by `f`.
pub fn computed<T: 'static>(f: impl Fn() -> T + 'static) -> Computed<T> {
    Computed {
        inner: Rc::new(ComputedInner {
            id: runtime::next_id(),
            f: Box::new(f),
            value: RefCell::new(None),
            stale: Cell::new(true),
            computing: Cell::new(false),
            sources: RefCell::new(IndexMap::new()),
            subscribers: Subscribers::default(),
        }),
    }
}

/// Holds the `computing` flag for one evaluation and clears it even when
/// the function unwinds, so the next read recomputes.
struct ComputingGuard<'a>(&'a Cell<bool>);

impl<'a> ComputingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        ComputingGuard(flag)
    }
}

impl Drop for ComputingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T: Clone + 'static> Computed<T> {
    /// Returns the memoized value, recomputing it first if a dependency
    /// changed since the last read.
    pub fn get(&self) -> T {
        let inner = &self.inner;
        inner.subscribers.track_read(inner.id, inner.clone());
        if inner.stale.get() {
            assert!(
                !inner.computing.get(),
                "computed cell read itself while computing (dependency cycle)"
            );
            let value = {
                let _computing = ComputingGuard::enter(&inner.computing);
                let observer: Rc<dyn Subscriber> = inner.clone();
                runtime::with_observer(Some(observer), || (inner.f)())
            };
            *inner.value.borrow_mut() = Some(value);
            inner.stale.set(false);
        }
        match &*inner.value.borrow() {
            Some(value) => value.clone(),
            None => unreachable!("computed value is present once computed"),
        }
    }

    /// True when the next read will recompute.
    pub fn is_stale(&self) -> bool {
        self.inner.stale.get()
    }
}
