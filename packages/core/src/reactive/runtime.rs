//! Reactive Runtime
//!
//! Thread-local bookkeeping shared by every reactive primitive: the
//! currently running observer (for dependency tracking) and the queue of
//! effects waiting to re-run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

pub(crate) type NodeId = usize;

thread_local! {
    static NEXT_ID: Cell<NodeId> = const { Cell::new(1) };
    static OBSERVER: RefCell<Option<Rc<dyn Subscriber>>> = const { RefCell::new(None) };
    static QUEUE: RefCell<IndexMap<NodeId, Rc<dyn Subscriber>>> = RefCell::new(IndexMap::new());
    static BATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

pub(crate) fn next_id() -> NodeId {
    NEXT_ID.with(|id| {
        let next = id.get();
        id.set(next + 1);
        next
    })
}

/// Something a computation can depend on.
pub(crate) trait Source {
    fn unsubscribe(&self, subscriber: NodeId);
}

/// A computation that re-evaluates when one of its sources changes.
pub(crate) trait Subscriber {
    fn id(&self) -> NodeId;

    /// Records a source read during the current evaluation.
    fn track(&self, id: NodeId, source: Rc<dyn Source>);

    /// A source changed. Effects enqueue themselves; computed cells go stale
    /// and forward the notification to their own subscribers.
    fn notify(self: Rc<Self>);

    /// Re-runs a queued computation.
    fn run(self: Rc<Self>);
}

/// Set of computations depending on one source, in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    inner: RefCell<IndexMap<NodeId, Rc<dyn Subscriber>>>,
}

impl Subscribers {
    pub(crate) fn remove(&self, id: NodeId) {
        self.inner.borrow_mut().shift_remove(&id);
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Registers the running observer (if any) as a dependent of `source`.
    pub(crate) fn track_read(&self, source_id: NodeId, source: Rc<dyn Source>) {
        let observer = OBSERVER.with(|current| current.borrow().clone());
        if let Some(observer) = observer {
            self.inner.borrow_mut().insert(observer.id(), observer.clone());
            observer.track(source_id, source);
        }
    }

    pub(crate) fn notify_all(&self) {
        let subscribers: Vec<Rc<dyn Subscriber>> = self.inner.borrow().values().cloned().collect();
        for subscriber in subscribers {
            subscriber.notify();
        }
    }
}

/// Restores the previous observer when dropped, also while unwinding.
struct ObserverGuard {
    previous: Option<Rc<dyn Subscriber>>,
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        OBSERVER.with(|current| *current.borrow_mut() = previous);
    }
}

pub(crate) fn with_observer<R>(observer: Option<Rc<dyn Subscriber>>, f: impl FnOnce() -> R) -> R {
    let previous = OBSERVER.with(|current| std::mem::replace(&mut *current.borrow_mut(), observer));
    let _guard = ObserverGuard { previous };
    f()
}

/// Runs `f` without registering any reads as dependencies of the running
/// computation.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    with_observer(None, f)
}

/// Returns true while a tracked computation is running.
pub fn is_tracking() -> bool {
    OBSERVER.with(|current| current.borrow().is_some())
}

pub(crate) fn enqueue(subscriber: Rc<dyn Subscriber>) {
    QUEUE.with(|queue| {
        queue.borrow_mut().insert(subscriber.id(), subscriber);
    });
}

pub(crate) fn dequeue(id: NodeId) {
    QUEUE.with(|queue| {
        queue.borrow_mut().shift_remove(&id);
    });
}

/// Leaves the batch when dropped. The outermost guard drops pending effects
/// if the batch is unwinding, so siblings of a panicking effect stay un-run.
struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let depth = BATCH_DEPTH.with(|depth| {
            let next = depth.get().saturating_sub(1);
            depth.set(next);
            next
        });
        if depth == 0 && std::thread::panicking() {
            QUEUE.with(|queue| queue.borrow_mut().clear());
        }
    }
}

fn enter_batch() -> BatchGuard {
    BATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
    BatchGuard
}

fn in_batch() -> bool {
    BATCH_DEPTH.with(|depth| depth.get() > 0)
}

/// Runs `f` with effect re-runs deferred until it returns. Nested batches
/// flush once, when the outermost one ends.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let result = {
        let _guard = enter_batch();
        f()
    };
    flush();
    result
}

/// Re-runs queued effects in the order they were first notified. Effects
/// notified while flushing are appended and run in the same pass.
pub(crate) fn flush() {
    if in_batch() {
        return;
    }
    let _guard = enter_batch();
    loop {
        let next = QUEUE.with(|queue| queue.borrow_mut().shift_remove_index(0));
        match next {
            Some((_, subscriber)) => subscriber.run(),
            None => break,
        }
    }
}

/// Number of effects waiting to re-run.
pub fn pending_effects() -> usize {
    QUEUE.with(|queue| queue.borrow().len())
}
