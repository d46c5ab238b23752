//! Effects
//!
//! Eager computations. An effect runs once when created and again, in
//! notification order, every time one of the cells it read changes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use super::runtime::{self, NodeId, Source, Subscriber};

/// Runs before an effect re-runs and when it is disposed.
pub type Cleanup = Box<dyn FnOnce()>;

/// Values an effect body may return.
pub trait EffectReturn {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl EffectReturn for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl EffectReturn for Cleanup {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(self)
    }
}

impl EffectReturn for Option<Cleanup> {
    fn into_cleanup(self) -> Option<Cleanup> {
        self
    }
}

type EffectFn = Box<dyn FnMut() -> Option<Cleanup>>;

struct EffectInner {
    id: NodeId,
    f: RefCell<Option<EffectFn>>,
    cleanup: RefCell<Option<Cleanup>>,
    sources: RefCell<IndexMap<NodeId, Rc<dyn Source>>>,
    disposed: Cell<bool>,
}

impl EffectInner {
    fn release_sources(&self) {
        let sources = std::mem::take(&mut *self.sources.borrow_mut());
        for source in sources.values() {
            source.unsubscribe(self.id);
        }
    }

    fn run_cleanup(&self) {
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            runtime::untrack(cleanup);
        }
    }
}

/// Puts the effect body back after it ran, even when it panicked.
struct RestoreFn<'a> {
    slot: &'a RefCell<Option<EffectFn>>,
    f: Option<EffectFn>,
}

impl Drop for RestoreFn<'_> {
    fn drop(&mut self) {
        if let Some(f) = self.f.take() {
            *self.slot.borrow_mut() = Some(f);
        }
    }
}

impl Subscriber for EffectInner {
    fn id(&self) -> NodeId {
        self.id
    }

    fn track(&self, id: NodeId, source: Rc<dyn Source>) {
        self.sources.borrow_mut().entry(id).or_insert(source);
    }

    fn notify(self: Rc<Self>) {
        if !self.disposed.get() {
            runtime::enqueue(self);
        }
    }

    fn run(self: Rc<Self>) {
        if self.disposed.get() {
            return;
        }
        self.release_sources();
        self.run_cleanup();
        // A body that re-enters itself (writes a cell it reads) is re-queued
        // by that write instead of recursing.
        let taken = self.f.borrow_mut().take();
        let Some(f) = taken else {
            return;
        };
        let mut restore = RestoreFn {
            slot: &self.f,
            f: Some(f),
        };
        let observer: Rc<dyn Subscriber> = self.clone();
        let cleanup = runtime::with_observer(Some(observer), || match restore.f.as_mut() {
            Some(body) => body(),
            None => None,
        });
        drop(restore);
        if self.disposed.get() {
            if let Some(cleanup) = cleanup {
                runtime::untrack(cleanup);
            }
        } else {
            *self.cleanup.borrow_mut() = cleanup;
        }
    }
}

/// Stops an effect. Dropping a `Disposer` without calling
/// [`Disposer::dispose`] leaves the effect running for as long as any of its
/// sources live.
#[must_use = "an effect keeps running until its disposer is invoked"]
pub struct Disposer {
    inner: Rc<EffectInner>,
}

impl Disposer {
    pub fn dispose(self) {
        let inner = self.inner;
        if inner.disposed.replace(true) {
            return;
        }
        runtime::dequeue(inner.id);
        inner.release_sources();
        inner.run_cleanup();
        inner.f.borrow_mut().take();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer").field("id", &self.inner.id).finish()
    }
}

/// Creates an effect and runs it immediately.
pub fn effect<R, F>(mut f: F) -> Disposer
where
    R: EffectReturn,
    F: FnMut() -> R + 'static,
{
    let inner = Rc::new(EffectInner {
        id: runtime::next_id(),
        f: RefCell::new(Some(Box::new(move || f().into_cleanup()))),
        cleanup: RefCell::new(None),
        sources: RefCell::new(IndexMap::new()),
        disposed: Cell::new(false),
    });
    let first = inner.clone();
    runtime::batch(move || first.run());
    Disposer { inner }
}
