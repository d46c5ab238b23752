//! Reactive Core
//!
//! Cells, computed cells and effects with automatic dependency tracking.
//! Everything here is single-threaded; state lives in thread-locals and
//! handles are `Rc`-based, so none of these types are `Send`.

mod computed;
mod effect;
pub(crate) mod runtime;
mod signal;

pub use computed::{computed, Computed};
pub use effect::{effect, Cleanup, Disposer, EffectReturn};
pub use runtime::{batch, is_tracking, pending_effects, untrack};
pub use signal::{cell, signal, ReadSignal, Signal, WriteSignal};
