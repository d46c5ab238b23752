//! Render Node Runtime
//!
//! Render nodes are the mountable units a compiled template is built from.
//! They talk to the target platform exclusively through the [`Renderer`]
//! adapter, so the same tree can drive a DOM, a terminal or the in-memory
//! renderer used by tests.

mod component;
mod conditional;
mod element;
mod fragment;
mod list;
mod text;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::reactive::Disposer;
use crate::value::Value;

pub use component::ComponentNode;
pub use conditional::{conditional, IfBranch, IfNode};
pub use element::{element, ElementFactory, ElementInput, ElementNode};
pub use fragment::{fragment, FragmentNode};
pub use list::{for_each, ForInput, ForNode};
pub use text::{text, TextNode, TextSource};

/// Opaque reference to a target-platform node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub usize);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Handles = SmallVec<[Handle; 4]>;

pub type Unsubscribe = Box<dyn FnOnce()>;

pub type Listener = Rc<dyn Fn(&Value)>;

/// Target-platform adapter. Adapters also answer [`Renderer::is_first`]
/// so keyed lists can tell whether their front item is already in place.
pub trait Renderer {
    /// Returns a new, unattached element.
    fn create(&self, tag: &str) -> Handle;

    /// Returns a new, unattached text node.
    fn create_text(&self, initial: &str) -> Handle;

    /// Inserts `handles` into `target` right after `after`, or at the front
    /// when `after` is `None`. Handles that are already attached move.
    fn mount(&self, handles: &[Handle], target: Handle, after: Option<Handle>);

    /// Removes `handles` from `target`; handles not in `target` are ignored.
    fn unmount(&self, handles: &[Handle], target: Handle);

    /// True if the first of `handles` immediately follows `after`.
    fn is_after(&self, handles: &[Handle], after: Handle) -> bool;

    /// True if the first of `handles` is the first child of `target`.
    /// Keyed lists ask this for the item at the front, which has no
    /// predecessor to pass to [`Renderer::is_after`].
    fn is_first(&self, handles: &[Handle], target: Handle) -> bool;

    /// Applies a property; `Null`/`Undefined` clears it.
    fn set_property(&self, name: &str, value: &Value, handle: Handle);

    fn set_text(&self, text: &str, handle: Handle);

    fn subscribe_event(&self, name: &str, listener: Listener, handle: Handle) -> Unsubscribe;

    /// Swaps `old` for `new` at the position of the first of `old`.
    fn replace(&self, container: Handle, new: &[Handle], old: &[Handle]);
}

pub type RendererRef = Rc<dyn Renderer>;

/// Lazily computed insertion point: the handle after which a node inserts
/// its elements, or `None` for the front of the target.
///
/// Anchors are resolved at the moment a node inserts, so a conditional or
/// list that re-renders long after the initial mount still lands behind
/// whatever its preceding sibling currently shows.
#[derive(Clone, Default)]
pub struct Anchor(Option<Rc<dyn Fn() -> Option<Handle>>>);

impl Anchor {
    pub fn front() -> Self {
        Anchor(None)
    }

    pub fn fixed(handle: Handle) -> Self {
        Anchor(Some(Rc::new(move || Some(handle))))
    }

    pub fn from_fn(f: impl Fn() -> Option<Handle> + 'static) -> Self {
        Anchor(Some(Rc::new(f)))
    }

    /// Anchor right behind `node`, falling back to `previous` while `node`
    /// renders nothing.
    pub fn after_node(node: Node, previous: Anchor) -> Self {
        Anchor::from_fn(move || {
            if node.is_mounted() {
                if let Some(last) = node.elements().last() {
                    return Some(*last);
                }
            }
            previous.resolve()
        })
    }

    pub fn resolve(&self) -> Option<Handle> {
        self.0.as_ref().and_then(|f| f())
    }
}

impl fmt::Debug for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Anchor(<fn>)"),
            None => f.write_str("Anchor(front)"),
        }
    }
}

/// A mountable unit of a rendered tree.
///
/// Mount and unmount nest strictly: a node unmounts its children before
/// itself. Reading [`RenderNode::elements`] while unmounted is a defect in
/// the caller and panics.
pub trait RenderNode {
    fn name(&self) -> &str;

    fn is_mounted(&self) -> bool;

    /// Platform handles currently rendered by this node, in target order.
    fn elements(&self) -> Handles;

    fn mount(&self, renderer: &RendererRef, target: Handle, after: &Anchor);

    fn unmount(&self, renderer: &RendererRef, target: Handle);
}

pub type Node = Rc<dyn RenderNode>;

/// Reads a dynamic value. Reads performed inside are tracked.
pub type Accessor = Rc<dyn Fn() -> Value>;

/// A property value: fixed, or re-read reactively.
#[derive(Clone)]
pub enum Binding {
    Static(Value),
    Dynamic(Accessor),
}

impl Binding {
    pub fn constant(value: impl Into<Value>) -> Self {
        Binding::Static(value.into())
    }

    pub fn dynamic(f: impl Fn() -> Value + 'static) -> Self {
        Binding::Dynamic(Rc::new(f))
    }

    pub fn get(&self) -> Value {
        match self {
            Binding::Static(value) => value.clone(),
            Binding::Dynamic(f) => f(),
        }
    }

    pub fn into_accessor(self) -> Accessor {
        match self {
            Binding::Static(value) => Rc::new(move || value.clone()),
            Binding::Dynamic(f) => f,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Binding::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Static(value)
    }
}

/// Teardown work collected while a node is mounted and released, in
/// registration order, when it unmounts.
#[derive(Default)]
pub(crate) struct Disposables {
    entries: RefCell<Vec<Unsubscribe>>,
}

impl Disposables {
    pub(crate) fn effect(&self, disposer: Disposer) {
        self.push(Box::new(move || disposer.dispose()));
    }

    pub(crate) fn push(&self, teardown: Unsubscribe) {
        self.entries.borrow_mut().push(teardown);
    }

    pub(crate) fn dispose(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for teardown in entries {
            teardown();
        }
    }
}

/// Handles of an optional node, empty when absent.
pub(crate) fn elements_of(node: Option<&Node>) -> Handles {
    node.map(|node| node.elements()).unwrap_or_default()
}
