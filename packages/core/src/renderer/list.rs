use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{Anchor, Disposables, Handle, Handles, Node, RenderNode, RendererRef};
use crate::reactive::{effect, untrack, ReadSignal, Signal};

/// Inputs of a keyed list.
pub struct ForInput<T> {
    /// Current items. Read inside the list's effect, so reactive reads here
    /// drive reconciliation.
    pub items: Rc<dyn Fn() -> Vec<T>>,
    /// Stable identity of an item.
    pub track: Rc<dyn Fn(&T) -> String>,
    /// Builds the node for one item. The item cell is updated in place
    /// whenever a later pass yields a new value under the same key.
    pub render: Rc<dyn Fn(ReadSignal<T>) -> Node>,
    /// Rendered instead of the items while the sequence is empty.
    pub empty: Option<Node>,
}

impl<T> ForInput<T> {
    pub fn new(
        items: impl Fn() -> Vec<T> + 'static,
        track: impl Fn(&T) -> String + 'static,
        render: impl Fn(ReadSignal<T>) -> Node + 'static,
    ) -> Self {
        ForInput {
            items: Rc::new(items),
            track: Rc::new(track),
            render: Rc::new(render),
            empty: None,
        }
    }

    pub fn empty(mut self, node: Node) -> Self {
        self.empty = Some(node);
        self
    }
}

pub fn for_each<T>(input: ForInput<T>) -> Node
where
    T: Clone + PartialEq + 'static,
{
    Rc::new(ForNode::new(input))
}

struct ForEntry<T> {
    item: Signal<T>,
    node: Node,
}

struct ForState<T> {
    input: ForInput<T>,
    anchor: RefCell<Anchor>,
    keys: RefCell<Vec<String>>,
    entries: RefCell<IndexMap<String, ForEntry<T>>>,
    empty_mounted: Cell<bool>,
}

#[derive(Default, Debug)]
struct Reconciled {
    added: usize,
    removed: usize,
    moved: usize,
}

impl<T: Clone + PartialEq + 'static> ForState<T> {
    fn node(&self, key: &str) -> Option<Node> {
        self.entries.borrow().get(key).map(|entry| entry.node.clone())
    }

    /// Handle the item at `index` should follow: the last handle rendered by
    /// the closest preceding item, or the list's own anchor.
    fn anchor_before(&self, index: usize) -> Option<Handle> {
        let keys = self.keys.borrow().clone();
        for key in keys[..index.min(keys.len())].iter().rev() {
            if let Some(node) = self.node(key) {
                if node.is_mounted() {
                    if let Some(last) = node.elements().last() {
                        return Some(*last);
                    }
                }
            }
        }
        let anchor = self.anchor.borrow().clone();
        anchor.resolve()
    }

    fn item_anchor(state: &Rc<Self>, key: String) -> Anchor {
        let state: Weak<Self> = Rc::downgrade(state);
        Anchor::from_fn(move || {
            let state = state.upgrade()?;
            let index = state.keys.borrow().iter().position(|k| *k == key);
            match index {
                Some(index) => state.anchor_before(index),
                None => state.anchor.borrow().clone().resolve(),
            }
        })
    }

    fn unmount_items(&self, renderer: &RendererRef, target: Handle) {
        let keys = std::mem::take(&mut *self.keys.borrow_mut());
        let mut entries = std::mem::take(&mut *self.entries.borrow_mut());
        for key in keys.iter().rev() {
            if let Some(entry) = entries.shift_remove(key) {
                entry.node.unmount(renderer, target);
            }
        }
    }

    fn reconcile(
        state: &Rc<Self>,
        items: Vec<T>,
        keys: Vec<String>,
        renderer: &RendererRef,
        target: Handle,
    ) -> Reconciled {
        let mut summary = Reconciled::default();

        if items.is_empty() {
            if let Some(empty) = &state.input.empty {
                if !state.empty_mounted.get() {
                    summary.removed = state.keys.borrow().len();
                    state.unmount_items(renderer, target);
                    let anchor = state.anchor.borrow().clone();
                    empty.mount(renderer, target, &anchor);
                    state.empty_mounted.set(true);
                }
                return summary;
            }
        } else if state.empty_mounted.get() {
            if let Some(empty) = &state.input.empty {
                empty.unmount(renderer, target);
            }
            state.empty_mounted.set(false);
        }

        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            assert!(seen.insert(key.as_str()), "duplicate track key `{key}` in list");
        }

        let previous = state.keys.replace(keys.clone());
        for key in &previous {
            if !seen.contains(key.as_str()) {
                let removed = state.entries.borrow_mut().shift_remove(key);
                if let Some(entry) = removed {
                    entry.node.unmount(renderer, target);
                    summary.removed += 1;
                }
            }
        }

        for (index, (key, item)) in keys.iter().zip(items).enumerate() {
            let existing = state
                .entries
                .borrow()
                .get(key)
                .map(|entry| (entry.item.clone(), entry.node.clone()));
            match existing {
                Some((cell, node)) => {
                    if move_into_place(state, index, &node, renderer, target) {
                        summary.moved += 1;
                    }
                    cell.set(item);
                }
                None => {
                    let cell = Signal::new(item);
                    let node = (state.input.render)(cell.read_only());
                    node.mount(renderer, target, &ForState::item_anchor(state, key.clone()));
                    state
                        .entries
                        .borrow_mut()
                        .insert(key.clone(), ForEntry { item: cell, node });
                    summary.added += 1;
                }
            }
        }
        summary
    }
}

/// Re-inserts an existing item's handles behind its predecessor unless they
/// already sit there. Returns true when the handles moved.
fn move_into_place<T: Clone + PartialEq + 'static>(
    state: &Rc<ForState<T>>,
    index: usize,
    node: &Node,
    renderer: &RendererRef,
    target: Handle,
) -> bool {
    let handles = node.elements();
    if handles.is_empty() {
        return false;
    }
    let after = state.anchor_before(index);
    let in_place = match after {
        Some(after) => renderer.is_after(&handles, after),
        None => renderer.is_first(&handles, target),
    };
    if in_place {
        return false;
    }
    renderer.unmount(&handles, target);
    renderer.mount(&handles, target, after);
    true
}

/// Keyed list. Items whose key survives a pass keep their node and
/// subscriptions; only their item cell is updated and, when their position
/// changed, their handles are moved.
pub struct ForNode<T> {
    state: Rc<ForState<T>>,
    mounted: Cell<bool>,
    disposables: Disposables,
}

impl<T: Clone + PartialEq + 'static> ForNode<T> {
    pub fn new(input: ForInput<T>) -> Self {
        ForNode {
            state: Rc::new(ForState {
                input,
                anchor: RefCell::new(Anchor::front()),
                keys: RefCell::new(Vec::new()),
                entries: RefCell::new(IndexMap::new()),
                empty_mounted: Cell::new(false),
            }),
            mounted: Cell::new(false),
            disposables: Disposables::default(),
        }
    }

    /// Track keys in their current order.
    pub fn keys(&self) -> Vec<String> {
        self.state.keys.borrow().clone()
    }
}

impl<T: Clone + PartialEq + 'static> RenderNode for ForNode<T> {
    fn name(&self) -> &str {
        "for"
    }

    fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn elements(&self) -> Handles {
        assert!(self.mounted.get(), "for node read before mounting");
        if self.state.empty_mounted.get() {
            if let Some(empty) = &self.state.input.empty {
                return empty.elements();
            }
        }
        let keys = self.state.keys.borrow().clone();
        let mut handles = Handles::new();
        for key in &keys {
            let node = self.state.node(key);
            match node {
                Some(node) => handles.extend(node.elements()),
                None => panic!("for node has no entry for track key `{key}`; state out of sync"),
            }
        }
        handles
    }

    fn mount(&self, renderer: &RendererRef, target: Handle, after: &Anchor) {
        *self.state.anchor.borrow_mut() = after.clone();
        let state = self.state.clone();
        let renderer = renderer.clone();
        self.disposables.effect(effect(move || {
            let items = (state.input.items)();
            let keys: Vec<String> = items.iter().map(|item| (state.input.track)(item)).collect();
            let summary = untrack(|| ForState::reconcile(&state, items, keys, &renderer, target));
            debug!(
                added = summary.added,
                removed = summary.removed,
                moved = summary.moved,
                "reconciled list"
            );
        }));
        self.mounted.set(true);
    }

    fn unmount(&self, renderer: &RendererRef, target: Handle) {
        if !self.mounted.get() {
            return;
        }
        trace!(%target, "unmount list");
        self.disposables.dispose();
        if self.state.empty_mounted.replace(false) {
            if let Some(empty) = &self.state.input.empty {
                empty.unmount(renderer, target);
            }
        }
        self.state.unmount_items(renderer, target);
        self.mounted.set(false);
    }
}
