//! In-Memory Renderer
//!
//! A renderer adapter backed by a node arena. Every adapter call is
//! recorded as an [`Operation`], which makes it the reference platform for
//! exercising render trees without a real UI toolkit.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::Serialize;

use crate::renderer::{Handle, Listener, Renderer, Unsubscribe};
use crate::value::Value;

/// One recorded adapter call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    Create { handle: Handle, tag: String },
    CreateText { handle: Handle, text: String },
    Insert { handles: Vec<Handle>, target: Handle, after: Option<Handle> },
    Remove { handles: Vec<Handle>, target: Handle },
    SetProperty { handle: Handle, name: String, value: serde_json::Value },
    SetText { handle: Handle, text: String },
    Subscribe { handle: Handle, event: String },
    Unsubscribe { handle: Handle, event: String },
    Replace { container: Handle, new: Vec<Handle>, old: Vec<Handle> },
}

#[derive(Clone, Debug)]
enum Kind {
    Element {
        tag: String,
        properties: IndexMap<String, Value>,
    },
    Text(String),
}

struct Entry {
    kind: Kind,
    parent: Option<Handle>,
    children: Vec<Handle>,
}

#[derive(Default)]
struct State {
    nodes: Vec<Entry>,
    listeners: IndexMap<usize, (Handle, String, Listener)>,
    next_listener: usize,
    operations: Vec<Operation>,
}

impl State {
    fn entry(&self, handle: Handle) -> &Entry {
        match self.nodes.get(handle.0) {
            Some(entry) => entry,
            None => panic!("unknown handle {handle}"),
        }
    }

    fn entry_mut(&mut self, handle: Handle) -> &mut Entry {
        match self.nodes.get_mut(handle.0) {
            Some(entry) => entry,
            None => panic!("unknown handle {handle}"),
        }
    }

    fn push(&mut self, kind: Kind) -> Handle {
        let handle = Handle(self.nodes.len());
        self.nodes.push(Entry {
            kind,
            parent: None,
            children: Vec::new(),
        });
        handle
    }

    fn detach(&mut self, handle: Handle) {
        if let Some(parent) = self.entry_mut(handle).parent.take() {
            self.entry_mut(parent).children.retain(|child| *child != handle);
        }
    }

    fn insert_at(&mut self, handles: &[Handle], target: Handle, index: usize) {
        for (offset, handle) in handles.iter().enumerate() {
            self.entry_mut(*handle).parent = Some(target);
            self.entry_mut(target).children.insert(index + offset, *handle);
        }
    }
}

#[derive(Default)]
pub struct MemoryRenderer {
    state: Rc<RefCell<State>>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element to mount trees into. Not recorded.
    pub fn create_root(&self, tag: &str) -> Handle {
        self.state.borrow_mut().push(Kind::Element {
            tag: tag.to_string(),
            properties: IndexMap::new(),
        })
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    pub fn take_operations(&self) -> Vec<Operation> {
        std::mem::take(&mut self.state.borrow_mut().operations)
    }

    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }

    pub fn children(&self, handle: Handle) -> Vec<Handle> {
        self.state.borrow().entry(handle).children.clone()
    }

    pub fn parent(&self, handle: Handle) -> Option<Handle> {
        self.state.borrow().entry(handle).parent
    }

    pub fn tag(&self, handle: Handle) -> Option<String> {
        match &self.state.borrow().entry(handle).kind {
            Kind::Element { tag, .. } => Some(tag.clone()),
            Kind::Text(_) => None,
        }
    }

    pub fn text(&self, handle: Handle) -> Option<String> {
        match &self.state.borrow().entry(handle).kind {
            Kind::Text(text) => Some(text.clone()),
            Kind::Element { .. } => None,
        }
    }

    pub fn property(&self, handle: Handle, name: &str) -> Option<Value> {
        match &self.state.borrow().entry(handle).kind {
            Kind::Element { properties, .. } => properties.get(name).cloned(),
            Kind::Text(_) => None,
        }
    }

    pub fn listener_count(&self, handle: Handle) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|(owner, _, _)| *owner == handle)
            .count()
    }

    /// Calls every listener subscribed to `event` on `handle`.
    pub fn dispatch(&self, handle: Handle, event: &str, payload: &Value) {
        let listeners: Vec<Listener> = self
            .state
            .borrow()
            .listeners
            .values()
            .filter(|(owner, name, _)| *owner == handle && name == event)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(payload);
        }
    }

    /// Markup of the children of `handle`.
    pub fn inner_html(&self, handle: Handle) -> String {
        let state = self.state.borrow();
        let mut out = String::new();
        for child in &state.entry(handle).children {
            write_html(&state, *child, &mut out);
        }
        out
    }

    /// Markup of `handle` itself.
    pub fn to_html(&self, handle: Handle) -> String {
        let state = self.state.borrow();
        let mut out = String::new();
        write_html(&state, handle, &mut out);
        out
    }

    fn record(&self, operation: Operation) {
        self.state.borrow_mut().operations.push(operation);
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(Value::to_display_string)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_display_string(),
    }
}

fn write_html(state: &State, handle: Handle, out: &mut String) {
    let entry = state.entry(handle);
    match &entry.kind {
        Kind::Text(text) => out.push_str(&escape(text)),
        Kind::Element { tag, properties } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in properties {
                match value {
                    Value::Bool(true) => {
                        out.push(' ');
                        out.push_str(name);
                    }
                    Value::Bool(false) | Value::Function(_) => {}
                    _ => {
                        out.push_str(&format!(" {}=\"{}\"", name, escape(&attribute_text(value))));
                    }
                }
            }
            out.push('>');
            for child in &entry.children {
                write_html(state, *child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

impl Renderer for MemoryRenderer {
    fn create(&self, tag: &str) -> Handle {
        let handle = self.state.borrow_mut().push(Kind::Element {
            tag: tag.to_string(),
            properties: IndexMap::new(),
        });
        self.record(Operation::Create {
            handle,
            tag: tag.to_string(),
        });
        handle
    }

    fn create_text(&self, initial: &str) -> Handle {
        let handle = self
            .state
            .borrow_mut()
            .push(Kind::Text(initial.to_string()));
        self.record(Operation::CreateText {
            handle,
            text: initial.to_string(),
        });
        handle
    }

    fn mount(&self, handles: &[Handle], target: Handle, after: Option<Handle>) {
        {
            let mut state = self.state.borrow_mut();
            for handle in handles {
                state.detach(*handle);
            }
            let index = match after {
                Some(after) => {
                    let position = state
                        .entry(target)
                        .children
                        .iter()
                        .position(|child| *child == after);
                    match position {
                        Some(position) => position + 1,
                        None => panic!("insertion anchor {after} is not a child of {target}"),
                    }
                }
                None => 0,
            };
            state.insert_at(handles, target, index);
        }
        self.record(Operation::Insert {
            handles: handles.to_vec(),
            target,
            after,
        });
    }

    fn unmount(&self, handles: &[Handle], target: Handle) {
        {
            let mut state = self.state.borrow_mut();
            for handle in handles {
                if state.entry(*handle).parent == Some(target) {
                    state.detach(*handle);
                }
            }
        }
        self.record(Operation::Remove {
            handles: handles.to_vec(),
            target,
        });
    }

    fn is_after(&self, handles: &[Handle], after: Handle) -> bool {
        let Some(first) = handles.first() else {
            return false;
        };
        let state = self.state.borrow();
        let Some(parent) = state.entry(*first).parent else {
            return false;
        };
        let siblings = &state.entry(parent).children;
        match siblings.iter().position(|child| child == first) {
            Some(index) if index > 0 => siblings[index - 1] == after,
            _ => false,
        }
    }

    fn is_first(&self, handles: &[Handle], target: Handle) -> bool {
        let Some(first) = handles.first() else {
            return false;
        };
        self.state.borrow().entry(target).children.first() == Some(first)
    }

    fn set_property(&self, name: &str, value: &Value, handle: Handle) {
        {
            let mut state = self.state.borrow_mut();
            if let Kind::Element { properties, .. } = &mut state.entry_mut(handle).kind {
                if value.is_nullish() {
                    properties.shift_remove(name);
                } else {
                    properties.insert(name.to_string(), value.clone());
                }
            }
        }
        self.record(Operation::SetProperty {
            handle,
            name: name.to_string(),
            value: value.to_json(),
        });
    }

    fn set_text(&self, text: &str, handle: Handle) {
        {
            let mut state = self.state.borrow_mut();
            if let Kind::Text(content) = &mut state.entry_mut(handle).kind {
                *content = text.to_string();
            }
        }
        self.record(Operation::SetText {
            handle,
            text: text.to_string(),
        });
    }

    fn subscribe_event(&self, name: &str, listener: Listener, handle: Handle) -> Unsubscribe {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.insert(id, (handle, name.to_string(), listener));
            state.operations.push(Operation::Subscribe {
                handle,
                event: name.to_string(),
            });
            id
        };
        let state: Weak<RefCell<State>> = Rc::downgrade(&self.state);
        Box::new(move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.borrow_mut();
                if let Some((handle, event, _)) = state.listeners.shift_remove(&id) {
                    state.operations.push(Operation::Unsubscribe { handle, event });
                }
            }
        })
    }

    fn replace(&self, container: Handle, new: &[Handle], old: &[Handle]) {
        {
            let mut state = self.state.borrow_mut();
            for handle in new {
                state.detach(*handle);
            }
            let index = old.first().and_then(|first| {
                state
                    .entry(container)
                    .children
                    .iter()
                    .position(|child| child == first)
            });
            let Some(index) = index else {
                panic!("replace requires at least one handle of {container} to replace");
            };
            for handle in old {
                if state.entry(*handle).parent == Some(container) {
                    state.detach(*handle);
                }
            }
            state.insert_at(new, container, index);
        }
        self.record(Operation::Replace {
            container,
            new: new.to_vec(),
            old: old.to_vec(),
        });
    }
}
