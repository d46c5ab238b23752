use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::{Anchor, Binding, Disposables, Handle, Handles, Listener, Node, RenderNode, RendererRef};
use crate::reactive::effect;
use crate::value::Value;

/// Bindings of an element node.
#[derive(Default)]
pub struct ElementInput {
    /// Applied once at mount.
    pub attrs: IndexMap<String, Value>,
    /// `class` and `class.<name>` entries are merged into a single `class`
    /// property holding the list of active class names.
    pub props: IndexMap<String, Binding>,
    pub events: IndexMap<String, Listener>,
    pub child: Option<Node>,
}

impl ElementInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn prop(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.props.insert(name.into(), binding);
        self
    }

    pub fn event(mut self, name: impl Into<String>, listener: impl Fn(&Value) + 'static) -> Self {
        self.events.insert(name.into(), Rc::new(listener));
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.child = Some(child);
        self
    }
}

/// Constructor for elements of one tag name.
#[derive(Clone, Debug)]
pub struct ElementFactory {
    tag: Rc<str>,
}

impl ElementFactory {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn build(&self, input: ElementInput) -> Node {
        Rc::new(ElementNode::new(self.tag.clone(), input))
    }
}

/// Returns the constructor for `<tag>` elements.
pub fn element(tag: impl Into<Rc<str>>) -> ElementFactory {
    ElementFactory { tag: tag.into() }
}

enum ClassSource {
    List(Binding),
    Toggle(Rc<str>, Binding),
}

pub struct ElementNode {
    tag: Rc<str>,
    input: ElementInput,
    handle: Cell<Option<Handle>>,
    disposables: Disposables,
}

impl ElementNode {
    pub fn new(tag: impl Into<Rc<str>>, input: ElementInput) -> Self {
        ElementNode {
            tag: tag.into(),
            input,
            handle: Cell::new(None),
            disposables: Disposables::default(),
        }
    }

    fn bind_props(&self, renderer: &RendererRef, handle: Handle) {
        let mut classes = Vec::new();
        for (name, binding) in &self.input.props {
            if name == "class" {
                classes.push(ClassSource::List(binding.clone()));
                continue;
            }
            if let Some(class_name) = name.strip_prefix("class.") {
                classes.push(ClassSource::Toggle(class_name.into(), binding.clone()));
                continue;
            }
            match binding {
                Binding::Static(value) => renderer.set_property(name, value, handle),
                Binding::Dynamic(accessor) => {
                    let renderer = renderer.clone();
                    let accessor = accessor.clone();
                    let name = name.clone();
                    self.disposables.effect(effect(move || {
                        renderer.set_property(&name, &accessor(), handle);
                    }));
                }
            }
        }
        if classes.is_empty() {
            return;
        }
        let renderer = renderer.clone();
        self.disposables.effect(effect(move || {
            let mut active = Vec::new();
            for source in &classes {
                match source {
                    ClassSource::List(binding) => push_class_names(&binding.get(), &mut active),
                    ClassSource::Toggle(class_name, binding) => {
                        if binding.get().is_truthy() {
                            active.push(Value::String(class_name.clone()));
                        }
                    }
                }
            }
            renderer.set_property("class", &Value::array(active), handle);
        }));
    }
}

fn push_class_names(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::String(names) => out.extend(names.split_whitespace().map(Value::from)),
        Value::Array(items) => {
            for item in items.iter() {
                push_class_names(item, out);
            }
        }
        Value::Undefined | Value::Null | Value::Bool(false) => {}
        other => out.push(Value::from(other.to_display_string())),
    }
}

impl RenderNode for ElementNode {
    fn name(&self) -> &str {
        &self.tag
    }

    fn is_mounted(&self) -> bool {
        self.handle.get().is_some()
    }

    fn elements(&self) -> Handles {
        match self.handle.get() {
            Some(handle) => Handles::from_slice(&[handle]),
            None => panic!("<{}> element read before mounting", self.tag),
        }
    }

    fn mount(&self, renderer: &RendererRef, target: Handle, after: &Anchor) {
        trace!(tag = %self.tag, %target, "mount element");
        let handle = renderer.create(&self.tag);
        self.handle.set(Some(handle));
        for (name, value) in &self.input.attrs {
            renderer.set_property(name, value, handle);
        }
        self.bind_props(renderer, handle);
        for (name, listener) in &self.input.events {
            self.disposables
                .push(renderer.subscribe_event(name, listener.clone(), handle));
        }
        if let Some(child) = &self.input.child {
            child.mount(renderer, handle, &Anchor::front());
        }
        renderer.mount(&[handle], target, after.resolve());
    }

    fn unmount(&self, renderer: &RendererRef, target: Handle) {
        let Some(handle) = self.handle.get() else {
            return;
        };
        trace!(tag = %self.tag, %target, "unmount element");
        if let Some(child) = &self.input.child {
            child.unmount(renderer, handle);
        }
        renderer.unmount(&[handle], target);
        self.disposables.dispose();
        self.handle.set(None);
    }
}
