//! Component Factory
//!
//! A component pairs a controller, which builds per-instance context from
//! the invocation's inputs, with a render function turning that context into
//! a render tree. Inputs arrive through three channels (props, events,
//! slots); each is resolved once when the component is instantiated, with
//! defaults filled in for every declared name.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::renderer::{fragment, Accessor, Anchor, Binding, ComponentNode, Handle, Listener, Node, RendererRef};
use crate::value::Value;

/// Renders a slot. Receives the context object built from the slot
/// element's attributes.
pub type SlotFn = Rc<dyn Fn(Value) -> Node>;

/// Input names a component reads. Undeclared lookups still resolve to a
/// default but are logged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDeclaration {
    pub props: Vec<String>,
    pub events: Vec<String>,
    pub slots: Vec<String>,
}

impl InputDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn props<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.props.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn events<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.events.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn slots<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.slots.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Inputs supplied at an invocation site.
#[derive(Clone, Default)]
pub struct ComponentInput {
    pub props: IndexMap<String, Binding>,
    pub events: IndexMap<String, Listener>,
    pub slots: IndexMap<String, SlotFn>,
}

impl ComponentInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.props.insert(name.into(), binding);
        self
    }

    pub fn event(mut self, name: impl Into<String>, listener: impl Fn(&Value) + 'static) -> Self {
        self.events.insert(name.into(), Rc::new(listener));
        self
    }

    pub fn slot(mut self, name: impl Into<String>, render: impl Fn(Value) -> Node + 'static) -> Self {
        self.slots.insert(name.into(), Rc::new(render));
        self
    }
}

/// Logs lookups of names the component never declared.
fn report_missing(component: &str, channel: &str, name: &str, declared: &[String]) {
    if !declared.is_empty() && !declared.iter().any(|d| d == name) {
        warn!(component, channel, name, "lookup of undeclared component input");
    }
}

/// Prop accessors of one instance.
#[derive(Clone)]
pub struct Props {
    component: Rc<str>,
    declared: Rc<[String]>,
    values: IndexMap<String, Accessor>,
}

impl Props {
    /// Accessor for `name`; unset names read as `undefined`.
    pub fn accessor(&self, name: &str) -> Accessor {
        match self.values.get(name) {
            Some(accessor) => accessor.clone(),
            None => {
                report_missing(&self.component, "props", name, &self.declared);
                Rc::new(|| Value::Undefined)
            }
        }
    }

    /// Reads `name` (tracked).
    pub fn get(&self, name: &str) -> Value {
        self.accessor(name)()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Event callbacks of one instance.
#[derive(Clone)]
pub struct Events {
    component: Rc<str>,
    declared: Rc<[String]>,
    listeners: IndexMap<String, Listener>,
}

impl Events {
    /// Callback for `name`; unset names get a no-op.
    pub fn listener(&self, name: &str) -> Listener {
        match self.listeners.get(name) {
            Some(listener) => listener.clone(),
            None => {
                report_missing(&self.component, "events", name, &self.declared);
                Rc::new(|_: &Value| {})
            }
        }
    }

    pub fn emit(&self, name: &str, payload: &Value) {
        self.listener(name)(payload)
    }
}

/// Slot render functions, handed to the render function.
#[derive(Clone)]
pub struct Slots {
    component: Rc<str>,
    declared: Rc<[String]>,
    slots: IndexMap<String, SlotFn>,
}

impl Slots {
    pub fn has(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Render function for `name`; unset names render an empty fragment.
    pub fn get(&self, name: &str) -> SlotFn {
        match self.slots.get(name) {
            Some(slot) => slot.clone(),
            None => {
                report_missing(&self.component, "slots", name, &self.declared);
                Rc::new(|_| fragment(Vec::new()))
            }
        }
    }

    pub fn render(&self, name: &str, context: Value) -> Node {
        self.get(name)(context)
    }
}

/// Which slots the invocation filled; what a controller sees of slots.
#[derive(Clone, Debug, Default)]
pub struct SlotPresence {
    filled: Vec<String>,
}

impl SlotPresence {
    pub fn has(&self, name: &str) -> bool {
        self.filled.iter().any(|filled| filled == name)
    }
}

/// Everything a controller receives.
#[derive(Clone)]
pub struct Inputs {
    pub props: Props,
    pub events: Events,
    pub slots: SlotPresence,
}

type ControllerFn<C> = Rc<dyn Fn(&Inputs) -> C>;
type RenderFn<C> = Rc<dyn Fn(&C, &Slots) -> Option<Node>>;

/// A reusable component definition.
pub struct Component<C> {
    name: Rc<str>,
    declaration: InputDeclaration,
    controller: ControllerFn<C>,
    render: RenderFn<C>,
}

impl<C> Clone for Component<C> {
    fn clone(&self) -> Self {
        Component {
            name: self.name.clone(),
            declaration: self.declaration.clone(),
            controller: self.controller.clone(),
            render: self.render.clone(),
        }
    }
}

impl<C> fmt::Debug for Component<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("declaration", &self.declaration)
            .finish()
    }
}

/// Defines a component from its controller and render function.
pub fn define_component<C, F, R>(controller: F, render: R) -> Component<C>
where
    C: 'static,
    F: Fn(&Inputs) -> C + 'static,
    R: Fn(&C, &Slots) -> Option<Node> + 'static,
{
    Component {
        name: Rc::from("component"),
        declaration: InputDeclaration::default(),
        controller: Rc::new(controller),
        render: Rc::new(render),
    }
}

impl<C: 'static> Component<C> {
    pub fn with_name(mut self, name: impl Into<Rc<str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_inputs(mut self, declaration: InputDeclaration) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaration(&self) -> &InputDeclaration {
        &self.declaration
    }

    /// Resolves the input channels and returns an unmounted component node.
    /// The controller runs when the node mounts.
    pub fn instantiate(&self, input: ComponentInput) -> Node {
        let (inputs, slots) = self.resolve(input);
        Rc::new(ComponentNode::new(
            self.name.clone(),
            inputs,
            slots,
            self.controller.clone(),
            self.render.clone(),
        ))
    }

    fn resolve(&self, input: ComponentInput) -> (Inputs, Slots) {
        let ComponentInput {
            props,
            events,
            slots,
        } = input;

        let mut values: IndexMap<String, Accessor> = props
            .into_iter()
            .map(|(name, binding)| (name, binding.into_accessor()))
            .collect();
        for name in &self.declaration.props {
            values
                .entry(name.clone())
                .or_insert_with(|| Rc::new(|| Value::Undefined));
        }

        let mut listeners = events;
        for name in &self.declaration.events {
            listeners
                .entry(name.clone())
                .or_insert_with(|| Rc::new(|_: &Value| {}));
        }

        let filled: Vec<String> = slots.keys().cloned().collect();
        let mut slot_fns = slots;
        for name in &self.declaration.slots {
            slot_fns
                .entry(name.clone())
                .or_insert_with(|| Rc::new(|_| fragment(Vec::new())));
        }

        let inputs = Inputs {
            props: Props {
                component: self.name.clone(),
                declared: self.declaration.props.clone().into(),
                values,
            },
            events: Events {
                component: self.name.clone(),
                declared: self.declaration.events.clone().into(),
                listeners,
            },
            slots: SlotPresence { filled },
        };
        let slots = Slots {
            component: self.name.clone(),
            declared: self.declaration.slots.clone().into(),
            slots: slot_fns,
        };
        (inputs, slots)
    }
}

/// A component mounted by [`render`].
#[must_use = "the component stays mounted until `unmount` is called"]
pub struct Mounted {
    node: Node,
    renderer: RendererRef,
    target: Handle,
}

impl Mounted {
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn unmount(self) {
        self.node.unmount(&self.renderer, self.target);
    }
}

/// Instantiates `component` and mounts it at the front of `target`.
pub fn render<C: 'static>(
    renderer: RendererRef,
    target: Handle,
    component: &Component<C>,
    input: ComponentInput,
) -> Mounted {
    let node = component.instantiate(input);
    node.mount(&renderer, target, &Anchor::front());
    Mounted {
        node,
        renderer,
        target,
    }
}
