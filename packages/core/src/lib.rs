//! htmly Core
//!
//! Runtime for compiled htmly templates: a fine-grained reactive core, the
//! render nodes compiled templates are built from, the component factory
//! and an in-memory renderer adapter.

pub mod component;
pub mod memory;
pub mod reactive;
pub mod renderer;
pub mod value;

pub use component::{
    define_component, render, Component, ComponentInput, Events, InputDeclaration, Inputs, Mounted, Props, SlotFn,
    SlotPresence, Slots,
};
pub use memory::{MemoryRenderer, Operation};
pub use reactive::{batch, cell, computed, effect, signal, untrack, Computed, Disposer, ReadSignal, Signal, WriteSignal};
pub use renderer::{
    conditional, element, for_each, fragment, text, Accessor, Anchor, Binding, ElementInput, ForInput, Handle,
    Handles, IfBranch, Listener, Node, RenderNode, Renderer, RendererRef, TextSource,
};
pub use value::{Function, Value};
