use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use super::{elements_of, Anchor, Handle, Handles, Node, RenderNode, RendererRef};
use crate::component::{Inputs, Slots};

/// A component instance. The controller runs on mount and its context
/// lives until unmount.
pub struct ComponentNode<C> {
    name: Rc<str>,
    inputs: Inputs,
    slots: Slots,
    controller: Rc<dyn Fn(&Inputs) -> C>,
    render: Rc<dyn Fn(&C, &Slots) -> Option<Node>>,
    context: RefCell<Option<C>>,
    child: RefCell<Option<Node>>,
    mounted: Cell<bool>,
}

impl<C> ComponentNode<C> {
    pub(crate) fn new(
        name: Rc<str>,
        inputs: Inputs,
        slots: Slots,
        controller: Rc<dyn Fn(&Inputs) -> C>,
        render: Rc<dyn Fn(&C, &Slots) -> Option<Node>>,
    ) -> Self {
        ComponentNode {
            name,
            inputs,
            slots,
            controller,
            render,
            context: RefCell::new(None),
            child: RefCell::new(None),
            mounted: Cell::new(false),
        }
    }

    /// Runs `f` with the controller context of the mounted instance.
    pub fn with_context<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        self.context.borrow().as_ref().map(f)
    }
}

impl<C> RenderNode for ComponentNode<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn elements(&self) -> Handles {
        assert!(self.mounted.get(), "component <{}> read before mounting", self.name);
        elements_of(self.child.borrow().as_ref())
    }

    fn mount(&self, renderer: &RendererRef, target: Handle, after: &Anchor) {
        trace!(component = %self.name, %target, "mount component");
        let context = (self.controller)(&self.inputs);
        let child = (self.render)(&context, &self.slots);
        *self.context.borrow_mut() = Some(context);
        if let Some(child) = &child {
            child.mount(renderer, target, after);
        }
        *self.child.borrow_mut() = child;
        self.mounted.set(true);
    }

    fn unmount(&self, renderer: &RendererRef, target: Handle) {
        if !self.mounted.get() {
            return;
        }
        trace!(component = %self.name, %target, "unmount component");
        let child = self.child.borrow_mut().take();
        if let Some(child) = child {
            child.unmount(renderer, target);
        }
        self.context.borrow_mut().take();
        self.mounted.set(false);
    }
}
