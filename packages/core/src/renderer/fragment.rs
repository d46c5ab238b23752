use std::cell::Cell;
use std::rc::Rc;

use super::{Anchor, Handle, Handles, Node, RenderNode, RendererRef};

pub fn fragment(children: Vec<Node>) -> Node {
    Rc::new(FragmentNode::new(children))
}

/// Ordered siblings rendered into the same target.
pub struct FragmentNode {
    children: Vec<Node>,
    mounted: Cell<bool>,
}

impl FragmentNode {
    pub fn new(children: Vec<Node>) -> Self {
        FragmentNode {
            children,
            mounted: Cell::new(false),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl RenderNode for FragmentNode {
    fn name(&self) -> &str {
        "fragment"
    }

    fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn elements(&self) -> Handles {
        assert!(self.mounted.get(), "fragment read before mounting");
        self.children
            .iter()
            .flat_map(|child| child.elements())
            .collect()
    }

    fn mount(&self, renderer: &RendererRef, target: Handle, after: &Anchor) {
        let mut anchor = after.clone();
        for child in &self.children {
            child.mount(renderer, target, &anchor);
            anchor = Anchor::after_node(child.clone(), anchor);
        }
        self.mounted.set(true);
    }

    fn unmount(&self, renderer: &RendererRef, target: Handle) {
        if !self.mounted.get() {
            return;
        }
        for child in self.children.iter().rev() {
            child.unmount(renderer, target);
        }
        self.mounted.set(false);
    }
}
