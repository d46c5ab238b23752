use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use super::{elements_of, Anchor, Disposables, Handle, Handles, Node, RenderNode, RendererRef};
use crate::reactive::{effect, untrack};

/// One `if`/`else if` arm. An absent node renders nothing while its test
/// holds, which still shadows the arms after it.
#[derive(Clone)]
pub struct IfBranch {
    pub test: Rc<dyn Fn() -> bool>,
    pub node: Option<Node>,
}

impl IfBranch {
    pub fn new(test: impl Fn() -> bool + 'static, node: Option<Node>) -> Self {
        IfBranch {
            test: Rc::new(test),
            node,
        }
    }
}

pub fn conditional(branches: Vec<IfBranch>, otherwise: Option<Node>) -> Node {
    Rc::new(IfNode::new(branches, otherwise))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Selected {
    Branch(usize),
    Otherwise,
}

struct IfState {
    branches: Vec<IfBranch>,
    otherwise: Option<Node>,
    selected: Cell<Option<Selected>>,
    active: RefCell<Option<Node>>,
}

impl IfState {
    fn select(&self) -> Selected {
        self.branches
            .iter()
            .position(|branch| (branch.test)())
            .map(Selected::Branch)
            .unwrap_or(Selected::Otherwise)
    }

    fn node_for(&self, selected: Selected) -> Option<Node> {
        match selected {
            Selected::Branch(index) => self.branches[index].node.clone(),
            Selected::Otherwise => self.otherwise.clone(),
        }
    }

    fn switch(&self, selected: Selected, renderer: &RendererRef, target: Handle, anchor: &Anchor) {
        trace!(?selected, "switch conditional branch");
        let previous = self.active.borrow_mut().take();
        if let Some(previous) = previous {
            previous.unmount(renderer, target);
        }
        let next = self.node_for(selected);
        if let Some(next) = &next {
            next.mount(renderer, target, anchor);
        }
        *self.active.borrow_mut() = next;
    }
}

/// Mounts the first branch whose test holds, or the `otherwise` node.
pub struct IfNode {
    state: Rc<IfState>,
    mounted: Cell<bool>,
    disposables: Disposables,
}

impl IfNode {
    pub fn new(branches: Vec<IfBranch>, otherwise: Option<Node>) -> Self {
        IfNode {
            state: Rc::new(IfState {
                branches,
                otherwise,
                selected: Cell::new(None),
                active: RefCell::new(None),
            }),
            mounted: Cell::new(false),
            disposables: Disposables::default(),
        }
    }
}

impl RenderNode for IfNode {
    fn name(&self) -> &str {
        "if"
    }

    fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn elements(&self) -> Handles {
        assert!(self.mounted.get(), "if node read before mounting");
        elements_of(self.state.active.borrow().as_ref())
    }

    fn mount(&self, renderer: &RendererRef, target: Handle, after: &Anchor) {
        self.mounted.set(true);
        let state = self.state.clone();
        let renderer = renderer.clone();
        let anchor = after.clone();
        self.disposables.effect(effect(move || {
            let selected = state.select();
            if state.selected.get() == Some(selected) {
                return;
            }
            state.selected.set(Some(selected));
            untrack(|| state.switch(selected, &renderer, target, &anchor));
        }));
    }

    fn unmount(&self, renderer: &RendererRef, target: Handle) {
        if !self.mounted.get() {
            return;
        }
        self.disposables.dispose();
        let active = self.state.active.borrow_mut().take();
        if let Some(active) = active {
            active.unmount(renderer, target);
        }
        self.state.selected.set(None);
        self.mounted.set(false);
    }
}
