use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use super::{Accessor, Anchor, Disposables, Handle, Handles, Node, RenderNode, RendererRef};
use crate::reactive::effect;
use crate::value::Value;

/// Content of a text node.
#[derive(Clone)]
pub enum TextSource {
    Static(Value),
    Dynamic(Accessor),
}

impl TextSource {
    pub fn dynamic(f: impl Fn() -> Value + 'static) -> Self {
        TextSource::Dynamic(Rc::new(f))
    }
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        TextSource::Static(Value::from(text))
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        TextSource::Static(Value::from(text))
    }
}

impl From<Value> for TextSource {
    fn from(value: Value) -> Self {
        TextSource::Static(value)
    }
}

pub fn text(source: impl Into<TextSource>) -> Node {
    Rc::new(TextNode::new(source.into()))
}

pub struct TextNode {
    source: TextSource,
    handle: Rc<Cell<Option<Handle>>>,
    disposables: Disposables,
}

impl TextNode {
    pub fn new(source: TextSource) -> Self {
        TextNode {
            source,
            handle: Rc::new(Cell::new(None)),
            disposables: Disposables::default(),
        }
    }
}

impl RenderNode for TextNode {
    fn name(&self) -> &str {
        "text"
    }

    fn is_mounted(&self) -> bool {
        self.handle.get().is_some()
    }

    fn elements(&self) -> Handles {
        match self.handle.get() {
            Some(handle) => Handles::from_slice(&[handle]),
            None => panic!("text node read before mounting"),
        }
    }

    fn mount(&self, renderer: &RendererRef, target: Handle, after: &Anchor) {
        trace!(%target, "mount text");
        match &self.source {
            TextSource::Static(value) => {
                self.handle
                    .set(Some(renderer.create_text(&value.to_display_string())));
            }
            TextSource::Dynamic(accessor) => {
                let renderer = renderer.clone();
                let accessor = accessor.clone();
                let slot = self.handle.clone();
                self.disposables.effect(effect(move || {
                    let content = accessor().to_display_string();
                    match slot.get() {
                        Some(handle) => renderer.set_text(&content, handle),
                        None => slot.set(Some(renderer.create_text(&content))),
                    }
                }));
            }
        }
        if let Some(handle) = self.handle.get() {
            renderer.mount(&[handle], target, after.resolve());
        }
    }

    fn unmount(&self, renderer: &RendererRef, target: Handle) {
        let Some(handle) = self.handle.get() else {
            return;
        };
        renderer.unmount(&[handle], target);
        self.disposables.dispose();
        self.handle.set(None);
    }
}
