//! Output JIT Module
//!
//! Executes a generated [`Program`] directly against the runtime instead of
//! going through JavaScript. The program is compiled once into closures;
//! every instantiation of the resulting component only runs those closures.
//!
//! Imports are resolved through a [`ModuleRegistry`]: the runtime module
//! supplies the constructor vocabulary, controller modules are registered
//! as Rust closures and child components either as prebuilt definitions or
//! as programs evaluated on first use.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use htmly_core::{
    conditional, define_component, element, for_each, fragment, text, Binding, Component, ComponentInput,
    ElementInput, ForInput, IfBranch, Inputs, Node, ReadSignal, Slots, TextSource, Value,
};
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::interpreter::{evaluate as evaluate_host, literal_value, Scope};
use super::output_ast::{Expression, ImportSpecifier, ObjectProperty, Param, Program, Statement};
use crate::config::CompilerConfig;
use crate::error::{CompilerError, Result};
use crate::expression_parser::LiteralValue;
use crate::transform::identifiers::{self as ids, Constructors};
use crate::util::join_path;

/// Controller module: builds a component instance's context from its inputs.
pub type Controller = Rc<dyn Fn(&Inputs) -> Value>;

type NodeFactory = Rc<dyn Fn(&RenderScope) -> Node>;
type ValueFactory = Rc<dyn Fn(&RenderScope) -> Value>;

struct RegisteredProgram {
    program: Program,
    context: String,
}

/// Modules a generated program may import, keyed by normalized path.
pub struct ModuleRegistry {
    runtime_module: String,
    controllers: HashMap<String, Controller>,
    programs: HashMap<String, RegisteredProgram>,
    components: RefCell<HashMap<String, Component<Value>>>,
    loading: RefCell<HashSet<String>>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::with_config(&CompilerConfig::default())
    }

    pub fn with_config(config: &CompilerConfig) -> Self {
        ModuleRegistry {
            runtime_module: config.runtime_module.clone(),
            controllers: HashMap::new(),
            programs: HashMap::new(),
            components: RefCell::new(HashMap::new()),
            loading: RefCell::new(HashSet::new()),
        }
    }

    pub fn runtime_module(&self) -> &str {
        &self.runtime_module
    }

    pub fn register_controller(&mut self, path: &str, controller: impl Fn(&Inputs) -> Value + 'static) {
        self.controllers.insert(join_path("/", path), Rc::new(controller));
    }

    /// Registers the generated program of a child component. It is
    /// evaluated the first time a program imports `path`.
    pub fn register_program(&mut self, path: &str, program: Program, context: impl Into<String>) {
        self.programs.insert(
            join_path("/", path),
            RegisteredProgram {
                program,
                context: context.into(),
            },
        );
    }

    pub fn register_component(&mut self, path: &str, component: Component<Value>) {
        self.components.get_mut().insert(join_path("/", path), component);
    }

    pub fn controller(&self, path: &str) -> Result<Controller> {
        self.controllers
            .get(&join_path("/", path))
            .cloned()
            .ok_or_else(|| CompilerError::unknown_module(path))
    }

    /// Component exported by the module at `path`.
    pub fn component(&self, path: &str) -> Result<Component<Value>> {
        let key = join_path("/", path);
        if let Some(component) = self.components.borrow().get(&key) {
            return Ok(component.clone());
        }
        let registered = self
            .programs
            .get(&key)
            .ok_or_else(|| CompilerError::unknown_module(path))?;

        if !self.loading.borrow_mut().insert(key.clone()) {
            return Err(CompilerError::evaluation(format!("circular import of `{}`", path)));
        }
        let result = evaluate(&registered.program, &registered.context, self);
        self.loading.borrow_mut().remove(&key);

        let component = result?;
        self.components.borrow_mut().insert(key, component.clone());
        Ok(component)
    }
}

/// Evaluates `program`, whose relative imports are resolved against
/// `context`, into the component it exports.
pub fn evaluate(program: &Program, context: &str, registry: &ModuleRegistry) -> Result<Component<Value>> {
    debug!(context, statements = program.body.len(), "evaluating program");
    let mut jit = JitEvaluator::new(registry);
    let mut defaults: IndexMap<String, String> = IndexMap::new();
    let mut definition = None;

    for statement in &program.body {
        match statement {
            Statement::Import { specifiers, source } if *source == registry.runtime_module => {
                for specifier in specifiers {
                    let name = specifier.local();
                    let constructor = match specifier {
                        ImportSpecifier::Named(_) => Constructors::from_runtime_name(name),
                        ImportSpecifier::Default(_) => None,
                    };
                    match constructor {
                        Some(flag) => jit.runtime |= flag,
                        None => {
                            return Err(CompilerError::evaluation(format!(
                                "`{}` is not exported by {}",
                                name, source
                            )))
                        }
                    }
                }
            }
            Statement::Import { specifiers, source } if specifiers.is_empty() => {
                trace!(source = source.as_str(), "skipping side-effect import");
            }
            Statement::Import { specifiers, source } => {
                for specifier in specifiers {
                    match specifier {
                        ImportSpecifier::Default(local) => {
                            defaults.insert(local.clone(), join_path(context, source));
                        }
                        ImportSpecifier::Named(name) => {
                            return Err(CompilerError::evaluation(format!(
                                "named import `{}` from {} is not supported",
                                name, source
                            )))
                        }
                    }
                }
            }
            Statement::Const { declarations } => {
                for declarator in declarations {
                    let tag = jit.element_constructor(&declarator.init)?;
                    jit.elements.insert(declarator.name.clone(), tag);
                }
            }
            Statement::ExportDefault(expr) => definition = Some(expr),
            Statement::Return(_) => {
                return Err(CompilerError::evaluation("return outside of a function"));
            }
        }
    }

    let definition = definition.ok_or_else(|| CompilerError::evaluation("program has no default export"))?;
    let (name, controller_var, render) = split_definition(definition)?;
    jit.require(Constructors::COMPONENT)?;

    let controller_path = defaults
        .get(controller_var)
        .ok_or_else(|| CompilerError::evaluation(format!("`{}` is not imported", controller_var)))?;
    let controller = registry.controller(controller_path)?;

    for (local, path) in &defaults {
        if local != controller_var {
            jit.components.insert(local.clone(), registry.component(path)?);
        }
    }

    let (params, body) = match render {
        Expression::Function { params, body } => (params, body),
        other => return Err(unexpected("render function", other)),
    };
    for param in params {
        if param.as_str() != ids::SLOTS {
            return Err(CompilerError::evaluation(format!("unexpected render parameter `{}`", param)));
        }
        jit.slots_param = true;
    }
    let root = match body.as_slice() {
        [Statement::Return(expr)] if expr.is_null() => None,
        [Statement::Return(expr)] => Some(jit.compile_node(expr)?),
        _ => return Err(CompilerError::evaluation("render function must be a single return statement")),
    };

    Ok(define_component(
        move |inputs: &Inputs| controller(inputs),
        move |context: &Value, slots: &Slots| {
            let scope = RenderScope {
                scope: Scope::new(context.clone()),
                slots: Some(slots.clone()),
            };
            root.as_ref().map(|factory| factory(&scope))
        },
    )
    .with_name(name))
}

/// `$c("name", controller, function (...) { ... })`
fn split_definition(expr: &Expression) -> Result<(String, &str, &Expression)> {
    match expr {
        Expression::Call { callee, arguments } if callee.as_identifier() == Some(ids::COMPONENT) => {
            match arguments.as_slice() {
                [Expression::Literal {
                    value: LiteralValue::String(name),
                }, controller, render] => {
                    let controller = controller
                        .as_identifier()
                        .ok_or_else(|| unexpected("controller identifier", controller))?;
                    Ok((name.clone(), controller, render))
                }
                _ => Err(CompilerError::evaluation(format!(
                    "{} expects a name, a controller and a render function",
                    ids::COMPONENT
                ))),
            }
        }
        other => Err(unexpected("component definition", other)),
    }
}

fn unexpected(what: &str, got: &Expression) -> CompilerError {
    CompilerError::evaluation(format!("expected {}, got {:?}", what, got))
}

/// Runtime bindings of a render function invocation.
#[derive(Clone)]
struct RenderScope {
    scope: Scope,
    slots: Option<Slots>,
}

impl RenderScope {
    fn with_vars(&self, bindings: impl IntoIterator<Item = (String, Value)>) -> RenderScope {
        RenderScope {
            scope: self.scope.with_vars(bindings),
            slots: self.slots.clone(),
        }
    }
}

/// Reads the item signal; what `item()` calls inside a loop body.
fn accessor(signal: ReadSignal<Value>) -> Value {
    Value::function(move |_| signal.get())
}

/// Invokes an event handler expression's value with the event payload.
/// A handler expression that already ran for its effect leaves nothing to
/// call.
fn dispatch(handler: Value, payload: &Value) {
    if let Some(function) = handler.as_function() {
        function.call(std::slice::from_ref(payload));
    }
}

fn object_properties<'e>(expr: &'e Expression, what: &str) -> Result<&'e [ObjectProperty]> {
    match expr {
        Expression::Object { properties } => Ok(properties),
        other => Err(unexpected(what, other)),
    }
}

fn thunk_body(expr: &Expression) -> Option<&Expression> {
    match expr {
        Expression::Arrow { params, body } if params.is_empty() => Some(body),
        _ => None,
    }
}

struct JitEvaluator<'r> {
    registry: &'r ModuleRegistry,
    runtime: Constructors,
    elements: HashMap<String, Rc<str>>,
    components: HashMap<String, Component<Value>>,
    slots_param: bool,
}

impl<'r> JitEvaluator<'r> {
    fn new(registry: &'r ModuleRegistry) -> Self {
        JitEvaluator {
            registry,
            runtime: Constructors::empty(),
            elements: HashMap::new(),
            components: HashMap::new(),
            slots_param: false,
        }
    }

    fn require(&self, constructor: Constructors) -> Result<()> {
        if self.runtime.contains(constructor) {
            Ok(())
        } else {
            let names = constructor.names().join(", ");
            Err(CompilerError::evaluation(format!(
                "`{}` is used but not imported from {}",
                names, self.registry.runtime_module
            )))
        }
    }

    /// `$e("tag")`
    fn element_constructor(&self, expr: &Expression) -> Result<Rc<str>> {
        if let Expression::Call { callee, arguments } = expr {
            if callee.as_identifier() == Some(ids::ELEMENT) {
                if let [Expression::Literal {
                    value: LiteralValue::String(tag),
                }] = arguments.as_slice()
                {
                    self.require(Constructors::ELEMENT)?;
                    return Ok(Rc::from(tag.as_str()));
                }
            }
        }
        Err(unexpected("element constructor", expr))
    }

    fn compile_node(&self, expr: &Expression) -> Result<NodeFactory> {
        let (callee, arguments) = match expr {
            Expression::Call { callee, arguments } => (callee.as_ref(), arguments.as_slice()),
            other => return Err(unexpected("render node", other)),
        };

        match callee {
            Expression::Identifier { name } => {
                if let Some(tag) = self.elements.get(name) {
                    return self.compile_element(tag.clone(), arguments);
                }
                if let Some(component) = self.components.get(name) {
                    return self.compile_component(component.clone(), arguments);
                }
                match name.as_str() {
                    ids::TEXT => {
                        self.require(Constructors::TEXT)?;
                        self.compile_text(arguments)
                    }
                    ids::IF => {
                        self.require(Constructors::IF)?;
                        self.compile_if(arguments)
                    }
                    ids::FOR => {
                        self.require(Constructors::FOR)?;
                        self.compile_for(arguments)
                    }
                    ids::FRAGMENT => {
                        self.require(Constructors::FRAGMENT)?;
                        self.compile_fragment(arguments)
                    }
                    _ => Err(CompilerError::evaluation(format!("`{}` is not a render node constructor", name))),
                }
            }
            Expression::Call { .. } => {
                let tag = self.element_constructor(callee)?;
                self.compile_element(tag, arguments)
            }
            Expression::Index { object, index } if object.as_identifier() == Some(ids::SLOTS) => {
                let name = match index.as_ref() {
                    Expression::Literal {
                        value: LiteralValue::String(name),
                    } => name.clone(),
                    other => return Err(unexpected("slot name", other)),
                };
                self.compile_slot_outlet(name, arguments)
            }
            other => Err(unexpected("render node constructor", other)),
        }
    }

    fn compile_element(&self, tag: Rc<str>, arguments: &[Expression]) -> Result<NodeFactory> {
        let mut attrs: Vec<(String, ValueFactory)> = Vec::new();
        let mut props: Vec<(String, ValueFactory, bool)> = Vec::new();
        let mut events: Vec<(String, ValueFactory)> = Vec::new();
        let mut child = None;

        match arguments {
            [] => {}
            [input] => {
                for property in object_properties(input, "element input")? {
                    match property.key.as_str() {
                        "attrs" => attrs = self.compile_values(&property.value, "attrs")?,
                        "props" => props = self.compile_bindings(&property.value)?,
                        "events" => events = self.compile_values(&property.value, "events")?,
                        "child" => child = Some(self.compile_node(&property.value)?),
                        other => {
                            return Err(CompilerError::evaluation(format!("unknown element input `{}`", other)))
                        }
                    }
                }
            }
            _ => return Err(CompilerError::evaluation("element constructor takes one input object")),
        }

        Ok(Rc::new(move |scope: &RenderScope| {
            let mut input = ElementInput::new();
            for (name, value) in &attrs {
                input = input.attr(name.clone(), value(scope));
            }
            for (name, value, dynamic) in &props {
                input = input.prop(name.clone(), make_binding(value, *dynamic, scope));
            }
            for (name, handler) in &events {
                let handler = handler.clone();
                let scope = scope.clone();
                input = input.event(name.clone(), move |payload: &Value| dispatch(handler(&scope), payload));
            }
            if let Some(child) = &child {
                input = input.child(child(scope));
            }
            element(tag.clone()).build(input)
        }))
    }

    fn compile_text(&self, arguments: &[Expression]) -> Result<NodeFactory> {
        match arguments {
            [Expression::Literal { value }] => {
                let value = literal_value(value);
                Ok(Rc::new(move |_: &RenderScope| text(value.clone())))
            }
            [expr] => {
                let body = thunk_body(expr).ok_or_else(|| unexpected("text source", expr))?;
                let body = self.compile_value(body)?;
                Ok(Rc::new(move |scope: &RenderScope| {
                    let body = body.clone();
                    let scope = scope.clone();
                    text(TextSource::dynamic(move || body(&scope)))
                }))
            }
            _ => Err(CompilerError::evaluation(format!("{} takes one argument", ids::TEXT))),
        }
    }

    fn compile_if(&self, arguments: &[Expression]) -> Result<NodeFactory> {
        let [options] = arguments else {
            return Err(CompilerError::evaluation(format!("{} takes one options object", ids::IF)));
        };
        let mut branches: Vec<(ValueFactory, Option<NodeFactory>)> = Vec::new();
        let mut otherwise = None;

        for property in object_properties(options, "conditional options")? {
            match (property.key.as_str(), &property.value) {
                ("ifs", Expression::Array { elements }) => {
                    for branch in elements {
                        let (test, node) = match branch {
                            Expression::Array { elements } if elements.len() == 2 => (&elements[0], &elements[1]),
                            other => return Err(unexpected("[test, node] branch", other)),
                        };
                        let test = thunk_body(test).ok_or_else(|| unexpected("branch test", test))?;
                        let node = if node.is_null() {
                            None
                        } else {
                            Some(self.compile_node(node)?)
                        };
                        branches.push((self.compile_value(test)?, node));
                    }
                }
                ("otherwise", node) => otherwise = Some(self.compile_node(node)?),
                (key, value) => return Err(unexpected(&format!("conditional option, found `{}`", key), value)),
            }
        }

        Ok(Rc::new(move |scope: &RenderScope| {
            let branches = branches
                .iter()
                .map(|(test, node)| {
                    let test = test.clone();
                    let test_scope = scope.clone();
                    IfBranch::new(
                        move || test(&test_scope).is_truthy(),
                        node.as_ref().map(|node| node(scope)),
                    )
                })
                .collect();
            conditional(branches, otherwise.as_ref().map(|node| node(scope)))
        }))
    }

    fn compile_for(&self, arguments: &[Expression]) -> Result<NodeFactory> {
        let [options, render] = arguments else {
            return Err(CompilerError::evaluation(format!(
                "{} takes an options object and a render function",
                ids::FOR
            )));
        };

        let mut items = None;
        let mut track = None;
        let mut empty = None;
        for property in object_properties(options, "loop options")? {
            match property.key.as_str() {
                "items" => {
                    let body = thunk_body(&property.value).ok_or_else(|| unexpected("items thunk", &property.value))?;
                    items = Some(self.compile_value(body)?);
                }
                "trackBy" => track = Some(self.compile_item_arrow(&property.value, |body| self.compile_value(body))?),
                "empty" => empty = Some(self.compile_node(&property.value)?),
                other => return Err(CompilerError::evaluation(format!("unknown loop option `{}`", other))),
            }
        }
        let items = items.ok_or_else(|| CompilerError::evaluation("loop without items"))?;
        let (track_var, track) = track.ok_or_else(|| CompilerError::evaluation("loop without trackBy"))?;
        let (item_var, body) = self.compile_item_arrow(render, |body| self.compile_node(body))?;

        Ok(Rc::new(move |scope: &RenderScope| {
            let items = items.clone();
            let items_scope = scope.clone();
            let track = track.clone();
            let track_var = track_var.clone();
            let track_scope = scope.clone();
            let body = body.clone();
            let item_var = item_var.clone();
            let body_scope = scope.clone();

            let mut input = ForInput::new(
                move || match items(&items_scope) {
                    Value::Array(values) => values.as_ref().clone(),
                    value if value.is_nullish() => Vec::new(),
                    value => panic!("TypeError: {} is not iterable", value.to_display_string()),
                },
                move |item: &Value| {
                    let item = item.clone();
                    let current = Value::function(move |_| item.clone());
                    track(&track_scope.with_vars([(track_var.clone(), current)])).to_display_string()
                },
                move |signal: ReadSignal<Value>| body(&body_scope.with_vars([(item_var.clone(), accessor(signal))])),
            );
            if let Some(empty) = &empty {
                input = input.empty(empty(scope));
            }
            for_each(input)
        }))
    }

    /// `(item) => body`
    fn compile_item_arrow<T>(
        &self,
        expr: &Expression,
        compile_body: impl FnOnce(&Expression) -> Result<T>,
    ) -> Result<(String, T)> {
        match expr {
            Expression::Arrow { params, body } => match params.as_slice() {
                [Param::Identifier { name }] => Ok((name.clone(), compile_body(body)?)),
                _ => Err(unexpected("single item parameter", expr)),
            },
            other => Err(unexpected("item function", other)),
        }
    }

    fn compile_fragment(&self, arguments: &[Expression]) -> Result<NodeFactory> {
        let children = arguments
            .iter()
            .map(|child| self.compile_node(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(Rc::new(move |scope: &RenderScope| {
            fragment(children.iter().map(|child| child(scope)).collect())
        }))
    }

    fn compile_component(&self, component: Component<Value>, arguments: &[Expression]) -> Result<NodeFactory> {
        let mut props: Vec<(String, ValueFactory, bool)> = Vec::new();
        let mut events: Vec<(String, ValueFactory)> = Vec::new();
        let mut slots: Vec<(String, Vec<(String, String)>, NodeFactory)> = Vec::new();

        if let [input] = arguments {
            for property in object_properties(input, "component input")? {
                match property.key.as_str() {
                    "props" => props = self.compile_bindings(&property.value)?,
                    "events" => events = self.compile_values(&property.value, "events")?,
                    "slots" => {
                        for slot in object_properties(&property.value, "slots")? {
                            let (bindings, body) = self.compile_slot(&slot.value)?;
                            slots.push((slot.key.clone(), bindings, body));
                        }
                    }
                    other => {
                        return Err(CompilerError::evaluation(format!("unknown component input `{}`", other)))
                    }
                }
            }
        } else if !arguments.is_empty() {
            return Err(CompilerError::evaluation(format!(
                "{} takes one input object",
                component.name()
            )));
        }

        Ok(Rc::new(move |scope: &RenderScope| {
            let mut input = ComponentInput::new();
            for (name, value, dynamic) in &props {
                input = input.prop(name.clone(), make_binding(value, *dynamic, scope));
            }
            for (name, handler) in &events {
                let handler = handler.clone();
                let scope = scope.clone();
                input = input.event(name.clone(), move |payload: &Value| dispatch(handler(&scope), payload));
            }
            for (name, bindings, body) in &slots {
                let bindings = bindings.clone();
                let body = body.clone();
                let scope = scope.clone();
                input = input.slot(name.clone(), move |context: Value| {
                    let vars = bindings
                        .iter()
                        .map(|(key, local)| (local.clone(), context.get(key)));
                    body(&scope.with_vars(vars))
                });
            }
            component.instantiate(input)
        }))
    }

    /// `() => node` or `({ key: local }) => node`
    fn compile_slot(&self, expr: &Expression) -> Result<(Vec<(String, String)>, NodeFactory)> {
        match expr {
            Expression::Arrow { params, body } => {
                let bindings = match params.as_slice() {
                    [] => Vec::new(),
                    [Param::Pattern { bindings }] => bindings.clone(),
                    _ => return Err(unexpected("slot function", expr)),
                };
                Ok((bindings, self.compile_node(body)?))
            }
            other => Err(unexpected("slot function", other)),
        }
    }

    fn compile_slot_outlet(&self, name: String, arguments: &[Expression]) -> Result<NodeFactory> {
        if !self.slots_param {
            return Err(CompilerError::evaluation(format!(
                "slot `{}` rendered but the render function takes no {}",
                name,
                ids::SLOTS
            )));
        }
        let context = match arguments {
            [] => None,
            [context] => Some(self.compile_value(context)?),
            _ => return Err(CompilerError::evaluation("slot functions take one context object")),
        };
        Ok(Rc::new(move |scope: &RenderScope| {
            let context = context.as_ref().map_or(Value::Undefined, |context| context(scope));
            match &scope.slots {
                Some(slots) => slots.render(&name, context),
                None => fragment(Vec::new()),
            }
        }))
    }

    /// Object of plain values: `{ key: value }`.
    fn compile_values(&self, expr: &Expression, what: &str) -> Result<Vec<(String, ValueFactory)>> {
        object_properties(expr, what)?
            .iter()
            .map(|property| Ok((property.key.clone(), self.compile_value(&property.value)?)))
            .collect()
    }

    /// Object of bindings: thunks stay reactive, anything else is constant.
    fn compile_bindings(&self, expr: &Expression) -> Result<Vec<(String, ValueFactory, bool)>> {
        object_properties(expr, "props")?
            .iter()
            .map(|property| match thunk_body(&property.value) {
                Some(body) => Ok((property.key.clone(), self.compile_value(body)?, true)),
                None => Ok((property.key.clone(), self.compile_value(&property.value)?, false)),
            })
            .collect()
    }

    fn compile_value(&self, expr: &Expression) -> Result<ValueFactory> {
        let factory: ValueFactory = match expr {
            Expression::Literal { value } => {
                let value = literal_value(value);
                Rc::new(move |_: &RenderScope| value.clone())
            }
            Expression::Host { expr } => {
                let expr = expr.clone();
                Rc::new(move |scope: &RenderScope| evaluate_host(&expr, &scope.scope))
            }
            Expression::Identifier { name } => {
                let name = name.clone();
                Rc::new(move |scope: &RenderScope| match scope.scope.lookup(&name) {
                    Some(value) => value.clone(),
                    None => panic!("ReferenceError: {} is not defined", name),
                })
            }
            Expression::Object { properties } => {
                let entries = properties
                    .iter()
                    .map(|property| Ok((property.key.clone(), self.compile_value(&property.value)?)))
                    .collect::<Result<Vec<_>>>()?;
                Rc::new(move |scope: &RenderScope| {
                    Value::object(entries.iter().map(|(key, value)| (key.clone(), value(scope))))
                })
            }
            Expression::Array { elements } => {
                let elements = elements
                    .iter()
                    .map(|element| self.compile_value(element))
                    .collect::<Result<Vec<_>>>()?;
                Rc::new(move |scope: &RenderScope| Value::array(elements.iter().map(|element| element(scope))))
            }
            Expression::Arrow { params, body } => {
                let params = params.clone();
                let body = self.compile_value(body)?;
                Rc::new(move |scope: &RenderScope| {
                    let params = params.clone();
                    let body = body.clone();
                    let scope = scope.clone();
                    Value::function(move |args| {
                        let mut vars = Vec::new();
                        for (index, param) in params.iter().enumerate() {
                            let arg = args.get(index).cloned().unwrap_or_default();
                            match param {
                                Param::Identifier { name } => vars.push((name.clone(), arg)),
                                Param::Pattern { bindings } => vars.extend(
                                    bindings.iter().map(|(key, local)| (local.clone(), arg.get(key))),
                                ),
                            }
                        }
                        body(&scope.with_vars(vars))
                    })
                })
            }
            other => return Err(unexpected("value expression", other)),
        };
        Ok(factory)
    }
}

fn make_binding(value: &ValueFactory, dynamic: bool, scope: &RenderScope) -> Binding {
    if dynamic {
        let value = value.clone();
        let scope = scope.clone();
        Binding::dynamic(move || value(&scope))
    } else {
        Binding::Static(value(scope))
    }
}
