//! Template Transformer
//!
//! Lowers a parsed template into a [`Program`]: a call tree over the runtime
//! constructors wrapped in a component definition. While walking the tree
//! the transformer records which constructors, element tags and child
//! components were used, and the import list is derived from that record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::identifiers::{self as ids, Constructors};
use crate::config::CompilerConfig;
use crate::error::{CompilerError, Result};
use crate::expression_parser::Expr;
use crate::output::output_ast::{Declarator, Expression, ImportSpecifier, ObjectProperty, Param, Program, Statement};
use crate::parse_util::sanitize_identifier;
use crate::template_parser::{Attribute, AttributeKind, AttributeValue, Element, ForBlock, IfBlock, TemplateNode};
use crate::util::{let_binding_name, relative_path, tag_name_to_var_name};

/// Where a component's files live. Paths are module specifiers; `context`
/// is the directory every generated import is made relative to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentInfo {
    /// Tag name the component is invoked under
    pub name: String,
    pub context: String,
    pub template: String,
    /// Module the generated program is written to
    pub component: String,
    pub controller: String,
    pub styles: Option<String>,
}

impl ComponentInfo {
    pub fn new(name: impl Into<String>, context: impl Into<String>) -> Self {
        let name = name.into();
        let context = context.into();
        ComponentInfo {
            template: format!("{}/{}.html", context, name),
            component: format!("{}/{}.component.js", context, name),
            controller: format!("{}/{}.js", context, name),
            name,
            context,
            styles: None,
        }
    }
}

/// Resolves the module a child component is imported from.
pub type ModuleResolver<'r> = &'r dyn Fn(&ComponentInfo) -> String;

/// Imports child components from their generated module.
pub fn default_resolver(info: &ComponentInfo) -> String {
    info.component.clone()
}

/// Lowers `ast` into the program defining the component `info`. Element
/// tags naming an entry of `siblings` compile to component invocations.
pub fn lower(
    ast: &[TemplateNode],
    info: &ComponentInfo,
    siblings: &IndexMap<String, ComponentInfo>,
    resolver: ModuleResolver<'_>,
    config: &CompilerConfig,
) -> Result<Program> {
    let mut transformer = Transformer::new(siblings, config);
    let root = transformer.visit_fragment(ast)?;
    Ok(transformer.finish(root, info, resolver))
}

/// Lowered element attributes, split by the channel they feed.
#[derive(Default)]
struct AttributeGroups {
    attrs: Vec<ObjectProperty>,
    props: Vec<ObjectProperty>,
    events: Vec<ObjectProperty>,
}

/// Children routed into one slot of a component invocation.
#[derive(Default)]
struct SlotContent<'t> {
    nodes: Vec<&'t TemplateNode>,
    lets: Vec<(String, String)>,
}

struct Transformer<'a> {
    siblings: &'a IndexMap<String, ComponentInfo>,
    config: &'a CompilerConfig,
    constructors: Constructors,
    /// Child components by tag, with the variable they are imported under
    components: IndexMap<String, String>,
    /// Hoisted element tags, with the variable each is declared under
    elements: IndexMap<String, String>,
    uses_slots: bool,
}

impl<'a> Transformer<'a> {
    fn new(siblings: &'a IndexMap<String, ComponentInfo>, config: &'a CompilerConfig) -> Self {
        Transformer {
            siblings,
            config,
            constructors: Constructors::COMPONENT,
            components: IndexMap::new(),
            elements: IndexMap::new(),
            uses_slots: false,
        }
    }

    fn finish(self, root: Option<Expression>, info: &ComponentInfo, resolver: ModuleResolver<'_>) -> Program {
        let mut body = vec![Statement::Import {
            specifiers: self
                .constructors
                .names()
                .into_iter()
                .map(|name| ImportSpecifier::Named(name.to_string()))
                .collect(),
            source: self.config.runtime_module.clone(),
        }];

        if let Some(styles) = &info.styles {
            body.push(Statement::Import {
                specifiers: Vec::new(),
                source: relative_path(&info.context, styles),
            });
        }

        body.push(Statement::Import {
            specifiers: vec![ImportSpecifier::Default(ids::CONTROLLER.to_string())],
            source: relative_path(&info.context, &info.controller),
        });

        for (tag, var) in &self.components {
            if let Some(child) = self.siblings.get(tag) {
                body.push(Statement::Import {
                    specifiers: vec![ImportSpecifier::Default(var.clone())],
                    source: relative_path(&info.context, &resolver(child)),
                });
            }
        }

        if self.config.hoist_elements && !self.elements.is_empty() {
            body.push(Statement::Const {
                declarations: self
                    .elements
                    .iter()
                    .map(|(tag, var)| Declarator {
                        name: var.clone(),
                        init: Expression::call(Expression::ident(ids::ELEMENT), vec![Expression::string(tag)]),
                    })
                    .collect(),
            });
        }

        let params = if self.uses_slots {
            vec![ids::SLOTS.to_string()]
        } else {
            Vec::new()
        };
        let render = Expression::Function {
            params,
            body: vec![Statement::Return(root.unwrap_or_else(Expression::null))],
        };

        body.push(Statement::ExportDefault(Expression::call(
            Expression::ident(ids::COMPONENT),
            vec![Expression::string(&info.name), Expression::ident(ids::CONTROLLER), render],
        )));

        Program { body }
    }

    /// Lowers sibling nodes. No output collapses to `None`, a single node
    /// is returned as is, and anything longer is wrapped in a fragment.
    fn visit_fragment<'t>(&mut self, nodes: impl IntoIterator<Item = &'t TemplateNode>) -> Result<Option<Expression>> {
        let mut lowered = Vec::new();
        for node in nodes {
            if let Some(expr) = self.visit_node(node)? {
                lowered.push(expr);
            }
        }
        Ok(match lowered.len() {
            0 => None,
            1 => lowered.pop(),
            _ => {
                self.constructors |= Constructors::FRAGMENT;
                Some(Expression::call(Expression::ident(ids::FRAGMENT), lowered))
            }
        })
    }

    fn visit_node(&mut self, node: &TemplateNode) -> Result<Option<Expression>> {
        match node {
            TemplateNode::Element(element) => self.visit_element(element),
            TemplateNode::Text { value } => Ok(self.visit_text(value)),
            TemplateNode::Expression { value } => Ok(Some(self.visit_interpolation(value))),
            TemplateNode::If(block) => self.visit_if(block),
            TemplateNode::For(block) => self.visit_for(block),
        }
    }

    fn visit_element(&mut self, element: &Element) -> Result<Option<Expression>> {
        if element.name == self.config.template_tag {
            return Err(CompilerError::transform(format!(
                "<{}> is only allowed as a direct child of a component",
                element.name
            )));
        }
        if element.name == self.config.slot_tag {
            return Ok(Some(self.visit_slot(element)));
        }
        if self.siblings.contains_key(&element.name) {
            return self.visit_component(element).map(Some);
        }

        self.constructors |= Constructors::ELEMENT;
        let callee = if self.config.hoist_elements {
            Expression::ident(self.hoist_element(&element.name))
        } else {
            Expression::call(Expression::ident(ids::ELEMENT), vec![Expression::string(&element.name)])
        };

        let groups = lower_attributes(&element.attributes);
        let child = self.visit_fragment(&element.children)?;

        let mut properties = Vec::new();
        push_group(&mut properties, "attrs", groups.attrs);
        push_group(&mut properties, "props", groups.props);
        push_group(&mut properties, "events", groups.events);
        if let Some(child) = child {
            properties.push(ObjectProperty::new("child", child));
        }
        let arguments = if properties.is_empty() {
            Vec::new()
        } else {
            vec![Expression::object(properties)]
        };
        Ok(Some(Expression::call(callee, arguments)))
    }

    /// Variable the constructor for `tag` is hoisted under. Tags that
    /// sanitize to the same name get numbered variables.
    fn hoist_element(&mut self, tag: &str) -> String {
        if let Some(var) = self.elements.get(tag) {
            return var.clone();
        }
        let base = ids::element_var(tag);
        let mut var = base.clone();
        let mut suffix = 2;
        while self.elements.values().any(|taken| *taken == var) {
            var = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.elements.insert(tag.to_string(), var.clone());
        var
    }

    fn visit_text(&mut self, value: &str) -> Option<Expression> {
        if value.is_empty() {
            return None;
        }
        self.constructors |= Constructors::TEXT;
        Some(Expression::call(Expression::ident(ids::TEXT), vec![Expression::string(value)]))
    }

    fn visit_interpolation(&mut self, value: &Expr) -> Expression {
        self.constructors |= Constructors::TEXT;
        Expression::call(
            Expression::ident(ids::TEXT),
            vec![Expression::thunk(Expression::host(value.clone()))],
        )
    }

    fn visit_if(&mut self, block: &IfBlock) -> Result<Option<Expression>> {
        let mut branches = vec![(&block.test, self.visit_fragment(&block.then)?)];
        for elif in &block.elifs {
            branches.push((&elif.test, self.visit_fragment(&elif.then)?));
        }
        let otherwise = self.visit_fragment(&block.otherwise)?;

        if otherwise.is_none() {
            while matches!(branches.last(), Some((_, None))) {
                branches.pop();
            }
        }
        if branches.is_empty() && otherwise.is_none() {
            return Ok(None);
        }
        self.constructors |= Constructors::IF;

        let ifs = branches
            .into_iter()
            .map(|(test, node)| {
                Expression::array(vec![
                    Expression::thunk(Expression::host(test.clone())),
                    node.unwrap_or_else(Expression::null),
                ])
            })
            .collect();

        let mut properties = vec![ObjectProperty::new("ifs", Expression::array(ifs))];
        if let Some(otherwise) = otherwise {
            properties.push(ObjectProperty::new("otherwise", otherwise));
        }
        Ok(Some(Expression::call(
            Expression::ident(ids::IF),
            vec![Expression::object(properties)],
        )))
    }

    fn visit_for(&mut self, block: &ForBlock) -> Result<Option<Expression>> {
        let item = block.item.as_identifier().ok_or_else(|| {
            CompilerError::transform(format!(
                "@for item must be a plain identifier, got `{}`",
                block.item
            ))
        })?;

        let children = self.visit_fragment(&block.children)?;
        let empty = self.visit_fragment(&block.empty)?;
        if children.is_none() && empty.is_none() {
            return Ok(None);
        }
        self.constructors |= Constructors::FOR;

        let children = children.unwrap_or_else(|| {
            self.constructors |= Constructors::FRAGMENT;
            Expression::call(Expression::ident(ids::FRAGMENT), Vec::new())
        });

        let mut options = vec![
            ObjectProperty::new("items", Expression::thunk(Expression::host(block.items.clone()))),
            ObjectProperty::new(
                "trackBy",
                Expression::arrow(vec![Param::ident(item)], Expression::host(block.track.clone())),
            ),
        ];
        if let Some(empty) = empty {
            options.push(ObjectProperty::new("empty", empty));
        }

        Ok(Some(Expression::call(
            Expression::ident(ids::FOR),
            vec![
                Expression::object(options),
                Expression::arrow(vec![Param::ident(item)], children),
            ],
        )))
    }

    /// `<slot name="x" [a]="expr">` becomes `$$slots["x"]({ a: () => expr })`.
    fn visit_slot(&mut self, element: &Element) -> Expression {
        self.uses_slots = true;

        let name = element
            .attribute("name")
            .and_then(Attribute::text)
            .unwrap_or("default")
            .to_string();

        let context = element
            .attributes
            .iter()
            .filter(|attribute| attribute.name != "name")
            .filter_map(|attribute| match (&attribute.kind, &attribute.value) {
                (AttributeKind::Literal, AttributeValue::Text(text)) => {
                    Some(ObjectProperty::new(&attribute.name, Expression::string(text)))
                }
                (AttributeKind::Property, AttributeValue::Expression(expr)) => Some(ObjectProperty::new(
                    &attribute.name,
                    Expression::thunk(Expression::host(expr.clone())),
                )),
                _ => None,
            })
            .collect();

        Expression::call(
            Expression::Index {
                object: Box::new(Expression::ident(ids::SLOTS)),
                index: Box::new(Expression::string(name)),
            },
            vec![Expression::object(context)],
        )
    }

    fn visit_component(&mut self, element: &Element) -> Result<Expression> {
        self.constructors |= Constructors::COMPONENT;
        let var = self
            .components
            .entry(element.name.clone())
            .or_insert_with(|| sanitize_identifier(&tag_name_to_var_name(&element.name)))
            .clone();

        let groups = lower_attributes(&element.attributes);
        let mut props = groups.attrs;
        props.extend(groups.props);

        let mut slots: IndexMap<String, SlotContent<'_>> = IndexMap::new();
        for child in &element.children {
            let (name, content) = self.route_slot(child)?;
            let slot = slots.entry(name).or_default();
            slot.nodes.extend(content.nodes);
            slot.lets.extend(content.lets);
        }

        let mut slot_properties = Vec::new();
        for (name, content) in slots {
            let Some(body) = self.visit_fragment(content.nodes)? else {
                continue;
            };
            let params = if content.lets.is_empty() {
                Vec::new()
            } else {
                vec![Param::Pattern { bindings: content.lets }]
            };
            slot_properties.push(ObjectProperty::new(name, Expression::arrow(params, body)));
        }

        let mut properties = Vec::new();
        push_group(&mut properties, "props", props);
        push_group(&mut properties, "events", groups.events);
        push_group(&mut properties, "slots", slot_properties);

        Ok(Expression::call(Expression::ident(var), vec![Expression::object(properties)]))
    }

    /// Decides which slot a component child fills. Anything but a
    /// `template` wrapper goes to the default slot.
    fn route_slot<'t>(&self, node: &'t TemplateNode) -> Result<(String, SlotContent<'t>)> {
        let wrapper = match node.as_element() {
            Some(element) if element.name == self.config.template_tag => element,
            _ => {
                return Ok((
                    "default".to_string(),
                    SlotContent {
                        nodes: vec![node],
                        lets: Vec::new(),
                    },
                ))
            }
        };

        let name = match wrapper.attribute("slot") {
            None => "default".to_string(),
            Some(attribute) => match attribute.text() {
                Some(name) if attribute.kind == AttributeKind::Literal => name.to_string(),
                _ => {
                    return Err(CompilerError::transform(format!(
                        "slot attribute of <{}> must be a literal name",
                        wrapper.name
                    )))
                }
            },
        };

        // `let-u="user"` binds the local `u` to the slot context's `user`
        let mut lets = Vec::new();
        for attribute in &wrapper.attributes {
            let Some(local) = let_binding_name(&attribute.name) else {
                continue;
            };
            if !is_binding_name(local) {
                return Err(CompilerError::transform(format!(
                    "{} on <{}> must introduce a valid identifier",
                    attribute.name, wrapper.name
                )));
            }
            let key = match (&attribute.kind, &attribute.value) {
                (AttributeKind::Flag, _) => local.to_string(),
                (AttributeKind::Literal, AttributeValue::Text(key)) if key.is_empty() => local.to_string(),
                (AttributeKind::Literal, AttributeValue::Text(key)) if is_binding_name(key) => key.clone(),
                _ => {
                    return Err(CompilerError::transform(format!(
                        "{} on <{}> must name a context property",
                        attribute.name, wrapper.name
                    )))
                }
            };
            lets.push((key, local.to_string()));
        }

        Ok((
            name,
            SlotContent {
                nodes: wrapper.children.iter().collect(),
                lets,
            },
        ))
    }
}

fn is_binding_name(name: &str) -> bool {
    crate::expression_parser::serializer::is_identifier_name(name)
}

fn push_group(properties: &mut Vec<ObjectProperty>, key: &str, group: Vec<ObjectProperty>) {
    if !group.is_empty() {
        properties.push(ObjectProperty::new(key, Expression::object(group)));
    }
}

/// Literal and flag attributes become constants, property bindings become
/// thunks and event bindings pass the handler expression through.
fn lower_attributes(attributes: &[Attribute]) -> AttributeGroups {
    let mut groups = AttributeGroups::default();
    for attribute in attributes {
        let name = attribute.name.clone();
        match (&attribute.kind, &attribute.value) {
            (AttributeKind::Literal, AttributeValue::Text(text)) => {
                groups.attrs.push(ObjectProperty::new(name, Expression::string(text)))
            }
            (AttributeKind::Flag, _) => groups.attrs.push(ObjectProperty::new(name, Expression::boolean(true))),
            (AttributeKind::Property, AttributeValue::Expression(expr)) => groups
                .props
                .push(ObjectProperty::new(name, Expression::thunk(Expression::host(expr.clone())))),
            (AttributeKind::Event, AttributeValue::Expression(expr)) => {
                groups.events.push(ObjectProperty::new(name, Expression::host(expr.clone())))
            }
            _ => {}
        }
    }
    groups
}
