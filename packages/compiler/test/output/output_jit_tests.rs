/**
 * Program Evaluation Tests
 *
 * Compiled programs evaluated against the runtime and mounted on the
 * in-memory renderer: node creation, reactivity, control flow, child
 * components with slots and module resolution failures.
 */

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use htmly_compiler::error::CompilerError;
    use htmly_compiler::output::output_ast::Statement;
    use htmly_compiler::output::{evaluate, ModuleRegistry, Program};
    use htmly_compiler::transform::ComponentInfo;
    use htmly_compiler::{compile_all, compile_component, CompilerConfig, ComponentSource};
    use htmly_core::{
        define_component, render, signal, text, Component, ComponentInput, Handle, MemoryRenderer, Mounted,
        Operation, RendererRef, Signal, Value,
    };
    use indexmap::IndexMap;

    fn compile_with(name: &str, template: &str, children: &[&str], config: &CompilerConfig) -> Program {
        let siblings: IndexMap<String, ComponentInfo> = children
            .iter()
            .map(|child| (child.to_string(), ComponentInfo::new(*child, "/src")))
            .collect();
        let source = ComponentSource::new(ComponentInfo::new(name, "/src"), template);
        compile_component(&source, &siblings, config)
            .unwrap_or_else(|e| panic!("{}", e))
            .program
    }

    fn compile(name: &str, template: &str, children: &[&str]) -> Program {
        compile_with(name, template, children, &CompilerConfig::default())
    }

    /// Registry with `app.js` returning `context` for every instance.
    fn registry_with(context: Value) -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry.register_controller("/src/app.js", move |_| context.clone());
        registry
    }

    fn load(program: &Program, registry: &ModuleRegistry) -> Component<Value> {
        evaluate(program, "/src", registry).unwrap_or_else(|e| panic!("{}", e))
    }

    struct Page {
        memory: Rc<MemoryRenderer>,
        root: Handle,
        _mounted: Mounted,
    }

    impl Page {
        fn html(&self) -> String {
            self.memory.inner_html(self.root)
        }

        /// First element child of the root
        fn first(&self) -> Handle {
            self.memory.children(self.root)[0]
        }
    }

    fn mount(component: &Component<Value>) -> Page {
        let memory = Rc::new(MemoryRenderer::new());
        let renderer: RendererRef = memory.clone();
        let root = memory.create_root("body");
        let mounted = render(renderer, root, component, ComponentInput::new());
        Page {
            memory,
            root,
            _mounted: mounted,
        }
    }

    fn getter(state: &Signal<Value>) -> Value {
        let state = state.clone();
        Value::function(move |_| state.get())
    }

    mod elements {
        use super::*;

        #[test]
        fn should_mount_a_bare_element_with_one_create_call() {
            let component = load(&compile("app", "<div></div>", &[]), &registry_with(Value::Undefined));
            let page = mount(&component);
            let operations = page.memory.operations();
            let creates = operations
                .iter()
                .filter(|op| matches!(op, Operation::Create { .. }))
                .count();
            assert_eq!(creates, 1);
            assert!(!operations
                .iter()
                .any(|op| matches!(op, Operation::SetProperty { .. } | Operation::Subscribe { .. })));
            assert_eq!(page.html(), "<div></div>");
        }

        #[test]
        fn should_set_literal_attributes() {
            let component = load(
                &compile("app", "<div foo=\"bar\"><input disabled/></div>", &[]),
                &registry_with(Value::Undefined),
            );
            assert_eq!(mount(&component).html(), "<div foo=\"bar\"><input disabled></input></div>");
        }

        #[test]
        fn should_evaluate_without_hoisted_constructors() {
            let config = CompilerConfig {
                hoist_elements: false,
                ..CompilerConfig::default()
            };
            let program = compile_with("app", "<p>hi</p>", &[], &config);
            let component = load(&program, &registry_with(Value::Undefined));
            assert_eq!(mount(&component).html(), "<p>hi</p>");
        }

        #[test]
        fn should_name_the_component() {
            let component = load(&compile("todo-app", "", &[]), &{
                let mut registry = ModuleRegistry::new();
                registry.register_controller("/src/todo-app.js", |_| Value::Undefined);
                registry
            });
            assert_eq!(component.name(), "todo-app");
            assert_eq!(mount(&component).html(), "");
        }
    }

    mod reactivity {
        use super::*;

        #[test]
        fn should_update_interpolations() {
            let count = signal(Value::from(1));
            let context = Value::object([("count", getter(&count))]);
            let component = load(&compile("app", "<p>n = {{ this.count() }}</p>", &[]), &registry_with(context));
            let page = mount(&component);
            assert_eq!(page.html(), "<p>n = 1</p>");
            count.set(Value::from(2));
            assert_eq!(page.html(), "<p>n = 2</p>");
        }

        #[test]
        fn should_update_property_bindings() {
            let title = signal(Value::from("a"));
            let context = Value::object([("title", getter(&title))]);
            let component = load(&compile("app", "<p [title]=\"this.title()\"></p>", &[]), &registry_with(context));
            let page = mount(&component);
            assert_eq!(page.html(), "<p title=\"a\"></p>");
            title.set(Value::from("b"));
            assert_eq!(page.html(), "<p title=\"b\"></p>");
        }

        #[test]
        fn should_run_event_handlers() {
            let count = signal(Value::from(0));
            let writer = count.clone();
            let adder = count.clone();
            let context = Value::object([
                ("count", getter(&count)),
                (
                    "inc",
                    Value::function(move |_| {
                        writer.set(Value::from(writer.get_untracked().to_number() + 1.0));
                        Value::Undefined
                    }),
                ),
                (
                    "add",
                    Value::function(move |args| {
                        let amount = args.first().map_or(0.0, Value::to_number);
                        adder.set(Value::from(adder.get_untracked().to_number() + amount));
                        Value::Undefined
                    }),
                ),
            ]);
            let component = load(
                &compile(
                    "app",
                    "<button (click)=\"this.inc()\" (add)=\"n => this.add(n)\">{{ this.count() }}</button>",
                    &[],
                ),
                &registry_with(context),
            );
            let page = mount(&component);
            let button = page.first();
            page.memory.dispatch(button, "click", &Value::Null);
            page.memory.dispatch(button, "click", &Value::Null);
            assert_eq!(page.html(), "<button>2</button>");
            page.memory.dispatch(button, "add", &Value::from(10));
            assert_eq!(page.html(), "<button>12</button>");
        }

        #[test]
        #[should_panic(expected = "ReferenceError: missing is not defined")]
        fn should_raise_host_errors_at_render_time() {
            let component = load(&compile("app", "{{ missing }}", &[]), &registry_with(Value::Undefined));
            mount(&component);
        }
    }

    mod control_flow {
        use super::*;

        #[test]
        fn should_switch_branches() {
            let show = signal(Value::Bool(true));
            let context = Value::object([("show", getter(&show))]);
            let component = load(
                &compile("app", "@if (this.show()) {<b>yes</b>} @else {<i>no</i>}", &[]),
                &registry_with(context),
            );
            let page = mount(&component);
            assert_eq!(page.html(), "<b>yes</b>");
            show.set(Value::Bool(false));
            assert_eq!(page.html(), "<i>no</i>");
            show.set(Value::Bool(true));
            assert_eq!(page.html(), "<b>yes</b>");
        }

        #[test]
        fn should_render_lists_and_the_empty_block() {
            let items = signal(Value::array([]));
            let context = Value::object([("items", getter(&items))]);
            let component = load(
                &compile(
                    "app",
                    "<ul>@for (item of this.items(); track item().id) {<li>{{ item().name }}</li>} @empty {<li>none</li>}</ul>",
                    &[],
                ),
                &registry_with(context),
            );
            let page = mount(&component);
            assert_eq!(page.html(), "<ul><li>none</li></ul>");

            let entry = |id: i32, name: &str| Value::object([("id", Value::from(id)), ("name", Value::from(name))]);
            items.set(Value::array([entry(1, "a"), entry(2, "b")]));
            assert_eq!(page.html(), "<ul><li>a</li><li>b</li></ul>");

            items.set(Value::array([entry(2, "b"), entry(1, "a")]));
            assert_eq!(page.html(), "<ul><li>b</li><li>a</li></ul>");

            items.set(Value::array([]));
            assert_eq!(page.html(), "<ul><li>none</li></ul>");
        }

        #[test]
        fn should_render_loop_items_named_like_their_tag() {
            let entry = |id: i32, name: &str| Value::object([("id", Value::from(id)), ("name", Value::from(name))]);
            let options = signal(Value::array([entry(1, "red"), entry(2, "blue")]));
            let component = load(
                &compile(
                    "app",
                    "<select>@for (option of this.options(); track option().id) {<option>{{ option().name }}</option>}</select><my-el></my-el><my_el></my_el>",
                    &[],
                ),
                &registry_with(Value::object([("options", getter(&options))])),
            );
            assert_eq!(
                mount(&component).html(),
                "<select><option>red</option><option>blue</option></select><my-el></my-el><my_el></my_el>"
            );
        }

        #[test]
        fn should_treat_nullish_items_as_empty() {
            let component = load(
                &compile("app", "@for (x of this.missing; track x()) { {{ x() }} } @empty {none}", &[]),
                &registry_with(Value::object([("other", Value::Null)])),
            );
            assert_eq!(mount(&component).html(), "none");
        }
    }

    mod components {
        use super::*;

        fn card_registry() -> ModuleRegistry {
            let mut registry = ModuleRegistry::new();
            registry.register_controller("/src/app.js", |_| {
                Value::object([("me", Value::object([("name", Value::from("Ann"))]))])
            });
            registry.register_controller("/src/user-card.js", |inputs| {
                let user = inputs.props.accessor("user");
                Value::object([("user", Value::function(move |_| user()))])
            });
            registry.register_program(
                "/src/user-card.component.js",
                compile(
                    "user-card",
                    "<div id=\"card\"><slot name=\"header\" [user]=\"this.user()\"></slot><slot></slot></div>",
                    &[],
                ),
                "/src",
            );
            registry
        }

        #[test]
        fn should_fill_named_and_default_slots() {
            let registry = card_registry();
            let program = compile(
                "app",
                "<user-card [user]=\"this.me\"><template slot=\"header\" let-u=\"user\">{{ u().name }}</template><p>body</p></user-card>",
                &["user-card"],
            );
            let component = load(&program, &registry);
            assert_eq!(mount(&component).html(), "<div id=\"card\">Ann<p>body</p></div>");
        }

        #[test]
        fn should_render_nothing_for_unfilled_slots() {
            let registry = card_registry();
            let component = load(&compile("app", "<user-card></user-card>", &["user-card"]), &registry);
            assert_eq!(mount(&component).html(), "<div id=\"card\"></div>");
        }

        #[test]
        fn should_forward_component_events() {
            let received = Rc::new(RefCell::new(Vec::new()));
            let log = received.clone();
            let mut registry = ModuleRegistry::new();
            registry.register_controller("/src/app.js", move |_| {
                let log = log.clone();
                Value::object([(
                    "onPick",
                    Value::function(move |args| {
                        log.borrow_mut().push(args.first().cloned().unwrap_or_default());
                        Value::Undefined
                    }),
                )])
            });
            registry.register_controller("/src/picker.js", |inputs| {
                let events = inputs.events.clone();
                Value::object([(
                    "pick",
                    Value::function(move |_| {
                        events.emit("pick", &Value::from("red"));
                        Value::Undefined
                    }),
                )])
            });
            registry.register_program(
                "/src/picker.component.js",
                compile("picker", "<button (click)=\"this.pick\">pick</button>", &[]),
                "/src",
            );
            let component = load(
                &compile("app", "<picker (pick)=\"this.onPick\"></picker>", &["picker"]),
                &registry,
            );
            let page = mount(&component);
            page.memory.dispatch(page.first(), "click", &Value::Null);
            assert_eq!(*received.borrow(), vec![Value::from("red")]);
        }

        #[test]
        fn should_use_registered_native_components() {
            let mut registry = registry_with(Value::Undefined);
            let native = define_component(|_| Value::Undefined, |_, _| Some(text(Value::from("native"))))
                .with_name("native-child");
            registry.register_component("/src/native-child.component.js", native);
            let component = load(&compile("app", "<native-child></native-child>", &["native-child"]), &registry);
            assert_eq!(mount(&component).html(), "native");
        }
    }

    mod modules {
        use super::*;

        #[test]
        fn should_report_a_missing_controller() {
            let program = compile("app", "<p></p>", &[]);
            match evaluate(&program, "/src", &ModuleRegistry::new()) {
                Err(CompilerError::UnknownModule { path }) => assert_eq!(path, "/src/app.js"),
                other => panic!("Expected an unknown module, got {:?}", other.err()),
            }
        }

        #[test]
        fn should_report_a_missing_child_component() {
            let program = compile("app", "<user-card></user-card>", &["user-card"]);
            match evaluate(&program, "/src", &registry_with(Value::Undefined)) {
                Err(CompilerError::UnknownModule { path }) => assert_eq!(path, "/src/user-card.component.js"),
                other => panic!("Expected an unknown module, got {:?}", other.err()),
            }
        }

        #[test]
        fn should_detect_circular_imports() {
            let sources = vec![
                ComponentSource::new(ComponentInfo::new("a-comp", "/src"), "<b-comp></b-comp>"),
                ComponentSource::new(ComponentInfo::new("b-comp", "/src"), "<a-comp></a-comp>"),
            ];
            let mut registry = ModuleRegistry::new();
            for (source, result) in sources.iter().zip(compile_all(&sources, &CompilerConfig::default())) {
                let compiled = result.unwrap_or_else(|e| panic!("{}", e));
                registry.register_controller(&source.info.controller, |_| Value::Undefined);
                registry.register_program(&source.info.component, compiled.program, "/src");
            }
            match registry.component("/src/a-comp.component.js") {
                Err(CompilerError::Evaluation { message }) => assert!(message.contains("circular import"), "{}", message),
                other => panic!("Expected a circular import error, got {:?}", other.err()),
            }
        }

        #[test]
        fn should_reject_constructors_that_are_not_imported() {
            let mut program = compile("app", "Hello", &[]);
            if let Statement::Import { specifiers, .. } = &mut program.body[0] {
                specifiers.retain(|specifier| specifier.local() != "$t");
            }
            match evaluate(&program, "/src", &registry_with(Value::Undefined)) {
                Err(CompilerError::Evaluation { message }) => {
                    assert!(message.contains("is used but not imported"), "{}", message)
                }
                other => panic!("Expected an evaluation error, got {:?}", other.err()),
            }
        }

        #[test]
        fn should_cache_evaluated_components() {
            let mut registry = registry_with(Value::Undefined);
            registry.register_program("/src/app.component.js", compile("app", "<p></p>", &[]), "/src");
            let first = registry.component("/src/app.component.js").unwrap();
            let second = registry.component("./src/../src/app.component.js").unwrap();
            assert_eq!(first.name(), second.name());
            assert_eq!(mount(&second).html(), "<p></p>");
        }
    }
}
