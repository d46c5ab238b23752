#![deny(clippy::all)]

/**
 * htmly Compiler
 *
 * Compiles htmly templates into programs over the `htmly-core` render-node
 * constructors, printable as ES modules or evaluated in-process.
 */

pub mod chars;
pub mod compiler;
pub mod config;
pub mod error;
pub mod expression_parser;
pub mod output;
pub mod parse_util;
pub mod template_parser;
pub mod transform;
pub mod util;

// Re-exports
pub use compiler::{
    compile_all, compile_all_with, compile_component, compile_component_with, parse, CompiledComponent,
    ComponentSource,
};
pub use config::CompilerConfig;
pub use error::{CompilerError, Result};
pub use output::{emit_program, evaluate, ModuleRegistry, Program};
pub use parse_util::{ParseError, ParseLocation, ParseSourceSpan};
pub use template_parser::{parse_template, print_template, TemplateNode};
pub use transform::{default_resolver, lower, ComponentInfo};
