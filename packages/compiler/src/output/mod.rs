//! Output Module
//!
//! The generated program AST, its JavaScript emitter and the evaluator
//! that runs a program against the runtime directly.

pub mod interpreter;
pub mod js_emitter;
pub mod output_ast;
pub mod output_jit;

pub use js_emitter::emit_program;
pub use output_ast::Program;
pub use output_jit::{evaluate, Controller, ModuleRegistry};
