//! Code Generator
//!
//! Lowers template ASTs into programs over the runtime constructors.

pub mod identifiers;
pub mod transformer;

pub use identifiers::Constructors;
pub use transformer::{default_resolver, lower, ComponentInfo, ModuleResolver};
