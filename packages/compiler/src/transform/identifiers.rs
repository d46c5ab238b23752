//! Runtime Identifiers
//!
//! Names of the render-node constructors a generated program imports from
//! the runtime module, plus the reserved names generated code binds.

use bitflags::bitflags;

pub const COMPONENT: &str = "$c";
pub const ELEMENT: &str = "$e";
pub const TEXT: &str = "$t";
pub const IF: &str = "$if";
pub const FOR: &str = "$for";
pub const FRAGMENT: &str = "$f";

/// Render function parameter holding the slot render functions
pub const SLOTS: &str = "$$slots";
/// Default import of the controller module
pub const CONTROLLER: &str = "controller";

bitflags! {
    /// Constructors used by a generated program
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Constructors: u8 {
        const COMPONENT = 0b00_0001;
        const ELEMENT = 0b00_0010;
        const TEXT = 0b00_0100;
        const IF = 0b00_1000;
        const FOR = 0b01_0000;
        const FRAGMENT = 0b10_0000;
    }
}

impl Constructors {
    /// Runtime names of the set flags, in import order.
    pub fn names(&self) -> Vec<&'static str> {
        [
            (Constructors::COMPONENT, COMPONENT),
            (Constructors::ELEMENT, ELEMENT),
            (Constructors::TEXT, TEXT),
            (Constructors::IF, IF),
            (Constructors::FOR, FOR),
            (Constructors::FRAGMENT, FRAGMENT),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect()
    }

    pub fn from_runtime_name(name: &str) -> Option<Self> {
        Some(match name {
            COMPONENT => Constructors::COMPONENT,
            ELEMENT => Constructors::ELEMENT,
            TEXT => Constructors::TEXT,
            IF => Constructors::IF,
            FOR => Constructors::FOR,
            FRAGMENT => Constructors::FRAGMENT,
            _ => return None,
        })
    }
}

/// Variable a hoisted element constructor is bound to. The `$e_` prefix
/// keeps it out of the names a template expression can bind.
pub fn element_var(tag: &str) -> String {
    format!("{}_{}", ELEMENT, crate::parse_util::sanitize_identifier(tag))
}
