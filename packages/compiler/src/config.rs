//! Compiler Configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Module the render-node constructors are imported from.
    pub runtime_module: String,
    /// Pre-declare element constructors for literal tag names.
    pub hoist_elements: bool,
    pub slot_tag: String,
    pub template_tag: String,
    /// Emitter indentation width.
    pub indent: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            runtime_module: "@htmly/core/renderer".to_string(),
            hoist_elements: true,
            slot_tag: "slot".to_string(),
            template_tag: "template".to_string(),
            indent: 2,
        }
    }
}

impl CompilerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
