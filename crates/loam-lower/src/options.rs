use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringOptions {
    /// Name of the produced IR module. Empty means "use the translation
    /// unit's module name".
    pub module_name: String,
    pub top_level_name: String,
    /// Module providing the string bridging helpers.
    pub string_module: String,
    /// Module providing the boolean bridging helpers.
    pub bool_module: String,
    pub verify: bool,
    /// Index of the first top-level declaration to lower. Earlier ones were
    /// lowered by a previous run (REPL-style drivers).
    pub start_index: usize,
    pub emit_curry_thunks: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            module_name: String::new(),
            top_level_name: "top_level_code".to_string(),
            string_module: "Foundation".to_string(),
            bool_module: "ObjectiveC".to_string(),
            verify: true,
            start_index: 0,
            emit_curry_thunks: true,
        }
    }
}

impl LoweringOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
