use loam_ast::{DeclId, SourceLoc, Ty};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFunction {
    pub id: DeclId,
    pub module: String,
    pub name: String,
    pub params: Vec<Ty>,
    pub result: Ty,
    pub loc: Option<SourceLoc>,
}

impl ExternalFunction {
    pub fn new(
        id: DeclId,
        module: impl Into<String>,
        name: impl Into<String>,
        params: Vec<Ty>,
        result: Ty,
    ) -> Self {
        Self {
            id,
            module: module.into(),
            name: name.into(),
            params,
            result,
            loc: None,
        }
    }

    pub fn ty(&self) -> Ty {
        Ty::function(self.params.clone(), self.result.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Function(ExternalFunction),
    /// A declaration with the requested name that cannot be called.
    NotAFunction { module: String, name: String },
}

/// Qualified name lookup into other modules.
pub trait NameLookup {
    /// `None` when the module itself cannot be found.
    fn lookup(&self, module: &str, name: &str) -> Option<Vec<LookupResult>>;
}

/// In-memory lookup over a fixed set of modules.
#[derive(Debug, Default, Clone)]
pub struct ModuleTable {
    modules: HashMap<String, Vec<(String, LookupResult)>>,
    next_id: u32,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: impl Into<String>) -> &mut Self {
        self.modules.entry(module.into()).or_default();
        self
    }

    pub fn add_function(
        &mut self,
        module: &str,
        name: &str,
        params: Vec<Ty>,
        result: Ty,
    ) -> &mut Self {
        self.next_id += 1;
        let id = DeclId(self.next_id);
        let function = ExternalFunction::new(id, module, name, params, result);
        self.modules
            .entry(module.to_string())
            .or_default()
            .push((name.to_string(), LookupResult::Function(function)));
        self
    }

    pub fn add_non_function(&mut self, module: &str, name: &str) -> &mut Self {
        self.modules.entry(module.to_string()).or_default().push((
            name.to_string(),
            LookupResult::NotAFunction {
                module: module.to_string(),
                name: name.to_string(),
            },
        ));
        self
    }

    /// A table providing the standard string and boolean bridging helpers.
    pub fn with_bridging_support(string_module: &str, bool_module: &str) -> Self {
        let mut table = Self::new();
        table
            .add_function(
                string_module,
                "convertNSStringToString",
                vec![Ty::HostString, Ty::InOut(Box::new(Ty::String))],
                Ty::Unit,
            )
            .add_function(
                string_module,
                "convertStringToNSString",
                vec![Ty::InOut(Box::new(Ty::String))],
                Ty::HostString,
            )
            .add_function(bool_module, "convertBoolToObjCBool", vec![Ty::Bool], Ty::HostBool)
            .add_function(bool_module, "convertObjCBoolToBool", vec![Ty::HostBool], Ty::Bool);
        table
    }
}

impl NameLookup for ModuleTable {
    fn lookup(&self, module: &str, name: &str) -> Option<Vec<LookupResult>> {
        let entries = self.modules.get(module)?;
        Some(
            entries
                .iter()
                .filter(|(entry_name, _)| entry_name == name)
                .map(|(_, result)| result.clone())
                .collect(),
        )
    }
}
