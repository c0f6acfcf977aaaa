use crate::context::{DeclContext, DeclId, ModuleRef};
use crate::expr::{Expr, Stmt};
use crate::types::{NominalKind, NominalRef, Ty};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub module: ModuleRef,
    pub decls: Vec<Decl>,
    /// Declarations originating elsewhere (e.g. synthesized for imported host
    /// types) whose definitions must still be emitted into this module.
    #[serde(default)]
    pub external_definitions: Vec<Decl>,
}

impl TranslationUnit {
    pub fn new(module: ModuleRef, decls: Vec<Decl>) -> Self {
        Self {
            module,
            decls,
            external_definitions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    Constructor(ConstructorDecl),
    Destructor(DestructorDecl),
    Nominal(NominalDecl),
    Var(VarDecl),
    Subscript(SubscriptDecl),
    PatternBinding(PatternBindingDecl),
    TopLevelCode(TopLevelCodeDecl),
}

impl Decl {
    pub fn id(&self) -> Option<DeclId> {
        match self {
            Decl::Func(d) => Some(d.id),
            Decl::Constructor(d) => Some(d.id),
            Decl::Destructor(d) => Some(d.id),
            Decl::Nominal(d) => Some(d.id),
            Decl::Var(d) => Some(d.id),
            Decl::Subscript(d) => Some(d.id),
            Decl::PatternBinding(_) | Decl::TopLevelCode(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessorKind {
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
    #[serde(default)]
    pub default: Option<Expr>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamClause {
    pub params: Vec<Param>,
}

impl ParamClause {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub id: DeclId,
    pub name: String,
    pub context: DeclContext,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    #[serde(default)]
    pub generic_params: Vec<String>,
    /// Explicit parameter clauses; `f(a)(b)` has two. The implicit `self`
    /// clause of methods is not listed here.
    pub param_clauses: Vec<ParamClause>,
    pub result: Ty,
    /// `None` for prototypes.
    #[serde(default)]
    pub body: Option<Vec<Stmt>>,
    #[serde(default)]
    pub accessor: Option<AccessorKind>,
    /// Type of `self` for instance methods.
    #[serde(default)]
    pub self_ty: Option<Ty>,
    /// Callable from the foreign host runtime.
    #[serde(default)]
    pub interop: bool,
}

impl FuncDecl {
    pub fn is_instance_member(&self) -> bool {
        self.self_ty.is_some()
    }

    pub fn is_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    /// Number of parameter lists the function can be applied through,
    /// counting the implicit `self` clause of methods.
    pub fn uncurry_levels(&self) -> u32 {
        let explicit = self.param_clauses.len().max(1) as u32;
        if self.is_instance_member() {
            explicit + 1
        } else {
            explicit
        }
    }

    pub fn natural_uncurry_level(&self) -> u32 {
        self.uncurry_levels() - 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub id: DeclId,
    pub context: DeclContext,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    pub self_ty: NominalRef,
    pub params: Vec<Param>,
    #[serde(default)]
    pub body: Option<Vec<Stmt>>,
}

impl ConstructorDecl {
    pub fn constructs_reference_type(&self) -> bool {
        self.self_ty.kind == NominalKind::Class
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestructorDecl {
    pub id: DeclId,
    pub context: DeclContext,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    pub class: NominalRef,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Ty,
    #[serde(default)]
    pub initial: Option<Expr>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            initial: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalDecl {
    pub id: DeclId,
    pub name: String,
    pub kind: NominalKind,
    pub context: DeclContext,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    #[serde(default)]
    pub superclass: Option<NominalRef>,
    /// Stored properties in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub members: Vec<Decl>,
}

impl NominalDecl {
    pub fn nominal_ref(&self) -> NominalRef {
        NominalRef {
            decl: self.id,
            name: self.name.clone(),
            kind: self.kind,
        }
    }

    pub fn self_ty(&self) -> Ty {
        Ty::Nominal(self.nominal_ref())
    }

    pub fn is_class(&self) -> bool {
        self.kind == NominalKind::Class
    }

    pub fn destructor(&self) -> Option<&DestructorDecl> {
        self.members.iter().find_map(|member| match member {
            Decl::Destructor(dd) => Some(dd),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetterDecl {
    pub value_name: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Storage {
    Stored,
    Computed {
        getter: Vec<Stmt>,
        #[serde(default)]
        setter: Option<SetterDecl>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub id: DeclId,
    pub name: String,
    pub context: DeclContext,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    pub ty: Ty,
    pub storage: Storage,
    /// Type of `self` for instance properties.
    #[serde(default)]
    pub self_ty: Option<Ty>,
    #[serde(default)]
    pub interop: bool,
}

impl VarDecl {
    pub fn is_computed(&self) -> bool {
        matches!(self.storage, Storage::Computed { .. })
    }

    pub fn is_settable(&self) -> bool {
        match &self.storage {
            Storage::Stored => true,
            Storage::Computed { setter, .. } => setter.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptDecl {
    pub id: DeclId,
    pub context: DeclContext,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    pub self_ty: Ty,
    pub indices: Vec<Param>,
    pub element_ty: Ty,
    pub getter: Vec<Stmt>,
    #[serde(default)]
    pub setter: Option<SetterDecl>,
}

/// `var name: ty = init` at module scope. The variable itself is declared
/// separately by a [`VarDecl`] with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternBindingDecl {
    pub var: DeclId,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLevelCodeDecl {
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    pub body: Vec<Stmt>,
}
