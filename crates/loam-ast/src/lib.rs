/*! The checked AST handed to lowering.
 *
 * Semantic analysis has already resolved every type, overload and declaration reference by the
 * time a translation unit reaches this crate. Lowering only reads it: declarations know their
 * lexical context, expressions carry their resolved type, and references name declarations by
 * id rather than by spelling.
 */

pub mod context;
pub mod decl;
pub mod expr;
pub mod types;

pub use context::{ContextFrame, DeclContext, DeclId, ModuleKind, ModuleRef};
pub use decl::{
    AccessorKind, ConstructorDecl, Decl, DestructorDecl, FieldDecl, FuncDecl, NominalDecl, Param,
    ParamClause, PatternBindingDecl, SetterDecl, SourceLoc, Storage, SubscriptDecl,
    TopLevelCodeDecl, TranslationUnit, VarDecl,
};
pub use expr::{BinaryOp, ClosureBody, ClosureExpr, ClosureId, Expr, ExprKind, LValue, Stmt};
pub use types::{FunctionTy, NominalKind, NominalRef, Ty};
