use crate::context::{DeclContext, DeclId};
use crate::decl::{FuncDecl, Param, SourceLoc};
use crate::types::Ty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClosureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    Let {
        name: String,
        init: Expr,
    },
    Var {
        name: String,
        ty: Ty,
        init: Option<Expr>,
    },
    Assign {
        target: LValue,
        value: Expr,
    },
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        #[serde(default)]
        else_branch: Vec<Stmt>,
    },
    LocalFunc(Box<FuncDecl>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LValue {
    Local(String),
    SelfField(String),
    Global(DeclId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    IntLiteral(i64),
    BoolLiteral(bool),
    StringLiteral(String),
    Unit,
    Local(String),
    SelfRef,
    Global(DeclId),
    /// Reference to a function at an uncurry level; `None` means its natural
    /// (fully applied) level.
    FuncRef {
        decl: DeclId,
        uncurry_level: Option<u32>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Field {
        base: Box<Expr>,
        field: String,
    },
    Construct {
        ctor: DeclId,
        args: Vec<Expr>,
    },
    Closure(Box<ClosureExpr>),
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Ty) -> Self {
        Self { kind, ty }
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::IntLiteral(value), Ty::Int)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::BoolLiteral(value), Ty::Bool)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::StringLiteral(value.into()), Ty::String)
    }

    pub fn unit() -> Self {
        Self::new(ExprKind::Unit, Ty::Unit)
    }

    pub fn local(name: impl Into<String>, ty: Ty) -> Self {
        Self::new(ExprKind::Local(name.into()), ty)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, ty: Ty) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>, ty: Ty) -> Self {
        Self::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            ty,
        )
    }

    pub fn func_ref(decl: DeclId, ty: Ty) -> Self {
        Self::new(
            ExprKind::FuncRef {
                decl,
                uncurry_level: None,
            },
            ty,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClosureBody {
    Block(Vec<Stmt>),
    /// Single-expression closure; its value is the result.
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureExpr {
    pub id: ClosureId,
    /// Context the closure is written in.
    pub context: DeclContext,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
    pub params: Vec<Param>,
    pub result: Ty,
    pub body: ClosureBody,
}
