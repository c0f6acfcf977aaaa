use loam_ast::{
    ClosureBody, ConstructorDecl, Decl, DeclId, DestructorDecl, Expr, ExprKind, FuncDecl,
    NominalDecl, Stmt, Storage, SubscriptDecl, TranslationUnit, VarDecl,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub enum IndexedDecl<'a> {
    Func(&'a FuncDecl),
    Constructor(&'a ConstructorDecl),
    Destructor(&'a DestructorDecl),
    Nominal(&'a NominalDecl),
    Var(&'a VarDecl),
    Subscript(&'a SubscriptDecl),
}

/// Every declaration of a translation unit by id, including type members and
/// functions local to bodies, so references can be resolved before the
/// referenced declaration has been visited.
#[derive(Debug, Default)]
pub struct DeclIndex<'a> {
    decls: HashMap<DeclId, IndexedDecl<'a>>,
}

impl<'a> DeclIndex<'a> {
    pub fn build(unit: &'a TranslationUnit) -> Self {
        let mut index = Self::default();
        for decl in unit.decls.iter().chain(&unit.external_definitions) {
            index.add_decl(decl);
        }
        index
    }

    pub fn get(&self, id: DeclId) -> Option<IndexedDecl<'a>> {
        self.decls.get(&id).copied()
    }

    pub fn func(&self, id: DeclId) -> Option<&'a FuncDecl> {
        match self.get(id)? {
            IndexedDecl::Func(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn constructor(&self, id: DeclId) -> Option<&'a ConstructorDecl> {
        match self.get(id)? {
            IndexedDecl::Constructor(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn nominal(&self, id: DeclId) -> Option<&'a NominalDecl> {
        match self.get(id)? {
            IndexedDecl::Nominal(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn var(&self, id: DeclId) -> Option<&'a VarDecl> {
        match self.get(id)? {
            IndexedDecl::Var(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    fn add_decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::Func(fd) => self.add_func(fd),
            Decl::Constructor(cd) => {
                self.decls.insert(cd.id, IndexedDecl::Constructor(cd));
                if let Some(body) = &cd.body {
                    self.add_stmts(body);
                }
            }
            Decl::Destructor(dd) => {
                self.decls.insert(dd.id, IndexedDecl::Destructor(dd));
                self.add_stmts(&dd.body);
            }
            Decl::Nominal(nd) => {
                self.decls.insert(nd.id, IndexedDecl::Nominal(nd));
                for member in &nd.members {
                    self.add_decl(member);
                }
            }
            Decl::Var(vd) => {
                self.decls.insert(vd.id, IndexedDecl::Var(vd));
                if let Storage::Computed { getter, setter } = &vd.storage {
                    self.add_stmts(getter);
                    if let Some(setter) = setter {
                        self.add_stmts(&setter.body);
                    }
                }
            }
            Decl::Subscript(sd) => {
                self.decls.insert(sd.id, IndexedDecl::Subscript(sd));
                self.add_stmts(&sd.getter);
                if let Some(setter) = &sd.setter {
                    self.add_stmts(&setter.body);
                }
            }
            Decl::PatternBinding(pb) => {
                if let Some(init) = &pb.init {
                    self.add_expr(init);
                }
            }
            Decl::TopLevelCode(tc) => self.add_stmts(&tc.body),
        }
    }

    fn add_func(&mut self, fd: &'a FuncDecl) {
        self.decls.insert(fd.id, IndexedDecl::Func(fd));
        if let Some(body) = &fd.body {
            self.add_stmts(body);
        }
    }

    fn add_stmts(&mut self, stmts: &'a [Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Expr(expr) | Stmt::Let { init: expr, .. } => self.add_expr(expr),
                Stmt::Var { init, .. } | Stmt::Return(init) => {
                    if let Some(expr) = init {
                        self.add_expr(expr);
                    }
                }
                Stmt::Assign { value, .. } => self.add_expr(value),
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    self.add_expr(condition);
                    self.add_stmts(then_branch);
                    self.add_stmts(else_branch);
                }
                Stmt::LocalFunc(fd) => self.add_func(fd),
            }
        }
    }

    fn add_expr(&mut self, expr: &'a Expr) {
        match &expr.kind {
            ExprKind::Call { callee, args } => {
                self.add_expr(callee);
                for arg in args {
                    self.add_expr(arg);
                }
            }
            ExprKind::Construct { args, .. } => {
                for arg in args {
                    self.add_expr(arg);
                }
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.add_expr(lhs);
                self.add_expr(rhs);
            }
            ExprKind::Field { base, .. } => self.add_expr(base),
            ExprKind::Closure(closure) => match &closure.body {
                ClosureBody::Block(stmts) => self.add_stmts(stmts),
                ClosureBody::Expr(body) => self.add_expr(body),
            },
            ExprKind::IntLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::Unit
            | ExprKind::Local(_)
            | ExprKind::SelfRef
            | ExprKind::Global(_)
            | ExprKind::FuncRef { .. } => {}
        }
    }
}
