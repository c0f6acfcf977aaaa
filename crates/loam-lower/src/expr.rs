use crate::cleanup::Cleanup;
use crate::error::Result;
use crate::function_lowering::{FunctionLoweringContext, Local, SelfBinding};
use crate::key::DeclarationKey;
use crate::types::lower_type;
use loam_ast::{BinaryOp, Expr, ExprKind, LValue, Stmt, Storage};
use loam_core::{self as ir, BlockId, CompareOp, Value};

enum LoweredOp {
    Arithmetic(ir::BinaryOp),
    Comparison(CompareOp),
}

fn lower_op(op: BinaryOp) -> LoweredOp {
    match op {
        BinaryOp::Add => LoweredOp::Arithmetic(ir::BinaryOp::Add),
        BinaryOp::Sub => LoweredOp::Arithmetic(ir::BinaryOp::Sub),
        BinaryOp::Mul => LoweredOp::Arithmetic(ir::BinaryOp::Mul),
        BinaryOp::Div => LoweredOp::Arithmetic(ir::BinaryOp::Div),
        BinaryOp::Rem => LoweredOp::Arithmetic(ir::BinaryOp::Rem),
        BinaryOp::And => LoweredOp::Arithmetic(ir::BinaryOp::And),
        BinaryOp::Or => LoweredOp::Arithmetic(ir::BinaryOp::Or),
        BinaryOp::Eq => LoweredOp::Comparison(CompareOp::Eq),
        BinaryOp::Ne => LoweredOp::Comparison(CompareOp::Ne),
        BinaryOp::Lt => LoweredOp::Comparison(CompareOp::Lt),
        BinaryOp::Le => LoweredOp::Comparison(CompareOp::Le),
        BinaryOp::Gt => LoweredOp::Comparison(CompareOp::Gt),
        BinaryOp::Ge => LoweredOp::Comparison(CompareOp::Ge),
    }
}

/// Calls and constructions hand back a +1 reference the binding owns.
fn produces_owned_value(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Call { .. } | ExprKind::Construct { .. })
}

impl<'m, 'a> FunctionLoweringContext<'m, 'a> {
    /// Lowers statements in order. Statements after one that closed the
    /// insertion point are unreachable and skipped.
    pub fn lower_stmts(&mut self, stmts: &'a [Stmt]) -> Result<()> {
        for stmt in stmts {
            if !self.frame.builder.has_insertion_point() {
                break;
            }
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_scope(&mut self, stmts: &'a [Stmt]) -> Result<()> {
        let depth = self.frame.cleanups.depth();
        let locals = self.frame.locals.len();
        self.lower_stmts(stmts)?;
        self.pop_scope(depth)?;
        self.frame.locals.truncate(locals);
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &'a Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => {
                self.lower_expr(expr)?;
            }
            Stmt::Let { name, init } => {
                let value = self.lower_expr(init)?;
                if init.ty.is_class() && produces_owned_value(init) {
                    self.push_cleanup(Cleanup::Release(value.clone()));
                }
                self.bind_local(name, Local::Value(value));
            }
            Stmt::Var { name, ty, init } => {
                let slot = self.frame.builder.alloc_stack(lower_type(ty))?;
                if let Some(init) = init {
                    let value = self.lower_expr(init)?;
                    self.frame.builder.store(slot.clone(), value)?;
                }
                self.push_cleanup(Cleanup::DeallocStack(slot.clone()));
                self.bind_local(name, Local::Address(slot));
            }
            Stmt::Assign { target, value } => self.lower_assign(target, value)?,
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => {
                        let value = self.lower_expr(expr)?;
                        // The caller gets its own reference; the local's is
                        // released with the other cleanups.
                        if expr.ty.is_class() && matches!(expr.kind, ExprKind::Local(_)) {
                            self.frame.builder.retain(value.clone())?;
                        }
                        Some(value)
                    }
                    None => None,
                };
                self.emit_return(value)?;
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => self.lower_if(condition, then_branch, else_branch)?,
            Stmt::LocalFunc(decl) => self.module.lower_func(decl)?,
        }
        Ok(())
    }

    fn lower_if(
        &mut self,
        condition: &'a Expr,
        then_branch: &'a [Stmt],
        else_branch: &'a [Stmt],
    ) -> Result<()> {
        let condition = self.lower_expr(condition)?;
        let then_block = self.frame.builder.create_block();
        let else_block = self.frame.builder.create_block();
        self.frame
            .builder
            .branch(condition, then_block, else_block)?;

        let mut open_ends: Vec<BlockId> = Vec::new();
        for (block, arm) in [(then_block, then_branch), (else_block, else_branch)] {
            self.frame.builder.position_at_end(block)?;
            self.lower_scope(arm)?;
            if let Some(end) = self.frame.builder.insertion_block() {
                open_ends.push(end);
            }
        }

        // Both arms returned: the code after the `if` is unreachable.
        if open_ends.is_empty() {
            return Ok(());
        }
        let join = self.frame.builder.create_block();
        for end in open_ends {
            self.frame.builder.position_at_end(end)?;
            self.frame.builder.jump(join)?;
        }
        self.frame.builder.position_at_end(join)?;
        Ok(())
    }

    fn lower_assign(&mut self, target: &'a LValue, value: &'a Expr) -> Result<()> {
        let value = self.lower_expr(value)?;
        match target {
            LValue::Local(name) => match self.lookup_local(name) {
                Some(Local::Address(address)) => self.frame.builder.store(address, value)?,
                Some(Local::Value(_)) => {
                    return Err(self.unsupported(format!("assignment to immutable `{}`", name)))
                }
                None => return Err(self.unsupported(format!("assignment to unknown `{}`", name))),
            },
            LValue::SelfField(field) => {
                let base = self.self_base()?;
                self.frame.builder.field_store(base, field.clone(), value)?;
            }
            LValue::Global(decl) => {
                let Some(var) = self.module.index.var(*decl) else {
                    return Err(self.unsupported(format!("assignment to unknown global {}", decl)));
                };
                match &var.storage {
                    Storage::Stored => {
                        let global = self.module.global_for(var);
                        let address = self.frame.builder.global_addr(global)?;
                        self.frame.builder.store(address, value)?;
                    }
                    Storage::Computed {
                        setter: Some(_), ..
                    } => {
                        let setter = self.module.declare(DeclarationKey::setter(var.id))?;
                        let callee = self.frame.builder.function_ref(setter)?;
                        self.frame.builder.apply(callee, vec![value])?;
                    }
                    Storage::Computed { setter: None, .. } => {
                        return Err(self.unsupported(format!(
                            "assignment to read-only `{}`",
                            var.name
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    pub fn lower_expr(&mut self, expr: &'a Expr) -> Result<Value> {
        let value = match &expr.kind {
            ExprKind::IntLiteral(value) => self.frame.builder.integer_literal(*value, 64),
            ExprKind::BoolLiteral(value) => self.frame.builder.bool_literal(*value),
            ExprKind::StringLiteral(value) => self.frame.builder.string_literal(value.clone()),
            ExprKind::Unit => self.frame.builder.unit_value(),
            ExprKind::Local(name) => match self.lookup_local(name) {
                Some(Local::Value(value)) => value,
                Some(Local::Address(address)) => self.frame.builder.load(address)?,
                None => return Err(self.unsupported(format!("reference to unknown `{}`", name))),
            },
            ExprKind::SelfRef => match self.frame.self_binding.clone() {
                Some(SelfBinding::Value(value)) => value,
                Some(SelfBinding::Slot(slot)) => self.frame.builder.load(slot)?,
                None => return Err(self.unsupported("`self` outside of a member")),
            },
            ExprKind::Global(decl) => {
                let Some(var) = self.module.index.var(*decl) else {
                    return Err(self.unsupported(format!("reference to unknown global {}", decl)));
                };
                if var.is_computed() {
                    let getter = self.module.declare(DeclarationKey::getter(var.id))?;
                    let callee = self.frame.builder.function_ref(getter)?;
                    self.frame.builder.apply(callee, Vec::new())?
                } else {
                    let global = self.module.global_for(var);
                    let address = self.frame.builder.global_addr(global)?;
                    self.frame.builder.load(address)?
                }
            }
            ExprKind::FuncRef {
                decl,
                uncurry_level,
            } => {
                let Some(func) = self.module.index.func(*decl) else {
                    return Err(self.unsupported(format!("reference to unknown function {}", decl)));
                };
                let level = uncurry_level.unwrap_or_else(|| func.natural_uncurry_level());
                let artifact = self.module.declare(DeclarationKey::func(*decl, level))?;
                self.frame.builder.function_ref(artifact)?
            }
            ExprKind::Call { callee, args } => {
                let callee = self.lower_expr(callee)?;
                let args = self.lower_args(args)?;
                self.frame.builder.apply(callee, args)?
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                match lower_op(*op) {
                    LoweredOp::Arithmetic(op) => {
                        self.frame
                            .builder
                            .binary(op, lhs, rhs, lower_type(&expr.ty))?
                    }
                    LoweredOp::Comparison(op) => self.frame.builder.compare(op, lhs, rhs)?,
                }
            }
            ExprKind::Field { base, field } => {
                let base = match base.kind {
                    ExprKind::SelfRef => self.self_base()?,
                    _ => self.lower_expr(base)?,
                };
                self.frame.builder.field_load(base, field.clone())?
            }
            ExprKind::Construct { ctor, args } => {
                let allocator = self.module.declare(DeclarationKey::allocator(*ctor))?;
                let args = self.lower_args(args)?;
                let callee = self.frame.builder.function_ref(allocator)?;
                self.frame.builder.apply(callee, args)?
            }
            ExprKind::Closure(closure) => {
                let artifact = self.module.lower_closure(closure)?;
                self.frame.builder.function_ref(artifact)?
            }
        };
        Ok(value)
    }

    fn lower_args(&mut self, args: &'a [Expr]) -> Result<Vec<Value>> {
        args.iter().map(|arg| self.lower_expr(arg)).collect()
    }
}
