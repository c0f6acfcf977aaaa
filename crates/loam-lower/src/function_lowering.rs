use crate::cleanup::{Cleanup, CleanupStack};
use crate::error::{LowerError, Result};
use crate::module_lowering::ModuleLowering;
use crate::types::{lower_nominal, lower_type};
use loam_ast::{
    ConstructorDecl, Expr, FieldDecl, FuncDecl, NominalDecl, Param, SetterDecl, Stmt, Ty,
};
use loam_core::{ArtifactId, BlockId, BodyBuilder, GlobalId, SourceLocation, Value};

#[derive(Debug, Clone)]
pub(crate) enum Local {
    Value(Value),
    /// A stack slot or an `inout` parameter.
    Address(Value),
}

#[derive(Debug, Clone)]
pub(crate) enum SelfBinding {
    Value(Value),
    /// Value-type constructors build `self` in a stack slot.
    Slot(Value),
}

/// Shared exit block. Returns run the cleanups above `base_depth` and
/// branch here; the epilog runs the rest.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Epilog {
    pub(crate) block: BlockId,
    pub(crate) base_depth: usize,
}

/// The per-artifact state, detachable from its module borrow so the
/// top-level artifact can stay open across declarations.
#[derive(Debug)]
pub(crate) struct FunctionFrame {
    pub(crate) artifact: ArtifactId,
    pub(crate) has_void_return: bool,
    pub(crate) builder: BodyBuilder,
    pub(crate) cleanups: CleanupStack,
    pub(crate) epilog: Option<Epilog>,
    pub(crate) params: Vec<Value>,
    pub(crate) locals: Vec<(String, Local)>,
    pub(crate) self_binding: Option<SelfBinding>,
    pub(crate) location: Option<SourceLocation>,
}

/// Lowers one declaration's body into one artifact.
///
/// A context is consumed by [`FunctionLoweringContext::finish`], which
/// closes whatever control flow is still open and installs the body.
/// Contexts are only handed out through scoped helpers that always finish
/// them, including when body lowering fails.
#[must_use = "an unfinished lowering context leaves its artifact without a body"]
pub struct FunctionLoweringContext<'m, 'a> {
    pub(crate) module: &'m mut ModuleLowering<'a>,
    pub(crate) frame: FunctionFrame,
}

impl<'m, 'a> FunctionLoweringContext<'m, 'a> {
    pub(crate) fn begin(
        module: &'m mut ModuleLowering<'a>,
        artifact: ArtifactId,
        has_void_return: bool,
    ) -> Self {
        let (params, location) = module.pre_emit(artifact);
        let mut builder = BodyBuilder::new();
        let (_, params) = builder.create_entry_block(&params);
        Self {
            module,
            frame: FunctionFrame {
                artifact,
                has_void_return,
                builder,
                cleanups: CleanupStack::new(),
                epilog: None,
                params,
                locals: Vec::new(),
                self_binding: None,
                location,
            },
        }
    }

    pub(crate) fn resume(module: &'m mut ModuleLowering<'a>, frame: FunctionFrame) -> Self {
        Self { module, frame }
    }

    pub(crate) fn suspend(self) -> FunctionFrame {
        self.frame
    }

    pub fn artifact(&self) -> ArtifactId {
        self.frame.artifact
    }

    pub fn has_void_return(&self) -> bool {
        self.frame.has_void_return
    }

    pub fn builder(&mut self) -> &mut BodyBuilder {
        &mut self.frame.builder
    }

    /// Entry block parameters, in signature order.
    pub fn params(&self) -> &[Value] {
        &self.frame.params
    }

    pub fn cleanups(&self) -> &CleanupStack {
        &self.frame.cleanups
    }

    pub(crate) fn artifact_name(&self) -> String {
        self.module
            .module
            .artifact(self.frame.artifact)
            .map(|artifact| artifact.name.clone())
            .unwrap_or_else(|_| self.frame.artifact.to_string())
    }

    pub(crate) fn unsupported(&self, what: impl Into<String>) -> LowerError {
        LowerError::unsupported(what, self.frame.location.clone())
    }

    /// Closes the artifact: an open insertion point gets an implicit unit
    /// return (after all cleanups) or, for non-unit results, an
    /// `unreachable` marker. Then installs, dumps and verifies the body.
    pub fn finish(mut self) -> ArtifactId {
        if let Err(error) = self.finalize_terminator() {
            panic!("failed to finalize `{}`: {}", self.artifact_name(), error);
        }
        if let Some(epilog) = self.frame.epilog {
            let terminated = self
                .frame
                .builder
                .block(epilog.block)
                .map_or(false, |block| block.is_terminated());
            assert!(
                terminated,
                "epilog of `{}` was not terminated",
                self.artifact_name()
            );
        }

        let FunctionLoweringContext { module, frame } = self;
        let artifact = frame.artifact;
        module.post_emit(artifact, frame.builder.finish());
        artifact
    }

    fn finalize_terminator(&mut self) -> loam_core::Result<()> {
        if !self.frame.builder.has_insertion_point() {
            return Ok(());
        }
        if self.frame.has_void_return {
            assert!(
                self.frame.epilog.is_none(),
                "`{}` falls through past its epilog",
                self.artifact_name()
            );
            for cleanup in self.frame.cleanups.active_above(0) {
                self.emit_cleanup(&cleanup)?;
            }
            let unit = self.frame.builder.unit_value();
            self.frame.builder.ret(unit)
        } else {
            self.frame.builder.unreachable()
        }
    }

    /// After a failed body: every block other than the current insertion
    /// point is closed with `unreachable`, so finishing yields a well-formed
    /// artifact. The insertion point itself is left for
    /// [`Self::finish`] unless an epilog is involved.
    pub(crate) fn seal_after_error(&mut self) {
        let current = if self.frame.epilog.is_some() {
            None
        } else {
            self.frame.builder.insertion_block()
        };
        let dangling: Vec<BlockId> = self
            .frame
            .builder
            .body()
            .blocks
            .values()
            .filter(|block| !block.is_terminated() && Some(block.id) != current)
            .map(|block| block.id)
            .collect();

        for block in dangling {
            let sealed = self
                .frame
                .builder
                .position_at_end(block)
                .and_then(|()| self.frame.builder.unreachable());
            if let Err(error) = sealed {
                panic!("failed to seal `{}`: {}", self.artifact_name(), error);
            }
        }

        match current {
            Some(block) => {
                if let Err(error) = self.frame.builder.position_at_end(block) {
                    panic!("failed to seal `{}`: {}", self.artifact_name(), error);
                }
            }
            None => self.frame.builder.clear_insertion_point(),
        }
    }

    pub fn push_cleanup(&mut self, cleanup: Cleanup) {
        self.frame.cleanups.push(cleanup);
    }

    fn emit_cleanup(&mut self, cleanup: &Cleanup) -> loam_core::Result<()> {
        match cleanup {
            Cleanup::DeallocStack(address) => self.frame.builder.dealloc_stack(address.clone()),
            Cleanup::Release(value) => self.frame.builder.release(value.clone()),
        }
    }

    /// Emits the cleanups above `depth` without popping them.
    pub(crate) fn emit_cleanups_above(&mut self, depth: usize) -> Result<()> {
        for cleanup in self.frame.cleanups.active_above(depth) {
            self.emit_cleanup(&cleanup)?;
        }
        Ok(())
    }

    /// Leaves a scope: pops its cleanups, emitting them if the scope's end is
    /// reachable.
    pub(crate) fn pop_scope(&mut self, depth: usize) -> Result<()> {
        let popped = self.frame.cleanups.pop_to(depth);
        if self.frame.builder.has_insertion_point() {
            for cleanup in &popped {
                self.emit_cleanup(cleanup)?;
            }
        }
        Ok(())
    }

    /// `return`: run every active cleanup, then leave through the epilog or
    /// directly.
    pub fn emit_return(&mut self, value: Option<Value>) -> Result<()> {
        match self.frame.epilog {
            Some(epilog) => {
                if value.is_some() {
                    return Err(self.unsupported("returning a value through an epilog"));
                }
                self.emit_cleanups_above(epilog.base_depth)?;
                self.frame.builder.jump(epilog.block)?;
            }
            None => {
                self.emit_cleanups_above(0)?;
                let value = value.unwrap_or_else(Value::unit);
                self.frame.builder.ret(value)?;
            }
        }
        Ok(())
    }

    fn establish_epilog(&mut self) -> Epilog {
        let epilog = Epilog {
            block: self.frame.builder.create_block(),
            base_depth: self.frame.cleanups.depth(),
        };
        self.frame.epilog = Some(epilog);
        epilog
    }

    /// Ends the body proper and continues in the epilog block.
    fn enter_epilog(&mut self, epilog: Epilog) -> Result<()> {
        self.pop_scope(epilog.base_depth)?;
        if self.frame.builder.has_insertion_point() {
            self.frame.builder.jump(epilog.block)?;
        }
        self.frame.builder.position_at_end(epilog.block)?;
        Ok(())
    }

    pub(crate) fn bind_local(&mut self, name: &str, local: Local) {
        self.frame.locals.push((name.to_string(), local));
    }

    pub(crate) fn lookup_local(&self, name: &str) -> Option<Local> {
        self.frame
            .locals
            .iter()
            .rev()
            .find(|(local, _)| local == name)
            .map(|(_, local)| local.clone())
    }

    fn bind_param(&mut self, param: &Param, value: Value) {
        let local = match param.ty {
            Ty::InOut(_) => Local::Address(value),
            _ => Local::Value(value),
        };
        self.bind_local(&param.name, local);
    }

    /// Binds `params` to the leading entry values and, when `has_self`, the
    /// last entry value to `self`.
    fn bind_entry<'p>(&mut self, params: impl IntoIterator<Item = &'p Param>, has_self: bool) {
        let values = self.frame.params.clone();
        let mut values = values.into_iter();
        for param in params {
            if let Some(value) = values.next() {
                self.bind_param(param, value);
            }
        }
        if has_self {
            if let Some(value) = values.last() {
                self.frame.self_binding = Some(SelfBinding::Value(value));
            }
        }
    }

    pub fn emit_function_body(&mut self, decl: &'a FuncDecl, body: &'a [Stmt]) -> Result<()> {
        let params = decl.param_clauses.iter().flat_map(|clause| &clause.params);
        self.bind_entry(params, decl.is_instance_member());
        self.lower_stmts(body)
    }

    pub fn emit_closure_body(&mut self, params: &'a [Param], body: &'a [Stmt]) -> Result<()> {
        self.bind_entry(params, false);
        self.lower_stmts(body)
    }

    pub fn emit_single_expression_closure(
        &mut self,
        params: &'a [Param],
        body: &'a Expr,
    ) -> Result<()> {
        self.bind_entry(params, false);
        let value = self.lower_expr(body)?;
        self.emit_return(Some(value))
    }

    pub fn emit_default_argument_generator(&mut self, expr: &'a Expr) -> Result<()> {
        let value = self.lower_expr(expr)?;
        self.emit_return(Some(value))
    }

    pub fn emit_getter_body(
        &mut self,
        has_self: bool,
        indices: &'a [Param],
        body: &'a [Stmt],
    ) -> Result<()> {
        self.bind_entry(indices, has_self);
        self.lower_stmts(body)
    }

    pub fn emit_setter_body(
        &mut self,
        has_self: bool,
        indices: &'a [Param],
        setter: &'a SetterDecl,
    ) -> Result<()> {
        let mut values = self.frame.params.clone().into_iter();
        if let Some(value) = values.next() {
            self.bind_local(&setter.value_name, Local::Value(value));
        }
        for param in indices {
            if let Some(value) = values.next() {
                self.bind_param(param, value);
            }
        }
        if has_self {
            if let Some(value) = values.last() {
                self.frame.self_binding = Some(SelfBinding::Value(value));
            }
        }
        self.lower_stmts(&setter.body)
    }

    pub fn emit_global_initializer(&mut self, global: GlobalId, init: &'a Expr) -> Result<()> {
        let value = self.lower_expr(init)?;
        let address = self.frame.builder.global_addr(global)?;
        self.frame.builder.store(address, value)?;
        Ok(())
    }

    fn store_field_initial_values(&mut self, fields: &'a [FieldDecl]) -> Result<()> {
        for field in fields {
            let Some(initial) = &field.initial else {
                continue;
            };
            let value = self.lower_expr(initial)?;
            let base = self.self_base()?;
            self.frame.builder.field_store(base, field.name.clone(), value)?;
        }
        Ok(())
    }

    /// `self` is built in a stack slot; every exit funnels through an epilog
    /// that loads the finished aggregate and returns it.
    pub fn emit_value_type_constructor(
        &mut self,
        decl: &'a ConstructorDecl,
        fields: &'a [FieldDecl],
        body: &'a [Stmt],
    ) -> Result<()> {
        self.bind_entry(&decl.params, false);
        let slot = self
            .frame
            .builder
            .alloc_stack(lower_nominal(&decl.self_ty))?;
        self.push_cleanup(Cleanup::DeallocStack(slot.clone()));
        self.frame.self_binding = Some(SelfBinding::Slot(slot.clone()));

        self.store_field_initial_values(fields)?;
        let epilog = self.establish_epilog();
        self.lower_stmts(body)?;
        self.enter_epilog(epilog)?;

        let value = self.frame.builder.load(slot)?;
        self.pop_scope(0)?;
        self.frame.builder.ret(value)?;
        Ok(())
    }

    /// Allocates the object, then hands it to the initializer.
    pub fn emit_reference_type_allocator(
        &mut self,
        decl: &'a ConstructorDecl,
        initializer: ArtifactId,
    ) -> Result<()> {
        let mut args = self.frame.params.clone();
        let object = self
            .frame
            .builder
            .alloc_ref(lower_nominal(&decl.self_ty))?;
        args.push(object);
        let callee = self.frame.builder.function_ref(initializer)?;
        let result = self.frame.builder.apply(callee, args)?;
        self.frame.builder.ret(result)?;
        Ok(())
    }

    /// Stored-property initial values first, then the body; returns `self`.
    pub fn emit_reference_type_initializer(
        &mut self,
        decl: &'a ConstructorDecl,
        fields: &'a [FieldDecl],
        body: &'a [Stmt],
    ) -> Result<()> {
        self.bind_entry(&decl.params, true);
        let object = self.self_base()?;

        self.store_field_initial_values(fields)?;
        let epilog = self.establish_epilog();
        self.lower_stmts(body)?;
        self.enter_epilog(epilog)?;

        self.pop_scope(0)?;
        self.frame.builder.ret(object)?;
        Ok(())
    }

    /// Explicit body, then reference-typed fields released in reverse
    /// declaration order, then the superclass destroyer or deallocation.
    pub fn emit_destroyer(
        &mut self,
        class: &'a NominalDecl,
        body: Option<&'a [Stmt]>,
        superclass: Option<ArtifactId>,
    ) -> Result<()> {
        self.bind_entry(std::iter::empty(), true);
        let object = self.self_base()?;

        let epilog = self.establish_epilog();
        if let Some(body) = body {
            self.lower_stmts(body)?;
        }
        self.enter_epilog(epilog)?;

        for field in class.fields.iter().rev() {
            if lower_type(&field.ty).is_reference() {
                let value = self
                    .frame
                    .builder
                    .field_load(object.clone(), field.name.clone())?;
                self.frame.builder.release(value)?;
            }
        }
        match superclass {
            Some(destroyer) => {
                let callee = self.frame.builder.function_ref(destroyer)?;
                self.frame.builder.apply(callee, vec![object])?;
            }
            None => self.frame.builder.dealloc_ref(object)?,
        }

        self.pop_scope(0)?;
        let unit = self.frame.builder.unit_value();
        self.frame.builder.ret(unit)?;
        Ok(())
    }

    /// Base value for field access on `self`: the object, or the slot of a
    /// value under construction.
    pub(crate) fn self_base(&self) -> Result<Value> {
        match &self.frame.self_binding {
            Some(SelfBinding::Value(value)) | Some(SelfBinding::Slot(value)) => Ok(value.clone()),
            None => Err(self.unsupported("`self` outside of a member")),
        }
    }
}
