use crate::bridging::{BridgingFunction, BridgingFunctionResolver};
use crate::decl_index::{DeclIndex, IndexedDecl};
use crate::diagnostics::DiagnosticSink;
use crate::error::{LowerError, Result};
use crate::function_lowering::{FunctionFrame, FunctionLoweringContext};
use crate::key::{DeclarationKey, KeyKind};
use crate::linkage::{derive_linkage, DeclFlavor};
use crate::lookup::NameLookup;
use crate::mangle::{mangle, mangle_global};
use crate::options::LoweringOptions;
use crate::thunks::ThunkGenerator;
use crate::types::{
    allocator_signature, closure_signature, default_arg_signature, destroyer_signature,
    func_signature, getter_signature, initializer_signature, interop_signature, lower_location,
    lower_type, setter_signature,
};
use indexmap::IndexMap;
use loam_ast::{
    ClosureBody, ClosureExpr, ConstructorDecl, ContextFrame, Decl, DeclContext, DeclId,
    DestructorDecl, FuncDecl, NominalDecl, NominalRef, Param, PatternBindingDecl, SourceLoc,
    Storage, SubscriptDecl, TopLevelCodeDecl, TranslationUnit, VarDecl,
};
use loam_core::{
    Artifact, ArtifactId, DebugScope, FunctionBody, GlobalId, IrModule, Linkage, Parameter,
    Signature, SourceLocation, StructuralVerifier, Type, Verifier,
};
use loam_emit::IrPrinter;
use std::collections::HashSet;

/// Everything needed to declare an artifact before its body exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDeclaration {
    pub name: String,
    pub linkage: Linkage,
    pub signature: Signature,
    pub location: Option<SourceLocation>,
}

/// Result of lowering a translation unit.
#[derive(Debug)]
pub struct LoweredModule {
    pub module: IrModule,
    /// Artifact of every key requested during lowering, in first-request
    /// order.
    pub artifacts: IndexMap<DeclarationKey, ArtifactId>,
}

impl LoweredModule {
    pub fn artifact_id(&self, key: &DeclarationKey) -> Option<ArtifactId> {
        self.artifacts.get(key).copied()
    }

    pub fn artifact(&self, key: &DeclarationKey) -> Option<&Artifact> {
        self.artifact_id(key)
            .and_then(|id| self.module.artifact(id).ok())
    }
}

/// Drives lowering of one translation unit. Owns the key-to-artifact table,
/// the bridging slots and the top-level artifact, which stays open for the
/// whole unit and is finished last.
pub struct ModuleLowering<'a> {
    pub(crate) options: LoweringOptions,
    unit: &'a TranslationUnit,
    pub(crate) index: DeclIndex<'a>,
    pub(crate) module: IrModule,
    artifacts: IndexMap<DeclarationKey, ArtifactId>,
    names: HashSet<String>,
    in_progress: HashSet<ArtifactId>,
    bridging: BridgingFunctionResolver,
    lookup: &'a dyn NameLookup,
    sink: &'a mut dyn DiagnosticSink,
    verifier: Box<dyn Verifier + 'a>,
    top_level: Option<FunctionFrame>,
}

impl<'a> ModuleLowering<'a> {
    pub fn new(
        unit: &'a TranslationUnit,
        options: LoweringOptions,
        lookup: &'a dyn NameLookup,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let module_name = if options.module_name.is_empty() {
            unit.module.name.clone()
        } else {
            options.module_name.clone()
        };
        Self {
            options,
            unit,
            index: DeclIndex::build(unit),
            module: IrModule::new(module_name),
            artifacts: IndexMap::new(),
            names: HashSet::new(),
            in_progress: HashSet::new(),
            bridging: BridgingFunctionResolver::new(),
            lookup,
            sink,
            verifier: Box::new(StructuralVerifier::new()),
            top_level: None,
        }
    }

    pub fn with_verifier(mut self, verifier: impl Verifier + 'a) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    pub fn options(&self) -> &LoweringOptions {
        &self.options
    }

    pub fn module(&self) -> &IrModule {
        &self.module
    }

    pub fn artifact_for(&self, key: &DeclarationKey) -> Option<ArtifactId> {
        self.artifacts.get(key).copied()
    }

    /// The single memoization point: returns the artifact registered under
    /// `key`, declaring it (without a body) on first request.
    pub fn get_or_create_artifact(
        &mut self,
        key: DeclarationKey,
        declaration: ArtifactDeclaration,
    ) -> ArtifactId {
        if let Some(&id) = self.artifacts.get(&key) {
            return id;
        }

        let name = self.unique_name(declaration.name);
        let id = self
            .module
            .declare_artifact(name.clone(), declaration.linkage, declaration.signature);
        if let Ok(artifact) = self.module.artifact_mut(id) {
            artifact.location = declaration.location;
        }
        self.artifacts.insert(key, id);

        tracing::debug!(
            key = %key,
            name = %name,
            linkage = %declaration.linkage,
            "Declared artifact"
        );
        id
    }

    /// Like [`Self::get_or_create_artifact`], deriving the declaration from
    /// the indexed source declaration behind `key`.
    pub fn declare(&mut self, key: DeclarationKey) -> Result<ArtifactId> {
        if let Some(id) = self.artifact_for(&key) {
            return Ok(id);
        }
        let declaration = self.describe(&key).ok_or_else(|| {
            LowerError::unsupported(format!("reference to undeclared artifact {}", key), None)
        })?;
        Ok(self.get_or_create_artifact(key, declaration))
    }

    fn unique_name(&mut self, name: String) -> String {
        if self.names.insert(name.clone()) {
            return name;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{}#{}", name, suffix);
            if self.names.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    fn describe(&self, key: &DeclarationKey) -> Option<ArtifactDeclaration> {
        let id = key.decl()?;
        let decl = self.index.get(id)?;
        let declaration = match (key.kind, decl) {
            (KeyKind::Func, IndexedDecl::Func(fd)) => self.declaration(
                key,
                &fd.context,
                &fd.name,
                fd.natural_uncurry_level(),
                DeclFlavor::Function,
                func_signature(fd, key.uncurry_level),
                fd.loc.as_ref(),
            ),
            (KeyKind::Allocator, IndexedDecl::Constructor(cd)) => self.declaration(
                key,
                &cd.context,
                "init",
                0,
                DeclFlavor::Constructor,
                allocator_signature(&cd.params, &cd.self_ty),
                cd.loc.as_ref(),
            ),
            (KeyKind::Initializer, IndexedDecl::Constructor(cd)) => self.declaration(
                key,
                &cd.context,
                "init",
                0,
                DeclFlavor::Constructor,
                initializer_signature(&cd.params, &cd.self_ty),
                cd.loc.as_ref(),
            ),
            (KeyKind::Destroyer, IndexedDecl::Nominal(nd)) => self.declaration(
                key,
                &member_context(nd),
                "deinit",
                0,
                DeclFlavor::Destructor,
                destroyer_signature(&nd.nominal_ref()),
                nd.loc.as_ref(),
            ),
            (KeyKind::Getter, IndexedDecl::Var(vd)) => self.declaration(
                key,
                &vd.context,
                &vd.name,
                0,
                property_flavor(vd),
                getter_signature(&vd.ty, vd.self_ty.as_ref(), &[]),
                vd.loc.as_ref(),
            ),
            (KeyKind::Setter, IndexedDecl::Var(vd)) => {
                let value_name = match &vd.storage {
                    Storage::Computed {
                        setter: Some(setter),
                        ..
                    } => setter.value_name.as_str(),
                    _ => "value",
                };
                self.declaration(
                    key,
                    &vd.context,
                    &vd.name,
                    0,
                    property_flavor(vd),
                    setter_signature(&vd.ty, value_name, vd.self_ty.as_ref(), &[]),
                    vd.loc.as_ref(),
                )
            }
            (KeyKind::Getter, IndexedDecl::Subscript(sd)) => self.declaration(
                key,
                &sd.context,
                "subscript",
                0,
                DeclFlavor::Subscript,
                getter_signature(&sd.element_ty, Some(&sd.self_ty), &sd.indices),
                sd.loc.as_ref(),
            ),
            (KeyKind::Setter, IndexedDecl::Subscript(sd)) => {
                let value_name = sd
                    .setter
                    .as_ref()
                    .map(|setter| setter.value_name.as_str())
                    .unwrap_or("value");
                self.declaration(
                    key,
                    &sd.context,
                    "subscript",
                    0,
                    DeclFlavor::Subscript,
                    setter_signature(&sd.element_ty, value_name, Some(&sd.self_ty), &sd.indices),
                    sd.loc.as_ref(),
                )
            }
            (KeyKind::DefaultArgGenerator(index), IndexedDecl::Func(fd)) => {
                let param = fd
                    .param_clauses
                    .iter()
                    .flat_map(|clause| &clause.params)
                    .nth(index as usize)?;
                self.declaration(
                    key,
                    &fd.context,
                    &fd.name,
                    0,
                    DeclFlavor::Function,
                    default_arg_signature(&param.ty),
                    fd.loc.as_ref(),
                )
            }
            (KeyKind::DefaultArgGenerator(index), IndexedDecl::Constructor(cd)) => {
                let param = cd.params.get(index as usize)?;
                self.declaration(
                    key,
                    &cd.context,
                    "init",
                    0,
                    DeclFlavor::Constructor,
                    default_arg_signature(&param.ty),
                    cd.loc.as_ref(),
                )
            }
            _ => return None,
        };
        Some(declaration)
    }

    #[allow(clippy::too_many_arguments)]
    fn declaration(
        &self,
        key: &DeclarationKey,
        context: &DeclContext,
        name: &str,
        natural_level: u32,
        flavor: DeclFlavor,
        native: Signature,
        loc: Option<&SourceLoc>,
    ) -> ArtifactDeclaration {
        let signature = if key.foreign {
            interop_signature(&native)
        } else {
            native
        };
        ArtifactDeclaration {
            name: mangle(context, name, key, natural_level),
            linkage: derive_linkage(context, flavor),
            signature,
            location: lower_location(loc),
        }
    }

    /// Lowers every declaration of the unit and returns the finished module.
    /// A fatal error is returned only after every artifact opened so far,
    /// the top-level one included, has been finalized.
    pub fn lower(mut self) -> Result<LoweredModule> {
        let unit = self.unit;
        self.begin_top_level();
        let outcome = self.lower_decls(unit);
        self.finish_top_level();
        outcome?;

        if self.options.verify {
            if let Err(error) = self.verifier.verify_module(&self.module) {
                panic!("module `{}` failed verification: {}", self.module.name, error);
            }
        }

        tracing::debug!(
            module = %self.module.name,
            artifacts = self.module.artifacts.len(),
            globals = self.module.globals.len(),
            "Lowered module"
        );
        Ok(LoweredModule {
            module: self.module,
            artifacts: self.artifacts,
        })
    }

    fn lower_decls(&mut self, unit: &'a TranslationUnit) -> Result<()> {
        for decl in unit.decls.iter().skip(self.options.start_index) {
            self.lower_decl(decl)?;
        }
        for decl in &unit.external_definitions {
            self.lower_decl(decl)?;
        }
        Ok(())
    }

    pub(crate) fn lower_decl(&mut self, decl: &'a Decl) -> Result<()> {
        match decl {
            Decl::Func(fd) => self.lower_func(fd),
            Decl::Constructor(cd) => self.lower_constructor(cd),
            Decl::Destructor(dd) => self.lower_destructor(dd),
            Decl::Nominal(nd) => self.lower_nominal(nd),
            Decl::Var(vd) => self.lower_var(vd),
            Decl::Subscript(sd) => self.lower_subscript(sd),
            Decl::PatternBinding(pb) => self.lower_pattern_binding(pb),
            Decl::TopLevelCode(tc) => self.lower_top_level_code(tc),
        }
    }

    pub(crate) fn lower_func(&mut self, fd: &'a FuncDecl) -> Result<()> {
        let params = fd.param_clauses.iter().flat_map(|clause| &clause.params);
        self.emit_default_arg_generators(fd.id, params)?;

        if let Some(body) = &fd.body {
            let id = self.declare(DeclarationKey::func(fd.id, fd.natural_uncurry_level()))?;
            self.lower_with(id, fd.result.is_void(), |ctx| {
                ctx.emit_function_body(fd, body)
            })?;
            ThunkGenerator::new(self).emit_curry_thunks(fd)?;
        }

        if fd.interop {
            ThunkGenerator::new(self).emit_method_interop_thunk(fd)?;
        }
        Ok(())
    }

    fn emit_default_arg_generators(
        &mut self,
        owner: DeclId,
        params: impl Iterator<Item = &'a Param>,
    ) -> Result<()> {
        for (index, param) in params.enumerate() {
            let Some(default) = &param.default else {
                continue;
            };
            let id = self.declare(DeclarationKey::default_arg(owner, index as u32))?;
            self.lower_with(id, param.ty.is_void(), |ctx| {
                ctx.emit_default_argument_generator(default)
            })?;
        }
        Ok(())
    }

    fn lower_constructor(&mut self, cd: &'a ConstructorDecl) -> Result<()> {
        self.emit_default_arg_generators(cd.id, cd.params.iter())?;

        let Some(body) = &cd.body else {
            return Ok(());
        };
        let fields = self
            .index
            .nominal(cd.self_ty.decl)
            .map(|nd| nd.fields.as_slice())
            .unwrap_or_default();

        if cd.constructs_reference_type() {
            let initializer = self.declare(DeclarationKey::initializer(cd.id))?;
            let allocator = self.declare(DeclarationKey::allocator(cd.id))?;
            self.lower_with(allocator, false, |ctx| {
                ctx.emit_reference_type_allocator(cd, initializer)
            })?;
            self.lower_with(initializer, false, |ctx| {
                ctx.emit_reference_type_initializer(cd, fields, body)
            })?;
        } else {
            let id = self.declare(DeclarationKey::allocator(cd.id))?;
            self.lower_with(id, false, |ctx| {
                ctx.emit_value_type_constructor(cd, fields, body)
            })?;
        }
        Ok(())
    }

    fn lower_destructor(&mut self, dd: &'a DestructorDecl) -> Result<()> {
        let Some(class) = self.index.nominal(dd.class.decl) else {
            return Err(LowerError::unsupported(
                format!("destructor of unknown class `{}`", dd.class.name),
                lower_location(dd.loc.as_ref()),
            ));
        };
        self.lower_destroyer(class, Some(dd))
    }

    fn lower_destroyer(
        &mut self,
        class: &'a NominalDecl,
        explicit: Option<&'a DestructorDecl>,
    ) -> Result<()> {
        let id = self.declare(DeclarationKey::destroyer(class.id))?;
        let superclass = class
            .superclass
            .as_ref()
            .map(|superclass| self.superclass_destroyer(superclass));
        let body = explicit.map(|dd| dd.body.as_slice());
        self.lower_with(id, true, |ctx| ctx.emit_destroyer(class, body, superclass))?;
        Ok(())
    }

    /// The superclass destroyer may not be lowered yet, or may live in
    /// another module; either way only its declaration is needed.
    fn superclass_destroyer(&mut self, superclass: &NominalRef) -> ArtifactId {
        let key = DeclarationKey::destroyer(superclass.decl);
        let declaration = self
            .describe(&key)
            .unwrap_or_else(|| ArtifactDeclaration {
                name: format!("{}.deinit", superclass.name),
                linkage: Linkage::External,
                signature: destroyer_signature(superclass),
                location: None,
            });
        self.get_or_create_artifact(key, declaration)
    }

    fn lower_nominal(&mut self, nd: &'a NominalDecl) -> Result<()> {
        for member in &nd.members {
            self.lower_decl(member)?;
        }
        if nd.is_class() && nd.destructor().is_none() {
            self.lower_destroyer(nd, None)?;
        }
        Ok(())
    }

    fn lower_var(&mut self, vd: &'a VarDecl) -> Result<()> {
        match &vd.storage {
            Storage::Stored => {
                if vd.self_ty.is_none() && !vd.context.is_type_context() {
                    self.global_for(vd);
                }
            }
            Storage::Computed { getter, setter } => {
                let get = self.declare(DeclarationKey::getter(vd.id))?;
                self.lower_with(get, vd.ty.is_void(), |ctx| {
                    ctx.emit_getter_body(vd.self_ty.is_some(), &[], getter)
                })?;
                if let Some(setter) = setter {
                    let set = self.declare(DeclarationKey::setter(vd.id))?;
                    self.lower_with(set, true, |ctx| {
                        ctx.emit_setter_body(vd.self_ty.is_some(), &[], setter)
                    })?;
                }
            }
        }

        if vd.interop {
            ThunkGenerator::new(self).emit_property_interop_thunks(vd)?;
        }
        Ok(())
    }

    fn lower_subscript(&mut self, sd: &'a SubscriptDecl) -> Result<()> {
        let get = self.declare(DeclarationKey::getter(sd.id))?;
        self.lower_with(get, sd.element_ty.is_void(), |ctx| {
            ctx.emit_getter_body(true, &sd.indices, &sd.getter)
        })?;
        if let Some(setter) = &sd.setter {
            let set = self.declare(DeclarationKey::setter(sd.id))?;
            self.lower_with(set, true, |ctx| {
                ctx.emit_setter_body(true, &sd.indices, setter)
            })?;
        }
        Ok(())
    }

    fn lower_pattern_binding(&mut self, pb: &'a PatternBindingDecl) -> Result<()> {
        let Some(var) = self.index.var(pb.var) else {
            return Err(LowerError::unsupported(
                format!("pattern binding of unknown variable {}", pb.var),
                lower_location(pb.loc.as_ref()),
            ));
        };
        let global = self.global_for(var);
        let Some(init) = &pb.init else {
            return Ok(());
        };
        if !self.top_level_is_open() {
            tracing::debug!(
                variable = %var.name,
                "Skipping initializer after terminated top-level code"
            );
            return Ok(());
        }
        self.with_top_level(|ctx| ctx.emit_global_initializer(global, init))
    }

    fn lower_top_level_code(&mut self, tc: &'a TopLevelCodeDecl) -> Result<()> {
        if !self.top_level_is_open() {
            tracing::debug!("Skipping statements after terminated top-level code");
            return Ok(());
        }
        self.with_top_level(|ctx| ctx.lower_stmts(&tc.body))
    }

    /// Lowers a closure on the spot into an internal artifact.
    pub(crate) fn lower_closure(&mut self, closure: &'a ClosureExpr) -> Result<ArtifactId> {
        let key = DeclarationKey::closure(closure.id);
        if let Some(id) = self.artifact_for(&key) {
            return Ok(id);
        }

        let mut name = closure.context.path().join(".");
        name.push_str(&format!(".closure#{}", closure.id.0));
        let declaration = ArtifactDeclaration {
            name,
            linkage: derive_linkage(&closure.context, DeclFlavor::Closure),
            signature: closure_signature(&closure.params, &closure.result),
            location: lower_location(closure.loc.as_ref()),
        };
        let id = self.get_or_create_artifact(key, declaration);

        match &closure.body {
            ClosureBody::Block(stmts) => self.lower_with(id, closure.result.is_void(), |ctx| {
                ctx.emit_closure_body(&closure.params, stmts)
            }),
            ClosureBody::Expr(expr) => self.lower_with(id, false, |ctx| {
                ctx.emit_single_expression_closure(&closure.params, expr)
            }),
        }
    }

    /// Storage for a non-computed module-level variable.
    pub(crate) fn global_for(&mut self, var: &VarDecl) -> GlobalId {
        self.module.add_global(
            mangle_global(&var.context, &var.name),
            lower_type(&var.ty),
            lower_location(var.loc.as_ref()),
        )
    }

    /// Resolves a bridging helper and registers it as an external
    /// declaration.
    pub(crate) fn bridging_function(
        &mut self,
        function: BridgingFunction,
        location: Option<&SourceLocation>,
    ) -> Result<ArtifactId> {
        let resolved = self.bridging.resolve(
            function,
            &self.options,
            self.lookup,
            &mut *self.sink,
            location,
        )?;

        let params = resolved
            .params
            .iter()
            .enumerate()
            .map(|(index, ty)| Parameter::new(format!("arg{}", index), lower_type(ty)))
            .collect();
        let declaration = ArtifactDeclaration {
            name: format!("{}.{}", resolved.module, resolved.name),
            linkage: Linkage::External,
            signature: Signature::new(params, lower_type(&resolved.result)),
            location: lower_location(resolved.loc.as_ref()),
        };
        Ok(self.get_or_create_artifact(DeclarationKey::bridging(function), declaration))
    }

    /// Runs `body` inside a fresh lowering context for `artifact`. The context
    /// is finished whatever `body` returns.
    pub(crate) fn lower_with<F>(
        &mut self,
        artifact: ArtifactId,
        has_void_return: bool,
        body: F,
    ) -> Result<ArtifactId>
    where
        F: FnOnce(&mut FunctionLoweringContext<'_, 'a>) -> Result<()>,
    {
        let mut ctx = FunctionLoweringContext::begin(self, artifact, has_void_return);
        let outcome = body(&mut ctx);
        if outcome.is_err() {
            ctx.seal_after_error();
        }
        let id = ctx.finish();
        outcome.map(|()| id)
    }

    fn begin_top_level(&mut self) {
        let declaration = ArtifactDeclaration {
            name: self.options.top_level_name.clone(),
            linkage: Linkage::Internal,
            signature: Signature::thin(Type::Unit),
            location: None,
        };
        let id = self.get_or_create_artifact(DeclarationKey::top_level(), declaration);
        let ctx = FunctionLoweringContext::begin(self, id, true);
        self.top_level = Some(ctx.suspend());
    }

    fn top_level_is_open(&self) -> bool {
        self.top_level
            .as_ref()
            .map_or(false, |frame| frame.builder.has_insertion_point())
    }

    pub(crate) fn with_top_level<T>(
        &mut self,
        body: impl FnOnce(&mut FunctionLoweringContext<'_, 'a>) -> Result<T>,
    ) -> Result<T> {
        let Some(frame) = self.top_level.take() else {
            panic!("top-level code lowered outside of the top-level artifact");
        };
        let mut ctx = FunctionLoweringContext::resume(self, frame);
        let outcome = body(&mut ctx);
        self.top_level = Some(ctx.suspend());
        outcome
    }

    fn finish_top_level(&mut self) {
        let Some(frame) = self.top_level.take() else {
            panic!("top-level artifact finished twice");
        };
        let mut ctx = FunctionLoweringContext::resume(self, frame);
        ctx.seal_after_error();
        ctx.finish();
    }

    /// Prepares `id` for body emission and returns its entry parameters.
    pub(crate) fn pre_emit(
        &mut self,
        id: ArtifactId,
    ) -> (Vec<(String, Type)>, Option<SourceLocation>) {
        let artifact = match self.module.artifact_mut(id) {
            Ok(artifact) => artifact,
            Err(error) => panic!("cannot lower into {}: {}", id, error),
        };
        assert!(
            !artifact.is_defined(),
            "already emitted artifact `{}`",
            artifact.name
        );
        assert!(
            self.in_progress.insert(id),
            "artifact `{}` is already being lowered",
            artifact.name
        );

        artifact.debug_scope = Some(DebugScope::at(artifact.location.clone()));
        tracing::debug!(
            artifact = %artifact.name,
            linkage = %artifact.linkage,
            "Lowering artifact"
        );

        let params = artifact
            .signature
            .params
            .iter()
            .map(|p| (p.name.clone(), p.param_type.clone()))
            .collect();
        (params, artifact.location.clone())
    }

    /// Installs the finished body of `id`, then dumps and verifies it.
    pub(crate) fn post_emit(&mut self, id: ArtifactId, body: FunctionBody) {
        self.in_progress.remove(&id);
        let artifact = match self.module.artifact_mut(id) {
            Ok(artifact) => artifact,
            Err(error) => panic!("cannot finish {}: {}", id, error),
        };
        if let Err(error) = artifact.define(body) {
            panic!("{}", error);
        }
        assert!(
            artifact.is_defined(),
            "did not emit any body for `{}`",
            artifact.name
        );

        if tracing::enabled!(tracing::Level::TRACE) {
            if let Ok(text) = IrPrinter::new().print_artifact(&self.module, id) {
                tracing::trace!("{}", text);
            }
        }

        if self.options.verify {
            if let Err(error) = self.verifier.verify_artifact(&self.module, id) {
                panic!("lowered artifact failed verification: {}", error);
            }
        }
    }
}

fn member_context(nd: &NominalDecl) -> DeclContext {
    nd.context.nested(ContextFrame::Type {
        decl: nd.id,
        name: nd.name.clone(),
    })
}

fn property_flavor(vd: &VarDecl) -> DeclFlavor {
    if vd.is_computed() {
        DeclFlavor::ComputedProperty
    } else {
        DeclFlavor::StoredProperty
    }
}

/// Lowers `unit` with a fresh [`ModuleLowering`].
pub fn lower_translation_unit<'a>(
    unit: &'a TranslationUnit,
    options: LoweringOptions,
    lookup: &'a dyn NameLookup,
    sink: &'a mut dyn DiagnosticSink,
) -> Result<LoweredModule> {
    ModuleLowering::new(unit, options, lookup, sink).lower()
}
