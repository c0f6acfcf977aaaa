use crate::bridging::BridgingFunction;
use crate::error::Result;
use crate::function_lowering::FunctionLoweringContext;
use crate::key::DeclarationKey;
use crate::module_lowering::ModuleLowering;
use crate::types::lower_type;
use loam_ast::{FuncDecl, Storage, VarDecl};
use loam_core::{ArtifactId, Type, Value};

/// Synthesizes forwarding artifacts: curried entry points and the host-facing
/// entry points of interop declarations.
pub struct ThunkGenerator<'s, 'a> {
    lowering: &'s mut ModuleLowering<'a>,
}

impl<'s, 'a> ThunkGenerator<'s, 'a> {
    pub fn new(lowering: &'s mut ModuleLowering<'a>) -> Self {
        Self { lowering }
    }

    fn curry_skip_reason(&self, fd: &FuncDecl) -> Option<&'static str> {
        if fd.is_accessor() {
            Some("accessor")
        } else if fd.is_instance_member() {
            Some("instance method")
        } else if fd.is_generic() {
            // Generic curry thunks need reabstraction, which is not done yet.
            Some("generic signature")
        } else if !self.lowering.options.emit_curry_thunks {
            Some("disabled by options")
        } else {
            None
        }
    }

    /// One thunk per level below the natural one, innermost first, each
    /// forwarding to the artifact one level deeper.
    pub fn emit_curry_thunks(&mut self, fd: &'a FuncDecl) -> Result<Vec<ArtifactId>> {
        let natural = fd.natural_uncurry_level();
        if natural == 0 {
            return Ok(Vec::new());
        }
        if let Some(reason) = self.curry_skip_reason(fd) {
            tracing::debug!(function = %fd.name, reason, "Skipping curry thunks");
            return Ok(Vec::new());
        }

        let mut thunks = Vec::new();
        for level in (0..natural).rev() {
            let next = self.lowering.declare(DeclarationKey::func(fd.id, level + 1))?;
            let thunk = self.lowering.declare(DeclarationKey::func(fd.id, level))?;
            self.lowering
                .lower_with(thunk, false, |ctx| ctx.emit_curry_thunk(next))?;
            thunks.push(thunk);
        }
        Ok(thunks)
    }

    pub fn emit_method_interop_thunk(&mut self, fd: &'a FuncDecl) -> Result<Option<ArtifactId>> {
        let key = DeclarationKey::func(fd.id, fd.natural_uncurry_level()).as_foreign();
        if self.lowering.artifact_for(&key).is_some() {
            tracing::debug!(function = %fd.name, "Interop thunk already registered");
            return Ok(None);
        }
        let canonical = self.lowering.declare(key.as_native())?;
        let thunk = self.lowering.declare(key)?;
        let id = self.lowering.lower_with(thunk, fd.result.is_void(), |ctx| {
            ctx.emit_interop_thunk(canonical)
        })?;
        Ok(Some(id))
    }

    /// Getter thunk always, setter thunk only for settable properties.
    pub fn emit_property_interop_thunks(&mut self, vd: &'a VarDecl) -> Result<Vec<ArtifactId>> {
        let get_key = DeclarationKey::getter(vd.id).as_foreign();
        if self.lowering.artifact_for(&get_key).is_some() {
            tracing::debug!(property = %vd.name, "Interop thunks already registered");
            return Ok(Vec::new());
        }

        let mut thunks = Vec::new();
        let canonical_get = match vd.storage {
            Storage::Computed { .. } => Some(self.lowering.declare(get_key.as_native())?),
            Storage::Stored => None,
        };
        let get = self.lowering.declare(get_key)?;
        thunks.push(self.lowering.lower_with(get, vd.ty.is_void(), |ctx| {
            ctx.emit_interop_getter(vd, canonical_get)
        })?);

        if !vd.is_settable() {
            tracing::debug!(property = %vd.name, "Read-only property, no setter thunk");
            return Ok(thunks);
        }
        let set_key = DeclarationKey::setter(vd.id).as_foreign();
        let canonical_set = match vd.storage {
            Storage::Computed { .. } => Some(self.lowering.declare(set_key.as_native())?),
            Storage::Stored => None,
        };
        let set = self.lowering.declare(set_key)?;
        thunks.push(self.lowering.lower_with(set, true, |ctx| {
            ctx.emit_interop_setter(vd, canonical_set)
        })?);
        Ok(thunks)
    }
}

impl<'m, 'a> FunctionLoweringContext<'m, 'a> {
    /// Partially applies the next level to this level's arguments.
    pub fn emit_curry_thunk(&mut self, next: ArtifactId) -> Result<()> {
        let args = self.frame.params.clone();
        let callee = self.frame.builder.function_ref(next)?;
        let partial = self.frame.builder.partial_apply(callee, args)?;
        self.frame.builder.ret(partial)?;
        Ok(())
    }

    /// Converts host arguments, calls `canonical`, converts the result back.
    pub fn emit_interop_thunk(&mut self, canonical: ArtifactId) -> Result<()> {
        let native = self.module.module.artifact(canonical)?.signature.clone();
        let host_args = self.frame.params.clone();

        let mut args = Vec::with_capacity(host_args.len());
        for (arg, param) in host_args.into_iter().zip(&native.params) {
            args.push(self.bridge_from_host(arg, &param.param_type)?);
        }
        let callee = self.frame.builder.function_ref(canonical)?;
        let result = self.frame.builder.apply(callee, args)?;
        let result = self.bridge_to_host(result, &native.result)?;
        self.frame.builder.ret(result)?;
        Ok(())
    }

    pub fn emit_interop_getter(
        &mut self,
        vd: &'a VarDecl,
        canonical: Option<ArtifactId>,
    ) -> Result<()> {
        let params = self.frame.params.clone();
        let value = match canonical {
            Some(getter) => {
                let callee = self.frame.builder.function_ref(getter)?;
                self.frame.builder.apply(callee, params)?
            }
            None => self.load_stored_property(vd, params.last().cloned())?,
        };
        let value = self.bridge_to_host(value, &lower_type(&vd.ty))?;
        self.frame.builder.ret(value)?;
        Ok(())
    }

    pub fn emit_interop_setter(
        &mut self,
        vd: &'a VarDecl,
        canonical: Option<ArtifactId>,
    ) -> Result<()> {
        let mut params = self.frame.params.clone().into_iter();
        let Some(host_value) = params.next() else {
            return Err(self.unsupported(format!("setter thunk for `{}` without a value", vd.name)));
        };
        let value = self.bridge_from_host(host_value, &lower_type(&vd.ty))?;
        let rest: Vec<Value> = params.collect();

        match canonical {
            Some(setter) => {
                let mut args = vec![value];
                args.extend(rest);
                let callee = self.frame.builder.function_ref(setter)?;
                self.frame.builder.apply(callee, args)?;
            }
            None => match (&vd.self_ty, rest.last()) {
                (Some(_), Some(object)) => {
                    self.frame
                        .builder
                        .field_store(object.clone(), vd.name.clone(), value)?;
                }
                _ => {
                    let global = self.module.global_for(vd);
                    let address = self.frame.builder.global_addr(global)?;
                    self.frame.builder.store(address, value)?;
                }
            },
        }
        let unit = self.frame.builder.unit_value();
        self.frame.builder.ret(unit)?;
        Ok(())
    }

    fn load_stored_property(&mut self, vd: &'a VarDecl, object: Option<Value>) -> Result<Value> {
        match (&vd.self_ty, object) {
            (Some(_), Some(object)) => Ok(self.frame.builder.field_load(object, vd.name.clone())?),
            _ => {
                let global = self.module.global_for(vd);
                let address = self.frame.builder.global_addr(global)?;
                Ok(self.frame.builder.load(address)?)
            }
        }
    }

    /// `value` arrives in host representation; `native` is the type the
    /// canonical artifact expects.
    fn bridge_from_host(&mut self, value: Value, native: &Type) -> Result<Value> {
        match native {
            Type::String => {
                let helper = self.bridging_ref(BridgingFunction::StringFromHost)?;
                let slot = self.frame.builder.alloc_stack(Type::String)?;
                self.frame.builder.apply(helper, vec![value, slot.clone()])?;
                let converted = self.frame.builder.load(slot.clone())?;
                self.frame.builder.dealloc_stack(slot)?;
                Ok(converted)
            }
            Type::Bool => {
                let helper = self.bridging_ref(BridgingFunction::BoolFromHost)?;
                Ok(self.frame.builder.apply(helper, vec![value])?)
            }
            _ => Ok(value),
        }
    }

    fn bridge_to_host(&mut self, value: Value, native: &Type) -> Result<Value> {
        match native {
            Type::String => {
                let helper = self.bridging_ref(BridgingFunction::StringToHost)?;
                let slot = self.frame.builder.alloc_stack(Type::String)?;
                self.frame.builder.store(slot.clone(), value)?;
                let converted = self.frame.builder.apply(helper, vec![slot.clone()])?;
                self.frame.builder.dealloc_stack(slot)?;
                Ok(converted)
            }
            Type::Bool => {
                let helper = self.bridging_ref(BridgingFunction::BoolToHost)?;
                Ok(self.frame.builder.apply(helper, vec![value])?)
            }
            _ => Ok(value),
        }
    }

    fn bridging_ref(&mut self, function: BridgingFunction) -> Result<Value> {
        let location = self.frame.location.clone();
        let helper = self.module.bridging_function(function, location.as_ref())?;
        Ok(self.frame.builder.function_ref(helper)?)
    }
}
