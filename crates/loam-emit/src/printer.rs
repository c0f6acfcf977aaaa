use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use anyhow::Result;
use loam_core::{
    Artifact, ArtifactId, BasicBlock, Instruction, IrModule, Terminator, Value,
};
use std::io::Write;

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct IrPrinter {
    config: EmitterConfig,
}

impl IrPrinter {
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn print_module(&self, module: &IrModule) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::from_config(&self.config);
        self.emit(module, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn print_artifact(&self, module: &IrModule, id: ArtifactId) -> Result<String> {
        let artifact = module.artifact(id)?;
        let mut buffer = Vec::new();
        let mut context = EmitContext::from_config(&self.config);
        self.emit_artifact(module, artifact, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn artifact_name(module: &IrModule, id: ArtifactId) -> String {
        module
            .artifact(id)
            .map(|a| format!("@{}", a.name))
            .unwrap_or_else(|_| format!("@<missing {}>", id))
    }

    fn emit_artifact<W: Write>(
        &self,
        module: &IrModule,
        artifact: &Artifact,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let mut header = format!(
            "@{} : {} {}",
            artifact.name,
            artifact.function_type(),
            artifact.linkage
        );
        if self.config.include_locations {
            if let Some(location) = &artifact.location {
                header.push_str(&format!(" loc \"{}\"", location));
            }
        }

        if artifact.is_external_declaration() {
            EmitHelper::write_keyword_line(writer, context, "fn", &header)?;
            return Ok(());
        }

        header.push_str(" {");
        EmitHelper::write_keyword_line(writer, context, "fn", &header)?;
        for block in artifact.body.blocks.values() {
            self.emit_block(module, block, writer, context)?;
        }
        EmitHelper::write_line(writer, context, "}")?;
        Ok(())
    }

    fn emit_block<W: Write>(
        &self,
        module: &IrModule,
        block: &BasicBlock,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let params: Vec<String> = block
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                if self.config.include_types {
                    format!("%arg{}: {}", index, param.param_type)
                } else {
                    format!("%arg{}", index)
                }
            })
            .collect();
        if params.is_empty() {
            EmitHelper::write_line(writer, context, &format!("{}:", block.id))?;
        } else {
            EmitHelper::write_line(
                writer,
                context,
                &format!("{}({}):", block.id, params.join(", ")),
            )?;
        }

        context.indent();
        for inst in &block.instructions {
            EmitHelper::write_line(writer, context, &self.format_instruction(module, inst))?;
        }
        EmitHelper::write_line(writer, context, &Self::format_terminator(&block.terminator))?;
        context.dedent();
        Ok(())
    }

    pub fn format_instruction(&self, module: &IrModule, inst: &Instruction) -> String {
        let typed = self.config.include_types;
        match inst {
            Instruction::Binary {
                result,
                op,
                left,
                right,
                ty,
            } => {
                if typed {
                    format!("{} = binary {} {}, {} : {}", result, op, left, right, ty)
                } else {
                    format!("{} = binary {} {}, {}", result, op, left, right)
                }
            }
            Instruction::Compare {
                result,
                op,
                left,
                right,
            } => format!("{} = compare {} {}, {}", result, op, left, right),
            Instruction::FunctionRef { result, artifact } => format!(
                "{} = function_ref {}",
                result,
                Self::artifact_name(module, *artifact)
            ),
            Instruction::Apply {
                result,
                callee,
                args,
            } => format!("{} = apply {}({})", result, callee, join_values(args)),
            Instruction::PartialApply {
                result,
                callee,
                args,
            } => format!(
                "{} = partial_apply {}({})",
                result,
                callee,
                join_values(args)
            ),
            Instruction::AllocStack { result, ty } => format!("{} = alloc_stack {}", result, ty),
            Instruction::DeallocStack { address } => format!("dealloc_stack {}", address),
            Instruction::Load { result, address } => format!("{} = load {}", result, address),
            Instruction::Store { address, value } => format!("store {} to {}", value, address),
            Instruction::FieldLoad {
                result,
                base,
                field,
            } => format!("{} = field_load {}.{}", result, base, field),
            Instruction::FieldStore { base, field, value } => {
                format!("field_store {} to {}.{}", value, base, field)
            }
            Instruction::AllocRef { result, ty } => format!("{} = alloc_ref {}", result, ty),
            Instruction::DeallocRef { object } => format!("dealloc_ref {}", object),
            Instruction::Retain { value } => format!("retain {}", value),
            Instruction::Release { value } => format!("release {}", value),
            Instruction::GlobalAddr { result, global } => {
                let name = module
                    .global(*global)
                    .map(|g| format!("@{}", g.name))
                    .unwrap_or_else(|| format!("@<missing {}>", global));
                format!("{} = global_addr {}", result, name)
            }
        }
    }

    pub fn format_terminator(terminator: &Terminator) -> String {
        match terminator {
            Terminator::Jump(target) => format!("br {}", target),
            Terminator::Branch {
                condition,
                then_block,
                else_block,
            } => format!("cond_br {}, {}, {}", condition, then_block, else_block),
            Terminator::Return(value) => format!("return {}", value),
            Terminator::Unreachable => "unreachable".to_string(),
            Terminator::Invalid => "<unterminated>".to_string(),
        }
    }
}

impl Default for IrPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for IrPrinter {
    type Item = IrModule;

    fn emit<W: Write>(
        &self,
        module: &IrModule,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        EmitHelper::write_keyword_line(writer, context, "module", &module.name)?;

        if !module.globals.is_empty() {
            writeln!(writer)?;
            for global in module.globals.values() {
                EmitHelper::write_keyword_line(
                    writer,
                    context,
                    "global",
                    &format!("@{} : {}", global.name, global.ty),
                )?;
            }
        }

        for artifact in module.artifacts() {
            writeln!(writer)?;
            self.emit_artifact(module, artifact, writer, context)?;
        }
        Ok(())
    }
}
