use crate::{
    artifact::{ArtifactId, FunctionBody},
    block::{BasicBlock, BlockId, BlockParam, Terminator},
    instructions::{BinaryOp, CompareOp, Instruction},
    types::Type,
    values::{Constant, GlobalId, ParamId, TempId, Value},
    IrError, Result,
};

#[derive(Debug)]
pub struct BodyBuilder {
    body: FunctionBody,
    insertion_point: Option<BlockId>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::with_body(FunctionBody::new())
    }

    pub fn with_body(body: FunctionBody) -> Self {
        Self {
            body,
            insertion_point: None,
        }
    }

    /// Creates the entry block with one block parameter per signature
    /// parameter and positions the cursor at its end.
    pub fn create_entry_block(&mut self, params: &[(String, Type)]) -> (BlockId, Vec<Value>) {
        let entry = self.body.create_block();
        let mut values = Vec::with_capacity(params.len());
        if let Some(block) = self.body.get_block_mut(entry) {
            for (index, (name, ty)) in params.iter().enumerate() {
                block.add_param(BlockParam::new(name.clone(), ty.clone()));
                values.push(Value::Param(ParamId(index as u32)));
            }
        }
        self.insertion_point = Some(entry);
        (entry, values)
    }

    pub fn create_block(&mut self) -> BlockId {
        self.body.create_block()
    }

    pub fn position_at_end(&mut self, block: BlockId) -> Result<()> {
        let target = self
            .body
            .get_block(block)
            .ok_or(IrError::UnknownBlock(block))?;
        if target.is_terminated() {
            return Err(IrError::BuilderError(format!(
                "cannot insert into terminated block {}",
                block
            )));
        }
        self.insertion_point = Some(block);
        Ok(())
    }

    pub fn has_insertion_point(&self) -> bool {
        self.insertion_point.is_some()
    }

    pub fn insertion_block(&self) -> Option<BlockId> {
        self.insertion_point
    }

    pub fn clear_insertion_point(&mut self) {
        self.insertion_point = None;
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.body.get_block(id)
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    pub fn finish(self) -> FunctionBody {
        self.body
    }

    fn new_temp(&mut self) -> Value {
        Value::Temp(TempId(self.body.next_temp()))
    }

    fn current_block_mut(&mut self) -> Result<&mut BasicBlock> {
        let block_id = self.insertion_point.ok_or_else(|| {
            IrError::NoInsertionPoint("instruction emitted after a terminator".into())
        })?;
        self.body
            .get_block_mut(block_id)
            .ok_or(IrError::UnknownBlock(block_id))
    }

    fn push(&mut self, inst: Instruction) -> Result<()> {
        self.current_block_mut()?.add_instruction(inst);
        Ok(())
    }

    fn push_with_result<F>(&mut self, make: F) -> Result<Value>
    where
        F: FnOnce(Value) -> Instruction,
    {
        // Check the cursor before burning a temporary.
        self.current_block_mut()?;
        let result = self.new_temp();
        self.push(make(result.clone()))?;
        Ok(result)
    }

    fn terminate(&mut self, term: Terminator) -> Result<()> {
        self.current_block_mut()?.set_terminator(term);
        self.insertion_point = None;
        Ok(())
    }

    pub fn integer_literal(&self, value: i64, bits: u16) -> Value {
        Value::Constant(Constant::int(value, bits))
    }

    pub fn bool_literal(&self, value: bool) -> Value {
        Value::Constant(Constant::Bool(value))
    }

    pub fn string_literal(&self, value: impl Into<String>) -> Value {
        Value::Constant(Constant::String(value.into()))
    }

    pub fn unit_value(&self) -> Value {
        Value::unit()
    }

    pub fn binary(&mut self, op: BinaryOp, left: Value, right: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Binary {
            result,
            op,
            left,
            right,
            ty,
        })
    }

    pub fn compare(&mut self, op: CompareOp, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Compare {
            result,
            op,
            left,
            right,
        })
    }

    pub fn function_ref(&mut self, artifact: ArtifactId) -> Result<Value> {
        self.push_with_result(|result| Instruction::FunctionRef { result, artifact })
    }

    pub fn apply(&mut self, callee: Value, args: Vec<Value>) -> Result<Value> {
        self.push_with_result(|result| Instruction::Apply {
            result,
            callee,
            args,
        })
    }

    pub fn partial_apply(&mut self, callee: Value, args: Vec<Value>) -> Result<Value> {
        self.push_with_result(|result| Instruction::PartialApply {
            result,
            callee,
            args,
        })
    }

    pub fn alloc_stack(&mut self, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::AllocStack { result, ty })
    }

    pub fn dealloc_stack(&mut self, address: Value) -> Result<()> {
        self.push(Instruction::DeallocStack { address })
    }

    pub fn load(&mut self, address: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Load { result, address })
    }

    pub fn store(&mut self, address: Value, value: Value) -> Result<()> {
        self.push(Instruction::Store { address, value })
    }

    pub fn field_load(&mut self, base: Value, field: impl Into<String>) -> Result<Value> {
        let field = field.into();
        self.push_with_result(|result| Instruction::FieldLoad {
            result,
            base,
            field,
        })
    }

    pub fn field_store(&mut self, base: Value, field: impl Into<String>, value: Value) -> Result<()> {
        self.push(Instruction::FieldStore {
            base,
            field: field.into(),
            value,
        })
    }

    pub fn alloc_ref(&mut self, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::AllocRef { result, ty })
    }

    pub fn dealloc_ref(&mut self, object: Value) -> Result<()> {
        self.push(Instruction::DeallocRef { object })
    }

    pub fn retain(&mut self, value: Value) -> Result<()> {
        self.push(Instruction::Retain { value })
    }

    pub fn release(&mut self, value: Value) -> Result<()> {
        self.push(Instruction::Release { value })
    }

    pub fn global_addr(&mut self, global: GlobalId) -> Result<Value> {
        self.push_with_result(|result| Instruction::GlobalAddr { result, global })
    }

    pub fn ret(&mut self, value: Value) -> Result<()> {
        self.terminate(Terminator::Return(value))
    }

    pub fn jump(&mut self, target: BlockId) -> Result<()> {
        if self.body.get_block(target).is_none() {
            return Err(IrError::UnknownBlock(target));
        }
        self.terminate(Terminator::Jump(target))
    }

    pub fn branch(&mut self, condition: Value, then_block: BlockId, else_block: BlockId) -> Result<()> {
        for target in [then_block, else_block] {
            if self.body.get_block(target).is_none() {
                return Err(IrError::UnknownBlock(target));
            }
        }
        self.terminate(Terminator::Branch {
            condition,
            then_block,
            else_block,
        })
    }

    pub fn unreachable(&mut self) -> Result<()> {
        self.terminate(Terminator::Unreachable)
    }
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
