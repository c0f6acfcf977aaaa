use crate::artifact::ArtifactId;
use crate::types::Type;
use crate::values::{GlobalId, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Instruction {
    Binary {
        result: Value,
        op: BinaryOp,
        left: Value,
        right: Value,
        ty: Type,
    },
    Compare {
        result: Value,
        op: CompareOp,
        left: Value,
        right: Value,
    },

    FunctionRef {
        result: Value,
        artifact: ArtifactId,
    },
    Apply {
        result: Value,
        callee: Value,
        args: Vec<Value>,
    },
    PartialApply {
        result: Value,
        callee: Value,
        args: Vec<Value>,
    },

    AllocStack {
        result: Value,
        ty: Type,
    },
    DeallocStack {
        address: Value,
    },
    Load {
        result: Value,
        address: Value,
    },
    Store {
        address: Value,
        value: Value,
    },
    FieldLoad {
        result: Value,
        base: Value,
        field: String,
    },
    FieldStore {
        base: Value,
        field: String,
        value: Value,
    },

    AllocRef {
        result: Value,
        ty: Type,
    },
    DeallocRef {
        object: Value,
    },
    Retain {
        value: Value,
    },
    Release {
        value: Value,
    },

    GlobalAddr {
        result: Value,
        global: GlobalId,
    },
}

impl Instruction {
    pub fn result(&self) -> Option<&Value> {
        match self {
            Instruction::Binary { result, .. }
            | Instruction::Compare { result, .. }
            | Instruction::FunctionRef { result, .. }
            | Instruction::Apply { result, .. }
            | Instruction::PartialApply { result, .. }
            | Instruction::AllocStack { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::FieldLoad { result, .. }
            | Instruction::AllocRef { result, .. }
            | Instruction::GlobalAddr { result, .. } => Some(result),
            Instruction::DeallocStack { .. }
            | Instruction::Store { .. }
            | Instruction::FieldStore { .. }
            | Instruction::DeallocRef { .. }
            | Instruction::Retain { .. }
            | Instruction::Release { .. } => None,
        }
    }

    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Binary { left, right, .. } | Instruction::Compare { left, right, .. } => {
                vec![left, right]
            }
            Instruction::Apply { callee, args, .. }
            | Instruction::PartialApply { callee, args, .. } => {
                let mut operands = vec![callee];
                operands.extend(args.iter());
                operands
            }
            Instruction::DeallocStack { address } => vec![address],
            Instruction::Load { address, .. } => vec![address],
            Instruction::Store { address, value } => vec![address, value],
            Instruction::FieldLoad { base, .. } => vec![base],
            Instruction::FieldStore { base, value, .. } => vec![base, value],
            Instruction::DeallocRef { object } => vec![object],
            Instruction::Retain { value } | Instruction::Release { value } => vec![value],
            Instruction::FunctionRef { .. }
            | Instruction::AllocStack { .. }
            | Instruction::AllocRef { .. }
            | Instruction::GlobalAddr { .. } => Vec::new(),
        }
    }

    pub fn referenced_artifact(&self) -> Option<ArtifactId> {
        match self {
            Instruction::FunctionRef { artifact, .. } => Some(*artifact),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Binary { .. } => "binary",
            Instruction::Compare { .. } => "compare",
            Instruction::FunctionRef { .. } => "function_ref",
            Instruction::Apply { .. } => "apply",
            Instruction::PartialApply { .. } => "partial_apply",
            Instruction::AllocStack { .. } => "alloc_stack",
            Instruction::DeallocStack { .. } => "dealloc_stack",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::FieldLoad { .. } => "field_load",
            Instruction::FieldStore { .. } => "field_store",
            Instruction::AllocRef { .. } => "alloc_ref",
            Instruction::DeallocRef { .. } => "dealloc_ref",
            Instruction::Retain { .. } => "retain",
            Instruction::Release { .. } => "release",
            Instruction::GlobalAddr { .. } => "global_addr",
        }
    }
}
