//! Injected services
//!
//! The machine consumes four capabilities through trait objects. Hosts
//! supply their own implementations or use the provided defaults:
//! [`SlotArchitecture`] for slot-operand variable mapping, [`Heap`] for
//! allocation, [`StackMarshaller`] for width adaptation, and
//! [`TableResolver`] for field lookup.
//!
//! [`Heap`]: crate::machine::Heap
//! [`StackMarshaller`]: crate::machine::StackMarshaller

use std::collections::HashMap;

use crate::bytecode::{Instruction, Opcode, Operand};
use crate::exec::Variable;
use crate::types::{Bitness, FieldDesc, FieldRef, TypeDesc};
use crate::value::Value;

/// Maps instructions to the variables they touch.
pub trait Architecture {
    /// Variables an instruction reads.
    fn read_variables(&self, instruction: &Instruction) -> Vec<Variable>;
    /// Variables an instruction writes.
    fn written_variables(&self, instruction: &Instruction) -> Vec<Variable>;
}

/// Produces instances suitable for marshalling.
pub trait Allocator {
    /// Allocate an unknown-initialized instance of `ty` in raw storage form.
    fn allocate_object(&mut self, ty: &TypeDesc, bitness: Bitness) -> Value;
}

/// Converts between raw storage form and stack-native form.
pub trait Marshaller {
    /// Raw storage form of `ty` to the form the operand stack carries.
    fn to_stack(&self, ty: &TypeDesc, value: Value, bitness: Bitness) -> Value;
    /// Stack-native form back to the raw storage form of `ty`.
    fn from_stack(&self, ty: &TypeDesc, value: Value, bitness: Bitness) -> Value;
}

/// Resolves field operand tokens to full descriptors.
pub trait FieldResolver {
    /// `None` when the token is not known to the host.
    fn resolve(&self, field: FieldRef) -> Option<FieldDesc>;
}

/// Slot-operand variable mapping for this instruction set.
///
/// Load opcodes read exactly the slot their operand names; store opcodes
/// write it. Every other instruction touches no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotArchitecture;

impl Architecture for SlotArchitecture {
    fn read_variables(&self, instruction: &Instruction) -> Vec<Variable> {
        match (instruction.opcode, instruction.operand) {
            (Opcode::LoadLocal, Operand::Slot(slot)) => vec![Variable::Local(slot)],
            (Opcode::LoadArg, Operand::Slot(slot)) => vec![Variable::Arg(slot)],
            _ => Vec::new(),
        }
    }

    fn written_variables(&self, instruction: &Instruction) -> Vec<Variable> {
        match (instruction.opcode, instruction.operand) {
            (Opcode::StoreLocal, Operand::Slot(slot)) => vec![Variable::Local(slot)],
            (Opcode::StoreArg, Operand::Slot(slot)) => vec![Variable::Arg(slot)],
            _ => Vec::new(),
        }
    }
}

/// In-memory field table.
#[derive(Debug, Clone, Default)]
pub struct TableResolver {
    fields: HashMap<FieldRef, FieldDesc>,
}

impl TableResolver {
    pub fn new() -> Self {
        TableResolver::default()
    }

    /// Register a descriptor under its reference token.
    pub fn insert(&mut self, field: FieldRef, desc: FieldDesc) {
        self.fields.insert(field, desc);
    }

    /// Builder-style registration.
    pub fn with_field(mut self, field: FieldRef, desc: FieldDesc) -> Self {
        self.insert(field, desc);
        self
    }
}

impl FieldResolver for TableResolver {
    fn resolve(&self, field: FieldRef) -> Option<FieldDesc> {
        self.fields.get(&field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldId;

    #[test]
    fn slot_architecture_maps_loads_and_stores() {
        let arch = SlotArchitecture;
        let load = Instruction::new(0, Opcode::LoadLocal, Operand::Slot(3));
        assert_eq!(arch.read_variables(&load), vec![Variable::Local(3)]);
        assert!(arch.written_variables(&load).is_empty());

        let store = Instruction::new(1, Opcode::StoreArg, Operand::Slot(0));
        assert_eq!(arch.written_variables(&store), vec![Variable::Arg(0)]);
        assert!(arch.read_variables(&store).is_empty());

        let add = Instruction::new(2, Opcode::Add, Operand::None);
        assert!(arch.read_variables(&add).is_empty());
        assert!(arch.written_variables(&add).is_empty());
    }

    #[test]
    fn table_resolver_round_trip() {
        let desc = FieldDesc {
            id: FieldId(7),
            name: "count".to_string(),
            field_type: TypeDesc::I32,
            declaring_type: TypeDesc::Class("Counter".to_string()),
        };
        let resolver = TableResolver::new().with_field(FieldRef(1), desc.clone());
        assert_eq!(resolver.resolve(FieldRef(1)), Some(desc));
        assert_eq!(resolver.resolve(FieldRef(2)), None);
    }
}
