//! Field access
//!
//! `load.field` and `store.field` consult the [`FieldResolver`] for the
//! field's descriptor, then branch on the receiver's shape. The dispatch
//! order matters: a receiver that is not fully known short-circuits to a
//! synthesized unknown before any nullness test, so an unknown reference
//! never raises a null-reference fault. A by-value instance is exempt
//! from that short-circuit, it is its own identity even when its slots
//! hold unknowns.
//!
//! Compound referents store fields in raw form; values cross the stack
//! boundary through the [`Marshaller`]. Reads and writes touch only slots
//! the instance lays out itself, a field declared by an ancestor type has
//! no slot and faults.
//!
//! [`FieldResolver`]: crate::machine::FieldResolver
//! [`Marshaller`]: crate::machine::Marshaller

use super::families::FallThroughHandler;
use super::Fault;
use crate::bytecode::{Instruction, Opcode, Operand};
use crate::exec::ExecutionContext;
use crate::types::FieldDesc;
use crate::value::Value;

fn resolve(
    ctx: &ExecutionContext<'_>,
    instruction: &Instruction,
) -> Result<FieldDesc, Fault> {
    let Operand::Field(field) = instruction.operand else {
        return Err(Fault::InvalidProgram);
    };
    ctx.machine
        .fields()
        .resolve(field)
        .ok_or(Fault::InvalidProgram)
}

enum FieldSource {
    Raw(Value),
    Synthesized,
}

/// `load.field`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldLoads;

impl FallThroughHandler for FieldLoads {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::LoadField]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        let desc = resolve(ctx, instruction)?;
        let (state, machine) = ctx.parts();
        let receiver = state.stack.pop()?;
        let value = match receiver {
            // A by-value instance is its own identity; it reads its slots
            // directly no matter what those slots hold.
            Value::Compound(object) => {
                let raw = object.read_field(desc.id).ok_or(Fault::InvalidProgram)?;
                machine
                    .marshaller()
                    .to_stack(&desc.field_type, raw, machine.bitness())
            }
            ref v if !v.is_fully_known() => machine.create_unknown(&desc.field_type),
            Value::ObjectRef(ref r) if r.is_null() => return Err(Fault::NullReference),
            Value::ObjectRef(r) => {
                let handle = r.referent.ok_or(Fault::InvalidProgram)?;
                let source = {
                    let referent = handle.borrow();
                    match &*referent {
                        Value::Compound(object) => match object.read_field(desc.id) {
                            Some(raw) => FieldSource::Raw(raw),
                            None => return Err(Fault::InvalidProgram),
                        },
                        Value::StandIn(_) => FieldSource::Synthesized,
                        _ => return Err(Fault::InvalidProgram),
                    }
                };
                match source {
                    FieldSource::Raw(raw) => {
                        machine
                            .marshaller()
                            .to_stack(&desc.field_type, raw, machine.bitness())
                    }
                    FieldSource::Synthesized => machine.create_unknown(&desc.field_type),
                }
            }
            _ => return Err(Fault::InvalidProgram),
        };
        state.stack.push(value);
        Ok(())
    }
}

/// `store.field`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldStores;

impl FallThroughHandler for FieldStores {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::StoreField]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        let desc = resolve(ctx, instruction)?;
        let (state, machine) = ctx.parts();
        let value = state.stack.pop()?;
        let receiver = state.stack.pop()?;
        match receiver {
            // A by-value instance popped off the stack: the mutation could
            // never be observed, the program needed a reference here.
            Value::Compound(_) => Err(Fault::InvalidProgram),
            // The write lands somewhere no longer distinguishable; absorb
            // it rather than fault.
            ref v if !v.is_fully_known() => Ok(()),
            Value::ObjectRef(ref r) if r.is_null() => Err(Fault::NullReference),
            Value::ObjectRef(r) => {
                let handle = r.referent.ok_or(Fault::InvalidProgram)?;
                let raw = machine
                    .marshaller()
                    .from_stack(&desc.field_type, value, machine.bitness());
                let mut referent = handle.borrow_mut();
                match &mut *referent {
                    Value::Compound(object) => {
                        if object.write_field(desc.id, raw) {
                            Ok(())
                        } else {
                            Err(Fault::InvalidProgram)
                        }
                    }
                    Value::StandIn(_) => Ok(()),
                    _ => Err(Fault::InvalidProgram),
                }
            }
            _ => Err(Fault::InvalidProgram),
        }
    }
}
