//! Constant pushes

use super::families::FallThroughHandler;
use super::Fault;
use crate::bytecode::{Instruction, Opcode, Operand};
use crate::exec::ExecutionContext;
use crate::value::{FloatValue, IntValue, ObjectRef, Value};

/// `push.i32`, `push.i64`, `push.f64`, and `push.null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Constants;

impl FallThroughHandler for Constants {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[
            Opcode::PushI32,
            Opcode::PushI64,
            Opcode::PushF64,
            Opcode::PushNull,
        ]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        let value = match (instruction.opcode, instruction.operand) {
            (Opcode::PushI32, Operand::I32(v)) => Value::Int(IntValue::from_i32(v)),
            (Opcode::PushI64, Operand::I64(v)) => Value::Int(IntValue::from_i64(v)),
            (Opcode::PushF64, Operand::F64(v)) => Value::Float(FloatValue(v)),
            (Opcode::PushNull, Operand::None) => {
                Value::ObjectRef(ObjectRef::null(ctx.machine.bitness().is_32()))
            }
            _ => return Err(Fault::InvalidProgram),
        };
        ctx.state.stack.push(value);
        Ok(())
    }
}
