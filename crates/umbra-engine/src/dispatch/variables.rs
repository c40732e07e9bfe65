//! Variable traffic
//!
//! Which variable an instruction touches is the [`Architecture`] service's
//! call; the handlers only move values between the frame and the stack. An
//! instruction whose architecture reports no touched variable is
//! malformed.
//!
//! [`Architecture`]: crate::machine::Architecture

use super::families::FallThroughHandler;
use super::Fault;
use crate::bytecode::{Instruction, Opcode};
use crate::exec::ExecutionContext;

/// `load.local` and `load.arg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableLoads;

impl FallThroughHandler for VariableLoads {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::LoadLocal, Opcode::LoadArg]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        let (state, machine) = ctx.parts();
        let variable = machine
            .architecture()
            .read_variables(instruction)
            .into_iter()
            .next()
            .ok_or(Fault::InvalidProgram)?;
        let value = state.read_variable(variable);
        state.stack.push(value);
        Ok(())
    }
}

/// `store.local` and `store.arg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableStores;

impl FallThroughHandler for VariableStores {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::StoreLocal, Opcode::StoreArg]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        let (state, machine) = ctx.parts();
        let variable = machine
            .architecture()
            .written_variables(instruction)
            .into_iter()
            .next()
            .ok_or(Fault::InvalidProgram)?;
        let value = state.stack.pop()?;
        state.write_variable(variable, value);
        Ok(())
    }
}
