//! Stack shuffling

use super::families::FallThroughHandler;
use super::Fault;
use crate::bytecode::{Instruction, Opcode};
use crate::exec::ExecutionContext;

/// `nop`, `dup`, and `drop`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackOps;

impl FallThroughHandler for StackOps {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::Nop, Opcode::Dup, Opcode::Drop]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        match instruction.opcode {
            Opcode::Nop => Ok(()),
            Opcode::Dup => {
                let top = ctx.state.stack.pop()?;
                ctx.state.stack.push(top.clone());
                ctx.state.stack.push(top);
                Ok(())
            }
            Opcode::Drop => {
                ctx.state.stack.pop()?;
                Ok(())
            }
            _ => Err(Fault::InvalidProgram),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Operand;
    use crate::exec::ProgramState;
    use crate::machine::Machine;
    use crate::types::{Bitness, Width};
    use crate::value::{IntValue, Value};

    fn run(opcode: Opcode, state: &mut ProgramState) -> Result<(), Fault> {
        let mut machine = Machine::with_defaults(Bitness::Bits64);
        let mut ctx = ExecutionContext::new(state, &mut machine);
        StackOps.run(&mut ctx, &Instruction::new(0, opcode, Operand::None))
    }

    #[test]
    fn dup_duplicates_the_top() {
        let mut state = ProgramState::new();
        state
            .stack
            .push(Value::Int(IntValue::known(3, Width::W32)));
        run(Opcode::Dup, &mut state).expect("dup");
        assert_eq!(state.stack.len(), 2);
        let copy = Value::Int(IntValue::known(3, Width::W32));
        assert_eq!(state.stack.pop(), Ok(copy.clone()));
        assert_eq!(state.stack.pop(), Ok(copy));
    }

    #[test]
    fn drop_discards_the_top() {
        let mut state = ProgramState::new();
        state
            .stack
            .push(Value::Int(IntValue::known(3, Width::W32)));
        run(Opcode::Drop, &mut state).expect("drop");
        assert!(state.stack.is_empty());
    }

    #[test]
    fn dup_and_drop_underflow_on_an_empty_stack() {
        let mut state = ProgramState::new();
        assert_eq!(run(Opcode::Dup, &mut state), Err(Fault::StackUnderflow));
        assert_eq!(run(Opcode::Drop, &mut state), Err(Fault::StackUnderflow));
    }

    #[test]
    fn nop_leaves_the_stack_alone() {
        let mut state = ProgramState::new();
        run(Opcode::Nop, &mut state).expect("nop");
        assert!(state.stack.is_empty());
    }
}
