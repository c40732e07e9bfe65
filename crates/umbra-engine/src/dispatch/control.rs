//! Control transfer

use super::comparison::{evaluate, Predicate};
use super::families::{BranchHandler, FallThroughHandler};
use super::{Continuation, DispatchResult, Fault, OpcodeHandler};
use crate::bytecode::{Instruction, Opcode, Operand};
use crate::exec::ExecutionContext;
use crate::trilean::Trilean;

/// `jump`: the unconditional transfer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jumps;

impl OpcodeHandler for Jumps {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::Jump]
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> DispatchResult {
        let Operand::Target(target) = instruction.operand else {
            return DispatchResult::Fault(Fault::InvalidProgram);
        };
        ctx.state.pc = target;
        DispatchResult::Continue(Continuation::Redirect)
    }
}

/// `jump.true` and `jump.false`: one-operand truthiness branches.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruthBranches;

impl BranchHandler for TruthBranches {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::JumpIfTrue, Opcode::JumpIfFalse]
    }

    fn condition(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<Trilean, Fault> {
        let truth = ctx.state.stack.pop()?.truthiness();
        Ok(match instruction.opcode {
            Opcode::JumpIfFalse => !truth,
            _ => truth,
        })
    }
}

/// `jump.eq` through `jump.le.un`: two-operand relational branches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareBranches;

impl BranchHandler for CompareBranches {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[
            Opcode::JumpEq,
            Opcode::JumpNe,
            Opcode::JumpGt,
            Opcode::JumpGtUn,
            Opcode::JumpGe,
            Opcode::JumpGeUn,
            Opcode::JumpLt,
            Opcode::JumpLtUn,
            Opcode::JumpLe,
            Opcode::JumpLeUn,
        ]
    }

    fn condition(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<Trilean, Fault> {
        let predicate =
            Predicate::for_branch(instruction.opcode).ok_or(Fault::InvalidProgram)?;
        let rhs = ctx.state.stack.pop()?;
        let lhs = ctx.state.stack.pop()?;
        Ok(evaluate(predicate, &lhs, &rhs))
    }
}

/// `ret`: marks the state exited; the driver stops the path there.
#[derive(Debug, Clone, Copy, Default)]
pub struct Returns;

impl FallThroughHandler for Returns {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[Opcode::Ret]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        _instruction: &Instruction,
    ) -> Result<(), Fault> {
        ctx.state.exit = true;
        Ok(())
    }
}
