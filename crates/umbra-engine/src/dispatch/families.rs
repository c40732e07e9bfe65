//! Handler families
//!
//! Adapters lifting the two recurring handler shapes into
//! [`OpcodeHandler`]: straight-line handlers that fall through on success,
//! and conditional branches whose three-valued condition decides between
//! taken, not-taken, and forked control flow.

use super::{Continuation, DispatchResult, Fault, OpcodeHandler};
use crate::bytecode::{Instruction, Opcode, Operand};
use crate::exec::ExecutionContext;
use crate::trilean::Trilean;

/// A handler whose instructions always fall through on success.
pub trait FallThroughHandler {
    fn supported_opcodes(&self) -> &'static [Opcode];

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault>;
}

/// Adapter turning a [`FallThroughHandler`] into an [`OpcodeHandler`].
#[derive(Debug, Clone, Copy)]
pub struct FallThrough<H>(pub H);

impl<H: FallThroughHandler> OpcodeHandler for FallThrough<H> {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        self.0.supported_opcodes()
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> DispatchResult {
        match self.0.run(ctx, instruction) {
            Ok(()) => DispatchResult::Continue(Continuation::Step),
            Err(fault) => DispatchResult::Fault(fault),
        }
    }
}

/// A conditional branch: the condition decides where control goes.
pub trait BranchHandler {
    fn supported_opcodes(&self) -> &'static [Opcode];

    /// Evaluate the branch condition, popping its operands.
    fn condition(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<Trilean, Fault>;
}

/// Adapter turning a [`BranchHandler`] into an [`OpcodeHandler`].
///
/// A definite condition takes or skips the branch; an unknown condition
/// forks, leaving the driver to explore both successors.
#[derive(Debug, Clone, Copy)]
pub struct Branching<H>(pub H);

impl<H: BranchHandler> OpcodeHandler for Branching<H> {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        self.0.supported_opcodes()
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> DispatchResult {
        let Operand::Target(target) = instruction.operand else {
            return DispatchResult::Fault(Fault::InvalidProgram);
        };
        match self.0.condition(ctx, instruction) {
            Err(fault) => DispatchResult::Fault(fault),
            Ok(Trilean::True) => {
                ctx.state.pc = target;
                DispatchResult::Continue(Continuation::Redirect)
            }
            Ok(Trilean::False) => DispatchResult::Continue(Continuation::Step),
            Ok(Trilean::Unknown) => DispatchResult::Continue(Continuation::Fork { target }),
        }
    }
}
