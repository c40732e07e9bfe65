//! Handler dispatch
//!
//! Execution is driven through a [`DispatchTable`]: each registered
//! [`OpcodeHandler`] claims the opcodes it implements, and dispatching an
//! instruction routes it to the claiming handler. Handlers report either a
//! [`Continuation`] telling the driver how control flow proceeds, or a
//! [`Fault`] ending the explored path.
//!
//! Most handlers fall through to the next instruction and are written
//! against the narrower [`FallThroughHandler`] trait; conditional branches
//! implement [`BranchHandler`] and let the [`Branching`] adapter turn a
//! three-valued condition into taken, not-taken, or forked control flow.

use thiserror::Error;

mod arithmetic;
mod comparison;
mod constants;
mod control;
mod families;
mod object;
mod stack;
mod variables;

pub use arithmetic::Arithmetic;
pub use comparison::{Comparisons, Predicate};
pub use constants::Constants;
pub use control::{CompareBranches, Jumps, Returns, TruthBranches};
pub use families::{BranchHandler, Branching, FallThrough, FallThroughHandler};
pub use object::{FieldLoads, FieldStores};
pub use stack::StackOps;
pub use variables::{VariableLoads, VariableStores};

use crate::bytecode::{Instruction, Opcode};
use crate::exec::ExecutionContext;

/// Abnormal end of an explored path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("null reference dereferenced")]
    NullReference,
    #[error("malformed or ill-typed program")]
    InvalidProgram,
    #[error("evaluation stack underflow")]
    StackUnderflow,
    #[error("definite division by zero")]
    DivideByZero,
    #[error("no handler registered for opcode")]
    UnknownOpcode,
}

/// How control flow proceeds after a successfully handled instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Fall through to the next instruction in offset order.
    Step,
    /// The handler rewrote the program counter; resume there.
    Redirect,
    /// An undecidable branch: both the fall-through successor and `target`
    /// are feasible.
    Fork { target: u64 },
}

/// Outcome of dispatching a single instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchResult {
    Continue(Continuation),
    Fault(Fault),
}

/// A unit of execution semantics covering a fixed set of opcodes.
pub trait OpcodeHandler {
    /// The opcodes this handler claims.
    fn supported_opcodes(&self) -> &'static [Opcode];

    /// Execute one claimed instruction against the context.
    fn execute(&self, ctx: &mut ExecutionContext<'_>, instruction: &Instruction)
        -> DispatchResult;
}

/// Routes instructions to the handler claiming their opcode.
///
/// Registration order matters only for overlap: a later handler displaces
/// an earlier one on the opcodes both claim.
pub struct DispatchTable {
    handlers: [Option<usize>; 256],
    registry: Vec<Box<dyn OpcodeHandler>>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        DispatchTable::new()
    }
}

impl DispatchTable {
    /// A table with no handlers; every dispatch reports
    /// [`Fault::UnknownOpcode`].
    pub fn new() -> Self {
        DispatchTable {
            handlers: [None; 256],
            registry: Vec::new(),
        }
    }

    /// A table covering the full instruction set with the in-crate
    /// handlers.
    pub fn with_default_handlers() -> Self {
        let mut table = DispatchTable::new();
        table.register(FallThrough(Constants));
        table.register(FallThrough(StackOps));
        table.register(FallThrough(VariableLoads));
        table.register(FallThrough(VariableStores));
        table.register(FallThrough(Arithmetic));
        table.register(FallThrough(Comparisons));
        table.register(FallThrough(FieldLoads));
        table.register(FallThrough(FieldStores));
        table.register(Jumps);
        table.register(Branching(TruthBranches));
        table.register(Branching(CompareBranches));
        table.register(FallThrough(Returns));
        table
    }

    /// Register `handler` for every opcode it claims.
    pub fn register(&mut self, handler: impl OpcodeHandler + 'static) {
        let index = self.registry.len();
        for &opcode in handler.supported_opcodes() {
            self.handlers[opcode as u8 as usize] = Some(index);
        }
        self.registry.push(Box::new(handler));
    }

    /// True when some registered handler claims `opcode`.
    pub fn supports(&self, opcode: Opcode) -> bool {
        self.handlers[opcode as u8 as usize].is_some()
    }

    /// Route one instruction to its handler.
    pub fn dispatch(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> DispatchResult {
        match self.handlers[instruction.opcode as u8 as usize] {
            Some(index) => self.registry[index].execute(ctx, instruction),
            None => DispatchResult::Fault(Fault::UnknownOpcode),
        }
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("handlers", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Operand;
    use crate::exec::ProgramState;
    use crate::machine::Machine;
    use crate::types::Bitness;

    #[test]
    fn empty_table_reports_unknown_opcode() {
        let table = DispatchTable::new();
        let mut machine = Machine::with_defaults(Bitness::Bits64);
        let mut state = ProgramState::new();
        let mut ctx = ExecutionContext::new(&mut state, &mut machine);
        let instruction = Instruction::new(0, Opcode::Nop, Operand::None);
        assert_eq!(
            table.dispatch(&mut ctx, &instruction),
            DispatchResult::Fault(Fault::UnknownOpcode)
        );
    }

    #[test]
    fn default_table_claims_every_opcode() {
        let table = DispatchTable::with_default_handlers();
        for byte in 0..=u8::MAX {
            if let Ok(opcode) = Opcode::try_from(byte) {
                assert!(table.supports(opcode), "{opcode} unclaimed");
            }
        }
    }

    #[test]
    fn later_registration_displaces_earlier() {
        struct Claims(&'static [Opcode], Continuation);
        impl OpcodeHandler for Claims {
            fn supported_opcodes(&self) -> &'static [Opcode] {
                self.0
            }
            fn execute(
                &self,
                _ctx: &mut ExecutionContext<'_>,
                _instruction: &Instruction,
            ) -> DispatchResult {
                DispatchResult::Continue(self.1)
            }
        }

        let mut table = DispatchTable::new();
        table.register(Claims(&[Opcode::Nop], Continuation::Step));
        table.register(Claims(&[Opcode::Nop], Continuation::Redirect));

        let mut machine = Machine::with_defaults(Bitness::Bits64);
        let mut state = ProgramState::new();
        let mut ctx = ExecutionContext::new(&mut state, &mut machine);
        let instruction = Instruction::new(0, Opcode::Nop, Operand::None);
        assert_eq!(
            table.dispatch(&mut ctx, &instruction),
            DispatchResult::Continue(Continuation::Redirect)
        );
    }
}
