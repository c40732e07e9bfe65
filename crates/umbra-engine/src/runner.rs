//! Single-path driver
//!
//! [`StepRunner`] advances one [`ProgramState`] instruction by instruction
//! until the path ends. A path ends by exiting, by faulting, by reaching an
//! undecidable branch, or by exhausting the step budget that bounds
//! exploration of programs which may not terminate.
//!
//! Divergence is reported, not resolved: the caller receives both feasible
//! successors and decides which to pursue, typically by [`fork`]ing the
//! state for one arm and reusing it for the other.
//!
//! [`fork`]: ProgramState::fork

use crate::bytecode::Program;
use crate::dispatch::{Continuation, DispatchResult, DispatchTable, Fault};
use crate::exec::{ExecutionContext, ProgramState};
use crate::machine::Machine;

/// Steps before a run gives up on a path.
pub const DEFAULT_STEP_BUDGET: u64 = 1 << 20;

/// How a driven path ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// The state exited cleanly.
    Completed,
    /// An undecidable branch: the path splits into the branch target and
    /// the fall-through successor.
    Diverged { target: u64, fall_through: u64 },
    /// The path ended abnormally.
    Faulted(Fault),
    /// The step budget ran out before the path ended.
    BudgetExhausted,
}

/// Drives a state through a program until its path ends.
#[derive(Debug)]
pub struct StepRunner {
    table: DispatchTable,
    budget: u64,
}

impl StepRunner {
    pub fn new(table: DispatchTable) -> Self {
        StepRunner {
            table,
            budget: DEFAULT_STEP_BUDGET,
        }
    }

    /// A runner over the full default instruction set.
    pub fn with_defaults() -> Self {
        StepRunner::new(DispatchTable::with_default_handlers())
    }

    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Run `state` until its path through `program` ends.
    ///
    /// The state is left wherever the path ended; after a divergence it
    /// still points at the branch, so the caller can fork it and aim the
    /// copies at the two successors.
    pub fn run(
        &self,
        machine: &mut Machine,
        program: &Program,
        state: &mut ProgramState,
    ) -> RunOutcome {
        let mut steps = 0u64;
        while !state.exit {
            if steps >= self.budget {
                return RunOutcome::BudgetExhausted;
            }
            steps += 1;

            let Some(instruction) = program.instruction_at(state.pc) else {
                return RunOutcome::Faulted(Fault::InvalidProgram);
            };
            let mut ctx = ExecutionContext::new(state, machine);
            let continuation = match self.table.dispatch(&mut ctx, instruction) {
                DispatchResult::Continue(continuation) => continuation,
                DispatchResult::Fault(fault) => return RunOutcome::Faulted(fault),
            };

            // An exit set by the handler ends the path before any advance;
            // a trailing `ret` has no successor to step to.
            if state.exit {
                break;
            }

            match continuation {
                Continuation::Step => match program.next_offset(state.pc) {
                    Some(next) => state.pc = next,
                    None => return RunOutcome::Faulted(Fault::InvalidProgram),
                },
                Continuation::Redirect => {}
                Continuation::Fork { target } => {
                    let Some(fall_through) = program.next_offset(state.pc) else {
                        return RunOutcome::Faulted(Fault::InvalidProgram);
                    };
                    return RunOutcome::Diverged {
                        target,
                        fall_through,
                    };
                }
            }
        }
        RunOutcome::Completed
    }
}
