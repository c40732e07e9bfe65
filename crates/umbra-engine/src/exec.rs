//! Execution state
//!
//! [`ProgramState`] is one explored path's mutable state: operand stack,
//! variable slots, program counter, and exit flag. [`ExecutionContext`] is
//! the per-step view a handler executes against, bundling the state with
//! the machine's services. Exactly one handler mutates a context at a time.

use std::collections::HashMap;

use crate::dispatch::Fault;
use crate::machine::Machine;
use crate::value::Value;

/// LIFO operand stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalStack {
    values: Vec<Value>,
}

impl EvalStack {
    pub fn new() -> Self {
        EvalStack::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pop the top value; popping an empty stack is the underflow fault.
    pub fn pop(&mut self) -> Result<Value, Fault> {
        self.values.pop().ok_or(Fault::StackUnderflow)
    }

    #[must_use]
    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The stack contents, bottom first.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A variable slot binding: a local or an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Local(u16),
    Arg(u16),
}

/// The mutable state of one explored path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramState {
    /// Offset of the instruction being executed.
    pub pc: u64,
    pub stack: EvalStack,
    variables: HashMap<Variable, Value>,
    /// Set by the return handler; the driver stops stepping once it is up.
    pub exit: bool,
}

impl ProgramState {
    pub fn new() -> Self {
        ProgramState::default()
    }

    /// A fresh state positioned at `pc`.
    pub fn at_offset(pc: u64) -> Self {
        ProgramState {
            pc,
            ..ProgramState::default()
        }
    }

    /// Current value of a slot. A slot that was never written reads as
    /// the opaque unknown.
    #[must_use]
    pub fn read_variable(&self, variable: Variable) -> Value {
        self.variables
            .get(&variable)
            .cloned()
            .unwrap_or(Value::Unknown)
    }

    pub fn write_variable(&mut self, variable: Variable, value: Value) {
        self.variables.insert(variable, value);
    }

    /// Deep-isolated copy for exploring the other arm of an unknown branch.
    ///
    /// Every heap object reachable from the stack or the variables is
    /// copied, with aliasing preserved inside the copy, so the two paths
    /// never observe each other's writes. A plain `clone` still shares
    /// referents and is only safe for read-only snapshots.
    #[must_use]
    pub fn fork(&self) -> ProgramState {
        let mut memo = HashMap::new();
        ProgramState {
            pc: self.pc,
            stack: EvalStack {
                values: self
                    .stack
                    .values
                    .iter()
                    .map(|value| value.deep_clone(&mut memo))
                    .collect(),
            },
            variables: self
                .variables
                .iter()
                .map(|(variable, value)| (*variable, value.deep_clone(&mut memo)))
                .collect(),
            exit: self.exit,
        }
    }
}

/// Per-step view a handler executes against.
pub struct ExecutionContext<'a> {
    pub state: &'a mut ProgramState,
    pub machine: &'a mut Machine,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(state: &'a mut ProgramState, machine: &'a mut Machine) -> Self {
        ExecutionContext { state, machine }
    }

    /// Simultaneous borrows of the state and the machine.
    pub fn parts(&mut self) -> (&mut ProgramState, &mut Machine) {
        (&mut *self.state, &mut *self.machine)
    }
}
