//! Umbra Engine - Abstract bytecode execution core
//!
//! This library provides the complete abstract execution engine including:
//! - A three-valued value domain with bit-level knownness tracking
//! - Offset-addressed programs over a stack-based instruction set
//! - Per-opcode handler dispatch against a pluggable machine
//! - Path-at-a-time driving that forks at undecidable branches

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod bytecode;
pub mod dispatch;
pub mod exec;
pub mod machine;
pub mod runner;
pub mod trilean;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use bytecode::{Instruction, Opcode, Operand, Program};
pub use dispatch::{DispatchResult, DispatchTable, Fault, OpcodeHandler};
pub use exec::{EvalStack, ExecutionContext, ProgramState, Variable};
pub use machine::{Machine, MachineBuilder};
pub use runner::{RunOutcome, StepRunner};
pub use trilean::Trilean;
pub use types::{Bitness, FieldDesc, FieldId, FieldRef, TypeDesc, Width};
pub use value::{FloatValue, IntValue, ObjectRef, Value};
