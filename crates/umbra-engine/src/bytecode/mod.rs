//! Decoded bytecode programs
//!
//! The engine consumes instructions a host already decoded from its binary
//! container: each carries its stream offset, its opcode, and a decoded
//! operand. [`Program`] is the offset-addressed container the step driver
//! navigates. Validation is advisory and does not gate execution.

pub mod disasm;
mod opcode;

pub use opcode::{Opcode, OperandKind};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FieldRef;

/// A decoded instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    None,
    I32(i32),
    I64(i64),
    F64(f64),
    /// Variable slot index.
    Slot(u16),
    /// Field reference token, resolved through the machine's field resolver.
    Field(FieldRef),
    /// Branch target: the offset of another instruction.
    Target(u64),
}

impl Operand {
    /// The shape of this operand, for matching against the opcode's.
    pub fn kind(self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::I32(_) => OperandKind::I32,
            Operand::I64(_) => OperandKind::I64,
            Operand::F64(_) => OperandKind::F64,
            Operand::Slot(_) => OperandKind::Slot,
            Operand::Field(_) => OperandKind::Field,
            Operand::Target(_) => OperandKind::Target,
        }
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Offset of this instruction in the original stream.
    pub offset: u64,
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    pub fn new(offset: u64, opcode: Opcode, operand: Operand) -> Self {
        Instruction {
            offset,
            opcode,
            operand,
        }
    }
}

/// An offset-addressed instruction list.
///
/// Offsets must be strictly increasing but need not be contiguous; streams
/// decoded from byte-addressed containers keep their original gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Program { instructions }
    }

    /// Append an instruction at the next sequential offset; returns it.
    pub fn push(&mut self, opcode: Opcode, operand: Operand) -> u64 {
        let offset = self
            .instructions
            .last()
            .map(|i| i.offset + 1)
            .unwrap_or(0);
        self.instructions.push(Instruction::new(offset, opcode, operand));
        offset
    }

    /// Append an instruction at an explicit offset.
    pub fn push_at(&mut self, offset: u64, opcode: Opcode, operand: Operand) {
        self.instructions.push(Instruction::new(offset, opcode, operand));
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Offset of the entry instruction.
    pub fn first_offset(&self) -> Option<u64> {
        self.instructions.first().map(|i| i.offset)
    }

    /// Look up the instruction at exactly `offset`.
    pub fn instruction_at(&self, offset: u64) -> Option<&Instruction> {
        self.instructions
            .binary_search_by_key(&offset, |i| i.offset)
            .ok()
            .map(|index| &self.instructions[index])
    }

    /// Offset of the instruction following the one at `offset`.
    ///
    /// `None` when `offset` is unknown or names the last instruction.
    pub fn next_offset(&self, offset: u64) -> Option<u64> {
        let index = self
            .instructions
            .binary_search_by_key(&offset, |i| i.offset)
            .ok()?;
        self.instructions.get(index + 1).map(|i| i.offset)
    }

    /// Validate the program, collecting all problems found.
    ///
    /// Checks offset ordering, operand shape per opcode, and that every
    /// branch target names an instruction offset. Does not short-circuit.
    pub fn validate(&self) -> Result<(), Vec<ProgramError>> {
        let mut errors: Vec<ProgramError> = Vec::new();

        // Offsets strictly increasing
        for pair in self.instructions.windows(2) {
            if pair[1].offset <= pair[0].offset {
                errors.push(ProgramError {
                    offset: pair[1].offset,
                    kind: ProgramErrorKind::UnorderedOffset {
                        previous: pair[0].offset,
                    },
                });
            }
        }

        // Operand shape matches the opcode
        for instruction in &self.instructions {
            let expected = instruction.opcode.operand_kind();
            let found = instruction.operand.kind();
            if expected != found {
                errors.push(ProgramError {
                    offset: instruction.offset,
                    kind: ProgramErrorKind::OperandShape {
                        opcode: instruction.opcode,
                        expected,
                        found,
                    },
                });
            }
        }

        // Branch targets land on instruction offsets
        let offsets: HashSet<u64> = self.instructions.iter().map(|i| i.offset).collect();
        for instruction in &self.instructions {
            if let Operand::Target(target) = instruction.operand {
                if !offsets.contains(&target) {
                    errors.push(ProgramError {
                        offset: instruction.offset,
                        kind: ProgramErrorKind::BadBranchTarget { target },
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A validation problem with the offset where it was detected.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("offset {offset:#06x}: {kind}")]
pub struct ProgramError {
    pub offset: u64,
    pub kind: ProgramErrorKind,
}

/// Kinds of problems [`Program::validate`] can detect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgramErrorKind {
    #[error("instruction offsets must be strictly increasing (previous offset {previous})")]
    UnorderedOffset { previous: u64 },
    #[error("{opcode} carries {found} but expects {expected}")]
    OperandShape {
        opcode: Opcode,
        expected: OperandKind,
        found: OperandKind,
    },
    #[error("branch target {target} is not an instruction offset")]
    BadBranchTarget { target: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_sequential_offsets() {
        let mut program = Program::new();
        assert_eq!(program.push(Opcode::PushI32, Operand::I32(1)), 0);
        assert_eq!(program.push(Opcode::Drop, Operand::None), 1);
        assert_eq!(program.push(Opcode::Ret, Operand::None), 2);
        assert_eq!(program.len(), 3);
        assert_eq!(program.first_offset(), Some(0));
    }

    #[test]
    fn navigation_with_sparse_offsets() {
        let mut program = Program::new();
        program.push_at(0, Opcode::PushI32, Operand::I32(5));
        program.push_at(5, Opcode::Nop, Operand::None);
        program.push_at(6, Opcode::Ret, Operand::None);

        assert_eq!(
            program.instruction_at(5).map(|i| i.opcode),
            Some(Opcode::Nop)
        );
        assert!(program.instruction_at(3).is_none());
        assert_eq!(program.next_offset(0), Some(5));
        assert_eq!(program.next_offset(5), Some(6));
        assert_eq!(program.next_offset(6), None);
        assert_eq!(program.next_offset(3), None);
    }

    #[test]
    fn validate_accepts_a_well_formed_program() {
        let mut program = Program::new();
        program.push(Opcode::PushI32, Operand::I32(5));
        program.push(Opcode::PushI32, Operand::I32(3));
        let target = 4;
        program.push(Opcode::JumpGt, Operand::Target(target));
        program.push(Opcode::Nop, Operand::None);
        program.push(Opcode::Ret, Operand::None);
        assert!(program.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unordered_offsets() {
        let mut program = Program::new();
        program.push_at(4, Opcode::Nop, Operand::None);
        program.push_at(2, Opcode::Ret, Operand::None);
        let errors = program.validate().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e.kind, ProgramErrorKind::UnorderedOffset { previous: 4 })));
    }

    #[test]
    fn validate_rejects_operand_shape_mismatch() {
        let mut program = Program::new();
        program.push(Opcode::PushI32, Operand::None);
        program.push(Opcode::Ret, Operand::None);
        let errors = program.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0].kind,
            ProgramErrorKind::OperandShape {
                opcode: Opcode::PushI32,
                expected: OperandKind::I32,
                found: OperandKind::None,
            }
        ));
    }

    #[test]
    fn validate_rejects_dangling_branch_target() {
        let mut program = Program::new();
        program.push(Opcode::Jump, Operand::Target(99));
        program.push(Opcode::Ret, Operand::None);
        let errors = program.validate().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e.kind, ProgramErrorKind::BadBranchTarget { target: 99 })));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut program = Program::new();
        program.push_at(3, Opcode::PushI32, Operand::None);
        program.push_at(1, Opcode::Jump, Operand::Target(50));
        let errors = program.validate().unwrap_err();
        assert!(errors.len() >= 3, "expected several errors: {:?}", errors);
    }

    #[test]
    fn error_display_carries_offset_and_detail() {
        let error = ProgramError {
            offset: 5,
            kind: ProgramErrorKind::BadBranchTarget { target: 99 },
        };
        let text = error.to_string();
        assert!(text.contains("0x0005"));
        assert!(text.contains("99"));
    }

    #[test]
    fn serde_round_trip() {
        let mut program = Program::new();
        program.push(Opcode::PushI32, Operand::I32(-7));
        program.push(Opcode::LoadLocal, Operand::Slot(2));
        program.push(Opcode::LoadField, Operand::Field(FieldRef(0x0A)));
        program.push(Opcode::Jump, Operand::Target(0));
        program.push(Opcode::Ret, Operand::None);

        let json = serde_json::to_string(&program).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(back, program);
    }
}
