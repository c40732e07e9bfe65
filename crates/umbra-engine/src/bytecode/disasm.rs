//! Program disassembler
//!
//! Renders a decoded program as a human-readable listing. Used for
//! debugging dumps and golden tests.

use std::fmt::Write;

use super::{Instruction, Operand, Program};
use crate::types::FieldRef;

/// Disassemble a program to a listing
///
/// # Format
/// ```text
/// === Instructions ===
/// 0000  push.i32 5
/// 0001  push.i32 3
/// 0002  jump.gt (-> 0005)
/// ```
pub fn disassemble(program: &Program) -> String {
    let mut output = String::new();
    writeln!(output, "=== Instructions ===").unwrap();
    for instruction in program.instructions() {
        writeln!(output, "{}", format_instruction(instruction)).unwrap();
    }
    output
}

fn format_instruction(instruction: &Instruction) -> String {
    let offset = instruction.offset;
    let opcode = instruction.opcode;
    match instruction.operand {
        Operand::None => format!("{:04}  {}", offset, opcode),
        Operand::I32(value) => format!("{:04}  {} {}", offset, opcode, value),
        Operand::I64(value) => format!("{:04}  {} {}", offset, opcode, value),
        Operand::F64(value) => format!("{:04}  {} {}", offset, opcode, value),
        Operand::Slot(slot) => format!("{:04}  {} {}", offset, opcode, slot),
        Operand::Field(FieldRef(token)) => {
            format!("{:04}  {} field:{:#x}", offset, opcode, token)
        }
        Operand::Target(target) => format!("{:04}  {} (-> {:04})", offset, opcode, target),
    }
}
