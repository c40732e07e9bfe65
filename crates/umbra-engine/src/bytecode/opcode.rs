//! Bytecode instruction set
//!
//! Stack-based instruction set with 45 opcodes organized by category.
//! Explicit byte values keep serialized programs stable; operands are
//! decoded structures rather than inline bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bytecode opcode (45 instructions)
///
/// Byte values are grouped by category and leave gaps for growth.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // ===== Constants (0x01-0x0F) =====
    /// Push a known 32-bit integer [i32]
    PushI32 = 0x01,
    /// Push a known 64-bit integer [i64]
    PushI64 = 0x02,
    /// Push a known float [f64]
    PushF64 = 0x03,
    /// Push the null reference
    PushNull = 0x04,

    // ===== Stack manipulation (0x10-0x1F) =====
    /// Do nothing
    Nop = 0x10,
    /// Duplicate the top of stack
    Dup = 0x11,
    /// Pop and discard the top of stack
    Drop = 0x12,

    // ===== Variables (0x20-0x2F) =====
    /// Push the value of a local slot [u16 slot]
    LoadLocal = 0x20,
    /// Pop into a local slot [u16 slot]
    StoreLocal = 0x21,
    /// Push the value of an argument slot [u16 slot]
    LoadArg = 0x22,
    /// Pop into an argument slot [u16 slot]
    StoreArg = 0x23,

    // ===== Arithmetic and bitwise (0x30-0x3F) =====
    /// Pop b, pop a, push a + b
    Add = 0x30,
    /// Pop b, pop a, push a - b
    Sub = 0x31,
    /// Pop b, pop a, push a * b
    Mul = 0x32,
    /// Pop b, pop a, push a / b (signed)
    Div = 0x33,
    /// Pop b, pop a, push a % b (signed)
    Rem = 0x34,
    /// Pop b, pop a, push a & b
    And = 0x35,
    /// Pop b, pop a, push a | b
    Or = 0x36,
    /// Pop b, pop a, push a ^ b
    Xor = 0x37,
    /// Pop amount, pop a, push a << amount
    Shl = 0x38,
    /// Pop amount, pop a, push a >> amount (logical)
    Shr = 0x39,
    /// Pop amount, pop a, push a >> amount (arithmetic)
    Sar = 0x3A,
    /// Pop a, push !a (bitwise complement)
    Not = 0x3B,
    /// Pop a, push -a
    Neg = 0x3C,

    // ===== Comparisons (0x40-0x4F) =====
    /// Pop b, pop a, push a == b as a 32-bit int
    CmpEq = 0x40,
    /// Pop b, pop a, push a > b (signed)
    CmpGt = 0x41,
    /// Pop b, pop a, push a > b (unsigned or unordered)
    CmpGtUn = 0x42,
    /// Pop b, pop a, push a < b (signed)
    CmpLt = 0x43,
    /// Pop b, pop a, push a < b (unsigned or unordered)
    CmpLtUn = 0x44,

    // ===== Object model (0x50-0x5F) =====
    /// Pop an instance, push the value of one of its fields [field]
    LoadField = 0x50,
    /// Pop a value, pop an instance, store into one of its fields [field]
    StoreField = 0x51,

    // ===== Control flow (0x60-0x7F) =====
    /// Unconditional jump [target]
    Jump = 0x60,
    /// Pop a condition, jump when it tests true [target]
    JumpIfTrue = 0x61,
    /// Pop a condition, jump when it tests false [target]
    JumpIfFalse = 0x62,
    /// Pop b, pop a, jump when a == b [target]
    JumpEq = 0x63,
    /// Pop b, pop a, jump when a != b [target]
    JumpNe = 0x64,
    /// Pop b, pop a, jump when a > b (signed) [target]
    JumpGt = 0x65,
    /// Pop b, pop a, jump when a > b (unsigned or unordered) [target]
    JumpGtUn = 0x66,
    /// Pop b, pop a, jump when a >= b (signed) [target]
    JumpGe = 0x67,
    /// Pop b, pop a, jump when a >= b (unsigned or unordered) [target]
    JumpGeUn = 0x68,
    /// Pop b, pop a, jump when a < b (signed) [target]
    JumpLt = 0x69,
    /// Pop b, pop a, jump when a < b (unsigned or unordered) [target]
    JumpLtUn = 0x6A,
    /// Pop b, pop a, jump when a <= b (signed) [target]
    JumpLe = 0x6B,
    /// Pop b, pop a, jump when a <= b (unsigned or unordered) [target]
    JumpLeUn = 0x6C,
    /// Flag the current path as finished
    Ret = 0x7F,
}

/// The operand shape an opcode expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandKind {
    None,
    I32,
    I64,
    F64,
    Slot,
    Field,
    Target,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OperandKind::None => "no operand",
            OperandKind::I32 => "an i32 operand",
            OperandKind::I64 => "an i64 operand",
            OperandKind::F64 => "an f64 operand",
            OperandKind::Slot => "a slot operand",
            OperandKind::Field => "a field operand",
            OperandKind::Target => "a branch target",
        };
        write!(f, "{}", text)
    }
}

impl Opcode {
    /// The operand shape this opcode expects.
    pub fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::PushI32 => OperandKind::I32,
            Opcode::PushI64 => OperandKind::I64,
            Opcode::PushF64 => OperandKind::F64,
            Opcode::PushNull | Opcode::Nop | Opcode::Dup | Opcode::Drop => OperandKind::None,
            Opcode::LoadLocal | Opcode::StoreLocal | Opcode::LoadArg | Opcode::StoreArg => {
                OperandKind::Slot
            }
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Rem
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Shl
            | Opcode::Shr
            | Opcode::Sar
            | Opcode::Not
            | Opcode::Neg
            | Opcode::CmpEq
            | Opcode::CmpGt
            | Opcode::CmpGtUn
            | Opcode::CmpLt
            | Opcode::CmpLtUn
            | Opcode::Ret => OperandKind::None,
            Opcode::LoadField | Opcode::StoreField => OperandKind::Field,
            Opcode::Jump
            | Opcode::JumpIfTrue
            | Opcode::JumpIfFalse
            | Opcode::JumpEq
            | Opcode::JumpNe
            | Opcode::JumpGt
            | Opcode::JumpGtUn
            | Opcode::JumpGe
            | Opcode::JumpGeUn
            | Opcode::JumpLt
            | Opcode::JumpLtUn
            | Opcode::JumpLe
            | Opcode::JumpLeUn => OperandKind::Target,
        }
    }

    /// Assembly mnemonic, as the disassembler prints it.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::PushI32 => "push.i32",
            Opcode::PushI64 => "push.i64",
            Opcode::PushF64 => "push.f64",
            Opcode::PushNull => "push.null",
            Opcode::Nop => "nop",
            Opcode::Dup => "dup",
            Opcode::Drop => "drop",
            Opcode::LoadLocal => "load.local",
            Opcode::StoreLocal => "store.local",
            Opcode::LoadArg => "load.arg",
            Opcode::StoreArg => "store.arg",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Rem => "rem",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
            Opcode::Sar => "sar",
            Opcode::Not => "not",
            Opcode::Neg => "neg",
            Opcode::CmpEq => "cmp.eq",
            Opcode::CmpGt => "cmp.gt",
            Opcode::CmpGtUn => "cmp.gt.un",
            Opcode::CmpLt => "cmp.lt",
            Opcode::CmpLtUn => "cmp.lt.un",
            Opcode::LoadField => "load.field",
            Opcode::StoreField => "store.field",
            Opcode::Jump => "jump",
            Opcode::JumpIfTrue => "jump.true",
            Opcode::JumpIfFalse => "jump.false",
            Opcode::JumpEq => "jump.eq",
            Opcode::JumpNe => "jump.ne",
            Opcode::JumpGt => "jump.gt",
            Opcode::JumpGtUn => "jump.gt.un",
            Opcode::JumpGe => "jump.ge",
            Opcode::JumpGeUn => "jump.ge.un",
            Opcode::JumpLt => "jump.lt",
            Opcode::JumpLtUn => "jump.lt.un",
            Opcode::JumpLe => "jump.le",
            Opcode::JumpLeUn => "jump.le.un",
            Opcode::Ret => "ret",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(Opcode::PushI32),
            0x02 => Ok(Opcode::PushI64),
            0x03 => Ok(Opcode::PushF64),
            0x04 => Ok(Opcode::PushNull),
            0x10 => Ok(Opcode::Nop),
            0x11 => Ok(Opcode::Dup),
            0x12 => Ok(Opcode::Drop),
            0x20 => Ok(Opcode::LoadLocal),
            0x21 => Ok(Opcode::StoreLocal),
            0x22 => Ok(Opcode::LoadArg),
            0x23 => Ok(Opcode::StoreArg),
            0x30 => Ok(Opcode::Add),
            0x31 => Ok(Opcode::Sub),
            0x32 => Ok(Opcode::Mul),
            0x33 => Ok(Opcode::Div),
            0x34 => Ok(Opcode::Rem),
            0x35 => Ok(Opcode::And),
            0x36 => Ok(Opcode::Or),
            0x37 => Ok(Opcode::Xor),
            0x38 => Ok(Opcode::Shl),
            0x39 => Ok(Opcode::Shr),
            0x3A => Ok(Opcode::Sar),
            0x3B => Ok(Opcode::Not),
            0x3C => Ok(Opcode::Neg),
            0x40 => Ok(Opcode::CmpEq),
            0x41 => Ok(Opcode::CmpGt),
            0x42 => Ok(Opcode::CmpGtUn),
            0x43 => Ok(Opcode::CmpLt),
            0x44 => Ok(Opcode::CmpLtUn),
            0x50 => Ok(Opcode::LoadField),
            0x51 => Ok(Opcode::StoreField),
            0x60 => Ok(Opcode::Jump),
            0x61 => Ok(Opcode::JumpIfTrue),
            0x62 => Ok(Opcode::JumpIfFalse),
            0x63 => Ok(Opcode::JumpEq),
            0x64 => Ok(Opcode::JumpNe),
            0x65 => Ok(Opcode::JumpGt),
            0x66 => Ok(Opcode::JumpGtUn),
            0x67 => Ok(Opcode::JumpGe),
            0x68 => Ok(Opcode::JumpGeUn),
            0x69 => Ok(Opcode::JumpLt),
            0x6A => Ok(Opcode::JumpLtUn),
            0x6B => Ok(Opcode::JumpLe),
            0x6C => Ok(Opcode::JumpLeUn),
            0x7F => Ok(Opcode::Ret),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trip_covers_every_opcode() {
        let decoded: Vec<Opcode> = (0u8..=255)
            .filter_map(|byte| Opcode::try_from(byte).ok())
            .collect();
        assert_eq!(decoded.len(), 45);
        for opcode in decoded {
            assert_eq!(Opcode::try_from(opcode as u8), Ok(opcode));
        }
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        assert_eq!(Opcode::try_from(0x00), Err(()));
        assert_eq!(Opcode::try_from(0x0F), Err(()));
        assert_eq!(Opcode::try_from(0xFF), Err(()));
    }

    #[test]
    fn operand_kinds() {
        assert_eq!(Opcode::PushI32.operand_kind(), OperandKind::I32);
        assert_eq!(Opcode::Add.operand_kind(), OperandKind::None);
        assert_eq!(Opcode::LoadLocal.operand_kind(), OperandKind::Slot);
        assert_eq!(Opcode::StoreField.operand_kind(), OperandKind::Field);
        assert_eq!(Opcode::JumpLeUn.operand_kind(), OperandKind::Target);
        assert_eq!(Opcode::Ret.operand_kind(), OperandKind::None);
    }

    #[test]
    fn mnemonics() {
        assert_eq!(Opcode::PushI32.to_string(), "push.i32");
        assert_eq!(Opcode::CmpGtUn.to_string(), "cmp.gt.un");
        assert_eq!(Opcode::JumpIfFalse.to_string(), "jump.false");
        assert_eq!(Opcode::Ret.to_string(), "ret");
    }
}
