//! Comparison semantics
//!
//! [`Predicate`] names the ten relational tests shared by the `cmp.*`
//! instructions and the two-operand branch block. Evaluation is total and
//! three-valued: integer predicates come from bitwise equality and
//! interval separation, float predicates are always decided with the
//! `.un` forms satisfied by unordered operands, and reference predicates
//! decide only identity. Operand shapes the predicate cannot relate
//! evaluate to unknown rather than faulting.

use super::families::FallThroughHandler;
use super::Fault;
use crate::bytecode::{Instruction, Opcode};
use crate::exec::ExecutionContext;
use crate::trilean::Trilean;
use crate::types::Width;
use crate::value::{FloatValue, IntValue, ObjectRef, Value};

/// A relational test between two stack values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Eq,
    Ne,
    Gt,
    GtUn,
    Ge,
    GeUn,
    Lt,
    LtUn,
    Le,
    LeUn,
}

impl Predicate {
    /// The predicate a `cmp.*` instruction materializes.
    pub fn for_compare(opcode: Opcode) -> Option<Predicate> {
        Some(match opcode {
            Opcode::CmpEq => Predicate::Eq,
            Opcode::CmpGt => Predicate::Gt,
            Opcode::CmpGtUn => Predicate::GtUn,
            Opcode::CmpLt => Predicate::Lt,
            Opcode::CmpLtUn => Predicate::LtUn,
            _ => return None,
        })
    }

    /// The predicate a two-operand branch tests.
    pub fn for_branch(opcode: Opcode) -> Option<Predicate> {
        Some(match opcode {
            Opcode::JumpEq => Predicate::Eq,
            Opcode::JumpNe => Predicate::Ne,
            Opcode::JumpGt => Predicate::Gt,
            Opcode::JumpGtUn => Predicate::GtUn,
            Opcode::JumpGe => Predicate::Ge,
            Opcode::JumpGeUn => Predicate::GeUn,
            Opcode::JumpLt => Predicate::Lt,
            Opcode::JumpLtUn => Predicate::LtUn,
            Opcode::JumpLe => Predicate::Le,
            Opcode::JumpLeUn => Predicate::LeUn,
            _ => return None,
        })
    }
}

fn int_predicate(predicate: Predicate, a: IntValue, b: IntValue) -> Trilean {
    match predicate {
        Predicate::Eq => a.is_eq(b),
        Predicate::Ne => !a.is_eq(b),
        Predicate::Lt => a.is_lt_signed(b),
        Predicate::LtUn => a.is_lt_unsigned(b),
        Predicate::Gt => b.is_lt_signed(a),
        Predicate::GtUn => b.is_lt_unsigned(a),
        Predicate::Ge => !a.is_lt_signed(b),
        Predicate::GeUn => !a.is_lt_unsigned(b),
        Predicate::Le => !b.is_lt_signed(a),
        Predicate::LeUn => !b.is_lt_unsigned(a),
    }
}

fn float_predicate(predicate: Predicate, a: FloatValue, b: FloatValue) -> Trilean {
    use std::cmp::Ordering::{Equal, Greater, Less};
    let ordering = a.compare(b);
    let decided = match predicate {
        Predicate::Eq => ordering == Some(Equal),
        Predicate::Ne => ordering != Some(Equal),
        Predicate::Gt => ordering == Some(Greater),
        Predicate::GtUn => !matches!(ordering, Some(Less | Equal)),
        Predicate::Ge => matches!(ordering, Some(Greater | Equal)),
        Predicate::GeUn => !matches!(ordering, Some(Less)),
        Predicate::Lt => ordering == Some(Less),
        Predicate::LtUn => !matches!(ordering, Some(Greater | Equal)),
        Predicate::Le => matches!(ordering, Some(Less | Equal)),
        Predicate::LeUn => !matches!(ordering, Some(Greater)),
    };
    Trilean::from(decided)
}

fn reference_predicate(predicate: Predicate, a: &ObjectRef, b: &ObjectRef) -> Trilean {
    match predicate {
        Predicate::Eq => a.is_eq(b),
        // `gt.un` against null is the standard non-null test.
        Predicate::Ne | Predicate::GtUn => !a.is_eq(b),
        _ => Trilean::Unknown,
    }
}

/// Evaluate `predicate` over two stack values.
pub(crate) fn evaluate(predicate: Predicate, lhs: &Value, rhs: &Value) -> Trilean {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) | (Value::NativeInt(a), Value::NativeInt(b))
            if a.width() == b.width() =>
        {
            int_predicate(predicate, *a, *b)
        }
        (Value::Float(a), Value::Float(b)) => float_predicate(predicate, *a, *b),
        (Value::ObjectRef(a), Value::ObjectRef(b)) => reference_predicate(predicate, a, b),
        _ => Trilean::Unknown,
    }
}

/// `cmp.eq`, `cmp.gt`, `cmp.gt.un`, `cmp.lt`, and `cmp.lt.un`.
///
/// Materializes the predicate as a 32-bit integer: 1, 0, or a value whose
/// low bit is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparisons;

impl FallThroughHandler for Comparisons {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[
            Opcode::CmpEq,
            Opcode::CmpGt,
            Opcode::CmpGtUn,
            Opcode::CmpLt,
            Opcode::CmpLtUn,
        ]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        let predicate =
            Predicate::for_compare(instruction.opcode).ok_or(Fault::InvalidProgram)?;
        let state = &mut *ctx.state;
        let rhs = state.stack.pop()?;
        let lhs = state.stack.pop()?;
        let result = match evaluate(predicate, &lhs, &rhs) {
            Trilean::True => IntValue::known(1, Width::W32),
            Trilean::False => IntValue::known(0, Width::W32),
            Trilean::Unknown => IntValue::partial(0, 1, Width::W32),
        };
        state.stack.push(Value::Int(result));
        Ok(())
    }
}
