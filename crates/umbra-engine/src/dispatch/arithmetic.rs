//! Arithmetic, bitwise, and shift semantics
//!
//! Binary operators pop the right operand first. Operand variants must
//! agree: two sized integers of equal width, two native integers, or two
//! floats where the operator has a float form. A top-of-type [`Unknown`]
//! operand absorbs any numeric partner into an unknown result instead of
//! faulting.
//!
//! Shift amounts are exempt from the equal-width rule; the result takes
//! the shifted value's width. Division faults only on a definitely zero
//! divisor, a possibly zero one degrades the result to unknown.
//!
//! [`Unknown`]: crate::value::Value::Unknown

use super::families::FallThroughHandler;
use super::Fault;
use crate::bytecode::{Instruction, Opcode};
use crate::exec::{ExecutionContext, ProgramState};
use crate::trilean::Trilean;
use crate::value::{FloatValue, IntValue, Value};

/// `add` through `neg`: the arithmetic block.
#[derive(Debug, Clone, Copy, Default)]
pub struct Arithmetic;

impl FallThroughHandler for Arithmetic {
    fn supported_opcodes(&self) -> &'static [Opcode] {
        &[
            Opcode::Add,
            Opcode::Sub,
            Opcode::Mul,
            Opcode::Div,
            Opcode::Rem,
            Opcode::And,
            Opcode::Or,
            Opcode::Xor,
            Opcode::Shl,
            Opcode::Shr,
            Opcode::Sar,
            Opcode::Not,
            Opcode::Neg,
        ]
    }

    fn run(
        &self,
        ctx: &mut ExecutionContext<'_>,
        instruction: &Instruction,
    ) -> Result<(), Fault> {
        let state = &mut *ctx.state;
        match instruction.opcode {
            Opcode::Not | Opcode::Neg => unary(state, instruction.opcode),
            Opcode::Shl | Opcode::Shr | Opcode::Sar => shift(state, instruction.opcode),
            Opcode::Div | Opcode::Rem => division(state, instruction.opcode),
            _ => binary(state, instruction.opcode),
        }
    }
}

fn is_numeric(value: &Value) -> bool {
    matches!(
        value,
        Value::Int(_) | Value::NativeInt(_) | Value::Float(_) | Value::Unknown
    )
}

fn int_op(opcode: Opcode, a: IntValue, b: IntValue) -> Result<IntValue, Fault> {
    Ok(match opcode {
        Opcode::Add => a.add(b),
        Opcode::Sub => a.sub(b),
        Opcode::Mul => a.mul(b),
        Opcode::And => a.and(b),
        Opcode::Or => a.or(b),
        Opcode::Xor => a.xor(b),
        _ => return Err(Fault::InvalidProgram),
    })
}

fn float_op(opcode: Opcode, a: FloatValue, b: FloatValue) -> Result<FloatValue, Fault> {
    Ok(match opcode {
        Opcode::Add => a.add(b),
        Opcode::Sub => a.sub(b),
        Opcode::Mul => a.mul(b),
        _ => return Err(Fault::InvalidProgram),
    })
}

fn binary(state: &mut ProgramState, opcode: Opcode) -> Result<(), Fault> {
    let rhs = state.stack.pop()?;
    let lhs = state.stack.pop()?;
    let result = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) if a.width() == b.width() => {
            Value::Int(int_op(opcode, a, b)?)
        }
        (Value::NativeInt(a), Value::NativeInt(b)) if a.width() == b.width() => {
            Value::NativeInt(int_op(opcode, a, b)?)
        }
        (Value::Float(a), Value::Float(b)) => Value::Float(float_op(opcode, a, b)?),
        (Value::Unknown, ref other) | (ref other, Value::Unknown) if is_numeric(other) => {
            Value::Unknown
        }
        _ => return Err(Fault::InvalidProgram),
    };
    state.stack.push(result);
    Ok(())
}

fn division(state: &mut ProgramState, opcode: Opcode) -> Result<(), Fault> {
    let rhs = state.stack.pop()?;
    let lhs = state.stack.pop()?;
    let result = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) if a.width() == b.width() => {
            Value::Int(int_division(opcode, a, b)?)
        }
        (Value::NativeInt(a), Value::NativeInt(b)) if a.width() == b.width() => {
            Value::NativeInt(int_division(opcode, a, b)?)
        }
        (Value::Float(a), Value::Float(b)) => Value::Float(match opcode {
            Opcode::Div => a.div(b),
            _ => a.rem(b),
        }),
        (Value::Unknown, ref other) | (ref other, Value::Unknown) if is_numeric(other) => {
            Value::Unknown
        }
        _ => return Err(Fault::InvalidProgram),
    };
    state.stack.push(result);
    Ok(())
}

fn int_division(opcode: Opcode, a: IntValue, b: IntValue) -> Result<IntValue, Fault> {
    if b.is_nonzero() == Trilean::False {
        return Err(Fault::DivideByZero);
    }
    Ok(match opcode {
        Opcode::Div => a.div(b),
        _ => a.rem(b),
    })
}

fn shift(state: &mut ProgramState, opcode: Opcode) -> Result<(), Fault> {
    let amount = state.stack.pop()?;
    let value = state.stack.pop()?;
    let shifted = |v: IntValue, k: IntValue| match opcode {
        Opcode::Shl => v.shl(k),
        Opcode::Shr => v.shr(k),
        _ => v.sar(k),
    };
    let result = match (value, amount) {
        (Value::Int(v), Value::Int(k) | Value::NativeInt(k)) => Value::Int(shifted(v, k)),
        (Value::NativeInt(v), Value::Int(k) | Value::NativeInt(k)) => {
            Value::NativeInt(shifted(v, k))
        }
        (Value::Unknown, Value::Int(_) | Value::NativeInt(_) | Value::Unknown)
        | (Value::Int(_) | Value::NativeInt(_), Value::Unknown) => Value::Unknown,
        _ => return Err(Fault::InvalidProgram),
    };
    state.stack.push(result);
    Ok(())
}

fn unary(state: &mut ProgramState, opcode: Opcode) -> Result<(), Fault> {
    let operand = state.stack.pop()?;
    let result = match (opcode, operand) {
        (Opcode::Not, Value::Int(a)) => Value::Int(a.not()),
        (Opcode::Not, Value::NativeInt(a)) => Value::NativeInt(a.not()),
        (Opcode::Neg, Value::Int(a)) => Value::Int(a.neg()),
        (Opcode::Neg, Value::NativeInt(a)) => Value::NativeInt(a.neg()),
        (Opcode::Neg, Value::Float(a)) => Value::Float(a.neg()),
        (_, Value::Unknown) => Value::Unknown,
        _ => return Err(Fault::InvalidProgram),
    };
    state.stack.push(result);
    Ok(())
}
