//! The value model
//!
//! One tagged union covers every shape a stack slot can hold: fixed-width
//! integers with bit-level known/unknown tracking, concrete floats, object
//! references with three-valued nullness, structured instances, class
//! stand-ins, and the fully opaque unknown.

mod float;
mod integer;
mod object;

pub use float::FloatValue;
pub use integer::IntValue;
pub use object::{CompoundObject, ObjectHandle, ObjectRef, StandInObject};

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::trilean::Trilean;

/// A value in the abstract domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Fixed-width integer with known/unknown bit tracking.
    Int(IntValue),
    /// Pointer-sized integer; inner width fixed by the target bitness.
    NativeInt(IntValue),
    /// Concrete floating-point value.
    Float(FloatValue),
    /// Object reference: null, a referent, or unknown.
    ObjectRef(ObjectRef),
    /// Value-type instance held by value.
    Compound(CompoundObject),
    /// Class stand-in with unresolved fields.
    StandIn(StandInObject),
    /// Fully opaque value with no type information.
    Unknown,
}

impl Value {
    /// Whether nothing about this value is left undetermined.
    ///
    /// For references this is knowledge of the reference itself (nullness
    /// and identity), not of the referent's contents.
    #[must_use]
    pub fn is_fully_known(&self) -> bool {
        match self {
            Value::Int(i) | Value::NativeInt(i) => i.is_fully_known(),
            Value::Float(_) => true,
            Value::ObjectRef(r) => r.is_known,
            Value::Compound(obj) => obj.is_fully_known(),
            Value::StandIn(_) => false,
            Value::Unknown => false,
        }
    }

    /// Three-valued truthiness, as a unary branch condition sees it.
    ///
    /// Integers test nonzero, floats test nonzero exactly, references test
    /// non-null. Structured values have no defined truthiness.
    #[must_use]
    pub fn truthiness(&self) -> Trilean {
        match self {
            Value::Int(i) | Value::NativeInt(i) => i.is_nonzero(),
            Value::Float(fl) => Trilean::from(fl.is_nonzero()),
            Value::ObjectRef(r) => !r.nullness(),
            Value::Compound(_) | Value::StandIn(_) | Value::Unknown => Trilean::Unknown,
        }
    }

    /// Deep-copy this value so the copy shares no object with the original.
    ///
    /// Aliasing inside the copied graph is preserved: a handle reached twice
    /// maps to one copied object. Cycles close through a placeholder that is
    /// inserted into the memo before its referent is copied.
    pub(crate) fn deep_clone(
        &self,
        memo: &mut HashMap<*const RefCell<Value>, ObjectHandle>,
    ) -> Value {
        match self {
            Value::ObjectRef(r) => {
                let referent = r.referent.as_ref().map(|handle| clone_handle(handle, memo));
                Value::ObjectRef(ObjectRef {
                    referent,
                    is_known: r.is_known,
                    is32: r.is32,
                })
            }
            Value::Compound(obj) => {
                let mut copy = CompoundObject::new(obj.ty().clone());
                for (id, value) in obj.fields() {
                    copy.define_field(*id, value.deep_clone(memo));
                }
                Value::Compound(copy)
            }
            other => other.clone(),
        }
    }
}

fn clone_handle(
    handle: &ObjectHandle,
    memo: &mut HashMap<*const RefCell<Value>, ObjectHandle>,
) -> ObjectHandle {
    let key = Rc::as_ptr(handle);
    if let Some(copy) = memo.get(&key) {
        return Rc::clone(copy);
    }
    let copy: ObjectHandle = Rc::new(RefCell::new(Value::Unknown));
    memo.insert(key, Rc::clone(&copy));
    let inner = handle.borrow().deep_clone(memo);
    *copy.borrow_mut() = inner;
    copy
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::NativeInt(i) => write!(f, "native {}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::ObjectRef(r) => write!(f, "{}", r),
            Value::Compound(obj) => write!(f, "{}", obj),
            Value::StandIn(s) => write!(f, "{}", s),
            Value::Unknown => write!(f, "?"),
        }
    }
}
