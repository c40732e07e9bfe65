//! Default marshaller
//!
//! Converts between raw field storage and the widened stack form. Narrow
//! integers live in fields at their declared width but travel on the
//! evaluation stack as 32-bit values; native-sized categories travel as
//! [`Value::NativeInt`] at the machine word width.
//!
//! Unknown bits survive both directions: sign extension smears an unknown
//! sign bit across the widened portion, truncation drops the high bits of
//! both masks.

use super::services::Marshaller;
use crate::types::{Bitness, TypeDesc, Width};
use crate::value::{IntValue, Value};

/// Default storage-form to stack-form converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackMarshaller;

impl StackMarshaller {
    pub fn new() -> Self {
        StackMarshaller
    }

    fn adapt(i: IntValue, to: Width, signed: bool) -> IntValue {
        if i.width().bits() < to.bits() {
            if signed {
                i.sign_extend(to)
            } else {
                i.zero_extend(to)
            }
        } else if i.width().bits() > to.bits() {
            i.truncate(to)
        } else {
            i
        }
    }
}

impl Marshaller for StackMarshaller {
    fn to_stack(&self, ty: &TypeDesc, value: Value, bitness: Bitness) -> Value {
        match ty.unannotated() {
            TypeDesc::Bool | TypeDesc::Char | TypeDesc::U8 | TypeDesc::U16 => match value {
                Value::Int(i) => Value::Int(Self::adapt(i, Width::W32, false)),
                other => other,
            },
            TypeDesc::I8 | TypeDesc::I16 => match value {
                Value::Int(i) => Value::Int(Self::adapt(i, Width::W32, true)),
                other => other,
            },
            TypeDesc::NativeInt | TypeDesc::Ptr(_) | TypeDesc::FnPtr => match value {
                Value::Int(i) | Value::NativeInt(i) => {
                    Value::NativeInt(Self::adapt(i, bitness.width(), true))
                }
                other => other,
            },
            TypeDesc::NativeUInt => match value {
                Value::Int(i) | Value::NativeInt(i) => {
                    Value::NativeInt(Self::adapt(i, bitness.width(), false))
                }
                other => other,
            },
            _ => value,
        }
    }

    fn from_stack(&self, ty: &TypeDesc, value: Value, bitness: Bitness) -> Value {
        match ty.unannotated() {
            TypeDesc::Bool | TypeDesc::I8 | TypeDesc::U8 => match value {
                Value::Int(i) if i.width().bits() > Width::W8.bits() => {
                    Value::Int(i.truncate(Width::W8))
                }
                other => other,
            },
            TypeDesc::Char | TypeDesc::I16 | TypeDesc::U16 => match value {
                Value::Int(i) if i.width().bits() > Width::W16.bits() => {
                    Value::Int(i.truncate(Width::W16))
                }
                other => other,
            },
            TypeDesc::I32 | TypeDesc::U32 => match value {
                Value::Int(i) if i.width().bits() > Width::W32.bits() => {
                    Value::Int(i.truncate(Width::W32))
                }
                other => other,
            },
            TypeDesc::I64 => match value {
                Value::Int(i) => Value::Int(Self::adapt(i, Width::W64, true)),
                other => other,
            },
            TypeDesc::U64 => match value {
                Value::Int(i) => Value::Int(Self::adapt(i, Width::W64, false)),
                other => other,
            },
            TypeDesc::NativeInt | TypeDesc::Ptr(_) | TypeDesc::FnPtr => match value {
                Value::Int(i) | Value::NativeInt(i) => {
                    Value::Int(Self::adapt(i, bitness.width(), true))
                }
                other => other,
            },
            TypeDesc::NativeUInt => match value {
                Value::Int(i) | Value::NativeInt(i) => {
                    Value::Int(Self::adapt(i, bitness.width(), false))
                }
                other => other,
            },
            TypeDesc::F32 => match value {
                Value::Float(f) => Value::Float(f.to_f32()),
                other => other,
            },
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FloatValue;

    fn marshaller() -> StackMarshaller {
        StackMarshaller::new()
    }

    #[test]
    fn narrow_signed_fields_sign_extend_onto_the_stack() {
        let raw = Value::Int(IntValue::known(0xFE, Width::W8));
        let stacked = marshaller().to_stack(&TypeDesc::I8, raw, Bitness::Bits64);
        assert_eq!(stacked, Value::Int(IntValue::known(0xFFFF_FFFE, Width::W32)));
    }

    #[test]
    fn narrow_unsigned_fields_zero_extend_onto_the_stack() {
        let raw = Value::Int(IntValue::known(0xFE, Width::W8));
        let stacked = marshaller().to_stack(&TypeDesc::U8, raw, Bitness::Bits64);
        assert_eq!(stacked, Value::Int(IntValue::known(0xFE, Width::W32)));
    }

    #[test]
    fn unknown_sign_bit_smears_across_the_widened_portion() {
        let raw = Value::Int(IntValue::partial(0x00, 0x80, Width::W8));
        let stacked = marshaller().to_stack(&TypeDesc::I8, raw, Bitness::Bits64);
        assert_eq!(
            stacked,
            Value::Int(IntValue::partial(0x00, 0xFFFF_FF80, Width::W32))
        );
    }

    #[test]
    fn storing_truncates_back_to_field_width() {
        let stacked = Value::Int(IntValue::known(0x1234_5678, Width::W32));
        let raw = marshaller().from_stack(&TypeDesc::U8, stacked, Bitness::Bits64);
        assert_eq!(raw, Value::Int(IntValue::known(0x78, Width::W8)));
    }

    #[test]
    fn native_categories_travel_as_native_int_at_word_width() {
        let raw = Value::Int(IntValue::known(0x10, Width::W32));
        let stacked = marshaller().to_stack(&TypeDesc::NativeInt, raw, Bitness::Bits64);
        assert_eq!(
            stacked,
            Value::NativeInt(IntValue::known(0x10, Width::W64))
        );

        let back = marshaller().from_stack(&TypeDesc::NativeInt, stacked, Bitness::Bits64);
        assert_eq!(back, Value::Int(IntValue::known(0x10, Width::W64)));
    }

    #[test]
    fn native_width_follows_the_machine_bitness() {
        let raw = Value::NativeInt(IntValue::known(0xFFFF_FFFF_FFFF_FFFF, Width::W64));
        let stacked = marshaller().to_stack(&TypeDesc::NativeUInt, raw, Bitness::Bits32);
        assert_eq!(
            stacked,
            Value::NativeInt(IntValue::known(0xFFFF_FFFF, Width::W32))
        );
    }

    #[test]
    fn storing_an_f64_into_an_f32_field_rounds() {
        let stacked = Value::Float(FloatValue(1.000000001));
        let raw = marshaller().from_stack(&TypeDesc::F32, stacked, Bitness::Bits64);
        assert_eq!(raw, Value::Float(FloatValue(1.000000001f32 as f64)));
    }

    #[test]
    fn wide_fields_pass_through_unchanged() {
        let stacked = Value::Int(IntValue::partial(0x10, 0x0F, Width::W32));
        assert_eq!(
            marshaller().to_stack(&TypeDesc::I32, stacked.clone(), Bitness::Bits64),
            stacked
        );
        assert_eq!(
            marshaller().from_stack(&TypeDesc::I32, stacked.clone(), Bitness::Bits64),
            stacked
        );
    }

    #[test]
    fn storing_a_narrow_value_into_a_wide_field_widens_per_signedness() {
        let stacked = Value::Int(IntValue::known(0xFFFF_FFFF, Width::W32));
        assert_eq!(
            marshaller().from_stack(&TypeDesc::I64, stacked.clone(), Bitness::Bits64),
            Value::Int(IntValue::known(u64::MAX, Width::W64))
        );
        assert_eq!(
            marshaller().from_stack(&TypeDesc::U64, stacked, Bitness::Bits64),
            Value::Int(IntValue::known(0xFFFF_FFFF, Width::W64))
        );
    }

    #[test]
    fn non_integer_values_pass_through_integer_marshalling() {
        assert_eq!(
            marshaller().to_stack(&TypeDesc::I8, Value::Unknown, Bitness::Bits64),
            Value::Unknown
        );
        assert_eq!(
            marshaller().from_stack(&TypeDesc::I8, Value::Unknown, Bitness::Bits64),
            Value::Unknown
        );
    }

    #[test]
    fn annotations_unwrap_before_marshalling() {
        let ty = TypeDesc::Modified(Box::new(TypeDesc::I8));
        let raw = Value::Int(IntValue::known(0x80, Width::W8));
        assert_eq!(
            marshaller().to_stack(&ty, raw, Bitness::Bits64),
            Value::Int(IntValue::known(0xFFFF_FF80, Width::W32))
        );
    }
}
