//! Shared test utilities
//!
//! Common builders for machines, field tables, and stack values so the
//! integration tests stay focused on the semantics they exercise.

use umbra_engine::machine::{Heap, Machine, SlotArchitecture, StackMarshaller, TableResolver};
use umbra_engine::types::{Bitness, FieldDesc, FieldId, FieldRef, TypeDesc, Width};
use umbra_engine::value::{IntValue, Value};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// A 64-bit machine wired with the default services and no field table.
pub fn machine() -> Machine {
    Machine::with_defaults(Bitness::Bits64)
}

/// A 64-bit machine that knows one named type.
///
/// The type gets the given layout in the allocator, and every field is
/// resolvable through its token.
///
/// # Example
/// ```ignore
/// let machine = machine_with_type("Point", vec![
///     (FieldRef(0x10), field(0, "x", TypeDesc::I32, "Point")),
/// ]);
/// ```
pub fn machine_with_type(name: &str, fields: Vec<(FieldRef, FieldDesc)>) -> Machine {
    let layout: Vec<FieldDesc> = fields.iter().map(|(_, desc)| desc.clone()).collect();
    let mut resolver = TableResolver::new();
    for (token, desc) in fields {
        resolver.insert(token, desc);
    }
    Machine::builder(Bitness::Bits64)
        .architecture(SlotArchitecture)
        .allocator(Heap::new().with_layout(name, layout))
        .marshaller(StackMarshaller::new())
        .field_resolver(resolver)
        .build()
        .expect("all services supplied")
}

/// A field descriptor declared by the named type.
pub fn field(id: u32, name: &str, field_type: TypeDesc, declaring: &str) -> FieldDesc {
    FieldDesc {
        id: FieldId(id),
        name: name.to_string(),
        field_type,
        declaring_type: TypeDesc::Class(declaring.to_string()),
    }
}

/// A fully known 32-bit stack value.
pub fn known32(value: i32) -> Value {
    Value::Int(IntValue::from_i32(value))
}

/// A partially known 32-bit stack value.
pub fn partial32(bits: u64, unknown: u64) -> Value {
    Value::Int(IntValue::partial(bits, unknown, Width::W32))
}

/// A fully unknown 32-bit stack value.
pub fn unknown32() -> Value {
    Value::Int(IntValue::unknown(Width::W32))
}
