//! Static type descriptors
//!
//! The engine never parses metadata itself; it consumes type descriptors the
//! host resolved from its binary container. `TypeDesc` covers every category
//! the unknown-value synthesizer and the marshaller have to distinguish.

use serde::{Deserialize, Serialize};

/// Pointer width of the target environment.
///
/// Decides the width of native-sized integers and of object references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bitness {
    Bits32,
    Bits64,
}

impl Bitness {
    /// The integer width of a pointer-sized value on this target.
    pub fn width(self) -> Width {
        match self {
            Bitness::Bits32 => Width::W32,
            Bitness::Bits64 => Width::W64,
        }
    }

    pub fn is_32(self) -> bool {
        matches!(self, Bitness::Bits32)
    }
}

/// Fixed integer width, sign-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Number of bits in this width.
    pub const fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// Bit mask selecting exactly the bits of this width.
    pub const fn mask(self) -> u64 {
        match self {
            Width::W8 => 0xFF,
            Width::W16 => 0xFFFF,
            Width::W32 => 0xFFFF_FFFF,
            Width::W64 => u64::MAX,
        }
    }

    /// Mask selecting only the sign bit of this width.
    pub const fn sign_bit(self) -> u64 {
        1u64 << (self.bits() - 1)
    }
}

/// Static type descriptor for a stack slot, variable, or field.
///
/// Categories mirror a managed type system: primitives, references, value
/// types, generic placeholders, and representation-neutral annotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDesc {
    /// No value; appears in signatures only.
    Void,
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Pointer-sized signed integer.
    NativeInt,
    /// Pointer-sized unsigned integer.
    NativeUInt,
    /// Raw pointer to an inner type.
    Ptr(Box<TypeDesc>),
    /// Function pointer.
    FnPtr,
    /// The root object type.
    Object,
    /// Immutable string reference.
    Str,
    /// Multi-dimensional array of an element type.
    Array(Box<TypeDesc>),
    /// Single-dimensional, zero-based array of an element type.
    Vector(Box<TypeDesc>),
    /// A named reference type (class).
    Class(String),
    /// A named value type (struct).
    Struct(String),
    /// Instantiated generic type.
    GenericInst {
        name: String,
        args: Vec<TypeDesc>,
    },
    /// Generic placeholder declared on the enclosing type.
    TypeParam(u16),
    /// Generic placeholder declared on the enclosing method.
    MethodParam(u16),
    /// Managed pointer to an inner type.
    ByRef(Box<TypeDesc>),
    /// Opaque typed-reference value.
    TypedRef,
    /// Custom-modifier annotation; does not change the runtime representation.
    Modified(Box<TypeDesc>),
    /// Pinned annotation; does not change the runtime representation.
    Pinned(Box<TypeDesc>),
}

impl TypeDesc {
    /// Strips any chain of representation-neutral annotations.
    ///
    /// Iterative so arbitrarily deep nesting never grows the call stack.
    pub fn unannotated(&self) -> &TypeDesc {
        let mut ty = self;
        while let TypeDesc::Modified(inner) | TypeDesc::Pinned(inner) = ty {
            ty = inner;
        }
        ty
    }

    /// Storage width for integer-representable categories.
    ///
    /// `None` for floats, references, and structured types.
    pub fn storage_width(&self, bitness: Bitness) -> Option<Width> {
        match self.unannotated() {
            TypeDesc::Bool | TypeDesc::I8 | TypeDesc::U8 => Some(Width::W8),
            TypeDesc::I16 | TypeDesc::U16 | TypeDesc::Char => Some(Width::W16),
            TypeDesc::I32 | TypeDesc::U32 => Some(Width::W32),
            TypeDesc::I64 | TypeDesc::U64 => Some(Width::W64),
            TypeDesc::NativeInt | TypeDesc::NativeUInt | TypeDesc::Ptr(_) | TypeDesc::FnPtr => {
                Some(bitness.width())
            }
            _ => None,
        }
    }

    /// Whether widening this type replicates the sign bit.
    pub fn is_signed(&self) -> bool {
        matches!(
            self.unannotated(),
            TypeDesc::I8 | TypeDesc::I16 | TypeDesc::I32 | TypeDesc::I64 | TypeDesc::NativeInt
        )
    }

    /// Get a human-readable name for this type
    pub fn display_name(&self) -> String {
        match self {
            TypeDesc::Void => "void".to_string(),
            TypeDesc::Bool => "bool".to_string(),
            TypeDesc::Char => "char".to_string(),
            TypeDesc::I8 => "i8".to_string(),
            TypeDesc::U8 => "u8".to_string(),
            TypeDesc::I16 => "i16".to_string(),
            TypeDesc::U16 => "u16".to_string(),
            TypeDesc::I32 => "i32".to_string(),
            TypeDesc::U32 => "u32".to_string(),
            TypeDesc::I64 => "i64".to_string(),
            TypeDesc::U64 => "u64".to_string(),
            TypeDesc::F32 => "f32".to_string(),
            TypeDesc::F64 => "f64".to_string(),
            TypeDesc::NativeInt => "native int".to_string(),
            TypeDesc::NativeUInt => "native uint".to_string(),
            TypeDesc::Ptr(inner) => format!("{}*", inner.display_name()),
            TypeDesc::FnPtr => "fnptr".to_string(),
            TypeDesc::Object => "object".to_string(),
            TypeDesc::Str => "string".to_string(),
            TypeDesc::Array(inner) => format!("{}[,]", inner.display_name()),
            TypeDesc::Vector(inner) => format!("{}[]", inner.display_name()),
            TypeDesc::Class(name) => name.clone(),
            TypeDesc::Struct(name) => name.clone(),
            TypeDesc::GenericInst { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.display_name()).collect();
                format!("{}<{}>", name, args.join(", "))
            }
            TypeDesc::TypeParam(index) => format!("!{}", index),
            TypeDesc::MethodParam(index) => format!("!!{}", index),
            TypeDesc::ByRef(inner) => format!("{}&", inner.display_name()),
            TypeDesc::TypedRef => "typedref".to_string(),
            TypeDesc::Modified(inner) => inner.display_name(),
            TypeDesc::Pinned(inner) => inner.display_name(),
        }
    }
}

/// A field reference as it appears on an instruction operand.
///
/// Opaque to the engine; the host's field resolver maps it to a [`FieldDesc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef(pub u32);

/// Stable identity of a field slot inside an object's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId(pub u32);

/// Fully resolved field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDesc {
    /// Slot identity used to index field tables.
    pub id: FieldId,
    /// Field name, for diagnostics.
    pub name: String,
    /// Static type of the field.
    pub field_type: TypeDesc,
    /// The type the field is declared on.
    pub declaring_type: TypeDesc,
}
