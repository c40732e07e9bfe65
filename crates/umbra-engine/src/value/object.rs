//! Object references and structured referents

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::Value;
use crate::trilean::Trilean;
use crate::types::{FieldId, TypeDesc};

/// Shared handle to a heap-resident value.
pub type ObjectHandle = Rc<RefCell<Value>>;

/// A reference-typed stack value.
///
/// `is_known == false` models a reference whose nullness and identity are
/// undetermined; it may still carry a best-effort referent for field access.
/// A known reference with no referent is the null reference.
#[derive(Debug, Clone)]
pub struct ObjectRef {
    pub referent: Option<ObjectHandle>,
    pub is_known: bool,
    pub is32: bool,
}

impl ObjectRef {
    /// The known null reference.
    pub fn null(is32: bool) -> Self {
        ObjectRef {
            referent: None,
            is_known: true,
            is32,
        }
    }

    /// A known, non-null reference to `referent`.
    pub fn to_object(referent: ObjectHandle, is32: bool) -> Self {
        ObjectRef {
            referent: Some(referent),
            is_known: true,
            is32,
        }
    }

    /// A reference with unknown nullness and identity.
    pub fn unknown(is32: bool) -> Self {
        ObjectRef {
            referent: None,
            is_known: false,
            is32,
        }
    }

    /// True only for the known null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.is_known && self.referent.is_none()
    }

    /// Three-valued nullness.
    #[must_use]
    pub fn nullness(&self) -> Trilean {
        if self.is_known {
            Trilean::from(self.referent.is_none())
        } else {
            Trilean::Unknown
        }
    }

    /// Three-valued reference identity.
    ///
    /// Decided only when both sides are known: null equals null, and two
    /// referents are equal exactly when they are the same object.
    pub fn is_eq(&self, other: &ObjectRef) -> Trilean {
        if !self.is_known || !other.is_known {
            return Trilean::Unknown;
        }
        match (&self.referent, &other.referent) {
            (None, None) => Trilean::True,
            (Some(a), Some(b)) => Trilean::from(Rc::ptr_eq(a, b)),
            _ => Trilean::False,
        }
    }
}

/// Structural equality is reference identity, not referent contents.
impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.is_known == other.is_known
            && self.is32 == other.is32
            && match (&self.referent, &other.referent) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known {
            write!(f, "object?")
        } else if self.referent.is_none() {
            write!(f, "null")
        } else {
            write!(f, "object")
        }
    }
}

/// An instance with an explicit field table, keyed by field identity.
///
/// Class instances live behind an [`ObjectHandle`]; value-type instances
/// travel on the stack by value.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundObject {
    ty: TypeDesc,
    fields: HashMap<FieldId, Value>,
}

impl CompoundObject {
    pub fn new(ty: TypeDesc) -> Self {
        CompoundObject {
            ty,
            fields: HashMap::new(),
        }
    }

    #[must_use]
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    #[must_use]
    pub fn has_field(&self, id: FieldId) -> bool {
        self.fields.contains_key(&id)
    }

    /// Read a field slot. `None` when the slot was never laid out.
    #[must_use]
    pub fn read_field(&self, id: FieldId) -> Option<Value> {
        self.fields.get(&id).cloned()
    }

    /// Overwrite an existing field slot. `false` when the slot is absent.
    pub fn write_field(&mut self, id: FieldId, value: Value) -> bool {
        match self.fields.get_mut(&id) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Create or overwrite a field slot. Used when laying out an instance.
    pub fn define_field(&mut self, id: FieldId, value: Value) {
        self.fields.insert(id, value);
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// True when every field slot holds a fully known value.
    #[must_use]
    pub fn is_fully_known(&self) -> bool {
        self.fields.values().all(Value::is_fully_known)
    }

    pub(crate) fn fields(&self) -> impl Iterator<Item = (&FieldId, &Value)> {
        self.fields.iter()
    }
}

impl fmt::Display for CompoundObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{{} fields}}",
            self.ty.display_name(),
            self.fields.len()
        )
    }
}

/// Stand-in for an instance of a named class whose fields are unresolved.
///
/// Reads through a stand-in synthesize unknowns of the field's static type;
/// writes are absorbed. Fields declared by ancestor types are not modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct StandInObject {
    ty: TypeDesc,
    is32: bool,
}

impl StandInObject {
    pub fn new(ty: TypeDesc, is32: bool) -> Self {
        StandInObject { ty, is32 }
    }

    #[must_use]
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }
}

impl fmt::Display for StandInObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.ty.display_name())
    }
}
