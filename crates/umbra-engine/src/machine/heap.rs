//! Default allocator
//!
//! [`Heap`] is a layout-registry allocator: hosts register the field layout
//! of named types, and allocation produces unknown-initialized instances.
//! Class instances are handed out behind fresh [`ObjectHandle`]s; the heap
//! retains no ownership of them, so snapshotting an explored path is
//! entirely [`ProgramState::fork`]'s job.
//!
//! A named type without a registered layout allocates with an empty field
//! table. Fields declared by ancestor types are not part of a layout.
//!
//! [`ProgramState::fork`]: crate::exec::ProgramState::fork

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::services::Allocator;
use crate::types::{Bitness, FieldDesc, TypeDesc};
use crate::value::{CompoundObject, FloatValue, IntValue, ObjectHandle, ObjectRef, Value};

/// Layout-registry allocator handing out unknown-initialized instances.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    layouts: HashMap<String, Vec<FieldDesc>>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    /// Register the field layout of a named type.
    pub fn register_layout(&mut self, name: impl Into<String>, fields: Vec<FieldDesc>) {
        self.layouts.insert(name.into(), fields);
    }

    /// Builder-style layout registration.
    pub fn with_layout(mut self, name: impl Into<String>, fields: Vec<FieldDesc>) -> Self {
        self.register_layout(name, fields);
        self
    }

    fn layout_of(&self, ty: &TypeDesc) -> Option<&Vec<FieldDesc>> {
        let name = match ty {
            TypeDesc::Class(name) | TypeDesc::Struct(name) => name,
            TypeDesc::GenericInst { name, .. } => name,
            _ => return None,
        };
        self.layouts.get(name)
    }

    /// A fresh instance of `ty` with every laid-out field unknown.
    fn instance(&self, ty: &TypeDesc, bitness: Bitness) -> CompoundObject {
        let mut object = CompoundObject::new(ty.clone());
        if let Some(fields) = self.layout_of(ty) {
            for desc in fields {
                object.define_field(desc.id, self.raw_unknown(&desc.field_type, bitness));
            }
        }
        object
    }

    /// The unknown-initialized raw storage value for a field of `ty`.
    fn raw_unknown(&self, ty: &TypeDesc, bitness: Bitness) -> Value {
        let ty = ty.unannotated();
        if let Some(width) = ty.storage_width(bitness) {
            return Value::Int(IntValue::unknown(width));
        }
        match ty {
            TypeDesc::F32 | TypeDesc::F64 => Value::Float(FloatValue(0.0)),
            TypeDesc::Struct(_) | TypeDesc::TypedRef => {
                Value::Compound(self.instance(ty, bitness))
            }
            TypeDesc::Object
            | TypeDesc::Str
            | TypeDesc::Array(_)
            | TypeDesc::Vector(_)
            | TypeDesc::Class(_)
            | TypeDesc::GenericInst { .. }
            | TypeDesc::ByRef(_)
            | TypeDesc::TypeParam(_)
            | TypeDesc::MethodParam(_) => Value::ObjectRef(ObjectRef::unknown(bitness.is_32())),
            _ => Value::Unknown,
        }
    }

    /// Allocate an instance of `ty` in raw storage form.
    ///
    /// Value types come back by value; reference types behind a known
    /// reference to a fresh handle; a managed pointer allocates its
    /// pointee and references it.
    pub fn allocate(&self, ty: &TypeDesc, bitness: Bitness) -> Value {
        let is32 = bitness.is_32();
        let ty = ty.unannotated();
        if let Some(width) = ty.storage_width(bitness) {
            return Value::Int(IntValue::unknown(width));
        }
        match ty {
            TypeDesc::F32 | TypeDesc::F64 => Value::Float(FloatValue(0.0)),
            TypeDesc::Struct(_) | TypeDesc::TypedRef => {
                Value::Compound(self.instance(ty, bitness))
            }
            TypeDesc::Class(_)
            | TypeDesc::GenericInst { .. }
            | TypeDesc::Object
            | TypeDesc::Str
            | TypeDesc::Array(_)
            | TypeDesc::Vector(_) => {
                let handle: ObjectHandle =
                    Rc::new(RefCell::new(Value::Compound(self.instance(ty, bitness))));
                Value::ObjectRef(ObjectRef::to_object(handle, is32))
            }
            TypeDesc::ByRef(inner) => {
                let referent = self.allocate(inner, bitness);
                let handle: ObjectHandle = Rc::new(RefCell::new(referent));
                Value::ObjectRef(ObjectRef::to_object(handle, is32))
            }
            _ => Value::Unknown,
        }
    }
}

impl Allocator for Heap {
    fn allocate_object(&mut self, ty: &TypeDesc, bitness: Bitness) -> Value {
        self.allocate(ty, bitness)
    }
}
