//! Machine configuration and the unknown-value synthesizer
//!
//! A [`Machine`] bundles the pointer width with the four host services the
//! handlers consult: the [`Architecture`] mapping instructions to the
//! variables they touch, the [`Allocator`] producing fresh instances, the
//! [`Marshaller`] converting between storage and stack form, and the
//! [`FieldResolver`] turning field tokens into descriptors.
//!
//! Services are trait objects supplied through [`MachineBuilder`];
//! [`Machine::with_defaults`] wires up the in-crate implementations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

mod heap;
mod marshal;
mod services;

pub use heap::Heap;
pub use marshal::StackMarshaller;
pub use services::{
    Allocator, Architecture, FieldResolver, Marshaller, SlotArchitecture, TableResolver,
};

use crate::types::{Bitness, TypeDesc, Width};
use crate::value::{FloatValue, IntValue, ObjectRef, StandInObject, Value};

/// The executing machine: pointer width plus the host services.
pub struct Machine {
    bitness: Bitness,
    architecture: Box<dyn Architecture>,
    allocator: Box<dyn Allocator>,
    marshaller: Box<dyn Marshaller>,
    fields: Box<dyn FieldResolver>,
}

impl Machine {
    /// Start assembling a machine service by service.
    pub fn builder(bitness: Bitness) -> MachineBuilder {
        MachineBuilder {
            bitness,
            architecture: None,
            allocator: None,
            marshaller: None,
            fields: None,
        }
    }

    /// A machine wired up with the in-crate default services.
    pub fn with_defaults(bitness: Bitness) -> Machine {
        Machine {
            bitness,
            architecture: Box::new(SlotArchitecture),
            allocator: Box::new(Heap::new()),
            marshaller: Box::new(StackMarshaller::new()),
            fields: Box::new(TableResolver::new()),
        }
    }

    pub fn bitness(&self) -> Bitness {
        self.bitness
    }

    pub fn architecture(&self) -> &dyn Architecture {
        self.architecture.as_ref()
    }

    pub fn marshaller(&self) -> &dyn Marshaller {
        self.marshaller.as_ref()
    }

    pub fn fields(&self) -> &dyn FieldResolver {
        self.fields.as_ref()
    }

    /// Synthesize the stack-form unknown value of `ty`.
    ///
    /// Total over the type system: every category maps to a value carrying
    /// exactly the uncertainty the type admits. Narrow integers are unknown
    /// only in the bits their storage width covers, floats collapse to a
    /// concrete zero, sealed-layout classes reference a stand-in, and
    /// by-value categories allocate an unknown-initialized instance and
    /// marshal it into stack form.
    pub fn create_unknown(&mut self, ty: &TypeDesc) -> Value {
        let bitness = self.bitness;
        let is32 = bitness.is_32();
        match ty.unannotated() {
            TypeDesc::Bool => Value::Int(IntValue::partial(0, 0x1, Width::W32)),
            TypeDesc::I8 | TypeDesc::U8 => Value::Int(IntValue::partial(0, 0xFF, Width::W32)),
            TypeDesc::I16 | TypeDesc::U16 | TypeDesc::Char => {
                Value::Int(IntValue::partial(0, 0xFFFF, Width::W32))
            }
            TypeDesc::I32 | TypeDesc::U32 => Value::Int(IntValue::unknown(Width::W32)),
            TypeDesc::I64 | TypeDesc::U64 => Value::Int(IntValue::unknown(Width::W64)),
            TypeDesc::F32 | TypeDesc::F64 => Value::Float(FloatValue(0.0)),
            TypeDesc::NativeInt | TypeDesc::NativeUInt | TypeDesc::Ptr(_) | TypeDesc::FnPtr => {
                Value::NativeInt(IntValue::unknown(bitness.width()))
            }
            ty @ TypeDesc::Class(_) => {
                let handle = Rc::new(RefCell::new(Value::StandIn(StandInObject::new(
                    ty.clone(),
                    is32,
                ))));
                Value::ObjectRef(ObjectRef::to_object(handle, is32))
            }
            ty @ (TypeDesc::ByRef(_) | TypeDesc::Struct(_) | TypeDesc::TypedRef) => {
                let raw = self.allocator.allocate_object(ty, bitness);
                self.marshaller.to_stack(ty, raw, bitness)
            }
            _ => Value::ObjectRef(ObjectRef::unknown(is32)),
        }
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("bitness", &self.bitness)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Machine`] from individually supplied services.
pub struct MachineBuilder {
    bitness: Bitness,
    architecture: Option<Box<dyn Architecture>>,
    allocator: Option<Box<dyn Allocator>>,
    marshaller: Option<Box<dyn Marshaller>>,
    fields: Option<Box<dyn FieldResolver>>,
}

impl MachineBuilder {
    pub fn architecture(mut self, architecture: impl Architecture + 'static) -> Self {
        self.architecture = Some(Box::new(architecture));
        self
    }

    pub fn allocator(mut self, allocator: impl Allocator + 'static) -> Self {
        self.allocator = Some(Box::new(allocator));
        self
    }

    pub fn marshaller(mut self, marshaller: impl Marshaller + 'static) -> Self {
        self.marshaller = Some(Box::new(marshaller));
        self
    }

    pub fn field_resolver(mut self, fields: impl FieldResolver + 'static) -> Self {
        self.fields = Some(Box::new(fields));
        self
    }

    /// Fails if any of the four services was never supplied.
    pub fn build(self) -> Result<Machine, BuildError> {
        Ok(Machine {
            bitness: self.bitness,
            architecture: self
                .architecture
                .ok_or(BuildError::MissingService("architecture"))?,
            allocator: self
                .allocator
                .ok_or(BuildError::MissingService("allocator"))?,
            marshaller: self
                .marshaller
                .ok_or(BuildError::MissingService("marshaller"))?,
            fields: self
                .fields
                .ok_or(BuildError::MissingService("field resolver"))?,
        })
    }
}

/// Raised when [`MachineBuilder::build`] is missing a service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("required service not supplied: {0}")]
    MissingService(&'static str),
}
