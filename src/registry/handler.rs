use crate::error::HandlerError;
use crate::value::Value;
use std::any::{Any, TypeId};
use std::fmt;

/// Runtime type a handler can encode, with its name for diagnostics
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

/// Extension handler translating between structure signatures and host records.
///
/// Handlers must not touch the registry they are registered in. Fields are
/// handed over by value, so nothing can be retained past the call.
pub trait StructHandler: Send + Sync {
    /// Structure signatures this handler decodes
    fn readable_signatures(&self) -> Vec<i8>;

    /// Runtime types this handler encodes
    fn writable_types(&self) -> Vec<TypeDescriptor>;

    /// Build a host value from a decoded structure
    fn read(&self, signature: i8, fields: Vec<Value>) -> Result<Value, HandlerError>;

    /// Split a host record into its signature and ordered fields
    fn write(&self, value: &dyn Any) -> Result<(i8, Vec<Value>), HandlerError>;

    /// Name used in log output
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
