use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use crate::info::Type;
use crate::value::{Instance, Value};

struct ObjectData {
    ty: Type,
    fields: RwLock<Box<[Value]>>,
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A shared handle to a class instance.
///
/// The fields are stored in the instance layout order of the runtime type, see
/// [`TypeInfo::instance_fields`](crate::info::TypeInfo::instance_fields).
/// Mutation goes through the handle, every clone of it observes the change.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
    /// Creates an instance from its runtime type and a field for every slot.
    ///
    /// Callers must pass one value per entry of `ty.instance_fields()`.
    pub(crate) fn from_parts(ty: Type, fields: Box<[Value]>) -> Self {
        debug_assert_eq!(fields.len(), ty.instance_fields().len());
        Self(Arc::new(ObjectData {
            ty,
            fields: RwLock::new(fields),
        }))
    }

    /// Returns the runtime type.
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    /// Returns the address of the instance storage.
    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    /// Returns the number of field slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.ty.instance_fields().len()
    }

    /// Reads a field slot.
    pub fn load(&self, slot: usize) -> Option<Value> {
        let fields = self.0.fields.read().unwrap_or_else(PoisonError::into_inner);
        fields.get(slot).cloned()
    }

    /// Writes a field slot, returns `false` if the slot does not exist.
    pub fn store(&self, slot: usize, value: Value) -> bool {
        let mut fields = self.0.fields.write().unwrap_or_else(PoisonError::into_inner);
        match fields.get_mut(slot) {
            Some(target) => {
                *target = value;
                true
            }
            None => false,
        }
    }

    /// Copies every field out, so no lock is held while they are inspected.
    pub fn snapshot(&self) -> Box<[Value]> {
        let fields = self.0.fields.read().unwrap_or_else(PoisonError::into_inner);
        fields.clone()
    }
}

impl Instance for ObjectRef {
    #[inline]
    fn instance_type(&self) -> &Type {
        self.ty()
    }

    #[inline]
    fn load_slot(&self, slot: usize) -> Option<Value> {
        self.load(slot)
    }

    #[inline]
    fn store_slot(&mut self, slot: usize, value: Value) -> bool {
        self.store(slot, value)
    }
}

// Fields are not printed, an object graph may be cyclic.
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({} @ {:#x})", self.0.ty.path(), self.identity())
    }
}
