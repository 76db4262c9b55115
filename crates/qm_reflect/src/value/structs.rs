use alloc::boxed::Box;
use core::fmt;

use crate::info::Type;
use crate::value::{Instance, Value};

// -----------------------------------------------------------------------------
// StructValue

/// An instance of a struct type, copied by value.
///
/// Writing to a field of a `StructValue` held inside a [`Value`] only changes
/// that copy. Use the typed accessors with `&mut StructValue` to mutate a
/// struct in place.
#[derive(Clone)]
pub struct StructValue {
    ty: Type,
    fields: Box<[Value]>,
}

impl StructValue {
    pub(crate) fn from_parts(ty: Type, fields: Box<[Value]>) -> Self {
        debug_assert_eq!(fields.len(), ty.instance_fields().len());
        Self { ty, fields }
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.fields.get(slot)
    }

    /// Returns the value of the instance field named `name`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        let slot = self.ty.instance_fields().iter().position(|f| f.name() == name)?;
        self.fields.get(slot)
    }

    #[inline]
    pub fn set(&mut self, slot: usize, value: Value) -> bool {
        match self.fields.get_mut(slot) {
            Some(target) => {
                *target = value;
                true
            }
            None => false,
        }
    }
}

impl Instance for StructValue {
    #[inline]
    fn instance_type(&self) -> &Type {
        &self.ty
    }

    #[inline]
    fn load_slot(&self, slot: usize) -> Option<Value> {
        self.fields.get(slot).cloned()
    }

    #[inline]
    fn store_slot(&mut self, slot: usize, value: Value) -> bool {
        self.set(slot, value)
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.fields == other.fields
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct(self.ty.path());
        for (info, value) in self.ty.instance_fields().iter().zip(self.fields.iter()) {
            builder.field(info.name(), value);
        }
        builder.finish()
    }
}
