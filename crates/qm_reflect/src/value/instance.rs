use crate::info::Type;
use crate::value::Value;

/// A typed view of an instance with field slots.
///
/// Implemented by [`ObjectRef`](crate::value::ObjectRef) for class instances and
/// by [`StructValue`](crate::value::StructValue) for structs. Typed accessors
/// take `&T` / `&mut T`, which lets a struct be mutated in place.
///
/// Slots index into [`TypeInfo::instance_fields`](crate::info::TypeInfo::instance_fields)
/// of the runtime type.
pub trait Instance: Send + Sync + 'static {
    /// Returns the runtime type of this instance.
    fn instance_type(&self) -> &Type;

    /// Reads a slot, `None` if out of bounds.
    fn load_slot(&self, slot: usize) -> Option<Value>;

    /// Writes a slot, `false` if out of bounds.
    fn store_slot(&mut self, slot: usize, value: Value) -> bool;
}
