use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use crate::info::Type;
use crate::value::Value;

struct ArrayData {
    ty: Type,
    items: RwLock<Box<[Value]>>,
}

// -----------------------------------------------------------------------------
// ArrayRef

/// A shared handle to a fixed-length array.
///
/// `ty` is the array type itself (e.g. `i32[]`), its
/// [`element`](crate::info::TypeInfo::element) is the item type.
/// Created by [`Reflector::new_array`](crate::Reflector::new_array).
#[derive(Clone)]
pub struct ArrayRef(Arc<ArrayData>);

impl ArrayRef {
    pub(crate) fn from_parts(ty: Type, items: Box<[Value]>) -> Self {
        Self(Arc::new(ArrayData {
            ty,
            items: RwLock::new(items),
        }))
    }

    /// Returns the array type.
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    /// Returns the address of the array storage.
    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    pub fn len(&self) -> usize {
        self.0.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        let items = self.0.items.read().unwrap_or_else(PoisonError::into_inner);
        items.get(index).cloned()
    }

    /// Writes an item, returns `false` if `index` is out of bounds.
    ///
    /// The value is not checked against the element type.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut items = self.0.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(index) {
            Some(target) => {
                *target = value;
                true
            }
            None => false,
        }
    }

    /// Copies every item out.
    pub fn snapshot(&self) -> Box<[Value]> {
        let items = self.0.items.read().unwrap_or_else(PoisonError::into_inner);
        items.clone()
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Array({}; {} @ {:#x})",
            self.0.ty.path(),
            self.len(),
            self.identity()
        )
    }
}
