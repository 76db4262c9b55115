use alloc::sync::Arc;
use core::fmt;

use crate::ReflectError;
use crate::info::{Type, TypeKind};
use crate::value::Value;

/// The callable behind a delegate.
pub type DelegateFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

struct DelegateData {
    ty: Type,
    func: DelegateFn,
}

// -----------------------------------------------------------------------------
// DelegateRef

/// A shared handle to a callable of a delegate type.
///
/// The clone engine never copies a delegate; a delegate field of a cloned
/// object is reset to `Null`.
#[derive(Clone)]
pub struct DelegateRef(Arc<DelegateData>);

impl DelegateRef {
    /// Binds `func` to the delegate type `ty`.
    ///
    /// # Errors
    ///
    /// [`ReflectError::UnsupportedType`] if `ty` is not a delegate type.
    pub fn new<F>(ty: &Type, func: F) -> Result<Self, ReflectError>
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        if ty.kind() != TypeKind::Delegate {
            return Err(ReflectError::UnsupportedType {
                type_path: ty.shared_path().clone(),
                reason: "not a delegate type",
            });
        }
        Ok(Self(Arc::new(DelegateData {
            ty: ty.clone(),
            func: Arc::new(func),
        })))
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    /// Calls the delegate.
    #[inline]
    pub fn invoke(&self, args: &[Value]) -> Value {
        (self.0.func)(args)
    }
}

impl fmt::Debug for DelegateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delegate({} @ {:#x})", self.0.ty.path(), self.identity())
    }
}
