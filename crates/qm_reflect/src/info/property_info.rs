use alloc::sync::Arc;
use core::fmt;

use crate::info::{MemberFlags, TypeHandle};
use crate::value::{Instance, Value};

/// Reads a property. Receives `None` for static properties.
pub type PropertyGetter = Arc<dyn Fn(Option<&dyn Instance>) -> Value + Send + Sync>;

/// Writes a property. Receives `None` for static properties.
pub type PropertySetter = Arc<dyn Fn(Option<&mut dyn Instance>, Value) + Send + Sync>;

// -----------------------------------------------------------------------------
// PropertyInfo

/// Information for a property: a named member backed by user code.
///
/// Either accessor may be missing; requesting it then fails with
/// [`ReflectError::MissingAccessor`](crate::ReflectError::MissingAccessor).
#[derive(Clone)]
pub struct PropertyInfo {
    name: Arc<str>,
    ty: TypeHandle,
    flags: MemberFlags,
    declaring: TypeHandle,
    getter: Option<PropertyGetter>,
    setter: Option<PropertySetter>,
}

impl PropertyInfo {
    pub(crate) fn new(
        name: Arc<str>,
        ty: TypeHandle,
        flags: MemberFlags,
        declaring: TypeHandle,
        getter: Option<PropertyGetter>,
        setter: Option<PropertySetter>,
    ) -> Self {
        Self {
            name,
            ty,
            // Properties have no storage, a constant makes no sense.
            flags: flags.difference(MemberFlags::LITERAL),
            declaring,
            getter,
            setter,
        }
    }

    /// Returns the property name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }

    /// Returns the handle of the declared value type.
    #[inline]
    pub const fn ty(&self) -> TypeHandle {
        self.ty
    }

    #[inline]
    pub const fn flags(&self) -> MemberFlags {
        self.flags
    }

    #[inline]
    pub const fn declaring(&self) -> TypeHandle {
        self.declaring
    }

    #[inline]
    pub const fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }

    #[inline]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    #[inline]
    pub fn getter(&self) -> Option<&PropertyGetter> {
        self.getter.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&PropertySetter> {
        self.setter.as_ref()
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("flags", &self.flags)
            .field("declaring", &self.declaring)
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}
