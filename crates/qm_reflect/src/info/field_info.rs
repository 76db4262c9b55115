use alloc::sync::Arc;

use crate::info::{MemberFlags, TypeHandle};

// -----------------------------------------------------------------------------
// FieldInfo

/// Information for a field.
///
/// Instance fields own a `slot` in the flattened layout of every instance
/// of the declaring type (and its subclasses). Static fields own a slot in
/// the static storage of the declaring type.
///
/// # Examples
///
/// ```
/// use qm_reflect::info::MemberFlags;
/// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// let i32_ty = registry.builtin(Builtin::I32);
/// let ty = registry
///     .register(TypeBuilder::class("demo::Counter").field("count", &i32_ty, MemberFlags::PUBLIC))
///     .unwrap();
///
/// let field = ty.field("count").unwrap();
/// assert_eq!(field.ty(), i32_ty.handle());
/// assert_eq!(field.slot(), 0);
/// assert!(field.is_public());
/// ```
#[derive(Clone, Debug)]
pub struct FieldInfo {
    name: Arc<str>,
    ty: TypeHandle,
    flags: MemberFlags,
    declaring: TypeHandle,
    slot: usize,
}

impl FieldInfo {
    pub(crate) fn new(
        name: Arc<str>,
        ty: TypeHandle,
        flags: MemberFlags,
        declaring: TypeHandle,
        slot: usize,
    ) -> Self {
        let flags = if flags.contains(MemberFlags::LITERAL) {
            flags | MemberFlags::STATIC
        } else {
            flags
        };
        Self {
            name,
            ty,
            flags,
            declaring,
            slot,
        }
    }

    /// Returns the field name.
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

    /// Returns the member flags.
    #[inline]
    pub const fn flags(&self) -> MemberFlags {
        self.flags
    }

    /// Returns the handle of the type declaring this field.
    #[inline]
    pub const fn declaring(&self) -> TypeHandle {
        self.declaring
    }

    /// Returns the slot index, in the instance layout or in static storage.
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub const fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }

    #[inline]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    /// Returns `true` for constants, which are static and read-only.
    #[inline]
    pub const fn is_literal(&self) -> bool {
        self.flags.contains(MemberFlags::LITERAL)
    }
}
