use alloc::sync::Arc;

use crate::info::{FieldInfo, MemberFlags, PropertyInfo, TypeHandle};

// -----------------------------------------------------------------------------
// MemberInfo

/// A resolved member descriptor, a field or a property.
///
/// Returned by [`TypeInfo::resolve_member`](crate::info::TypeInfo::resolve_member)
/// and cached per (type, name) by the [`Reflector`](crate::Reflector).
#[derive(Clone, Debug)]
pub enum MemberInfo {
    Field(FieldInfo),
    Property(PropertyInfo),
}

impl MemberInfo {
    /// Returns the member name.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(info) => info.name(),
            Self::Property(info) => info.name(),
        }
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> &Arc<str> {
        match self {
            Self::Field(info) => info.shared_name(),
            Self::Property(info) => info.shared_name(),
        }
    }

    /// Returns the handle of the declared value type.
    #[inline]
    pub const fn value_type(&self) -> TypeHandle {
        match self {
            Self::Field(info) => info.ty(),
            Self::Property(info) => info.ty(),
        }
    }

    /// Returns the handle of the declaring type.
    #[inline]
    pub const fn declaring(&self) -> TypeHandle {
        match self {
            Self::Field(info) => info.declaring(),
            Self::Property(info) => info.declaring(),
        }
    }

    #[inline]
    pub const fn flags(&self) -> MemberFlags {
        match self {
            Self::Field(info) => info.flags(),
            Self::Property(info) => info.flags(),
        }
    }

    #[inline]
    pub const fn is_static(&self) -> bool {
        self.flags().contains(MemberFlags::STATIC)
    }

    #[inline]
    pub const fn is_public(&self) -> bool {
        self.flags().contains(MemberFlags::PUBLIC)
    }

    #[inline]
    pub const fn as_field(&self) -> Option<&FieldInfo> {
        match self {
            Self::Field(info) => Some(info),
            Self::Property(_) => None,
        }
    }

    #[inline]
    pub const fn as_property(&self) -> Option<&PropertyInfo> {
        match self {
            Self::Property(info) => Some(info),
            Self::Field(_) => None,
        }
    }
}
