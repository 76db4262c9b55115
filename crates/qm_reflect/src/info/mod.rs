//! Provide runtime type infomation.
//!
//! ## Menu
//!
//! - [`TypeHandle`]: a process-unique 8 bytes identity of a registered type.
//!
//! - [`Type`]: a shared pointer to a [`TypeInfo`], compared and hashed by handle only.
//!
//! - [`TypeInfo`]: everything the engine knows about one type:
//!     - path, [`TypeKind`] and [`TypeFlags`].
//!     - optional base class and implemented interfaces.
//!     - element type, for arrays, pointers and by-ref markers.
//!     - declared fields and properties, plus the flattened instance layout.
//!     - optional constructor, and the storage of static fields.
//!
//! - Member Info:
//!     - [`FieldInfo`]: name, declared type, [`MemberFlags`], declaring type and slot.
//!     - [`PropertyInfo`]: name, declared type, [`MemberFlags`] and optional getter/setter.
//!     - [`MemberInfo`]: one of the above, as returned by member resolution.
//!
//! - [`BindingFlags`]: the filter used by [`TypeInfo::resolve_member`].

// -----------------------------------------------------------------------------
// Modules

mod field_info;
mod flags;
mod handle;
mod kind;
mod member_info;
mod property_info;
mod type_info;

// -----------------------------------------------------------------------------
// Exports

pub use field_info::FieldInfo;
pub use flags::{BindingFlags, MemberFlags, TypeFlags};
pub use handle::TypeHandle;
pub use kind::{Primitive, TypeKind};
pub use member_info::MemberInfo;
pub use property_info::{PropertyGetter, PropertyInfo, PropertySetter};
pub use type_info::{Constructor, Type, TypeInfo};

pub(crate) use type_info::TypeParts;
