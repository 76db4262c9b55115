use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;
use std::sync::{PoisonError, RwLock};

use crate::ReflectError;
use crate::info::{BindingFlags, FieldInfo, MemberInfo, PropertyInfo};
use crate::info::{TypeFlags, TypeHandle, TypeKind};
use crate::value::{Instance, Value};

/// Initialization logic of a class or struct.
///
/// Run by [`Reflector::create_instance`](crate::Reflector::create_instance),
/// base class first. Blank construction never runs it.
pub type Constructor = Arc<dyn Fn(&mut dyn Instance) + Send + Sync>;

// -----------------------------------------------------------------------------
// TypeInfo

/// Runtime information of a registered type.
///
/// A `TypeInfo` is immutable once registered, except for the values stored in
/// its static fields.
///
/// # Layout
///
/// The instance layout of a class is the layout of its base class followed by
/// its own instance fields, so a slot index stays valid for every subclass.
/// [`instance_fields`](Self::instance_fields) returns the whole layout,
/// [`fields`](Self::fields) only what the type itself declares.
pub struct TypeInfo {
    handle: TypeHandle,
    path: Arc<str>,
    kind: TypeKind,
    flags: TypeFlags,
    base: Option<Type>,
    element: Option<TypeHandle>,
    interfaces: Box<[TypeHandle]>,
    fields: Box<[FieldInfo]>,
    properties: Box<[PropertyInfo]>,
    layout: Box<[FieldInfo]>,
    constructor: Option<Constructor>,
    statics: RwLock<Box<[Value]>>,
}

/// Everything needed to build a [`TypeInfo`], assembled by the registry.
pub(crate) struct TypeParts {
    pub handle: TypeHandle,
    pub path: Arc<str>,
    pub kind: TypeKind,
    pub flags: TypeFlags,
    pub base: Option<Type>,
    pub element: Option<TypeHandle>,
    pub interfaces: Box<[TypeHandle]>,
    pub fields: Box<[FieldInfo]>,
    pub properties: Box<[PropertyInfo]>,
    pub layout: Box<[FieldInfo]>,
    pub constructor: Option<Constructor>,
    pub statics: Box<[Value]>,
}

impl TypeInfo {
    pub(crate) fn from_parts(parts: TypeParts) -> Self {
        Self {
            handle: parts.handle,
            path: parts.path,
            kind: parts.kind,
            flags: parts.flags,
            base: parts.base,
            element: parts.element,
            interfaces: parts.interfaces,
            fields: parts.fields,
            properties: parts.properties,
            layout: parts.layout,
            constructor: parts.constructor,
            statics: RwLock::new(parts.statics),
        }
    }

    /// Returns the [`TypeHandle`].
    #[inline(always)]
    pub const fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Returns the full path, a unique name within its registry.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub(crate) fn shared_path(&self) -> &Arc<str> {
        &self.path
    }

    #[inline(always)]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline(always)]
    pub const fn flags(&self) -> TypeFlags {
        self.flags
    }

    #[inline]
    pub const fn is_abstract(&self) -> bool {
        self.flags.contains(TypeFlags::ABSTRACT)
    }

    #[inline]
    pub const fn is_sealed(&self) -> bool {
        self.flags.contains(TypeFlags::SEALED)
    }

    #[inline]
    pub const fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    #[inline]
    pub const fn is_value_type(&self) -> bool {
        self.kind.is_value_type()
    }

    #[inline]
    pub const fn is_reference_type(&self) -> bool {
        self.kind.is_reference_type()
    }

    /// Returns `true` for open generic definitions and unbound type parameters.
    #[inline]
    pub const fn is_open_generic(&self) -> bool {
        self.flags.contains(TypeFlags::GENERIC_DEFINITION)
            || matches!(self.kind, TypeKind::GenericParameter)
    }

    /// Returns `true` if no instance of exactly this type can ever exist.
    #[inline]
    pub const fn is_uninstantiable(&self) -> bool {
        self.is_abstract() || self.is_interface() || self.is_open_generic()
    }

    /// Returns the base class, if any.
    #[inline]
    pub fn base(&self) -> Option<&Type> {
        self.base.as_ref()
    }

    /// Returns the element type of an array, pointer or by-ref marker.
    #[inline]
    pub const fn element(&self) -> Option<TypeHandle> {
        self.element
    }

    /// Returns the interfaces implemented by this type itself.
    #[inline]
    pub fn interfaces(&self) -> &[TypeHandle] {
        &self.interfaces
    }

    /// Returns the declared fields, instance and static, in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Returns the declared properties, in declaration order.
    #[inline]
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    /// Returns every instance field, inherited ones first, indexed by slot.
    #[inline]
    pub fn instance_fields(&self) -> &[FieldInfo] {
        &self.layout
    }

    /// Returns the declared field with exactly this `name`.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the declared property with exactly this `name`.
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name() == name)
    }

    #[inline]
    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    /// Iterates this type and then its base classes.
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeInfo> {
        core::iter::successors(Some(self), |info| info.base.as_deref())
    }

    /// Returns `true` if this type is `handle` or derives from it.
    pub fn is_subclass_of(&self, handle: TypeHandle) -> bool {
        self.ancestors().any(|info| info.handle == handle)
    }

    /// Returns `true` if a value of this type can be stored in a slot of
    /// type `handle`: same type, base class or implemented interface.
    pub fn is_assignable_to(&self, handle: TypeHandle) -> bool {
        self.ancestors()
            .any(|info| info.handle == handle || info.interfaces.contains(&handle))
    }

    /// Resolves a field or property by name.
    ///
    /// Members declared on this type are searched first. If none matches and
    /// `DECLARED_ONLY` is not set, the search continues on the base class; static
    /// members of base classes are only considered with `FLATTEN_HIERARCHY`.
    ///
    /// # Errors
    ///
    /// - [`ReflectError::AmbiguousMember`] if more than one member declared on
    ///   the same type matches (possible with `IGNORE_CASE`).
    /// - [`ReflectError::MemberNotFound`] if nothing matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use qm_reflect::info::{BindingFlags, MemberFlags};
    /// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
    ///
    /// let registry = TypeRegistry::new();
    /// let i32_ty = registry.builtin(Builtin::I32);
    /// let ty = registry
    ///     .register(TypeBuilder::class("demo::Pair").field("left", &i32_ty, MemberFlags::empty()))
    ///     .unwrap();
    ///
    /// assert!(ty.resolve_member("left", BindingFlags::ALL_MEMBERS).is_ok());
    /// assert!(ty.resolve_member("left", BindingFlags::PUBLIC | BindingFlags::INSTANCE).is_err());
    /// ```
    pub fn resolve_member(&self, name: &str, flags: BindingFlags) -> Result<MemberInfo, ReflectError> {
        for (depth, info) in self.ancestors().enumerate() {
            let inherited = depth > 0;
            let mut found: Option<MemberInfo> = None;
            let mut matches = 0_usize;

            let fields = info.fields.iter().cloned().map(MemberInfo::Field);
            let properties = info.properties.iter().cloned().map(MemberInfo::Property);
            for member in fields.chain(properties) {
                if !flags.name_matches(member.name(), name) || !flags.admits(&member) {
                    continue;
                }
                if inherited && member.is_static() && !flags.contains(BindingFlags::FLATTEN_HIERARCHY) {
                    continue;
                }
                matches += 1;
                found = Some(member);
            }

            if matches > 1 {
                return Err(ReflectError::AmbiguousMember {
                    type_path: self.path.clone(),
                    member: name.into(),
                    matches,
                });
            }
            if let Some(member) = found {
                return Ok(member);
            }
            if flags.contains(BindingFlags::DECLARED_ONLY) {
                break;
            }
        }

        Err(ReflectError::MemberNotFound {
            type_path: self.path.clone(),
            member: name.into(),
        })
    }

    /// Reads static storage.
    pub fn load_static(&self, slot: usize) -> Option<Value> {
        let statics = self.statics.read().unwrap_or_else(PoisonError::into_inner);
        statics.get(slot).cloned()
    }

    /// Writes static storage, returns `false` if the slot does not exist.
    pub fn store_static(&self, slot: usize, value: Value) -> bool {
        let mut statics = self.statics.write().unwrap_or_else(PoisonError::into_inner);
        match statics.get_mut(slot) {
            Some(target) => {
                *target = value;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("handle", &self.handle)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .field("base", &self.base.as_ref().map(|b| b.path()))
            .field("element", &self.element)
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Type

/// A type descriptor: a cheap, shareable pointer to a [`TypeInfo`].
///
/// Equality and hashing only use the [`TypeHandle`], so `Type` is a stable
/// cache key.
#[derive(Clone)]
pub struct Type(Arc<TypeInfo>);

impl Type {
    #[inline]
    pub(crate) fn new(info: TypeInfo) -> Self {
        Self(Arc::new(info))
    }

    /// Returns `true` if both point to the same allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl Deref for Type {
    type Target = TypeInfo;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({} {})", self.path, self.handle)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.path)
    }
}

impl From<&Type> for TypeHandle {
    #[inline]
    fn from(value: &Type) -> Self {
        value.handle
    }
}

impl From<Type> for TypeHandle {
    #[inline]
    fn from(value: Type) -> Self {
        value.handle
    }
}

#[cfg(test)]
mod tests {
    use crate::ReflectError;
    use crate::info::{BindingFlags, MemberFlags};
    use crate::registry::{Builtin, TypeBuilder, TypeRegistry};

    #[test]
    fn resolution_walks_the_hierarchy() {
        let registry = TypeRegistry::new();
        let i32_ty = registry.builtin(Builtin::I32);
        let base = registry
            .register(
                TypeBuilder::class("demo::Base")
                    .field("id", &i32_ty, MemberFlags::PUBLIC)
                    .field("secret", &i32_ty, MemberFlags::empty())
                    .field("count", &i32_ty, MemberFlags::PUBLIC | MemberFlags::STATIC),
            )
            .unwrap();
        let derived = registry
            .register(
                TypeBuilder::class("demo::Derived")
                    .extends(&base)
                    .field("id", &i32_ty, MemberFlags::PUBLIC),
            )
            .unwrap();
        let all = BindingFlags::ALL_MEMBERS;

        // The most derived declaration hides the base one.
        let id = derived.resolve_member("id", all).unwrap();
        assert_eq!(id.declaring(), derived.handle());
        assert_eq!(base.resolve_member("id", all).unwrap().declaring(), base.handle());

        // Inherited instance members, non-public included.
        let secret = derived.resolve_member("secret", all).unwrap();
        assert_eq!(secret.declaring(), base.handle());
        assert!(matches!(
            derived.resolve_member("secret", BindingFlags::PUBLIC | BindingFlags::INSTANCE),
            Err(ReflectError::MemberNotFound { .. })
        ));

        assert!(matches!(
            derived.resolve_member("secret", all | BindingFlags::DECLARED_ONLY),
            Err(ReflectError::MemberNotFound { .. })
        ));
        assert!(derived.resolve_member("id", all | BindingFlags::DECLARED_ONLY).is_ok());

        // Inherited statics need `FLATTEN_HIERARCHY`.
        assert!(matches!(
            derived.resolve_member("count", all),
            Err(ReflectError::MemberNotFound { .. })
        ));
        let count = derived
            .resolve_member("count", all | BindingFlags::FLATTEN_HIERARCHY)
            .unwrap();
        assert!(count.is_static());
        assert!(base.resolve_member("count", all).is_ok());

        // Inherited slots come first in the layout.
        let layout: Vec<&str> = derived.instance_fields().iter().map(|f| f.name()).collect();
        assert_eq!(layout, ["id", "secret", "id"]);
    }
}
