use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use qm_utils::hash::{HashMap, HashSet, NoOpHashMap};

use crate::info::{FieldInfo, MemberFlags, PropertyInfo, Type, TypeFlags};
use crate::info::{TypeHandle, TypeInfo, TypeKind, TypeParts};
use crate::registry::builder::MemberDecl;
use crate::registry::{Builtin, RegistryError, TypeBuilder};
use crate::value::{StructValue, Value};

enum Entry {
    Reserved { path: Arc<str>, kind: TypeKind },
    Defined(Type),
}

impl Entry {
    fn path(&self) -> &Arc<str> {
        match self {
            Self::Reserved { path, .. } => path,
            Self::Defined(ty) => ty.shared_path(),
        }
    }

    fn kind(&self) -> TypeKind {
        match self {
            Self::Reserved { kind, .. } => *kind,
            Self::Defined(ty) => ty.kind(),
        }
    }
}

struct RegistryInner {
    types: NoOpHashMap<TypeHandle, Entry>,
    paths: HashMap<Arc<str>, TypeHandle>,
    arrays: NoOpHashMap<TypeHandle, Type>,
    pointers: NoOpHashMap<TypeHandle, Type>,
    by_refs: NoOpHashMap<TypeHandle, Type>,
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store of runtime type information.
///
/// A registry starts with the [`Builtin`] types. User types are added with
/// [`register`](Self::register), or in two steps with [`reserve`](Self::reserve)
/// and [`define`](Self::define) when a type refers to itself (e.g. a linked list
/// node) or to a type registered later.
///
/// Registered types never change, so every cache built from a [`Type`] stays
/// valid for the lifetime of the process.
///
/// # Examples
///
/// ```
/// use qm_reflect::info::{MemberFlags, TypeKind};
/// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// let i32_ty = registry.builtin(Builtin::I32);
///
/// let node = registry.reserve("demo::Node", TypeKind::Class).unwrap();
/// let node = registry
///     .define(
///         node,
///         TypeBuilder::class("demo::Node")
///             .field("value", &i32_ty, MemberFlags::PUBLIC)
///             .field("next", node, MemberFlags::PUBLIC),
///     )
///     .unwrap();
///
/// assert_eq!(registry.get_with_path("demo::Node"), Some(node.clone()));
/// assert_eq!(node.field("next").unwrap().ty(), node.handle());
/// ```
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
    builtins: Box<[Type]>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry containing every [`Builtin`].
    pub fn new() -> Self {
        let mut inner = RegistryInner {
            types: NoOpHashMap::default(),
            paths: HashMap::default(),
            arrays: NoOpHashMap::default(),
            pointers: NoOpHashMap::default(),
            by_refs: NoOpHashMap::default(),
        };

        let builtins: Box<[Type]> = Builtin::ALL
            .iter()
            .map(|builtin| {
                let ty = Type::new(TypeInfo::from_parts(bare_parts(
                    TypeHandle::allocate(),
                    Arc::from(builtin.path()),
                    builtin.kind(),
                    None,
                )));
                inner.insert(ty.clone());
                ty
            })
            .collect();

        Self {
            inner: RwLock::new(inner),
            builtins,
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a builtin type.
    #[inline]
    pub fn builtin(&self, builtin: Builtin) -> Type {
        self.builtins[builtin.index()].clone()
    }

    /// Returns the number of defined and reserved types.
    pub fn len(&self) -> usize {
        self.read().types.len()
    }

    /// Returns `true` if `handle` was reserved or registered here.
    pub fn contains(&self, handle: TypeHandle) -> bool {
        self.read().types.contains_key(&handle)
    }

    /// Returns the defined type of `handle`.
    ///
    /// Returns `None` for unknown handles and for reserved, not yet defined ones.
    pub fn get(&self, handle: TypeHandle) -> Option<Type> {
        match self.read().types.get(&handle) {
            Some(Entry::Defined(ty)) => Some(ty.clone()),
            _ => None,
        }
    }

    /// Like [`get`](Self::get), with an error naming what went wrong.
    pub fn resolve(&self, handle: TypeHandle) -> Result<Type, RegistryError> {
        self.read().resolve(handle)
    }

    /// Returns the defined type with the given path.
    pub fn get_with_path(&self, path: &str) -> Option<Type> {
        let inner = self.read();
        let handle = inner.paths.get(path)?;
        match inner.types.get(handle) {
            Some(Entry::Defined(ty)) => Some(ty.clone()),
            _ => None,
        }
    }

    /// Allocates a handle for a type defined later with [`define`](Self::define).
    ///
    /// Only classes, interfaces and delegates can be reserved: their values are
    /// references, so a field of a reserved type never needs its layout.
    pub fn reserve(&self, path: &str, kind: TypeKind) -> Result<TypeHandle, RegistryError> {
        if !matches!(kind, TypeKind::Class | TypeKind::Interface | TypeKind::Delegate) {
            return Err(RegistryError::InvalidForwardDeclaration {
                path: Arc::from(path),
                kind,
            });
        }

        let mut inner = self.write();
        if inner.paths.contains_key(path) {
            return Err(RegistryError::DuplicatePath {
                path: Arc::from(path),
            });
        }

        let handle = TypeHandle::allocate();
        let path: Arc<str> = Arc::from(path);
        inner.paths.insert(path.clone(), handle);
        inner.types.insert(handle, Entry::Reserved { path, kind });
        Ok(handle)
    }

    /// Validates and registers a new type.
    pub fn register(&self, builder: TypeBuilder) -> Result<Type, RegistryError> {
        let mut inner = self.write();
        if inner.paths.contains_key(&*builder.path) {
            return Err(RegistryError::DuplicatePath { path: builder.path });
        }

        let object = self.builtin(Builtin::Object);
        let ty = Type::new(inner.build(TypeHandle::allocate(), builder, object)?);
        inner.insert(ty.clone());
        Ok(ty)
    }

    /// Defines a type previously reserved with [`reserve`](Self::reserve).
    ///
    /// The path and kind of `builder` must match the reservation.
    pub fn define(&self, handle: TypeHandle, builder: TypeBuilder) -> Result<Type, RegistryError> {
        let mut inner = self.write();
        match inner.types.get(&handle) {
            None => return Err(RegistryError::UnknownHandle { handle }),
            Some(Entry::Defined(ty)) => {
                return Err(RegistryError::AlreadyDefined {
                    path: ty.shared_path().clone(),
                });
            }
            Some(Entry::Reserved { path, kind }) => {
                if *path != builder.path || *kind != builder.kind {
                    return Err(RegistryError::ReservationMismatch {
                        expected: path.clone(),
                        found: builder.path,
                    });
                }
            }
        }

        let object = self.builtin(Builtin::Object);
        let ty = Type::new(inner.build(handle, builder, object)?);
        inner.insert(ty.clone());
        Ok(ty)
    }

    /// Returns the array type with elements of type `element`, creating it once.
    ///
    /// ```
    /// use qm_reflect::registry::{Builtin, TypeRegistry};
    ///
    /// let registry = TypeRegistry::new();
    /// let string = registry.builtin(Builtin::String);
    ///
    /// let a = registry.array_of(&string).unwrap();
    /// let b = registry.array_of(&string).unwrap();
    /// assert_eq!(a.path(), "string[]");
    /// assert!(qm_reflect::info::Type::ptr_eq(&a, &b));
    /// ```
    pub fn array_of(&self, element: impl Into<TypeHandle>) -> Result<Type, RegistryError> {
        self.compose(element.into(), TypeKind::Array)
    }

    /// Returns the unmanaged pointer type to `element`, creating it once.
    pub fn pointer_to(&self, element: impl Into<TypeHandle>) -> Result<Type, RegistryError> {
        self.compose(element.into(), TypeKind::Pointer)
    }

    /// Returns the by-reference marker type of `element`, creating it once.
    pub fn by_ref_of(&self, element: impl Into<TypeHandle>) -> Result<Type, RegistryError> {
        self.compose(element.into(), TypeKind::ByRef)
    }

    fn compose(&self, element: TypeHandle, kind: TypeKind) -> Result<Type, RegistryError> {
        if let Some(ty) = self.read().composed(kind).get(&element) {
            return Ok(ty.clone());
        }

        let mut inner = self.write();
        if let Some(ty) = inner.composed(kind).get(&element) {
            return Ok(ty.clone());
        }

        let entry = inner
            .types
            .get(&element)
            .ok_or(RegistryError::UnknownHandle { handle: element })?;
        let element_path = entry.path().clone();
        let element_kind = entry.kind();

        let invalid = match kind {
            TypeKind::ByRef => matches!(element_kind, TypeKind::Void | TypeKind::ByRef),
            TypeKind::Pointer => matches!(element_kind, TypeKind::ByRef),
            _ => matches!(element_kind, TypeKind::Void | TypeKind::ByRef),
        };
        if invalid {
            return Err(RegistryError::InvalidElement {
                type_path: element_path,
            });
        }

        let suffix = match kind {
            TypeKind::Array => "[]",
            TypeKind::Pointer => "*",
            _ => "&",
        };
        let path: Arc<str> = Arc::from(format!("{element_path}{suffix}"));
        if inner.paths.contains_key(&path) {
            return Err(RegistryError::DuplicatePath { path });
        }

        let ty = Type::new(TypeInfo::from_parts(bare_parts(
            TypeHandle::allocate(),
            path,
            kind,
            Some(element),
        )));
        inner.insert(ty.clone());
        inner.composed_mut(kind).insert(element, ty.clone());
        log::debug!("registered composed type `{ty}`");
        Ok(ty)
    }

    /// Returns the default value of a location of type `handle`.
    ///
    /// Primitives are zero, pointers are null addresses, structs have every
    /// field defaulted, and everything else is `Null`.
    pub fn default_value(&self, handle: TypeHandle) -> Value {
        self.read().default_value(handle)
    }
}

impl RegistryInner {
    fn insert(&mut self, ty: Type) {
        self.paths.insert(ty.shared_path().clone(), ty.handle());
        self.types.insert(ty.handle(), Entry::Defined(ty));
    }

    fn composed(&self, kind: TypeKind) -> &NoOpHashMap<TypeHandle, Type> {
        match kind {
            TypeKind::Array => &self.arrays,
            TypeKind::Pointer => &self.pointers,
            _ => &self.by_refs,
        }
    }

    fn composed_mut(&mut self, kind: TypeKind) -> &mut NoOpHashMap<TypeHandle, Type> {
        match kind {
            TypeKind::Array => &mut self.arrays,
            TypeKind::Pointer => &mut self.pointers,
            _ => &mut self.by_refs,
        }
    }

    fn resolve(&self, handle: TypeHandle) -> Result<Type, RegistryError> {
        match self.types.get(&handle) {
            Some(Entry::Defined(ty)) => Ok(ty.clone()),
            Some(Entry::Reserved { path, .. }) => Err(RegistryError::Undefined { path: path.clone() }),
            None => Err(RegistryError::UnknownHandle { handle }),
        }
    }

    // Struct fields always refer to defined structs, so the recursion terminates.
    fn default_value(&self, handle: TypeHandle) -> Value {
        let Some(Entry::Defined(ty)) = self.types.get(&handle) else {
            return Value::Null;
        };
        match ty.kind() {
            TypeKind::Primitive(primitive) => Value::zero(primitive),
            TypeKind::Pointer => Value::Pointer(0),
            TypeKind::Struct if !ty.flags().contains(TypeFlags::BY_REF_LIKE) => {
                let fields = ty
                    .instance_fields()
                    .iter()
                    .map(|field| self.default_value(field.ty()))
                    .collect();
                Value::Struct(StructValue::from_parts(ty.clone(), fields))
            }
            _ => Value::Null,
        }
    }

    fn build(
        &self,
        handle: TypeHandle,
        builder: TypeBuilder,
        object: Type,
    ) -> Result<TypeInfo, RegistryError> {
        let TypeBuilder {
            path,
            kind,
            flags,
            base,
            interfaces,
            members,
            constructor,
        } = builder;

        // Base class: classes only, never sealed, implicitly `object`.
        let base = match (kind, base) {
            (TypeKind::Class, Some(base)) => {
                let registered = matches!(
                    self.types.get(&base.handle()),
                    Some(Entry::Defined(ty)) if Type::ptr_eq(ty, &base)
                );
                if !registered || base.kind() != TypeKind::Class || base.is_sealed() {
                    return Err(RegistryError::InvalidBase {
                        type_path: path,
                        base: base.shared_path().clone(),
                    });
                }
                Some(base)
            }
            (TypeKind::Class, None) => Some(object),
            (_, Some(base)) => {
                return Err(RegistryError::InvalidBase {
                    type_path: path,
                    base: base.shared_path().clone(),
                });
            }
            (_, None) => None,
        };

        for interface in &interfaces {
            let entry = self
                .types
                .get(interface)
                .ok_or(RegistryError::UnknownHandle { handle: *interface })?;
            if entry.kind() != TypeKind::Interface {
                return Err(RegistryError::InvalidInterface {
                    type_path: path,
                    interface: entry.path().clone(),
                });
            }
        }

        {
            let mut names: HashSet<&str> = HashSet::default();
            for member in &members {
                if !names.insert(member.name()) {
                    return Err(RegistryError::DuplicateMember {
                        type_path: path,
                        member: member.name().clone(),
                    });
                }
            }
        }

        let mut layout: Vec<FieldInfo> = base
            .as_ref()
            .map(|base| base.instance_fields().to_vec())
            .unwrap_or_default();
        let mut fields = Vec::new();
        let mut properties = Vec::new();
        let mut statics = Vec::new();

        for member in members {
            match member {
                MemberDecl::Field { name, ty, flags } => {
                    self.check_field(&path, kind, &name, ty)?;
                    let field = if flags.contains(MemberFlags::STATIC) {
                        statics.push(self.default_value(ty));
                        FieldInfo::new(name, ty, flags, handle, statics.len() - 1)
                    } else {
                        let field = FieldInfo::new(name, ty, flags, handle, layout.len());
                        layout.push(field.clone());
                        field
                    };
                    fields.push(field);
                }
                MemberDecl::Constant { name, ty, value } => {
                    self.check_field(&path, kind, &name, ty)?;
                    let fits = self
                        .resolve(ty)
                        .is_ok_and(|declared| value.is_instance_of(&declared));
                    if !fits {
                        return Err(RegistryError::ConstantMismatch {
                            type_path: path,
                            member: name,
                        });
                    }
                    statics.push(value);
                    let flags = MemberFlags::PUBLIC | MemberFlags::LITERAL;
                    fields.push(FieldInfo::new(name, ty, flags, handle, statics.len() - 1));
                }
                MemberDecl::Property {
                    name,
                    ty,
                    flags,
                    getter,
                    setter,
                } => {
                    if !matches!(kind, TypeKind::Class | TypeKind::Struct | TypeKind::Interface) {
                        return Err(RegistryError::MisplacedMember {
                            type_path: path,
                            member: name,
                        });
                    }
                    if !self.types.contains_key(&ty) && ty != handle {
                        return Err(RegistryError::UnknownHandle { handle: ty });
                    }
                    properties.push(PropertyInfo::new(name, ty, flags, handle, getter, setter));
                }
            }
        }

        Ok(TypeInfo::from_parts(TypeParts {
            handle,
            path,
            kind,
            flags,
            base,
            element: None,
            interfaces: interfaces.into_boxed_slice(),
            fields: fields.into_boxed_slice(),
            properties: properties.into_boxed_slice(),
            layout: layout.into_boxed_slice(),
            constructor,
            statics: statics.into_boxed_slice(),
        }))
    }

    fn check_field(
        &self,
        path: &Arc<str>,
        kind: TypeKind,
        name: &Arc<str>,
        ty: TypeHandle,
    ) -> Result<(), RegistryError> {
        if !matches!(kind, TypeKind::Class | TypeKind::Struct) {
            return Err(RegistryError::MisplacedMember {
                type_path: path.clone(),
                member: name.clone(),
            });
        }
        match self.types.get(&ty) {
            None => Err(RegistryError::UnknownHandle { handle: ty }),
            Some(entry) if entry.kind() == TypeKind::Void => Err(RegistryError::InvalidElement {
                type_path: entry.path().clone(),
            }),
            Some(_) => Ok(()),
        }
    }
}

fn bare_parts(
    handle: TypeHandle,
    path: Arc<str>,
    kind: TypeKind,
    element: Option<TypeHandle>,
) -> TypeParts {
    TypeParts {
        handle,
        path,
        kind,
        flags: TypeFlags::empty(),
        base: None,
        element,
        interfaces: Box::new([]),
        fields: Box::new([]),
        properties: Box::new([]),
        layout: Box::new([]),
        constructor: None,
        statics: Box::new([]),
    }
}

// -----------------------------------------------------------------------------
// Tests
