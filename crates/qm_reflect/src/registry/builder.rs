use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::info::{Constructor, MemberFlags, PropertyGetter, PropertySetter};
use crate::info::{Type, TypeFlags, TypeHandle, TypeKind};
use crate::value::{Instance, Value};

pub(super) enum MemberDecl {
    Field {
        name: Arc<str>,
        ty: TypeHandle,
        flags: MemberFlags,
    },
    Constant {
        name: Arc<str>,
        ty: TypeHandle,
        value: Value,
    },
    Property {
        name: Arc<str>,
        ty: TypeHandle,
        flags: MemberFlags,
        getter: Option<PropertyGetter>,
        setter: Option<PropertySetter>,
    },
}

impl MemberDecl {
    pub(super) fn name(&self) -> &Arc<str> {
        match self {
            Self::Field { name, .. } | Self::Constant { name, .. } | Self::Property { name, .. } => {
                name
            }
        }
    }
}

// -----------------------------------------------------------------------------
// TypeBuilder

/// Describes a user type before it is registered.
///
/// Nothing is validated until the builder is handed to
/// [`TypeRegistry::register`](crate::registry::TypeRegistry::register) or
/// [`TypeRegistry::define`](crate::registry::TypeRegistry::define).
///
/// # Examples
///
/// ```
/// use qm_reflect::info::{MemberFlags, TypeFlags};
/// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
/// use qm_reflect::value::Value;
///
/// let registry = TypeRegistry::new();
/// let i32_ty = registry.builtin(Builtin::I32);
///
/// let shape = registry
///     .register(
///         TypeBuilder::class("demo::Shape")
///             .with_flags(TypeFlags::ABSTRACT)
///             .field("id", &i32_ty, MemberFlags::PUBLIC)
///             .constant("SIDES", &i32_ty, 0_i32),
///     )
///     .unwrap();
///
/// let square = registry
///     .register(
///         TypeBuilder::class("demo::Square")
///             .extends(&shape)
///             .field("size", &i32_ty, MemberFlags::PUBLIC)
///             .readonly_property("area", &i32_ty, MemberFlags::PUBLIC, |_| Value::I32(0)),
///     )
///     .unwrap();
///
/// assert!(square.is_subclass_of(shape.handle()));
/// assert_eq!(square.instance_fields().len(), 2);
/// assert_eq!(square.instance_fields()[1].name(), "size");
/// ```
pub struct TypeBuilder {
    pub(super) path: Arc<str>,
    pub(super) kind: TypeKind,
    pub(super) flags: TypeFlags,
    pub(super) base: Option<Type>,
    pub(super) interfaces: Vec<TypeHandle>,
    pub(super) members: Vec<MemberDecl>,
    pub(super) constructor: Option<Constructor>,
}

impl TypeBuilder {
    fn new(path: &str, kind: TypeKind) -> Self {
        Self {
            path: Arc::from(path),
            kind,
            flags: TypeFlags::empty(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            constructor: None,
        }
    }

    /// A reference type with fields. Extends `object` unless
    /// [`extends`](Self::extends) says otherwise.
    pub fn class(path: &str) -> Self {
        Self::new(path, TypeKind::Class)
    }

    /// A value type with fields.
    pub fn structure(path: &str) -> Self {
        Self::new(path, TypeKind::Struct)
    }

    /// An interface, it may only declare properties.
    pub fn interface(path: &str) -> Self {
        Self::new(path, TypeKind::Interface)
    }

    /// A delegate type.
    pub fn delegate(path: &str) -> Self {
        Self::new(path, TypeKind::Delegate)
    }

    /// An unbound type parameter, e.g. the `T` of a generic definition.
    pub fn generic_parameter(path: &str) -> Self {
        Self::new(path, TypeKind::GenericParameter)
    }

    /// Adds attribute flags.
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Sets the base class.
    pub fn extends(mut self, base: &Type) -> Self {
        self.base = Some(base.clone());
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeHandle>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Declares a field. Instance fields take the next slot of the layout.
    pub fn field(mut self, name: &str, ty: impl Into<TypeHandle>, flags: MemberFlags) -> Self {
        self.members.push(MemberDecl::Field {
            name: Arc::from(name),
            ty: ty.into(),
            flags,
        });
        self
    }

    /// Declares a public constant.
    pub fn constant(mut self, name: &str, ty: impl Into<TypeHandle>, value: impl Into<Value>) -> Self {
        self.members.push(MemberDecl::Constant {
            name: Arc::from(name),
            ty: ty.into(),
            value: value.into(),
        });
        self
    }

    /// Declares a property with a getter and a setter.
    pub fn property<G, S>(
        self,
        name: &str,
        ty: impl Into<TypeHandle>,
        flags: MemberFlags,
        getter: G,
        setter: S,
    ) -> Self
    where
        G: Fn(Option<&dyn Instance>) -> Value + Send + Sync + 'static,
        S: Fn(Option<&mut dyn Instance>, Value) + Send + Sync + 'static,
    {
        self.push_property(name, ty.into(), flags, Some(Arc::new(getter)), Some(Arc::new(setter)))
    }

    /// Declares a property without a setter.
    pub fn readonly_property<G>(
        self,
        name: &str,
        ty: impl Into<TypeHandle>,
        flags: MemberFlags,
        getter: G,
    ) -> Self
    where
        G: Fn(Option<&dyn Instance>) -> Value + Send + Sync + 'static,
    {
        self.push_property(name, ty.into(), flags, Some(Arc::new(getter)), None)
    }

    /// Declares a property without a getter.
    pub fn writeonly_property<S>(
        self,
        name: &str,
        ty: impl Into<TypeHandle>,
        flags: MemberFlags,
        setter: S,
    ) -> Self
    where
        S: Fn(Option<&mut dyn Instance>, Value) + Send + Sync + 'static,
    {
        self.push_property(name, ty.into(), flags, None, Some(Arc::new(setter)))
    }

    fn push_property(
        mut self,
        name: &str,
        ty: TypeHandle,
        flags: MemberFlags,
        getter: Option<PropertyGetter>,
        setter: Option<PropertySetter>,
    ) -> Self {
        self.members.push(MemberDecl::Property {
            name: Arc::from(name),
            ty,
            flags,
            getter,
            setter,
        });
        self
    }

    /// Sets the initialization logic, see [`Constructor`].
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn Instance) + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(f));
        self
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }
}
