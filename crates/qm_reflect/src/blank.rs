//! Build zeroed instances without running user initialization logic.
//!
//! [`BlankFactory::make_blank`] answers, per type, either with a
//! [`Blank::Fresh`] instance whose fields all hold their default value, or with a
//! [`Blank::Substitute`]: the value a caller should use instead, because a fresh
//! instance makes no sense for the type (an interface, a string, a pointer...).
//!
//! | type | result |
//! |---|---|
//! | void, generic parameter, open generic definition | error |
//! | pointer | `Substitute(Pointer(0))` |
//! | by-ref-like struct, interface, abstract class, by-ref marker, delegate | `Substitute(Null)` |
//! | string | `Substitute("")` |
//! | array | `Substitute` of a new empty array |
//! | primitive | `Fresh` zero |
//! | struct, class | `Fresh` instance, constructors not run |

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use qm_utils::CacheMap;
use qm_utils::hash::NoOpHashState;

use crate::ReflectError;
use crate::info::{Type, TypeFlags, TypeHandle, TypeInfo, TypeKind};
use crate::registry::TypeRegistry;
use crate::value::{ArrayRef, Instance, ObjectRef, Value};

// -----------------------------------------------------------------------------
// Blank

/// The outcome of blank construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Blank {
    /// A new zero-filled instance.
    Fresh(Value),
    /// No fresh instance can be made, use this value in its place.
    Substitute(Value),
}

impl Blank {
    #[inline]
    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }

    #[inline]
    pub fn into_value(self) -> Value {
        match self {
            Self::Fresh(value) | Self::Substitute(value) => value,
        }
    }
}

#[derive(Clone)]
enum BlankPlan {
    Unsupported(&'static str),
    Substitute(Value),
    EmptyArray(Type),
    Zero(Value),
    Object { ty: Type, template: Arc<[Value]> },
}

impl BlankPlan {
    fn compile(registry: &TypeRegistry, ty: &Type) -> Self {
        if let Some(reason) = unsupported_reason(ty) {
            return Self::Unsupported(reason);
        }
        match ty.kind() {
            TypeKind::Pointer => Self::Substitute(Value::Pointer(0)),
            TypeKind::Struct if ty.flags().contains(TypeFlags::BY_REF_LIKE) => {
                Self::Substitute(Value::Null)
            }
            TypeKind::Interface | TypeKind::ByRef | TypeKind::Delegate => {
                Self::Substitute(Value::Null)
            }
            TypeKind::Class if ty.is_abstract() => Self::Substitute(Value::Null),
            TypeKind::String => Self::Substitute(Value::Str(Arc::from(""))),
            TypeKind::Array => Self::EmptyArray(ty.clone()),
            TypeKind::Class => Self::Object {
                ty: ty.clone(),
                template: ty
                    .instance_fields()
                    .iter()
                    .map(|field| registry.default_value(field.ty()))
                    .collect(),
            },
            _ => Self::Zero(registry.default_value(ty.handle())),
        }
    }

    fn instantiate(&self, ty: &TypeInfo) -> Result<Blank, ReflectError> {
        Ok(match self {
            Self::Unsupported(reason) => {
                return Err(ReflectError::UnsupportedType {
                    type_path: ty.shared_path().clone(),
                    reason: *reason,
                });
            }
            Self::Substitute(value) => Blank::Substitute(value.clone()),
            Self::EmptyArray(ty) => Blank::Substitute(Value::Array(ArrayRef::from_parts(
                ty.clone(),
                Box::new([]),
            ))),
            Self::Zero(value) => Blank::Fresh(value.clone()),
            Self::Object { ty, template } => {
                Blank::Fresh(Value::Object(ObjectRef::from_parts(ty.clone(), template.to_vec().into())))
            }
        })
    }
}

fn unsupported_reason(ty: &TypeInfo) -> Option<&'static str> {
    match ty.kind() {
        TypeKind::Void => Some("void has no instances"),
        TypeKind::GenericParameter => Some("open generic parameter"),
        _ if ty.flags().contains(TypeFlags::GENERIC_DEFINITION) => Some("open generic definition"),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// BlankFactory

/// Builds blank instances, with the strategy memoized per type.
///
/// # Examples
///
/// ```
/// use qm_reflect::blank::{Blank, BlankFactory};
/// use qm_reflect::info::MemberFlags;
/// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
/// use qm_reflect::value::Value;
///
/// let registry = TypeRegistry::new();
/// let i32_ty = registry.builtin(Builtin::I32);
/// let string = registry.builtin(Builtin::String);
///
/// let factory = BlankFactory::new();
/// assert_eq!(factory.make_blank(&registry, &i32_ty).unwrap(), Blank::Fresh(Value::I32(0)));
/// assert_eq!(factory.make_blank(&registry, &string).unwrap(), Blank::Substitute(Value::from("")));
///
/// let void = registry.builtin(Builtin::Void);
/// assert!(factory.make_blank(&registry, &void).is_err());
/// ```
pub struct BlankFactory {
    plans: CacheMap<TypeHandle, BlankPlan, NoOpHashState>,
}

impl Default for BlankFactory {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl BlankFactory {
    #[inline]
    pub const fn new() -> Self {
        Self {
            plans: CacheMap::with_hasher(NoOpHashState),
        }
    }

    /// Produces a blank instance of `ty`, see the [module docs](self).
    ///
    /// # Errors
    ///
    /// [`ReflectError::UnsupportedType`] for `void` and open generic types.
    pub fn make_blank(&self, registry: &TypeRegistry, ty: &Type) -> Result<Blank, ReflectError> {
        let handle = ty.handle();
        let plan = self.plans.get_or_insert_with(&handle, || {
            log::debug!("compiling blank strategy for `{ty}`");
            (handle, BlankPlan::compile(registry, ty))
        });
        plan.instantiate(ty)
    }

    /// Produces an initialized instance of `ty`: a blank instance on which the
    /// constructors of `ty` and its base classes run, base class first.
    ///
    /// # Errors
    ///
    /// [`ReflectError::UnsupportedType`] if `ty` is abstract, an interface, or
    /// cannot be blanked.
    pub fn create_instance(&self, registry: &TypeRegistry, ty: &Type) -> Result<Value, ReflectError> {
        if ty.is_abstract() || ty.is_interface() {
            return Err(ReflectError::UnsupportedType {
                type_path: ty.shared_path().clone(),
                reason: "abstract types cannot be instantiated",
            });
        }

        match self.make_blank(registry, ty)? {
            Blank::Substitute(value) => Ok(value),
            Blank::Fresh(Value::Object(mut obj)) => {
                run_constructors(ty, &mut obj);
                Ok(Value::Object(obj))
            }
            Blank::Fresh(Value::Struct(mut value)) => {
                run_constructors(ty, &mut value);
                Ok(Value::Struct(value))
            }
            Blank::Fresh(value) => Ok(value),
        }
    }

    /// Returns the number of memoized strategies.
    #[inline]
    pub fn len(&self) -> usize {
        self.plans.len()
    }
}

fn run_constructors(ty: &TypeInfo, instance: &mut dyn Instance) {
    let chain: Vec<&TypeInfo> = ty.ancestors().collect();
    for info in chain.into_iter().rev() {
        if let Some(constructor) = info.constructor() {
            constructor(&mut *instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::{Blank, BlankFactory};
    use crate::ErrorKind;
    use crate::info::{MemberFlags, TypeFlags};
    use crate::registry::{Builtin, TypeBuilder, TypeRegistry};
    use crate::value::Value;

    #[test]
    fn policy_per_kind() {
        let registry = TypeRegistry::new();
        let factory = BlankFactory::new();
        let i32_ty = registry.builtin(Builtin::I32);

        let pointer = registry.pointer_to(&i32_ty).unwrap();
        assert_eq!(
            factory.make_blank(&registry, &pointer).unwrap(),
            Blank::Substitute(Value::Pointer(0))
        );

        let by_ref = registry.by_ref_of(&i32_ty).unwrap();
        assert_eq!(
            factory.make_blank(&registry, &by_ref).unwrap(),
            Blank::Substitute(Value::Null)
        );

        let iface = registry.register(TypeBuilder::interface("demo::IShape")).unwrap();
        assert_eq!(
            factory.make_blank(&registry, &iface).unwrap(),
            Blank::Substitute(Value::Null)
        );

        let abstract_ty = registry
            .register(TypeBuilder::class("demo::Shape").with_flags(TypeFlags::ABSTRACT))
            .unwrap();
        assert_eq!(
            factory.make_blank(&registry, &abstract_ty).unwrap(),
            Blank::Substitute(Value::Null)
        );

        let callback = registry.register(TypeBuilder::delegate("demo::Callback")).unwrap();
        assert_eq!(
            factory.make_blank(&registry, &callback).unwrap(),
            Blank::Substitute(Value::Null)
        );

        let span = registry
            .register(TypeBuilder::structure("demo::Span").with_flags(TypeFlags::BY_REF_LIKE))
            .unwrap();
        assert_eq!(
            factory.make_blank(&registry, &span).unwrap(),
            Blank::Substitute(Value::Null)
        );

        let array = registry.array_of(&i32_ty).unwrap();
        let Blank::Substitute(Value::Array(first)) = factory.make_blank(&registry, &array).unwrap()
        else {
            panic!("expected an empty array");
        };
        let Blank::Substitute(Value::Array(second)) = factory.make_blank(&registry, &array).unwrap()
        else {
            panic!("expected an empty array");
        };
        assert!(first.is_empty());
        assert_eq!(first.ty(), &array);
        assert!(!crate::value::ArrayRef::ptr_eq(&first, &second));
    }

    #[test]
    fn open_generics_are_rejected() {
        let registry = TypeRegistry::new();
        let factory = BlankFactory::new();

        let param = registry.register(TypeBuilder::generic_parameter("T")).unwrap();
        let err = factory.make_blank(&registry, &param).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let list = registry
            .register(TypeBuilder::class("demo::List`1").with_flags(TypeFlags::GENERIC_DEFINITION))
            .unwrap();
        assert!(factory.make_blank(&registry, &list).is_err());
        assert!(factory.create_instance(&registry, &list).is_err());
    }

    #[test]
    fn blank_skips_constructors() {
        let registry = TypeRegistry::new();
        let factory = BlankFactory::new();
        let i32_ty = registry.builtin(Builtin::I32);
        let string = registry.builtin(Builtin::String);
        let calls = Arc::new(AtomicUsize::new(0));

        let base_calls = calls.clone();
        let base = registry
            .register(
                TypeBuilder::class("demo::Base")
                    .field("a", &i32_ty, MemberFlags::PUBLIC)
                    .constructor(move |inst| {
                        base_calls.fetch_add(1, Ordering::Relaxed);
                        inst.store_slot(0, Value::I32(1));
                    }),
            )
            .unwrap();
        let derived = registry
            .register(
                TypeBuilder::class("demo::Derived")
                    .extends(&base)
                    .field("name", &string, MemberFlags::PUBLIC)
                    .constructor(|inst| {
                        // The base constructor already ran.
                        let a = inst.load_slot(0);
                        assert_eq!(a, Some(Value::I32(1)));
                        inst.store_slot(1, Value::from("built"));
                    }),
            )
            .unwrap();

        let blank = factory.make_blank(&registry, &derived).unwrap();
        assert!(blank.is_fresh());
        let obj = blank.into_value().as_object().cloned().unwrap();
        assert_eq!(obj.snapshot().as_ref(), [Value::I32(0), Value::Null]);
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        let built = factory.create_instance(&registry, &derived).unwrap();
        let obj = built.as_object().unwrap();
        assert_eq!(obj.load(0), Some(Value::I32(1)));
        assert_eq!(obj.load(1), Some(Value::from("built")));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn struct_blanks_are_independent() {
        let registry = TypeRegistry::new();
        let factory = BlankFactory::new();
        let i32_ty = registry.builtin(Builtin::I32);

        let point = registry
            .register(
                TypeBuilder::structure("demo::Point")
                    .field("x", &i32_ty, MemberFlags::PUBLIC)
                    .constructor(|inst| {
                        inst.store_slot(0, Value::I32(5));
                    }),
            )
            .unwrap();

        let Blank::Fresh(Value::Struct(mut first)) = factory.make_blank(&registry, &point).unwrap()
        else {
            panic!("expected a struct");
        };
        first.set(0, Value::I32(3));
        let second = factory.make_blank(&registry, &point).unwrap().into_value();
        assert_eq!(second.as_struct().unwrap().field("x"), Some(&Value::I32(0)));

        let built = factory.create_instance(&registry, &point).unwrap();
        assert_eq!(built.as_struct().unwrap().field("x"), Some(&Value::I32(5)));
        assert_eq!(factory.len(), 1);
    }
}
