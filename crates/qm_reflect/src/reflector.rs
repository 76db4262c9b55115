use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::type_name;
use core::fmt;

use qm_utils::CacheMap;
use qm_utils::hash::NoOpHashState;

use crate::ReflectError;
use crate::access::{
    Getter, MemberKey, MemberKeyRef, Setter, TypedAccessorCache, TypedGetter, TypedSetter,
};
use crate::access::{compile_getter, compile_setter, compile_typed_getter, compile_typed_setter};
use crate::blank::{Blank, BlankFactory};
use crate::classify::TypeClassifier;
use crate::clone::{CloneContext, CloneHook, ClonePlan};
use crate::info::{BindingFlags, MemberInfo, Type, TypeHandle};
use crate::registry::TypeRegistry;
use crate::value::{ArrayRef, FromValue, Instance, Value};

// -----------------------------------------------------------------------------
// ReflectCaches

/// Every memoized table of a [`Reflector`].
///
/// All tables are insert-only: an entry, once published, lives as long as the
/// caches. Clones of a `Reflector` share one `ReflectCaches`.
pub struct ReflectCaches {
    members: CacheMap<MemberKey, MemberInfo>,
    getters: CacheMap<MemberKey, Getter>,
    setters: CacheMap<MemberKey, Setter>,
    typed: TypedAccessorCache,
    classifier: TypeClassifier,
    blanks: BlankFactory,
    plans: CacheMap<TypeHandle, ClonePlan, NoOpHashState>,
    hooks: CacheMap<TypeHandle, CloneHook, NoOpHashState>,
}

impl Default for ReflectCaches {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ReflectCaches {
    pub const fn new() -> Self {
        Self {
            members: CacheMap::new(),
            getters: CacheMap::new(),
            setters: CacheMap::new(),
            typed: TypedAccessorCache::new(),
            classifier: TypeClassifier::new(),
            blanks: BlankFactory::new(),
            plans: CacheMap::with_hasher(NoOpHashState),
            hooks: CacheMap::with_hasher(NoOpHashState),
        }
    }
}

impl fmt::Debug for ReflectCaches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectCaches")
            .field("members", &self.members.len())
            .field("getters", &self.getters.len())
            .field("setters", &self.setters.len())
            .field("typed", &self.typed)
            .field("classified", &self.classifier.len())
            .field("blanks", &self.blanks.len())
            .field("plans", &self.plans.len())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Reflector

/// The entry point for reflective access, blank construction and deep cloning.
///
/// A `Reflector` pairs a [`TypeRegistry`] with the caches compiled against it,
/// and the [`BindingFlags`] used to resolve member names. It is cheap to clone,
/// clones share the registry and the caches.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use qm_reflect::{ErrorKind, Reflector};
/// use qm_reflect::info::MemberFlags;
/// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
/// use qm_reflect::value::Value;
///
/// let registry = Arc::new(TypeRegistry::new());
/// let i32_ty = registry.builtin(Builtin::I32);
/// let counter = registry
///     .register(
///         TypeBuilder::class("demo::Counter")
///             .field("count", &i32_ty, MemberFlags::PUBLIC)
///             .field("total", &i32_ty, MemberFlags::PUBLIC | MemberFlags::STATIC),
///     )
///     .unwrap();
///
/// let reflector = Reflector::new(registry);
/// let c = reflector.create_instance(&counter).unwrap();
///
/// reflector.set_member(&counter, "count", Some(&c), Value::I32(3)).unwrap();
/// assert_eq!(reflector.get_member_as::<i32>(&counter, "count", Some(&c)).unwrap(), 3);
///
/// reflector.set_static_member(&counter, "total", Value::I32(10)).unwrap();
/// assert_eq!(reflector.get_static_member_as::<i32>(&counter, "total").unwrap(), 10);
///
/// let err = reflector.get_member(&counter, "total", Some(&c)).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
/// ```
#[derive(Clone)]
pub struct Reflector {
    registry: Arc<TypeRegistry>,
    caches: Arc<ReflectCaches>,
    binding: BindingFlags,
}

impl Reflector {
    /// Creates a reflector resolving every member, see [`BindingFlags::ALL_MEMBERS`].
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_binding(registry, BindingFlags::ALL_MEMBERS)
    }

    /// Creates a reflector resolving members with `binding`.
    ///
    /// Resolved members are cached under the requested name, so every binding
    /// gets its own caches.
    pub fn with_binding(registry: Arc<TypeRegistry>, binding: BindingFlags) -> Self {
        Self {
            registry,
            caches: Arc::new(ReflectCaches::new()),
            binding,
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn caches(&self) -> &ReflectCaches {
        &self.caches
    }

    #[inline]
    pub const fn binding(&self) -> BindingFlags {
        self.binding
    }

    // -------------------------------------------------------------------------
    // Member resolution

    /// Resolves `name` on `ty` with the binding flags of this reflector.
    ///
    /// # Errors
    ///
    /// [`ReflectError::MemberNotFound`] and [`ReflectError::AmbiguousMember`].
    /// Failures are not cached.
    pub fn resolve_member(&self, ty: &Type, name: &str) -> Result<MemberInfo, ReflectError> {
        let key = MemberKeyRef::new(ty.handle(), name);
        self.caches.members.get_or_try_insert_with(&key, || {
            let member = ty.resolve_member(name, self.binding)?;
            Ok((key.into_owned(), member))
        })
    }

    /// Returns the cached getter of `ty::name`.
    pub fn getter(&self, ty: &Type, name: &str) -> Result<Getter, ReflectError> {
        let key = MemberKeyRef::new(ty.handle(), name);
        self.caches.getters.get_or_try_insert_with(&key, || {
            let member = self.resolve_member(ty, name)?;
            Ok((key.into_owned(), compile_getter(&self.registry, ty, &member)?))
        })
    }

    /// Returns the cached setter of `ty::name`.
    pub fn setter(&self, ty: &Type, name: &str) -> Result<Setter, ReflectError> {
        let key = MemberKeyRef::new(ty.handle(), name);
        self.caches.setters.get_or_try_insert_with(&key, || {
            let member = self.resolve_member(ty, name)?;
            Ok((key.into_owned(), compile_setter(&self.registry, ty, &member)?))
        })
    }

    /// Returns the cached getter of `ty::name` taking the instance as `&T`.
    pub fn typed_getter<T: Instance>(&self, ty: &Type, name: &str) -> Result<TypedGetter<T>, ReflectError> {
        self.caches
            .typed
            .get_or_try_insert_with(MemberKeyRef::new(ty.handle(), name), || {
                let member = self.resolve_member(ty, name)?;
                compile_typed_getter::<T>(ty, &member)
            })
    }

    /// Returns the cached setter of `ty::name` taking the instance as `&mut T`.
    pub fn typed_setter<T: Instance>(&self, ty: &Type, name: &str) -> Result<TypedSetter<T>, ReflectError> {
        self.caches
            .typed
            .get_or_try_insert_with(MemberKeyRef::new(ty.handle(), name), || {
                let member = self.resolve_member(ty, name)?;
                compile_typed_setter::<T>(&self.registry, ty, &member)
            })
    }

    // -------------------------------------------------------------------------
    // Opaque access

    /// Reads `ty::name` from `instance`, which must be `None` or `Null` for
    /// static members.
    ///
    /// # Errors
    ///
    /// - [`ReflectError::MemberNotFound`], [`ReflectError::AmbiguousMember`].
    /// - [`ReflectError::StaticWithInstance`], [`ReflectError::InstanceWithNull`].
    /// - [`ReflectError::MissingAccessor`] for a property without a getter.
    /// - [`ReflectError::TypeMismatch`] if `instance` is not an instance of `ty`.
    pub fn get_member(&self, ty: &Type, name: &str, instance: Option<&Value>) -> Result<Value, ReflectError> {
        let getter = self.getter(ty, name)?;
        getter(instance)
    }

    /// Assigns `ty::name` on `instance`, which must be `None` or `Null` for
    /// static members.
    ///
    /// # Errors
    ///
    /// Those of [`get_member`](Self::get_member), plus:
    ///
    /// - [`ReflectError::ConstantMember`] for constants.
    /// - [`ReflectError::UnsupportedMutation`] for instance members of a struct,
    ///   see [`set_member_typed`](Self::set_member_typed).
    /// - [`ReflectError::TypeMismatch`] if `value` does not fit the declared type.
    pub fn set_member(
        &self,
        ty: &Type,
        name: &str,
        instance: Option<&Value>,
        value: Value,
    ) -> Result<(), ReflectError> {
        let setter = self.setter(ty, name)?;
        setter(instance, value)
    }

    #[inline]
    pub fn get_static_member(&self, ty: &Type, name: &str) -> Result<Value, ReflectError> {
        self.get_member(ty, name, None)
    }

    #[inline]
    pub fn set_static_member(&self, ty: &Type, name: &str, value: Value) -> Result<(), ReflectError> {
        self.set_member(ty, name, None, value)
    }

    // -------------------------------------------------------------------------
    // Typed access

    /// Reads `name` from `instance`, resolved on its runtime type.
    pub fn get_member_typed<T: Instance>(&self, instance: &T, name: &str) -> Result<Value, ReflectError> {
        let getter = self.typed_getter::<T>(instance.instance_type(), name)?;
        getter(instance)
    }

    /// Assigns `name` on `instance` in place, resolved on its runtime type.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use qm_reflect::Reflector;
    /// use qm_reflect::info::MemberFlags;
    /// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
    /// use qm_reflect::value::{StructValue, Value};
    ///
    /// let registry = Arc::new(TypeRegistry::new());
    /// let f64_ty = registry.builtin(Builtin::F64);
    /// let vec2 = registry
    ///     .register(
    ///         TypeBuilder::structure("demo::Vec2")
    ///             .field("x", &f64_ty, MemberFlags::PUBLIC)
    ///             .field("y", &f64_ty, MemberFlags::PUBLIC),
    ///     )
    ///     .unwrap();
    ///
    /// let reflector = Reflector::new(registry);
    /// let mut v: StructValue = reflector.create_instance_as(&vec2).unwrap();
    ///
    /// reflector.set_member_typed(&mut v, "x", Value::F64(1.5)).unwrap();
    /// assert_eq!(reflector.get_member_typed_as::<_, f64>(&v, "x").unwrap(), 1.5);
    /// ```
    pub fn set_member_typed<T: Instance>(
        &self,
        instance: &mut T,
        name: &str,
        value: Value,
    ) -> Result<(), ReflectError> {
        let setter = self.typed_setter::<T>(instance.instance_type(), name)?;
        setter(instance, value)
    }

    // -------------------------------------------------------------------------
    // Converting access

    /// [`get_member`](Self::get_member), converted to `R`.
    ///
    /// # Errors
    ///
    /// [`ReflectError::TypeMismatch`] naming both types if the value is not an `R`.
    pub fn get_member_as<R: FromValue>(
        &self,
        ty: &Type,
        name: &str,
        instance: Option<&Value>,
    ) -> Result<R, ReflectError> {
        convert(self.get_member(ty, name, instance)?)
    }

    #[inline]
    pub fn get_static_member_as<R: FromValue>(&self, ty: &Type, name: &str) -> Result<R, ReflectError> {
        convert(self.get_static_member(ty, name)?)
    }

    #[inline]
    pub fn get_member_typed_as<T: Instance, R: FromValue>(
        &self,
        instance: &T,
        name: &str,
    ) -> Result<R, ReflectError> {
        convert(self.get_member_typed(instance, name)?)
    }

    // -------------------------------------------------------------------------
    // Classification and construction

    /// Returns `true` if values of `ty` can never hold a reference.
    #[inline]
    pub fn is_trivial(&self, ty: &Type) -> bool {
        self.caches.classifier.is_trivial(&self.registry, ty)
    }

    /// See [`BlankFactory::make_blank`].
    #[inline]
    pub fn make_blank(&self, ty: &Type) -> Result<Blank, ReflectError> {
        self.caches.blanks.make_blank(&self.registry, ty)
    }

    /// See [`BlankFactory::create_instance`].
    #[inline]
    pub fn create_instance(&self, ty: &Type) -> Result<Value, ReflectError> {
        self.caches.blanks.create_instance(&self.registry, ty)
    }

    /// [`create_instance`](Self::create_instance), converted to `R`.
    pub fn create_instance_as<R: FromValue>(&self, ty: &Type) -> Result<R, ReflectError> {
        convert(self.create_instance(ty)?)
    }

    /// Creates an array of `element` holding `items`.
    ///
    /// # Errors
    ///
    /// [`ReflectError::TypeMismatch`] if an item does not fit `element`.
    pub fn new_array(&self, element: &Type, items: Vec<Value>) -> Result<Value, ReflectError> {
        if let Some(item) = items.iter().find(|item| !item.is_instance_of(element)) {
            return Err(ReflectError::mismatch(item.type_name(), element.path().to_owned()));
        }
        let ty = self.registry.array_of(element)?;
        Ok(Value::Array(ArrayRef::from_parts(ty, items.into_boxed_slice())))
    }

    // -------------------------------------------------------------------------
    // Deep clone

    /// Deep clones `instance`, a value of `ty`, with a fresh [`CloneContext`].
    ///
    /// See the [`clone`](crate::clone) module for the rules.
    ///
    /// # Errors
    ///
    /// - [`ReflectError::UnsupportedType`] if `ty` is abstract, an interface or
    ///   an open generic type.
    /// - [`ReflectError::TypeMismatch`] if `instance` is not an instance of `ty`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use qm_reflect::Reflector;
    /// use qm_reflect::info::MemberFlags;
    /// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
    /// use qm_reflect::value::Value;
    ///
    /// let registry = Arc::new(TypeRegistry::new());
    /// let i32_ty = registry.builtin(Builtin::I32);
    /// let array = registry.array_of(&i32_ty).unwrap();
    ///
    /// let reflector = Reflector::new(registry);
    /// let items = reflector.new_array(&i32_ty, vec![Value::I32(1), Value::I32(2)]).unwrap();
    /// let copy = reflector.deep_clone(&array, &items).unwrap();
    ///
    /// assert!(!copy.same_reference(&items));
    /// assert_eq!(copy.as_array().unwrap().get(1), Some(Value::I32(2)));
    /// assert_eq!(reflector.deep_clone(&i32_ty, &Value::I32(9)).unwrap(), Value::I32(9));
    /// ```
    pub fn deep_clone(&self, ty: &Type, instance: &Value) -> Result<Value, ReflectError> {
        let mut ctx = CloneContext::new();
        crate::clone::deep_clone_in(self, &mut ctx, ty, instance)
    }

    /// Deep clones `instance` within `ctx`.
    ///
    /// Meant for clone hooks: the nested clone shares the visited set of the
    /// enclosing one, which is only cleared when the outermost call returns.
    #[inline]
    pub fn deep_clone_in(
        &self,
        ctx: &mut CloneContext,
        ty: &Type,
        instance: &Value,
    ) -> Result<Value, ReflectError> {
        crate::clone::deep_clone_in(self, ctx, ty, instance)
    }

    /// Deep clones `value` within `ctx`, dispatching on its runtime type only.
    #[inline]
    pub fn clone_value(&self, ctx: &mut CloneContext, value: &Value) -> Result<Value, ReflectError> {
        crate::clone::clone_value(self, ctx, value)
    }

    /// Installs `hook` as the clone routine of runtime type `ty`.
    ///
    /// Returns `false`, and keeps the installed hook, if one already exists.
    pub fn register_clone_hook<F>(&self, ty: &Type, hook: F) -> bool
    where
        F: Fn(&Reflector, &mut CloneContext, &Value) -> Result<Value, ReflectError> + Send + Sync + 'static,
    {
        let inserted = self
            .caches
            .hooks
            .insert_if_absent(ty.handle(), Arc::new(hook) as CloneHook);
        if !inserted {
            log::warn!("a clone hook is already registered for `{ty}`, the new one is ignored");
        }
        inserted
    }

    pub(crate) fn clone_hook(&self, ty: &Type) -> Option<CloneHook> {
        if self.caches.hooks.is_empty() {
            return None;
        }
        self.caches.hooks.get(&ty.handle())
    }

    pub(crate) fn clone_plan(&self, ty: &Type) -> ClonePlan {
        let handle = ty.handle();
        self.caches.plans.get_or_insert_with(&handle, || {
            log::debug!("compiling clone plan for `{ty}`");
            (handle, ClonePlan::compile(ty, self.is_trivial(ty)))
        })
    }
}

impl fmt::Debug for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflector")
            .field("types", &self.registry.len())
            .field("binding", &self.binding)
            .field("caches", &self.caches)
            .finish()
    }
}

fn convert<R: FromValue>(value: Value) -> Result<R, ReflectError> {
    R::from_value(value).map_err(|value| ReflectError::mismatch(value.type_name(), type_name::<R>()))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::thread;

    use super::Reflector;
    use crate::blank::Blank;
    use crate::info::{BindingFlags, MemberFlags, Type, TypeKind};
    use crate::registry::{Builtin, TypeBuilder, TypeRegistry};
    use crate::value::{DelegateRef, ObjectRef, StructValue, Value};
    use crate::{ErrorKind, ReflectError};

    struct Fixture {
        reflector: Reflector,
        node: Type,
        pair_a: Type,
        pair_b: Type,
        label: Type,
        vec2: Type,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(TypeRegistry::new());
        let i32_ty = registry.builtin(Builtin::I32);
        let f64_ty = registry.builtin(Builtin::F64);
        let string = registry.builtin(Builtin::String);

        let node_handle = registry.reserve("demo::Node", TypeKind::Class).unwrap();
        let node = registry
            .define(
                node_handle,
                TypeBuilder::class("demo::Node")
                    .field("value", &i32_ty, MemberFlags::PUBLIC)
                    .field("next", node_handle, MemberFlags::empty()),
            )
            .unwrap();

        let a_handle = registry.reserve("demo::A", TypeKind::Class).unwrap();
        let b_handle = registry.reserve("demo::B", TypeKind::Class).unwrap();
        let pair_a = registry
            .define(a_handle, TypeBuilder::class("demo::A").field("b", b_handle, MemberFlags::PUBLIC))
            .unwrap();
        let pair_b = registry
            .define(b_handle, TypeBuilder::class("demo::B").field("a", a_handle, MemberFlags::PUBLIC))
            .unwrap();

        let label = registry
            .register(
                TypeBuilder::class("demo::Label")
                    .field("text", &string, MemberFlags::PUBLIC)
                    .field("Size", &i32_ty, MemberFlags::PUBLIC)
                    .field("size", &i32_ty, MemberFlags::PUBLIC)
                    .constant("MAX", &i32_ty, 64_i32)
                    .readonly_property("len", &i32_ty, MemberFlags::PUBLIC, |_| Value::I32(5)),
            )
            .unwrap();

        let vec2 = registry
            .register(
                TypeBuilder::structure("demo::Vec2")
                    .field("x", &f64_ty, MemberFlags::PUBLIC)
                    .field("y", &f64_ty, MemberFlags::PUBLIC),
            )
            .unwrap();

        Fixture {
            reflector: Reflector::new(registry),
            node,
            pair_a,
            pair_b,
            label,
            vec2,
        }
    }

    fn new_node(fx: &Fixture, value: i32, next: Value) -> Value {
        let node = fx.reflector.create_instance(&fx.node).unwrap();
        fx.reflector.set_member(&fx.node, "value", Some(&node), Value::I32(value)).unwrap();
        fx.reflector.set_member(&fx.node, "next", Some(&node), next).unwrap();
        node
    }

    #[test]
    fn member_round_trip() {
        let fx = fixture();
        let r = &fx.reflector;
        let label = r.create_instance(&fx.label).unwrap();

        r.set_member(&fx.label, "text", Some(&label), Value::from("hi")).unwrap();
        r.set_member(&fx.label, "size", Some(&label), Value::I32(12)).unwrap();

        assert_eq!(r.get_member_as::<String>(&fx.label, "text", Some(&label)).unwrap(), "hi");
        assert_eq!(r.get_member(&fx.label, "size", Some(&label)).unwrap(), Value::I32(12));
        assert_eq!(r.get_member(&fx.label, "Size", Some(&label)).unwrap(), Value::I32(0));
        assert_eq!(r.get_static_member(&fx.label, "MAX").unwrap(), Value::I32(64));
        assert_eq!(r.get_member(&fx.label, "len", Some(&label)).unwrap(), Value::I32(5));

        // Compiled once, then served from the caches.
        assert!(Arc::ptr_eq(
            &r.getter(&fx.label, "size").unwrap(),
            &r.getter(&fx.label, "size").unwrap()
        ));
    }

    #[test]
    fn lookup_errors() {
        let fx = fixture();
        let r = &fx.reflector;
        let label = r.create_instance(&fx.label).unwrap();

        let err = r.get_member(&fx.label, "missing", Some(&label)).unwrap_err();
        assert!(matches!(err, ReflectError::MemberNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let ignore_case = Reflector::with_binding(
            r.registry().clone(),
            BindingFlags::ALL_MEMBERS | BindingFlags::IGNORE_CASE,
        );
        let err = ignore_case.get_member(&fx.label, "SIZE", Some(&label)).unwrap_err();
        assert!(matches!(err, ReflectError::AmbiguousMember { matches: 2, .. }));

        // Lookup errors pass through the converting wrappers unchanged.
        let err = ignore_case.get_member_as::<i32>(&fx.label, "size", Some(&label)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousMember);
    }

    #[test]
    fn static_and_instance_misuse() {
        let fx = fixture();
        let r = &fx.reflector;
        let label = r.create_instance(&fx.label).unwrap();

        let err = r.get_member(&fx.label, "MAX", Some(&label)).unwrap_err();
        assert!(matches!(err, ReflectError::StaticWithInstance { .. }));

        let err = r.get_member(&fx.label, "size", None).unwrap_err();
        assert!(matches!(err, ReflectError::InstanceWithNull { .. }));
        let err = r.set_member(&fx.label, "size", Some(&Value::Null), Value::I32(1)).unwrap_err();
        assert!(matches!(err, ReflectError::InstanceWithNull { .. }));

        let err = r.set_static_member(&fx.label, "MAX", Value::I32(1)).unwrap_err();
        assert!(matches!(err, ReflectError::ConstantMember { .. }));

        let err = r.set_member(&fx.label, "len", Some(&label), Value::I32(1)).unwrap_err();
        assert!(matches!(err, ReflectError::MissingAccessor { .. }));

        let node = r.create_instance(&fx.node).unwrap();
        let err = r.get_member(&fx.label, "size", Some(&node)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = r.set_member(&fx.label, "size", Some(&label), Value::from("big")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn struct_mutation_needs_typed_form() {
        let fx = fixture();
        let r = &fx.reflector;
        let v = r.create_instance(&fx.vec2).unwrap();

        let err = r.set_member(&fx.vec2, "x", Some(&v), Value::F64(1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMutation);
        assert_eq!(r.get_member(&fx.vec2, "y", Some(&v)).unwrap(), Value::F64(0.0));

        let mut v: StructValue = r.create_instance_as(&fx.vec2).unwrap();
        r.set_member_typed(&mut v, "x", Value::F64(2.5)).unwrap();
        assert_eq!(v.field("x"), Some(&Value::F64(2.5)));
        assert_eq!(r.get_member_typed_as::<_, f64>(&v, "x").unwrap(), 2.5);

        let label: ObjectRef = r.create_instance_as(&fx.label).unwrap();
        let err = r.get_member_typed(&label, "MAX").unwrap_err();
        assert!(matches!(err, ReflectError::StaticWithInstance { .. }));
    }

    #[test]
    fn failed_conversion_names_both_types() {
        let fx = fixture();
        let r = &fx.reflector;
        let err = r.get_static_member_as::<bool>(&fx.label, "MAX").unwrap_err();
        match err {
            ReflectError::TypeMismatch { found, expected } => {
                assert_eq!(found, "i32");
                assert_eq!(expected, "bool");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_skips_constructors() {
        let registry = Arc::new(TypeRegistry::new());
        let i32_ty = registry.builtin(Builtin::I32);
        let ty = registry
            .register(
                TypeBuilder::class("demo::Seeded")
                    .field("seed", &i32_ty, MemberFlags::PUBLIC)
                    .constructor(|instance| {
                        instance.store_slot(0, Value::I32(42));
                    }),
            )
            .unwrap();
        let r = Reflector::new(registry);

        let blank = r.make_blank(&ty).unwrap();
        assert!(blank.is_fresh());
        let blank = blank.into_value();
        assert_eq!(r.get_member(&ty, "seed", Some(&blank)).unwrap(), Value::I32(0));

        let created = r.create_instance(&ty).unwrap();
        assert_eq!(r.get_member(&ty, "seed", Some(&created)).unwrap(), Value::I32(42));
    }

    #[test]
    fn trivial_values_clone_to_themselves() {
        let fx = fixture();
        let r = &fx.reflector;
        let mut v: StructValue = r.create_instance_as(&fx.vec2).unwrap();
        r.set_member_typed(&mut v, "y", Value::F64(-1.0)).unwrap();
        let v = Value::Struct(v);

        assert!(r.is_trivial(&fx.vec2));
        let mut ctx = crate::clone::CloneContext::new();
        let copy = r.deep_clone_in(&mut ctx, &fx.vec2, &v).unwrap();
        assert_eq!(copy, v);
        assert_eq!(ctx.fields_visited(), 0);

        let i32_ty = r.registry().builtin(Builtin::I32);
        assert_eq!(r.deep_clone(&i32_ty, &Value::I32(7)).unwrap(), Value::I32(7));
        assert_eq!(r.deep_clone(&fx.node, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn clone_node_chain() {
        let fx = fixture();
        let r = &fx.reflector;
        let n2 = new_node(&fx, 2, Value::Null);
        let n1 = new_node(&fx, 1, n2.clone());

        let c1 = r.deep_clone(&fx.node, &n1).unwrap();
        assert!(!c1.same_reference(&n1));
        assert_eq!(r.get_member(&fx.node, "value", Some(&c1)).unwrap(), Value::I32(1));

        let c2 = r.get_member(&fx.node, "next", Some(&c1)).unwrap();
        assert!(!c2.same_reference(&n2));
        assert_eq!(r.get_member(&fx.node, "value", Some(&c2)).unwrap(), Value::I32(2));
        assert!(r.get_member(&fx.node, "next", Some(&c2)).unwrap().is_null());
    }

    #[test]
    fn cycle_resolves_to_original() {
        let fx = fixture();
        let r = &fx.reflector;
        let a = r.create_instance(&fx.pair_a).unwrap();
        let b = r.create_instance(&fx.pair_b).unwrap();
        r.set_member(&fx.pair_a, "b", Some(&a), b.clone()).unwrap();
        r.set_member(&fx.pair_b, "a", Some(&b), a.clone()).unwrap();

        let a2 = r.deep_clone(&fx.pair_a, &a).unwrap();
        let b2 = r.get_member(&fx.pair_a, "b", Some(&a2)).unwrap();
        assert!(!a2.same_reference(&a));
        assert!(!b2.same_reference(&b));

        let back = r.get_member(&fx.pair_b, "a", Some(&b2)).unwrap();
        assert!(back.same_reference(&a));
    }

    #[test]
    fn shared_node_resolves_to_original() {
        let fx = fixture();
        let r = &fx.reflector;
        let shared = new_node(&fx, 9, Value::Null);
        let node_array = r.registry().array_of(&fx.node).unwrap();
        let items = r.new_array(&fx.node, vec![shared.clone(), shared.clone()]).unwrap();

        let copy = r.deep_clone(&node_array, &items).unwrap();
        let copy = copy.as_array().unwrap();
        let first = copy.get(0).unwrap();
        let second = copy.get(1).unwrap();

        assert!(!first.same_reference(&shared));
        assert!(second.same_reference(&shared));
    }

    #[test]
    fn strings_keep_their_handle() {
        let fx = fixture();
        let r = &fx.reflector;
        let label = r.create_instance(&fx.label).unwrap();
        let text = Value::from("shared text");
        r.set_member(&fx.label, "text", Some(&label), text.clone()).unwrap();

        let copy = r.deep_clone(&fx.label, &label).unwrap();
        let copied = r.get_member(&fx.label, "text", Some(&copy)).unwrap();
        assert!(copied.same_reference(&text));

        let string = r.registry().builtin(Builtin::String);
        let strings = r.registry().array_of(&string).unwrap();
        let items = r
            .new_array(&string, vec![Value::from("a"), Value::from("b")])
            .unwrap();
        let copy = r.deep_clone(&strings, &items).unwrap();
        assert!(!copy.same_reference(&items));

        let (source, copy) = (items.as_array().unwrap(), copy.as_array().unwrap());
        assert_eq!(copy.len(), 2);
        for index in 0..2 {
            assert!(copy.get(index).unwrap().same_reference(&source.get(index).unwrap()));
        }
    }

    #[test]
    fn clone_preconditions() {
        let fx = fixture();
        let r = &fx.reflector;
        let registry = r.registry();

        let shape = registry.register(TypeBuilder::interface("demo::Shape")).unwrap();
        let err = r.deep_clone(&shape, &Value::Null).unwrap_err();
        assert!(matches!(err, ReflectError::UnsupportedType { .. }));

        let node = r.create_instance(&fx.node).unwrap();
        let err = r.deep_clone(&fx.label, &node).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let callback = registry.register(TypeBuilder::delegate("demo::Callback")).unwrap();
        let delegate = Value::Delegate(DelegateRef::new(&callback, |_| Value::Null).unwrap());
        assert_eq!(r.deep_clone(&callback, &delegate).unwrap(), Value::Null);
        assert_eq!(r.make_blank(&callback).unwrap(), Blank::Substitute(Value::Null));
    }

    #[test]
    fn hook_shares_visited_set() {
        let fx = fixture();
        let r = &fx.reflector;
        let a = r.create_instance(&fx.pair_a).unwrap();
        let b = r.create_instance(&fx.pair_b).unwrap();
        r.set_member(&fx.pair_a, "b", Some(&a), b.clone()).unwrap();
        r.set_member(&fx.pair_b, "a", Some(&b), a.clone()).unwrap();

        let pair_a = fx.pair_a.clone();
        let pair_b = fx.pair_b.clone();
        let installed = r.register_clone_hook(&fx.pair_a, move |r, ctx, value| {
            assert!(ctx.is_visited(value));
            let copy = r.create_instance(&pair_a)?;
            let b = r.get_member(&pair_a, "b", Some(value))?;
            let b = r.deep_clone_in(ctx, &pair_b, &b)?;
            assert_eq!(ctx.depth(), 1);
            assert!(ctx.is_visited(value));
            r.set_member(&pair_a, "b", Some(&copy), b)?;
            Ok(copy)
        });
        assert!(installed);
        assert!(!r.register_clone_hook(&fx.pair_a, |_, _, value| Ok(value.clone())));

        let a2 = r.deep_clone(&fx.pair_a, &a).unwrap();
        let b2 = r.get_member(&fx.pair_a, "b", Some(&a2)).unwrap();
        assert!(!b2.same_reference(&b));
        // The nested clone saw `a` as visited.
        assert!(r.get_member(&fx.pair_b, "a", Some(&b2)).unwrap().same_reference(&a));
    }

    #[test]
    fn caches_are_shared_across_threads() {
        let fx = fixture();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let r = fx.reflector.clone();
                let node = fx.node.clone();
                thread::spawn(move || {
                    let n = r.create_instance(&node).unwrap();
                    r.set_member(&node, "value", Some(&n), Value::I32(i)).unwrap();
                    let c = r.deep_clone(&node, &n).unwrap();
                    r.get_member_as::<i32>(&node, "value", Some(&c)).unwrap()
                })
            })
            .collect();

        let mut seen: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert!(fx.reflector.caches().getters.len() >= 1);
    }

    #[test]
    fn hooks_leave_arrays_to_the_engine() {
        let fx = fixture();
        let r = &fx.reflector;
        let i32_ty = r.registry().builtin(Builtin::I32);
        let i32_array = r.registry().array_of(&i32_ty).unwrap();

        assert!(r.register_clone_hook(&i32_array, |_, _, value| Ok(value.clone())));
        assert!(r.register_clone_hook(&fx.vec2, |_, _, _| Ok(Value::Null)));

        let items = r.new_array(&i32_ty, vec![Value::I32(4), Value::I32(5)]).unwrap();
        let copy = r.deep_clone(&i32_array, &items).unwrap();
        assert!(!copy.same_reference(&items));
        let Value::Array(copy) = copy else { panic!("expected an array") };
        assert_eq!(copy.snapshot().as_ref(), &[Value::I32(4), Value::I32(5)]);

        let v = r.create_instance(&fx.vec2).unwrap();
        assert_eq!(r.deep_clone(&fx.vec2, &v).unwrap(), v);
    }

    #[test]
    fn clone_struct_holding_a_reference() {
        let fx = fixture();
        let r = &fx.reflector;
        let i32_ty = r.registry().builtin(Builtin::I32);
        let holder = r
            .registry()
            .register(
                TypeBuilder::structure("demo::Holder")
                    .field("node", &fx.node, MemberFlags::PUBLIC)
                    .field("n", &i32_ty, MemberFlags::PUBLIC),
            )
            .unwrap();
        assert!(!r.is_trivial(&holder));

        let node = new_node(&fx, 3, Value::Null);
        let mut h: StructValue = r.create_instance_as(&holder).unwrap();
        r.set_member_typed(&mut h, "node", node.clone()).unwrap();
        r.set_member_typed(&mut h, "n", Value::I32(4)).unwrap();
        let h = Value::Struct(h);

        let Value::Struct(copy) = r.deep_clone(&holder, &h).unwrap() else {
            panic!("expected a struct");
        };
        assert_eq!(copy.field("n"), Some(&Value::I32(4)));

        let node_copy = copy.field("node").unwrap();
        assert!(!node_copy.same_reference(&node));
        assert_eq!(r.get_member(&fx.node, "value", Some(node_copy)).unwrap(), Value::I32(3));
    }

    #[test]
    fn clone_through_base_type_copies_inherited_fields() {
        let fx = fixture();
        let r = &fx.reflector;
        let i32_ty = r.registry().builtin(Builtin::I32);
        let base = r
            .registry()
            .register(
                TypeBuilder::class("demo::Base")
                    .field("k", &i32_ty, MemberFlags::empty())
                    .field("leaf", &fx.node, MemberFlags::PUBLIC),
            )
            .unwrap();
        let derived = r
            .registry()
            .register(
                TypeBuilder::class("demo::Derived")
                    .extends(&base)
                    .field("n", &i32_ty, MemberFlags::PUBLIC),
            )
            .unwrap();

        let leaf = new_node(&fx, 1, Value::Null);
        let d = r.create_instance(&derived).unwrap();
        r.set_member(&base, "k", Some(&d), Value::I32(7)).unwrap();
        r.set_member(&base, "leaf", Some(&d), leaf.clone()).unwrap();
        r.set_member(&derived, "n", Some(&d), Value::I32(4)).unwrap();

        let copy = r.deep_clone(&base, &d).unwrap();
        assert!(!copy.same_reference(&d));
        let Value::Object(obj) = &copy else { panic!("expected an object") };
        assert_eq!(obj.ty(), &derived);
        assert_eq!(r.get_member(&base, "k", Some(&copy)).unwrap(), Value::I32(7));
        assert_eq!(r.get_member(&derived, "n", Some(&copy)).unwrap(), Value::I32(4));

        let leaf_copy = r.get_member(&base, "leaf", Some(&copy)).unwrap();
        assert!(!leaf_copy.same_reference(&leaf));
        assert_eq!(r.get_member(&fx.node, "value", Some(&leaf_copy)).unwrap(), Value::I32(1));
    }

    #[test]
    fn clone_skips_statics_and_constants() {
        let fx = fixture();
        let r = &fx.reflector;
        let i32_ty = r.registry().builtin(Builtin::I32);
        let counter = r
            .registry()
            .register(
                TypeBuilder::class("demo::Counter")
                    .field("value", &i32_ty, MemberFlags::PUBLIC)
                    .field("total", &i32_ty, MemberFlags::PUBLIC | MemberFlags::STATIC)
                    .constant("LIMIT", &i32_ty, 10_i32),
            )
            .unwrap();

        let c = r.create_instance(&counter).unwrap();
        r.set_member(&counter, "value", Some(&c), Value::I32(2)).unwrap();
        r.set_static_member(&counter, "total", Value::I32(5)).unwrap();

        let mut ctx = crate::clone::CloneContext::new();
        let copy = r.deep_clone_in(&mut ctx, &counter, &c).unwrap();
        assert_eq!(ctx.fields_visited(), 1);
        assert_eq!(r.get_member(&counter, "value", Some(&copy)).unwrap(), Value::I32(2));
        assert_eq!(r.get_static_member(&counter, "total").unwrap(), Value::I32(5));
        assert_eq!(r.get_static_member(&counter, "LIMIT").unwrap(), Value::I32(10));
    }

    #[test]
    fn interface_properties() {
        let fx = fixture();
        let r = &fx.reflector;
        let i32_ty = r.registry().builtin(Builtin::I32);
        let iface = r
            .registry()
            .register(TypeBuilder::interface("demo::IHas").property(
                "p",
                &i32_ty,
                MemberFlags::PUBLIC,
                |instance| instance.and_then(|i| i.load_slot(0)).unwrap_or_default(),
                |instance, value| {
                    if let Some(i) = instance {
                        i.store_slot(0, value);
                    }
                },
            ))
            .unwrap();
        let holder = r
            .registry()
            .register(
                TypeBuilder::structure("demo::S")
                    .implements(&iface)
                    .field("p", &i32_ty, MemberFlags::PUBLIC),
            )
            .unwrap();
        let boxed = r
            .registry()
            .register(
                TypeBuilder::class("demo::Boxed")
                    .implements(&iface)
                    .field("p", &i32_ty, MemberFlags::PUBLIC),
            )
            .unwrap();

        // Class instances are assigned through the interface.
        let obj = r.create_instance(&boxed).unwrap();
        r.set_member(&iface, "p", Some(&obj), Value::I32(3)).unwrap();
        assert_eq!(r.get_member(&iface, "p", Some(&obj)).unwrap(), Value::I32(3));
        assert_eq!(r.get_member(&boxed, "p", Some(&obj)).unwrap(), Value::I32(3));

        // An opaque struct is a copy: reading works, assigning is refused.
        let s = r.create_instance(&holder).unwrap();
        assert_eq!(r.get_member(&iface, "p", Some(&s)).unwrap(), Value::I32(0));
        let err = r.set_member(&iface, "p", Some(&s), Value::I32(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMutation);

        // The by-reference form assigns it in place.
        let mut s: StructValue = r.create_instance_as(&holder).unwrap();
        let set = r.typed_setter::<StructValue>(&iface, "p").unwrap();
        set(&mut s, Value::I32(8)).unwrap();
        assert_eq!(s.field("p"), Some(&Value::I32(8)));

        let err = r.set_member(&iface, "p", Some(&obj), Value::from("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}
