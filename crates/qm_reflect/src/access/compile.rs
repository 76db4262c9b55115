use alloc::borrow::Cow;
use alloc::string::ToString;
use alloc::sync::Arc;

use crate::info::{MemberInfo, Type, TypeInfo};
use crate::registry::TypeRegistry;
use crate::value::{Instance, Value};
use crate::{AccessOp, AccessorKind, ReflectError};

/// Reads a member from an opaque instance, `None` for static members.
pub type Getter = Arc<dyn Fn(Option<&Value>) -> Result<Value, ReflectError> + Send + Sync>;

/// Writes a member of an opaque instance, `None` for static members.
pub type Setter = Arc<dyn Fn(Option<&Value>, Value) -> Result<(), ReflectError> + Send + Sync>;

/// Reads a member of an instance borrowed as `&T`.
pub type TypedGetter<T> = Arc<dyn Fn(&T) -> Result<Value, ReflectError> + Send + Sync>;

/// Writes a member of an instance borrowed as `&mut T`, in place.
pub type TypedSetter<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), ReflectError> + Send + Sync>;

#[inline]
fn getter<F>(f: F) -> Getter
where
    F: Fn(Option<&Value>) -> Result<Value, ReflectError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
fn setter<F>(f: F) -> Setter
where
    F: Fn(Option<&Value>, Value) -> Result<(), ReflectError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
fn typed_getter<T, F>(f: F) -> TypedGetter<T>
where
    T: Instance,
    F: Fn(&T) -> Result<Value, ReflectError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
fn typed_setter<T, F>(f: F) -> TypedSetter<T>
where
    T: Instance,
    F: Fn(&mut T, Value) -> Result<(), ReflectError> + Send + Sync + 'static,
{
    Arc::new(f)
}

// -----------------------------------------------------------------------------
// Site

/// The (type, member) pair an accessor is bound to.
struct Site {
    target: Type,
    member: Arc<str>,
}

impl Site {
    fn new(target: &Type, member: &MemberInfo) -> Self {
        Self {
            target: target.clone(),
            member: member.shared_name().clone(),
        }
    }

    #[inline]
    fn type_path(&self) -> Arc<str> {
        self.target.shared_path().clone()
    }

    #[inline]
    fn admits(&self, runtime: &TypeInfo) -> bool {
        runtime.is_assignable_to(self.target.handle())
    }

    fn mismatch(&self, found: Cow<'static, str>) -> ReflectError {
        ReflectError::mismatch(found, self.target.path().to_string())
    }

    fn static_with_instance(&self, op: AccessOp) -> ReflectError {
        ReflectError::StaticWithInstance {
            op,
            type_path: self.type_path(),
            member: self.member.clone(),
        }
    }

    fn missing(&self, accessor: AccessorKind) -> ReflectError {
        ReflectError::MissingAccessor {
            type_path: self.type_path(),
            member: self.member.clone(),
            accessor,
        }
    }

    fn check_static(&self, op: AccessOp, instance: Option<&Value>) -> Result<(), ReflectError> {
        match instance {
            Some(value) if !value.is_null() => Err(self.static_with_instance(op)),
            _ => Ok(()),
        }
    }

    fn require_instance<'a>(
        &self,
        op: AccessOp,
        instance: Option<&'a Value>,
    ) -> Result<&'a Value, ReflectError> {
        match instance {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(ReflectError::InstanceWithNull {
                op,
                type_path: self.type_path(),
                member: self.member.clone(),
            }),
        }
    }

    fn check_typed(&self, instance: &dyn Instance) -> Result<(), ReflectError> {
        let runtime = instance.instance_type();
        if self.admits(runtime) {
            Ok(())
        } else {
            Err(self.mismatch(Cow::Owned(runtime.path().to_string())))
        }
    }

    fn unsupported_mutation(&self) -> ReflectError {
        ReflectError::UnsupportedMutation {
            type_path: self.type_path(),
            member: self.member.clone(),
        }
    }

    // An opaque struct instance is a copy, writing to it would be lost.
    fn check_mutable(&self) -> Result<(), ReflectError> {
        if self.target.is_value_type() {
            return Err(self.unsupported_mutation());
        }
        Ok(())
    }

    // Same, for a struct reached through an interface the struct implements.
    fn check_mutable_instance(&self, instance: &Value) -> Result<(), ReflectError> {
        match instance {
            Value::Struct(value) if self.admits(value.ty()) => Err(self.unsupported_mutation()),
            _ => Ok(()),
        }
    }

    fn check_constant(&self, member: &MemberInfo) -> Result<(), ReflectError> {
        match member {
            MemberInfo::Field(field) if field.is_literal() => Err(ReflectError::ConstantMember {
                type_path: self.type_path(),
                member: self.member.clone(),
            }),
            _ => Ok(()),
        }
    }
}

fn check_value(declared: &Type, value: &Value) -> Result<(), ReflectError> {
    if value.is_instance_of(declared) {
        Ok(())
    } else {
        Err(ReflectError::mismatch(value.type_name(), declared.path().to_string()))
    }
}

// -----------------------------------------------------------------------------
// Opaque accessors

/// Compiles a getter for `member`, resolved on `ty`.
///
/// # Errors
///
/// - [`ReflectError::MissingAccessor`] for a property without a getter.
/// - [`ReflectError::Registry`] if the declaring type is not defined.
pub fn compile_getter(
    registry: &TypeRegistry,
    ty: &Type,
    member: &MemberInfo,
) -> Result<Getter, ReflectError> {
    let site = Site::new(ty, member);
    log::debug!("compiling getter for `{ty}::{}`", member.name());

    Ok(match member {
        MemberInfo::Field(field) if field.is_static() => {
            let owner = registry.resolve(field.declaring())?;
            let slot = field.slot();
            getter(move |instance| {
                site.check_static(AccessOp::Load, instance)?;
                Ok(owner.load_static(slot).unwrap_or_default())
            })
        }
        MemberInfo::Field(field) => {
            let slot = field.slot();
            getter(move |instance| {
                match site.require_instance(AccessOp::Load, instance)? {
                    Value::Object(obj) if site.admits(obj.ty()) => Ok(obj.load(slot).unwrap_or_default()),
                    Value::Struct(value) if site.admits(value.ty()) => {
                        Ok(value.get(slot).cloned().unwrap_or_default())
                    }
                    other => Err(site.mismatch(other.type_name())),
                }
            })
        }
        MemberInfo::Property(property) => {
            let get = property
                .getter()
                .cloned()
                .ok_or_else(|| site.missing(AccessorKind::Getter))?;
            if property.is_static() {
                getter(move |instance| {
                    site.check_static(AccessOp::Load, instance)?;
                    Ok(get(None))
                })
            } else {
                getter(move |instance| {
                    match site.require_instance(AccessOp::Load, instance)? {
                        Value::Object(obj) if site.admits(obj.ty()) => Ok(get(Some(obj as &dyn Instance))),
                        Value::Struct(value) if site.admits(value.ty()) => {
                            Ok(get(Some(value as &dyn Instance)))
                        }
                        other => Err(site.mismatch(other.type_name())),
                    }
                })
            }
        }
    })
}

/// Compiles a setter for `member`, resolved on `ty`.
///
/// Assigned values are checked against the declared type of the member.
///
/// # Errors
///
/// - [`ReflectError::ConstantMember`] for constants.
/// - [`ReflectError::UnsupportedMutation`] for instance members of a struct,
///   which can only be assigned through [`compile_typed_setter`]. The returned
///   setter fails the same way when an interface member is assigned on a struct.
/// - [`ReflectError::MissingAccessor`] for a property without a setter.
/// - [`ReflectError::Registry`] if the declared type is not defined.
pub fn compile_setter(
    registry: &TypeRegistry,
    ty: &Type,
    member: &MemberInfo,
) -> Result<Setter, ReflectError> {
    let site = Site::new(ty, member);
    site.check_constant(member)?;
    let declared = registry.resolve(member.value_type())?;
    log::debug!("compiling setter for `{ty}::{}`", member.name());

    Ok(match member {
        MemberInfo::Field(field) if field.is_static() => {
            let owner = registry.resolve(field.declaring())?;
            let slot = field.slot();
            setter(move |instance, value| {
                site.check_static(AccessOp::Assign, instance)?;
                check_value(&declared, &value)?;
                owner.store_static(slot, value);
                Ok(())
            })
        }
        MemberInfo::Field(field) => {
            site.check_mutable()?;
            let slot = field.slot();
            setter(move |instance, value| {
                let instance = site.require_instance(AccessOp::Assign, instance)?;
                site.check_mutable_instance(instance)?;
                check_value(&declared, &value)?;
                match instance {
                    Value::Object(obj) if site.admits(obj.ty()) => {
                        obj.store(slot, value);
                        Ok(())
                    }
                    other => Err(site.mismatch(other.type_name())),
                }
            })
        }
        MemberInfo::Property(property) => {
            let set = property
                .setter()
                .cloned()
                .ok_or_else(|| site.missing(AccessorKind::Setter))?;
            if property.is_static() {
                setter(move |instance, value| {
                    site.check_static(AccessOp::Assign, instance)?;
                    check_value(&declared, &value)?;
                    set(None, value);
                    Ok(())
                })
            } else {
                site.check_mutable()?;
                setter(move |instance, value| {
                    let instance = site.require_instance(AccessOp::Assign, instance)?;
                    site.check_mutable_instance(instance)?;
                    check_value(&declared, &value)?;
                    match instance {
                        Value::Object(obj) if site.admits(obj.ty()) => {
                            let mut handle = obj.clone();
                            set(Some(&mut handle as &mut dyn Instance), value);
                            Ok(())
                        }
                        other => Err(site.mismatch(other.type_name())),
                    }
                })
            }
        }
    })
}

// -----------------------------------------------------------------------------
// Typed accessors

/// Compiles a getter taking the instance as `&T`.
///
/// # Errors
///
/// - [`ReflectError::StaticWithInstance`] for static members, which have no
///   instance to borrow.
/// - [`ReflectError::MissingAccessor`] for a property without a getter.
pub fn compile_typed_getter<T: Instance>(
    ty: &Type,
    member: &MemberInfo,
) -> Result<TypedGetter<T>, ReflectError> {
    let site = Site::new(ty, member);
    if member.is_static() {
        return Err(site.static_with_instance(AccessOp::Load));
    }
    log::debug!(
        "compiling typed getter for `{ty}::{}` on `{}`",
        member.name(),
        core::any::type_name::<T>()
    );

    Ok(match member {
        MemberInfo::Field(field) => {
            let slot = field.slot();
            typed_getter(move |instance: &T| {
                site.check_typed(instance)?;
                Ok(instance.load_slot(slot).unwrap_or_default())
            })
        }
        MemberInfo::Property(property) => {
            let get = property
                .getter()
                .cloned()
                .ok_or_else(|| site.missing(AccessorKind::Getter))?;
            typed_getter(move |instance: &T| {
                site.check_typed(instance)?;
                Ok(get(Some(instance as &dyn Instance)))
            })
        }
    })
}

/// Compiles a setter taking the instance as `&mut T`.
///
/// Unlike [`compile_setter`], this mutates struct instances in place.
///
/// # Errors
///
/// - [`ReflectError::StaticWithInstance`] for static members.
/// - [`ReflectError::ConstantMember`] for constants.
/// - [`ReflectError::MissingAccessor`] for a property without a setter.
pub fn compile_typed_setter<T: Instance>(
    registry: &TypeRegistry,
    ty: &Type,
    member: &MemberInfo,
) -> Result<TypedSetter<T>, ReflectError> {
    let site = Site::new(ty, member);
    site.check_constant(member)?;
    if member.is_static() {
        return Err(site.static_with_instance(AccessOp::Assign));
    }
    let declared = registry.resolve(member.value_type())?;
    log::debug!(
        "compiling typed setter for `{ty}::{}` on `{}`",
        member.name(),
        core::any::type_name::<T>()
    );

    Ok(match member {
        MemberInfo::Field(field) => {
            let slot = field.slot();
            typed_setter(move |instance: &mut T, value| {
                site.check_typed(&*instance)?;
                check_value(&declared, &value)?;
                instance.store_slot(slot, value);
                Ok(())
            })
        }
        MemberInfo::Property(property) => {
            let set = property
                .setter()
                .cloned()
                .ok_or_else(|| site.missing(AccessorKind::Setter))?;
            typed_setter(move |instance: &mut T, value| {
                site.check_typed(&*instance)?;
                check_value(&declared, &value)?;
                set(Some(instance as &mut dyn Instance), value);
                Ok(())
            })
        }
    })
}
