use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;

use crate::blank::Blank;
use crate::clone::{CloneContext, ClonePlan, FieldSlot};
use crate::info::Type;
use crate::value::{ArrayRef, Value};
use crate::{ReflectError, Reflector};

/// Rejects types no instance can be an exact instance of.
fn check_clone_target(ty: &Type) -> Result<(), ReflectError> {
    if ty.is_uninstantiable() {
        return Err(ReflectError::UnsupportedType {
            type_path: ty.shared_path().clone(),
            reason: "abstract, interface and open generic types cannot be cloned",
        });
    }
    Ok(())
}

/// Clones `instance` as a value of `ty`, within `ctx`.
pub(crate) fn deep_clone_in(
    reflector: &Reflector,
    ctx: &mut CloneContext,
    ty: &Type,
    instance: &Value,
) -> Result<Value, ReflectError> {
    check_clone_target(ty)?;
    if instance.is_null() {
        return Ok(Value::Null);
    }
    if !instance.is_instance_of(ty) {
        return Err(ReflectError::mismatch(instance.type_name(), ty.path().to_string()));
    }

    ctx.enter();
    let cloned = clone_value(reflector, ctx, instance);
    ctx.exit();
    cloned
}

/// Clones any value, dispatching on its runtime type.
pub(crate) fn clone_value(
    reflector: &Reflector,
    ctx: &mut CloneContext,
    value: &Value,
) -> Result<Value, ReflectError> {
    let ty = match value {
        Value::Object(obj) => obj.ty(),
        Value::Array(array) => array.ty(),
        Value::Delegate(delegate) => delegate.ty(),
        Value::Struct(inner) => inner.ty(),
        // Null, primitives, pointers and strings.
        _ => return Ok(value.clone()),
    };

    if value.identity().is_some() && !ctx.first_visit(value) {
        return Ok(value.clone());
    }

    match reflector.clone_plan(ty) {
        ClonePlan::Identity | ClonePlan::Shared => Ok(value.clone()),
        ClonePlan::Elements => match value {
            Value::Array(array) => clone_elements(reflector, ctx, array),
            _ => Ok(value.clone()),
        },
        // Hooks only replace the field walk.
        ClonePlan::Fields(slots) => match reflector.clone_hook(ty) {
            Some(hook) => hook(reflector, ctx, value),
            None => clone_fields(reflector, ctx, value, ty, &slots),
        },
    }
}

fn clone_elements(
    reflector: &Reflector,
    ctx: &mut CloneContext,
    array: &ArrayRef,
) -> Result<Value, ReflectError> {
    let items = array
        .snapshot()
        .iter()
        .map(|item| clone_value(reflector, ctx, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(ArrayRef::from_parts(
        array.ty().clone(),
        items.into_boxed_slice(),
    )))
}

fn clone_fields(
    reflector: &Reflector,
    ctx: &mut CloneContext,
    source: &Value,
    ty: &Type,
    slots: &[FieldSlot],
) -> Result<Value, ReflectError> {
    let fields: Box<[Value]> = match source {
        Value::Object(obj) => obj.snapshot(),
        Value::Struct(inner) => inner.fields().into(),
        _ => Box::default(),
    };

    match reflector.make_blank(ty)? {
        Blank::Substitute(value) => Ok(value),
        Blank::Fresh(Value::Object(target)) => {
            for FieldSlot { slot, name } in slots {
                let field = fields.get(*slot).cloned().unwrap_or_default();
                ctx.enter_field(name);
                let cloned = clone_value(reflector, ctx, &field);
                ctx.exit_field();
                target.store(*slot, cloned?);
            }
            Ok(Value::Object(target))
        }
        Blank::Fresh(Value::Struct(mut target)) => {
            for FieldSlot { slot, name } in slots {
                let field = fields.get(*slot).cloned().unwrap_or_default();
                ctx.enter_field(name);
                let cloned = clone_value(reflector, ctx, &field);
                ctx.exit_field();
                target.set(*slot, cloned?);
            }
            Ok(Value::Struct(target))
        }
        Blank::Fresh(value) => Ok(value),
    }
}
