//! Reflective deep cloning of instance graphs.
//!
//! A deep clone walks the instance fields of a value and copies them into a
//! blank instance of the same runtime type. What happens per runtime type is
//! decided once and memoized by the [`Reflector`](crate::Reflector):
//!
//! | runtime type | clone |
//! |---|---|
//! | trivial (primitive, pointer, struct without references) | the value itself |
//! | string | the same handle |
//! | array | a new array, each element cloned |
//! | class, non-trivial struct | a blank instance, each instance field cloned |
//! | delegate, by-ref-like struct | the blank substitute, `null` |
//!
//! Static fields and constants are never copied.
//!
//! ## Cycles and shared nodes
//!
//! Class instances, arrays and delegates are recorded in the [`CloneContext`]
//! on first visit. A later reference to a recorded instance is not cloned again:
//! it resolves to the *original* instance. Cloning `A -> B -> A` gives
//! `A' -> B' -> A`.
//!
//! ## Hooks
//!
//! A [`CloneHook`] registered for a runtime type replaces the field walk for
//! that type. Hooks receive the running context, and may start nested clones
//! with [`Reflector::deep_clone_in`](crate::Reflector::deep_clone_in) that share
//! its visited set.

// -----------------------------------------------------------------------------
// Modules

mod context;
mod engine;
mod plan;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use engine::{clone_value, deep_clone_in};
pub(crate) use plan::{ClonePlan, FieldSlot};

// -----------------------------------------------------------------------------
// Exports

use alloc::sync::Arc;

use crate::value::Value;
use crate::{ReflectError, Reflector};

pub use context::CloneContext;

/// A custom clone routine for one runtime type.
///
/// The hook is called after the instance has been recorded as visited.
pub type CloneHook =
    Arc<dyn Fn(&Reflector, &mut CloneContext, &Value) -> Result<Value, ReflectError> + Send + Sync>;
