//! Compile member accessors into reusable closures.
//!
//! Resolving a member by name, checking its storage class and locating its
//! slot is done once, by the `compile_*` functions. The result is an `Arc`'d
//! closure that only performs the checks that depend on the call: the instance,
//! and the assigned value.
//!
//! ## Menu
//!
//! - Opaque form, the instance is an `Option<&Value>`:
//!     - [`Getter`] built by [`compile_getter`].
//!     - [`Setter`] built by [`compile_setter`]. Rejects instance members of
//!       structs, since an opaque struct instance is a copy.
//!
//! - Typed form, the instance is borrowed as `&T` / `&mut T` with `T: Instance`:
//!     - [`TypedGetter`] built by [`compile_typed_getter`].
//!     - [`TypedSetter`] built by [`compile_typed_setter`]. Mutates structs in place.
//!
//! - Caching:
//!     - [`MemberKey`] / [`MemberKeyRef`]: the (type handle, member name) key.
//!     - [`TypedAccessorCache`]: one cache per typed accessor type.
//!
//! The [`Reflector`](crate::Reflector) owns the caches and is the usual entry point.

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod compile;
mod key;

// -----------------------------------------------------------------------------
// Exports

pub use cache::TypedAccessorCache;
pub use compile::{Getter, Setter, TypedGetter, TypedSetter};
pub use compile::{compile_getter, compile_setter, compile_typed_getter, compile_typed_setter};
pub use key::{MemberKey, MemberKeyRef};
