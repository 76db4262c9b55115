//! Provide the instance model that reflective operations act on.
//!
//! ## Menu
//!
//! - [`Value`]: an opaque instance handle, one of:
//!     - a primitive or an unmanaged pointer, copied by value.
//!     - a [`StructValue`], copied by value.
//!     - a string, an [`ObjectRef`], an [`ArrayRef`] or a [`DelegateRef`],
//!       shared handles compared by identity.
//!     - `Null`, the empty reference.
//!
//! - [`Instance`]: the typed-by-reference view used by typed accessors,
//!   implemented by [`ObjectRef`] (classes) and [`StructValue`] (structs).
//!
//! - [`FromValue`]: fallible conversion out of a [`Value`], used by the
//!   strongly-typed accessor wrappers.
//!
//! Reference handles own their storage through an `Arc`, and every handle has an
//! [`identity`](ObjectRef::identity): the address of that storage. Two handles with
//! the same identity are the same instance.

// -----------------------------------------------------------------------------
// Modules

mod array;
mod delegate;
mod from_value;
mod instance;
mod object;
mod structs;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use array::ArrayRef;
pub use delegate::{DelegateFn, DelegateRef};
pub use from_value::FromValue;
pub use instance::Instance;
pub use object::ObjectRef;
pub use structs::StructValue;
pub use value::Value;
