//! Provide the type registry, the source of all runtime type information.
//!
//! ## Menu
//!
//! - [`TypeRegistry`]: stores every [`Type`](crate::info::Type) by handle and by path.
//! - [`TypeBuilder`]: describes a class, struct, interface, delegate or generic
//!   parameter before registration.
//! - [`Builtin`]: the primitive types, `void`, `string` and the `object` root class.
//! - [`RegistryError`]: everything registration can reject.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod builtin;
mod error;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use builder::TypeBuilder;
pub use builtin::{Builtin, OBJECT_PATH};
pub use error::RegistryError;
pub use type_registry::TypeRegistry;
