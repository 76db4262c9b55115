use alloc::sync::Arc;

use thiserror::Error;

use crate::info::{TypeHandle, TypeKind};

/// A enumeration of all error outcomes of type registration and lookup.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("type path `{path}` is already registered")]
    DuplicatePath { path: Arc<str> },

    #[error("type handle {handle} is not registered")]
    UnknownHandle { handle: TypeHandle },

    #[error("type `{path}` was reserved but never defined")]
    Undefined { path: Arc<str> },

    #[error("type `{path}` is already defined")]
    AlreadyDefined { path: Arc<str> },

    #[error("definition of `{found}` does not match the reservation `{expected}`")]
    ReservationMismatch { expected: Arc<str>, found: Arc<str> },

    #[error("type `{path}` of kind {kind} cannot be forward declared")]
    InvalidForwardDeclaration { path: Arc<str>, kind: TypeKind },

    #[error("type `{type_path}` cannot extend `{base}`")]
    InvalidBase { type_path: Arc<str>, base: Arc<str> },

    #[error("type `{type_path}` cannot implement `{interface}`, it is not an interface")]
    InvalidInterface {
        type_path: Arc<str>,
        interface: Arc<str>,
    },

    #[error("type `{type_path}` cannot be used as an element type")]
    InvalidElement { type_path: Arc<str> },

    #[error("type `{type_path}` declares the member `{member}` more than once")]
    DuplicateMember { type_path: Arc<str>, member: Arc<str> },

    #[error("type `{type_path}` cannot declare the member `{member}`")]
    MisplacedMember { type_path: Arc<str>, member: Arc<str> },

    #[error("the value of constant `{type_path}::{member}` does not fit its declared type")]
    ConstantMismatch { type_path: Arc<str>, member: Arc<str> },
}
