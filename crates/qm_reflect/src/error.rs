use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use thiserror::Error;

use crate::registry::RegistryError;

// -----------------------------------------------------------------------------
// Helpers

/// The direction of a member access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessOp {
    Load,
    Assign,
}

impl fmt::Display for AccessOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.pad("load"),
            Self::Assign => f.pad("assign"),
        }
    }
}

/// The accessor a property failed to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Getter,
    Setter,
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Getter => f.pad("getter"),
            Self::Setter => f.pad("setter"),
        }
    }
}

/// Coarse classification of a [`ReflectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed something the operation cannot work with.
    InvalidArgument,
    /// Several members match the requested name.
    AmbiguousMember,
    /// A value or instance has the wrong runtime type.
    TypeMismatch,
    /// The operation would only mutate a temporary copy of a value type.
    UnsupportedMutation,
}

// -----------------------------------------------------------------------------
// Error

/// A enumeration of all error outcomes of reflective access, blank
/// construction and deep cloning.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ReflectError {
    #[error("member `{member}` was not found on type `{type_path}`")]
    MemberNotFound { type_path: Arc<str>, member: Arc<str> },

    #[error("{matches} members of type `{type_path}` match the name `{member}`")]
    AmbiguousMember {
        type_path: Arc<str>,
        member: Arc<str>,
        matches: usize,
    },

    #[error("property `{type_path}::{member}` has no {accessor}")]
    MissingAccessor {
        type_path: Arc<str>,
        member: Arc<str>,
        accessor: AccessorKind,
    },

    #[error("cannot {op} a static member with a non-null instance (`{type_path}::{member}`)")]
    StaticWithInstance {
        op: AccessOp,
        type_path: Arc<str>,
        member: Arc<str>,
    },

    #[error("cannot {op} an instance member with a null instance (`{type_path}::{member}`)")]
    InstanceWithNull {
        op: AccessOp,
        type_path: Arc<str>,
        member: Arc<str>,
    },

    #[error("cannot assign the constant `{type_path}::{member}`")]
    ConstantMember { type_path: Arc<str>, member: Arc<str> },

    #[error(
        "cannot assign `{type_path}::{member}` through an opaque instance of a value type, \
         use the typed by-reference accessor instead"
    )]
    UnsupportedMutation { type_path: Arc<str>, member: Arc<str> },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        found: Cow<'static, str>,
        expected: Cow<'static, str>,
    },

    #[error("type `{type_path}` cannot be used with this operation: {reason}")]
    UnsupportedType {
        type_path: Arc<str>,
        reason: &'static str,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ReflectError {
    /// Returns the coarse category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AmbiguousMember { .. } => ErrorKind::AmbiguousMember,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::UnsupportedMutation { .. } => ErrorKind::UnsupportedMutation,
            Self::MemberNotFound { .. }
            | Self::MissingAccessor { .. }
            | Self::StaticWithInstance { .. }
            | Self::InstanceWithNull { .. }
            | Self::ConstantMember { .. }
            | Self::UnsupportedType { .. }
            | Self::Registry(_) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn mismatch(
        found: impl Into<Cow<'static, str>>,
        expected: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::TypeMismatch {
            found: found.into(),
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{AccessOp, ErrorKind, ReflectError};

    #[test]
    fn messages_name_the_misuse() {
        let err = ReflectError::StaticWithInstance {
            op: AccessOp::Load,
            type_path: "demo::A".into(),
            member: "count".into(),
        };
        assert!(err.to_string().starts_with("cannot load a static member with a non-null instance"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = ReflectError::InstanceWithNull {
            op: AccessOp::Assign,
            type_path: "demo::A".into(),
            member: "x".into(),
        };
        assert!(err.to_string().starts_with("cannot assign an instance member with a null instance"));

        let err = ReflectError::mismatch("i32", "demo::A");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.to_string(), "type mismatch: expected `demo::A`, found `i32`");
    }
}
