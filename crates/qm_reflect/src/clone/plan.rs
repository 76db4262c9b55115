use alloc::sync::Arc;
use core::fmt;

use crate::info::{Type, TypeKind};

/// One instance field copied by the clone engine.
#[derive(Debug, Clone)]
pub(crate) struct FieldSlot {
    pub slot: usize,
    pub name: Arc<str>,
}

// -----------------------------------------------------------------------------
// ClonePlan

/// How values of one runtime type are deep cloned, memoized per type.
#[derive(Clone)]
pub(crate) enum ClonePlan {
    /// Trivial types: the value is its own clone.
    Identity,
    /// Strings: the same handle.
    Shared,
    /// Arrays: a new array with every element cloned.
    Elements,
    /// Everything else: a blank instance with these fields cloned into it.
    /// Static fields and constants are not part of the list.
    Fields(Arc<[FieldSlot]>),
}

impl ClonePlan {
    pub(crate) fn compile(ty: &Type, trivial: bool) -> Self {
        if trivial {
            return Self::Identity;
        }
        match ty.kind() {
            TypeKind::String => Self::Shared,
            TypeKind::Array => Self::Elements,
            _ => Self::Fields(
                ty.instance_fields()
                    .iter()
                    .map(|field| FieldSlot {
                        slot: field.slot(),
                        name: field.shared_name().clone(),
                    })
                    .collect(),
            ),
        }
    }
}

impl fmt::Debug for ClonePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Shared => f.write_str("Shared"),
            Self::Elements => f.write_str("Elements"),
            Self::Fields(slots) => f.debug_tuple("Fields").field(&slots.len()).finish(),
        }
    }
}
