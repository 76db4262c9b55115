use core::fmt;
use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering};

// -----------------------------------------------------------------------------
// TypeHandle

/// The identity of a registered type, size = 8.
///
/// Handles are allocated from one process-wide counter, so two handles are
/// equal only if they were produced by the same registration, even across
/// different [`TypeRegistry`](crate::registry::TypeRegistry) instances.
///
/// The hash of a handle is its raw value, which makes it a good key for maps
/// using [`NoOpHashState`](qm_utils::hash::NoOpHashState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TypeHandle(NonZeroU64);

impl TypeHandle {
    pub(crate) fn allocate() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let index = NEXT.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::MIN.saturating_add(index))
    }

    /// Returns the raw value.
    #[inline(always)]
    pub const fn to_bits(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
