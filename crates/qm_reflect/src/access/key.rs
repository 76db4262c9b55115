use alloc::boxed::Box;
use core::fmt;

use qm_utils::hash::hashbrown::Equivalent;

use crate::info::TypeHandle;

// -----------------------------------------------------------------------------
// MemberKey

/// The cache key of a member: the type it was requested on, and its name.
///
/// Lookups use [`MemberKeyRef`], so a cache hit never allocates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub ty: TypeHandle,
    pub name: Box<str>,
}

/// A borrowed [`MemberKey`], hashing identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberKeyRef<'a> {
    pub ty: TypeHandle,
    pub name: &'a str,
}

impl<'a> MemberKeyRef<'a> {
    #[inline]
    pub const fn new(ty: TypeHandle, name: &'a str) -> Self {
        Self { ty, name }
    }

    #[inline]
    pub fn into_owned(self) -> MemberKey {
        MemberKey {
            ty: self.ty,
            name: Box::from(self.name),
        }
    }
}

impl Equivalent<MemberKey> for MemberKeyRef<'_> {
    #[inline]
    fn equivalent(&self, key: &MemberKey) -> bool {
        self.ty == key.ty && self.name == &*key.name
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.ty, self.name)
    }
}

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;

    use qm_utils::hash::FixedHashState;

    use super::{MemberKey, MemberKeyRef};
    use crate::info::TypeHandle;

    #[test]
    fn borrowed_key_hashes_like_owned() {
        let ty = TypeHandle::allocate();
        let borrowed = MemberKeyRef::new(ty, "next");
        let owned: MemberKey = borrowed.into_owned();

        assert_eq!(FixedHashState.hash_one(borrowed), FixedHashState.hash_one(&owned));
    }
}
