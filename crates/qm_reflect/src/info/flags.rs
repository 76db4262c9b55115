use bitflags::bitflags;

use crate::info::MemberInfo;

bitflags! {
    /// Attributes of a type that are not implied by its [`TypeKind`].
    ///
    /// [`TypeKind`]: crate::info::TypeKind
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        /// The type cannot be instantiated directly.
        const ABSTRACT = 1 << 0;
        /// The type cannot be used as a base class.
        const SEALED = 1 << 1;
        /// The type is an open generic definition, its parameters are unbound.
        const GENERIC_DEFINITION = 1 << 2;
        /// A struct that may only live on the stack, it can never be boxed.
        const BY_REF_LIKE = 1 << 3;
    }
}

bitflags! {
    /// Attributes of a field or property.
    ///
    /// A member without [`PUBLIC`](Self::PUBLIC) is non-public.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u8 {
        const PUBLIC = 1 << 0;
        const STATIC = 1 << 1;
        /// A compile-time constant. Implies `STATIC` and cannot be assigned.
        const LITERAL = 1 << 2;
    }
}

bitflags! {
    /// The filter applied when resolving a member by name.
    ///
    /// A member matches if its visibility is selected by `PUBLIC`/`NON_PUBLIC`
    /// and its storage by `INSTANCE`/`STATIC`.
    ///
    /// # Examples
    ///
    /// ```
    /// use qm_reflect::info::BindingFlags;
    ///
    /// let flags = BindingFlags::ALL_MEMBERS;
    /// assert!(flags.contains(BindingFlags::NON_PUBLIC | BindingFlags::STATIC));
    /// assert!(!flags.contains(BindingFlags::IGNORE_CASE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindingFlags: u8 {
        const PUBLIC = 1 << 0;
        const NON_PUBLIC = 1 << 1;
        const INSTANCE = 1 << 2;
        const STATIC = 1 << 3;
        /// Compare names ignoring ASCII case.
        const IGNORE_CASE = 1 << 4;
        /// Do not search base classes.
        const DECLARED_ONLY = 1 << 5;
        /// Also return static members declared on base classes.
        const FLATTEN_HIERARCHY = 1 << 6;

        /// Every member, whatever its visibility or storage.
        const ALL_MEMBERS = Self::PUBLIC.bits()
            | Self::NON_PUBLIC.bits()
            | Self::INSTANCE.bits()
            | Self::STATIC.bits();
    }
}

impl BindingFlags {
    /// Returns `true` if `member` passes the visibility and storage filter.
    pub fn admits(self, member: &MemberInfo) -> bool {
        let flags = member.flags();
        let visible = if flags.contains(MemberFlags::PUBLIC) {
            self.contains(Self::PUBLIC)
        } else {
            self.contains(Self::NON_PUBLIC)
        };
        let storage = if member.is_static() {
            self.contains(Self::STATIC)
        } else {
            self.contains(Self::INSTANCE)
        };
        visible && storage
    }

    /// Returns `true` if `candidate` is the requested `name` under these flags.
    #[inline]
    pub fn name_matches(self, candidate: &str, name: &str) -> bool {
        if self.contains(Self::IGNORE_CASE) {
            candidate.eq_ignore_ascii_case(name)
        } else {
            candidate == name
        }
    }
}

impl Default for BindingFlags {
    #[inline]
    fn default() -> Self {
        Self::ALL_MEMBERS
    }
}
