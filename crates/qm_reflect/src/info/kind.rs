use core::fmt;

// -----------------------------------------------------------------------------
// Primitive

/// The fixed-size scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    ISize,
    USize,
    F32,
    F64,
}

impl Primitive {
    /// Returns the builtin type path, e.g. `"i32"`.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::ISize => "isize",
            Self::USize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.path())
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// An enumeration of the "kinds" of a registered type.
///
/// The kind decides how values of the type are represented by
/// [`Value`](crate::value::Value), and which category the classifier and
/// the blank constructor put the type in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The absence of a value. Cannot be instantiated.
    Void,
    /// A fixed-size scalar, see [`Primitive`].
    Primitive(Primitive),
    /// Immutable text, represented by a shared string handle.
    String,
    /// A reference type with fields and an optional base class.
    Class,
    /// A value type with fields. Copied on assignment.
    Struct,
    /// A reference type that only declares properties.
    Interface,
    /// A fixed-length sequence of the element type.
    Array,
    /// An unmanaged address of the element type.
    Pointer,
    /// A by-reference marker to the element type.
    ByRef,
    /// A reference to a callable.
    Delegate,
    /// An unresolved type parameter of a generic definition.
    GenericParameter,
}

impl TypeKind {
    /// Returns `true` if values of this kind are copied on assignment.
    #[inline]
    pub const fn is_value_type(self) -> bool {
        matches!(
            self,
            Self::Void | Self::Primitive(_) | Self::Struct | Self::Pointer
        )
    }

    /// Returns `true` if values of this kind are shared handles,
    /// and `null` is a valid value.
    #[inline]
    pub const fn is_reference_type(self) -> bool {
        matches!(
            self,
            Self::String | Self::Class | Self::Interface | Self::Array | Self::ByRef | Self::Delegate
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.pad("Void"),
            Self::Primitive(_) => f.pad("Primitive"),
            Self::String => f.pad("String"),
            Self::Class => f.pad("Class"),
            Self::Struct => f.pad("Struct"),
            Self::Interface => f.pad("Interface"),
            Self::Array => f.pad("Array"),
            Self::Pointer => f.pad("Pointer"),
            Self::ByRef => f.pad("ByRef"),
            Self::Delegate => f.pad("Delegate"),
            Self::GenericParameter => f.pad("GenericParameter"),
        }
    }
}
