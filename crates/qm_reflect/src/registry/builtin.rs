use crate::info::{Primitive, TypeKind};

/// The path of the root class every class derives from.
pub const OBJECT_PATH: &str = "object";

/// The types every [`TypeRegistry`](crate::registry::TypeRegistry) starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Void,
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
    String,
    /// The root class, see [`OBJECT_PATH`].
    Object,
}

impl Builtin {
    /// Every builtin, in registration order.
    pub const ALL: [Builtin; 17] = [
        Self::Void,
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::ISize,
        Self::USize,
        Self::F32,
        Self::F64,
        Self::String,
        Self::Object,
    ];

    /// Returns the position in [`ALL`](Self::ALL).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn kind(self) -> TypeKind {
        match self {
            Self::Void => TypeKind::Void,
            Self::Bool => TypeKind::Primitive(Primitive::Bool),
            Self::Char => TypeKind::Primitive(Primitive::Char),
            Self::I8 => TypeKind::Primitive(Primitive::I8),
            Self::I16 => TypeKind::Primitive(Primitive::I16),
            Self::I32 => TypeKind::Primitive(Primitive::I32),
            Self::I64 => TypeKind::Primitive(Primitive::I64),
            Self::U8 => TypeKind::Primitive(Primitive::U8),
            Self::U16 => TypeKind::Primitive(Primitive::U16),
            Self::U32 => TypeKind::Primitive(Primitive::U32),
            Self::U64 => TypeKind::Primitive(Primitive::U64),
            Self::ISize => TypeKind::Primitive(Primitive::ISize),
            Self::USize => TypeKind::Primitive(Primitive::USize),
            Self::F32 => TypeKind::Primitive(Primitive::F32),
            Self::F64 => TypeKind::Primitive(Primitive::F64),
            Self::String => TypeKind::String,
            Self::Object => TypeKind::Class,
        }
    }

    pub const fn path(self) -> &'static str {
        match self.kind() {
            TypeKind::Primitive(primitive) => primitive.path(),
            TypeKind::Void => "void",
            TypeKind::String => "string",
            _ => OBJECT_PATH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Builtin;

    #[test]
    fn index_matches_position() {
        for (index, builtin) in Builtin::ALL.iter().enumerate() {
            assert_eq!(builtin.index(), index);
        }
        assert_eq!(Builtin::U64.path(), "u64");
        assert_eq!(Builtin::Object.path(), "object");
    }
}
