use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;

use crate::info::{Primitive, TypeInfo, TypeKind};
use crate::registry::OBJECT_PATH;
use crate::value::{ArrayRef, DelegateRef, ObjectRef, StructValue};

// -----------------------------------------------------------------------------
// Value

/// An opaque instance handle.
///
/// Cloning a `Value` never copies the instance behind a reference handle, it
/// produces a second handle to the same instance. Use the
/// [`Reflector`](crate::Reflector) to deep clone.
///
/// # Equality
///
/// Primitives and strings compare by content, structs field by field, and
/// objects, arrays and delegates by identity. [`same_reference`](Self::same_reference)
/// compares strings by identity too.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    ISize(isize),
    USize(usize),
    F32(f32),
    F64(f64),
    /// An unmanaged address, never dereferenced.
    Pointer(usize),
    Str(Arc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
    Struct(StructValue),
    Delegate(DelegateRef),
}

impl Value {
    /// Returns the zero value of a primitive.
    pub const fn zero(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Bool => Self::Bool(false),
            Primitive::Char => Self::Char('\0'),
            Primitive::I8 => Self::I8(0),
            Primitive::I16 => Self::I16(0),
            Primitive::I32 => Self::I32(0),
            Primitive::I64 => Self::I64(0),
            Primitive::U8 => Self::U8(0),
            Primitive::U16 => Self::U16(0),
            Primitive::U32 => Self::U32(0),
            Primitive::U64 => Self::U64(0),
            Primitive::ISize => Self::ISize(0),
            Primitive::USize => Self::USize(0),
            Primitive::F32 => Self::F32(0.0),
            Primitive::F64 => Self::F64(0.0),
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the primitive kind, if this is a primitive.
    pub const fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            Self::Bool(_) => Primitive::Bool,
            Self::Char(_) => Primitive::Char,
            Self::I8(_) => Primitive::I8,
            Self::I16(_) => Primitive::I16,
            Self::I32(_) => Primitive::I32,
            Self::I64(_) => Primitive::I64,
            Self::U8(_) => Primitive::U8,
            Self::U16(_) => Primitive::U16,
            Self::U32(_) => Primitive::U32,
            Self::U64(_) => Primitive::U64,
            Self::ISize(_) => Primitive::ISize,
            Self::USize(_) => Primitive::USize,
            Self::F32(_) => Primitive::F32,
            Self::F64(_) => Primitive::F64,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Self::Struct(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_delegate(&self) -> Option<&DelegateRef> {
        match self {
            Self::Delegate(delegate) => Some(delegate),
            _ => None,
        }
    }

    /// Returns the identity of a shared instance, `None` for plain values.
    ///
    /// Strings are shared handles too, but the clone engine never tracks them.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Str(text) => Some(Arc::as_ptr(text).cast::<u8>() as usize),
            Self::Object(obj) => Some(obj.identity()),
            Self::Array(array) => Some(array.identity()),
            Self::Delegate(delegate) => Some(delegate.identity()),
            _ => None,
        }
    }

    /// Returns `true` if both are `Null` or both are handles to the same instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use qm_reflect::value::Value;
    ///
    /// let a = Value::from("text");
    /// let b = Value::from("text");
    ///
    /// assert_eq!(a, b);
    /// assert!(a.same_reference(&a.clone()));
    /// assert!(!a.same_reference(&b));
    /// assert!(Value::Null.same_reference(&Value::Null));
    /// ```
    pub fn same_reference(&self, other: &Self) -> bool {
        if self.is_null() && other.is_null() {
            return true;
        }
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Returns a readable name of the runtime type, used in error messages.
    pub fn type_name(&self) -> Cow<'static, str> {
        if let Some(primitive) = self.primitive() {
            return Cow::Borrowed(primitive.path());
        }
        match self {
            Self::Null => Cow::Borrowed("null"),
            Self::Pointer(_) => Cow::Borrowed("pointer"),
            Self::Str(_) => Cow::Borrowed("string"),
            Self::Object(obj) => Cow::Owned(obj.ty().path().to_string()),
            Self::Array(array) => Cow::Owned(array.ty().path().to_string()),
            Self::Struct(value) => Cow::Owned(value.ty().path().to_string()),
            Self::Delegate(delegate) => Cow::Owned(delegate.ty().path().to_string()),
            _ => Cow::Borrowed("unknown"),
        }
    }

    /// Returns `true` if this value can be stored in a location of type `target`.
    ///
    /// - `Null` fits every reference type.
    /// - Every non-null value fits the `object` root class.
    /// - A primitive fits its own primitive type, a pointer fits pointer types.
    /// - An object fits its class, its base classes and their interfaces.
    /// - Structs, arrays and delegates fit their exact type (or a struct interface).
    pub fn is_instance_of(&self, target: &TypeInfo) -> bool {
        if self.is_null() {
            return target.is_reference_type();
        }
        if is_object_root(target) {
            return true;
        }
        if let Some(primitive) = self.primitive() {
            return target.kind() == TypeKind::Primitive(primitive);
        }
        match self {
            Self::Pointer(_) => target.kind() == TypeKind::Pointer,
            Self::Str(_) => target.kind() == TypeKind::String,
            Self::Object(obj) => obj.ty().is_assignable_to(target.handle()),
            Self::Struct(value) => value.ty().is_assignable_to(target.handle()),
            Self::Array(array) => array.ty().handle() == target.handle(),
            Self::Delegate(delegate) => delegate.ty().handle() == target.handle(),
            _ => false,
        }
    }
}

#[inline]
fn is_object_root(target: &TypeInfo) -> bool {
    target.kind() == TypeKind::Class && target.base().is_none() && target.path() == OBJECT_PATH
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::ISize(a), Self::ISize(b)) => a == b,
            (Self::USize(a), Self::USize(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Pointer(a), Self::Pointer(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => ObjectRef::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => ArrayRef::ptr_eq(a, b),
            (Self::Struct(a), Self::Struct(b)) => a == b,
            (Self::Delegate(a), Self::Delegate(b)) => DelegateRef::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Char(v) => write!(f, "Char({v:?})"),
            Self::I8(v) => write!(f, "I8({v})"),
            Self::I16(v) => write!(f, "I16({v})"),
            Self::I32(v) => write!(f, "I32({v})"),
            Self::I64(v) => write!(f, "I64({v})"),
            Self::U8(v) => write!(f, "U8({v})"),
            Self::U16(v) => write!(f, "U16({v})"),
            Self::U32(v) => write!(f, "U32({v})"),
            Self::U64(v) => write!(f, "U64({v})"),
            Self::ISize(v) => write!(f, "ISize({v})"),
            Self::USize(v) => write!(f, "USize({v})"),
            Self::F32(v) => write!(f, "F32({v})"),
            Self::F64(v) => write!(f, "F64({v})"),
            Self::Pointer(v) => write!(f, "Pointer({v:#x})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Object(v) => fmt::Debug::fmt(v, f),
            Self::Array(v) => fmt::Debug::fmt(v, f),
            Self::Struct(v) => fmt::Debug::fmt(v, f),
            Self::Delegate(v) => fmt::Debug::fmt(v, f),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    isize => ISize,
    usize => USize,
    f32 => F32,
    f64 => F64,
    Arc<str> => Str,
    ObjectRef => Object,
    ArrayRef => Array,
    StructValue => Struct,
    DelegateRef => Delegate,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::Value;
    use crate::info::Primitive;
    use crate::registry::{Builtin, TypeRegistry};

    #[test]
    fn primitive_round_trip_names() {
        assert_eq!(Value::zero(Primitive::U16), Value::U16(0));
        assert_eq!(Value::I64(3).primitive(), Some(Primitive::I64));
        assert_eq!(Value::I64(3).type_name(), "i64");
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(Some(2_u8)), Value::U8(2));
        assert_eq!(Value::from(None::<u8>), Value::Null);
    }

    #[test]
    fn strings_compare_by_content_not_identity() {
        let text: Arc<str> = Arc::from("same");
        let a = Value::Str(text.clone());
        let b = Value::Str(text);
        let c = Value::from("same");

        assert!(a.same_reference(&b));
        assert!(!a.same_reference(&c));
        assert_eq!(a, c);
    }

    #[test]
    fn instance_of_builtins() {
        let registry = TypeRegistry::new();
        let i32_ty = registry.builtin(Builtin::I32);
        let i64_ty = registry.builtin(Builtin::I64);
        let string = registry.builtin(Builtin::String);
        let object = registry.builtin(Builtin::Object);

        assert!(Value::I32(1).is_instance_of(&i32_ty));
        assert!(!Value::I32(1).is_instance_of(&i64_ty));
        assert!(!Value::Null.is_instance_of(&i32_ty));
        assert!(Value::Null.is_instance_of(&string));
        assert!(Value::from("x").is_instance_of(&string));
        assert!(Value::I32(1).is_instance_of(&object));
        assert!(Value::from("x").is_instance_of(&object));
    }
}
