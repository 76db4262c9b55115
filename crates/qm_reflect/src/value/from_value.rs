use alloc::string::{String, ToString};
use alloc::sync::Arc;

use crate::value::{ArrayRef, DelegateRef, ObjectRef, StructValue, Value};

/// Fallible conversion out of a [`Value`].
///
/// On failure the original value is handed back, so the caller can report
/// what was actually found.
///
/// # Examples
///
/// ```
/// use qm_reflect::value::{FromValue, Value};
///
/// assert_eq!(i32::from_value(Value::I32(5)), Ok(5));
/// assert_eq!(Option::<i32>::from_value(Value::Null), Ok(None));
/// assert!(i64::from_value(Value::I32(5)).is_err());
/// ```
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                #[inline]
                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
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

impl FromValue for String {
    #[inline]
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Str(text) => Ok(text.to_string()),
            other => Err(other),
        }
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

/// `Null` converts to `None`.
impl<T: FromValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
