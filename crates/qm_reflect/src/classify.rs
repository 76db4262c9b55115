//! Decide whether values of a type can ever hold a reference.
//!
//! A *trivial* type is copied bit for bit, deep cloning it is the identity:
//!
//! - primitives, `void` and unmanaged pointers.
//! - structs whose instance fields are all trivial.
//!
//! Strings, arrays, classes, interfaces, delegates, by-ref markers, by-ref-like
//! structs and generic parameters are never trivial.

use qm_utils::CacheMap;
use qm_utils::hash::NoOpHashState;

use crate::info::{Type, TypeFlags, TypeHandle, TypeKind};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// TypeClassifier

/// A memoized triviality check.
///
/// # Examples
///
/// ```
/// use qm_reflect::classify::TypeClassifier;
/// use qm_reflect::info::MemberFlags;
/// use qm_reflect::registry::{Builtin, TypeBuilder, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// let f32_ty = registry.builtin(Builtin::F32);
/// let string = registry.builtin(Builtin::String);
///
/// let vec2 = registry
///     .register(
///         TypeBuilder::structure("demo::Vec2")
///             .field("x", &f32_ty, MemberFlags::PUBLIC)
///             .field("y", &f32_ty, MemberFlags::PUBLIC),
///     )
///     .unwrap();
/// let label = registry
///     .register(TypeBuilder::structure("demo::Label").field("text", &string, MemberFlags::PUBLIC))
///     .unwrap();
///
/// let classifier = TypeClassifier::new();
/// assert!(classifier.is_trivial(&registry, &vec2));
/// assert!(!classifier.is_trivial(&registry, &label));
/// assert!(!classifier.is_trivial(&registry, &string));
/// ```
#[derive(Debug)]
pub struct TypeClassifier {
    cache: CacheMap<TypeHandle, bool, NoOpHashState>,
}

impl Default for TypeClassifier {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeClassifier {
    #[inline]
    pub const fn new() -> Self {
        Self {
            cache: CacheMap::with_hasher(NoOpHashState),
        }
    }

    /// Returns `true` if `ty` can never hold a reference.
    pub fn is_trivial(&self, registry: &TypeRegistry, ty: &Type) -> bool {
        let handle = ty.handle();
        self.cache
            .get_or_insert_with(&handle, || (handle, self.classify(registry, ty)))
    }

    // Struct fields only name defined structs, so the recursion is finite.
    fn classify(&self, registry: &TypeRegistry, ty: &Type) -> bool {
        match ty.kind() {
            TypeKind::Void | TypeKind::Primitive(_) | TypeKind::Pointer => true,
            TypeKind::Struct => {
                !ty.flags().contains(TypeFlags::BY_REF_LIKE)
                    && ty.instance_fields().iter().all(|field| {
                        registry
                            .get(field.ty())
                            .is_some_and(|field_ty| self.is_trivial(registry, &field_ty))
                    })
            }
            TypeKind::String
            | TypeKind::Class
            | TypeKind::Interface
            | TypeKind::Array
            | TypeKind::ByRef
            | TypeKind::Delegate
            | TypeKind::GenericParameter => false,
        }
    }

    /// Returns the number of classified types.
    #[inline]
    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::TypeClassifier;
    use crate::info::{MemberFlags, TypeFlags, TypeKind};
    use crate::registry::{Builtin, TypeBuilder, TypeRegistry};

    #[test]
    fn builtin_categories() {
        let registry = TypeRegistry::new();
        let classifier = TypeClassifier::new();

        for builtin in Builtin::ALL {
            let ty = registry.builtin(builtin);
            let expected = !matches!(ty.kind(), TypeKind::String | TypeKind::Class);
            assert_eq!(classifier.is_trivial(&registry, &ty), expected, "{ty}");
        }

        let i32_ty = registry.builtin(Builtin::I32);
        assert!(classifier.is_trivial(&registry, &registry.pointer_to(&i32_ty).unwrap()));
        assert!(!classifier.is_trivial(&registry, &registry.array_of(&i32_ty).unwrap()));
        assert!(!classifier.is_trivial(&registry, &registry.by_ref_of(&i32_ty).unwrap()));

        let param = registry.register(TypeBuilder::generic_parameter("T")).unwrap();
        assert!(!classifier.is_trivial(&registry, &param));
        let delegate = registry.register(TypeBuilder::delegate("demo::Callback")).unwrap();
        assert!(!classifier.is_trivial(&registry, &delegate));
    }

    #[test]
    fn nested_structs() {
        let registry = TypeRegistry::new();
        let classifier = TypeClassifier::new();
        let i32_ty = registry.builtin(Builtin::I32);
        let object = registry.builtin(Builtin::Object);

        let leaf = registry
            .register(TypeBuilder::structure("demo::Leaf").field("n", &i32_ty, MemberFlags::PUBLIC))
            .unwrap();
        let plain = registry
            .register(
                TypeBuilder::structure("demo::Plain")
                    .field("leaf", &leaf, MemberFlags::PUBLIC)
                    .field("shared", &i32_ty, MemberFlags::PUBLIC | MemberFlags::STATIC)
                    .field("other", &object, MemberFlags::PUBLIC | MemberFlags::STATIC),
            )
            .unwrap();
        let holder = registry
            .register(TypeBuilder::structure("demo::Holder").field("obj", &object, MemberFlags::PUBLIC))
            .unwrap();
        let outer = registry
            .register(TypeBuilder::structure("demo::Outer").field("holder", &holder, MemberFlags::PUBLIC))
            .unwrap();
        let span = registry
            .register(
                TypeBuilder::structure("demo::Span")
                    .with_flags(TypeFlags::BY_REF_LIKE)
                    .field("len", &i32_ty, MemberFlags::PUBLIC),
            )
            .unwrap();

        // Static fields do not take part in the layout.
        assert!(classifier.is_trivial(&registry, &plain));
        assert!(!classifier.is_trivial(&registry, &outer));
        assert!(!classifier.is_trivial(&registry, &span));
        assert!(classifier.len() >= 4);
    }
}
