use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{PoisonError, RwLock};

use qm_utils::{CacheMap, TypeIdMap};

use crate::ReflectError;
use crate::access::{MemberKey, MemberKeyRef};

type ErasedTable = Arc<dyn Any + Send + Sync>;

// -----------------------------------------------------------------------------
// TypedAccessorCache

/// Caches accessors whose type depends on a generic parameter.
///
/// There is one [`CacheMap`] per accessor type `A` (e.g. `TypedGetter<ObjectRef>`),
/// found through its [`TypeId`]. Keying by the accessor type keeps getters and
/// setters, and every instance representation, apart.
pub struct TypedAccessorCache {
    tables: RwLock<TypeIdMap<ErasedTable>>,
}

impl Default for TypedAccessorCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypedAccessorCache {
    #[inline]
    pub const fn new() -> Self {
        Self {
            tables: RwLock::new(TypeIdMap::new()),
        }
    }

    fn table<A>(&self) -> Option<Arc<CacheMap<MemberKey, A>>>
    where
        A: Clone + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<A>();
        let erased = {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            tables.get(&type_id).cloned()
        };
        let erased = match erased {
            Some(erased) => erased,
            None => {
                let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
                tables
                    .get_or_insert(type_id, || Arc::new(CacheMap::<MemberKey, A>::new()) as ErasedTable)
                    .clone()
            }
        };
        erased.downcast::<CacheMap<MemberKey, A>>().ok()
    }

    /// Returns the accessor cached for `key`, compiling it with `compile` on a miss.
    ///
    /// Failed compilations are not cached.
    pub fn get_or_try_insert_with<A>(
        &self,
        key: MemberKeyRef<'_>,
        compile: impl FnOnce() -> Result<A, ReflectError>,
    ) -> Result<A, ReflectError>
    where
        A: Clone + Send + Sync + 'static,
    {
        match self.table::<A>() {
            Some(table) => table.get_or_try_insert_with(&key, || Ok((key.into_owned(), compile()?))),
            // Unreachable: tables are created under the `TypeId` of their accessor.
            None => compile(),
        }
    }

    /// Returns the number of accessor types seen so far.
    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl fmt::Debug for TypedAccessorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAccessorCache")
            .field("tables", &self.len())
            .finish()
    }
}
