use alloc::sync::Arc;
use core::fmt;

use qm_utils::hash::{HashMap, hashbrown::hash_map::Entry};

use crate::value::Value;

#[cfg(all(debug_assertions, feature = "debug"))]
use alloc::{string::String, vec::Vec};

crate::cfg::debug! {
    fn format_path(path: &[Arc<str>]) -> String {
        if path.is_empty() {
            return String::from("<root>");
        }
        path.join(".")
    }
}

// -----------------------------------------------------------------------------
// CloneContext

/// The state of one deep clone: visited instances and nesting depth.
///
/// A context is created by [`Reflector::deep_clone`](crate::Reflector::deep_clone),
/// or passed by the caller to [`Reflector::deep_clone_in`](crate::Reflector::deep_clone_in)
/// so that a clone started from a clone hook shares the enclosing visited set.
///
/// Every reference-type instance met during the walk is recorded *before* its
/// clone is computed. A later reference to a recorded instance, the back edge
/// of a cycle or a second path to a shared node, resolves to that original
/// instance.
///
/// The visited set is cleared when the depth returns to zero.
pub struct CloneContext {
    depth: usize,
    // Identity -> original. Holding the original keeps its address from being
    // reused while the clone runs.
    visited: HashMap<usize, Value>,
    fields_visited: usize,
    #[cfg(all(debug_assertions, feature = "debug"))]
    path: Vec<Arc<str>>,
}

impl Default for CloneContext {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CloneContext {
    pub fn new() -> Self {
        Self {
            depth: 0,
            visited: HashMap::default(),
            fields_visited: 0,
            #[cfg(all(debug_assertions, feature = "debug"))]
            path: Vec::new(),
        }
    }

    /// Returns the number of nested clone calls currently running.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the number of instance fields copied so far.
    #[inline]
    pub const fn fields_visited(&self) -> usize {
        self.fields_visited
    }

    /// Returns the number of instances recorded in the visited set.
    #[inline]
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Returns `true` if `value` is a shared instance already recorded.
    pub fn is_visited(&self, value: &Value) -> bool {
        value
            .identity()
            .is_some_and(|identity| self.visited.contains_key(&identity))
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.visited.clear();
            #[cfg(all(debug_assertions, feature = "debug"))]
            self.path.clear();
        }
    }

    /// Records `value`, returns `false` if it was already recorded.
    pub(crate) fn first_visit(&mut self, value: &Value) -> bool {
        let Some(identity) = value.identity() else {
            return true;
        };
        match self.visited.entry(identity) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
                true
            }
        }
    }

    #[inline]
    pub(crate) fn enter_field(&mut self, name: &Arc<str>) {
        self.fields_visited += 1;
        #[cfg(all(debug_assertions, feature = "debug"))]
        {
            self.path.push(name.clone());
            log::trace!("deep clone visits `{}`", format_path(&self.path));
        }
        #[cfg(not(all(debug_assertions, feature = "debug")))]
        let _ = name;
    }

    #[inline]
    pub(crate) fn exit_field(&mut self) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        self.path.pop();
    }
}

impl fmt::Debug for CloneContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("CloneContext");
        builder
            .field("depth", &self.depth)
            .field("visited", &self.visited.len())
            .field("fields_visited", &self.fields_visited);
        #[cfg(all(debug_assertions, feature = "debug"))]
        builder.field("path", &format_path(&self.path));
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::CloneContext;
    use crate::registry::{Builtin, TypeRegistry};
    use crate::value::{ArrayRef, Value};

    #[test]
    fn visited_set_lives_until_depth_zero() {
        let registry = TypeRegistry::new();
        let i32_ty = registry.builtin(Builtin::I32);
        let array_ty = registry.array_of(&i32_ty).unwrap();
        let items = Value::Array(ArrayRef::from_parts(array_ty, Box::new([Value::I32(1)])));

        let mut ctx = CloneContext::new();
        ctx.enter();
        assert!(ctx.first_visit(&items));
        ctx.enter();
        assert!(!ctx.first_visit(&items));
        ctx.exit();
        assert!(ctx.is_visited(&items));
        assert_eq!(ctx.depth(), 1);

        ctx.exit();
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.visited_len(), 0);
        assert!(!ctx.is_visited(&items));

        // Plain values are never recorded.
        assert!(ctx.first_visit(&Value::I32(1)));
        assert_eq!(ctx.visited_len(), 0);
    }
}
