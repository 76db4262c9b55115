#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Compilation config

/// Some macros used for compilation control.
pub(crate) mod cfg {
    /// Expands the wrapped items only when clone-path tracing is active.
    macro_rules! debug {
        ($($item:item)*) => {
            $(
                #[cfg(all(debug_assertions, feature = "debug"))]
                $item
            )*
        };
    }

    pub(crate) use debug;
}

// -----------------------------------------------------------------------------
// Extern Self

// Doc tests refer to the crate as `qm_reflect`; keep the name usable inside too.
extern crate self as qm_reflect;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod reflector;

pub mod access;
pub mod blank;
pub mod classify;
pub mod clone;
pub mod info;
pub mod registry;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::{AccessOp, AccessorKind, ErrorKind, ReflectError};
pub use reflector::{ReflectCaches, Reflector};
