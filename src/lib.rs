#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use qm_reflect as reflect;
pub use qm_utils as utils;
