//! Derive macros for gic.
//!
//! Re-exported from `gic`; depend on that crate instead of this one.

pub use gic_macros::Injectable;
