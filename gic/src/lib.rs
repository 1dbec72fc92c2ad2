//! # gic: a reflection-free dependency resolver
//!
//! Register constructible types with a [`Scope`], then ask a [`Resolver`]
//! for a root type. Its dependencies are built recursively: transients
//! fresh every time, singletons once per resolver, and unregistered
//! parameters filled from caller-supplied extra arguments.
//!
//! ```rust
//! use std::sync::Arc;
//! use gic::prelude::*;
//!
//! #[derive(Injectable)]
//! struct PowerSource;
//!
//! #[derive(Injectable)]
//! struct Heater {
//!     power: Arc<PowerSource>,
//!     watts: u32,
//! }
//!
//! let mut registry = Registry::new();
//! registry.singleton::<PowerSource>()?;
//! registry.transient::<Heater>()?;
//!
//! let resolver = Resolver::new(registry);
//! let a = resolver.resolve_with::<Heater>(ExtraArguments::new().with(1500u32))?;
//! let b = resolver.resolve_with::<Heater>(ExtraArguments::new().with(800u32))?;
//!
//! assert_eq!((a.watts, b.watts), (1500, 800));
//! assert!(Arc::ptr_eq(&a.power, &b.power));
//! # Ok::<(), GicError>(())
//! ```

pub use gic_container::*;
pub use gic_derive::*;
pub use gic_support::*;

pub mod prelude {
    pub use gic_container::prelude::*;
    pub use gic_derive::Injectable;
}
