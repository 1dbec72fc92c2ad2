//! Modules: named groups of related registrations.
//!
//! ```rust,ignore
//! struct AudioModule;
//!
//! impl Module for AudioModule {
//!     fn register(&self, registry: &mut Registry) -> Result<()> {
//!         registry.transient::<Disc>()?;
//!         registry.transient::<StereoUnit>()
//!     }
//! }
//!
//! registry.install(&AudioModule)?;
//! ```

use crate::error::Result;
use crate::registry::Registry;

/// Registers a related set of types into a [`Registry`].
pub trait Module {
    /// Called once by [`Registry::install`].
    fn register(&self, registry: &mut Registry) -> Result<()>;

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Arguments;
    use crate::descriptor::{Injectable, TypeDescriptor};
    use crate::error::GicError;
    use crate::key::TypeKey;
    use crate::registry::DuplicatePolicy;
    use crate::scope::Scope;

    struct Disc;

    impl Injectable for Disc {
        fn parameters() -> Vec<TypeKey> {
            vec![]
        }
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Disc)
        }
    }

    struct AudioModule;

    impl Module for AudioModule {
        fn register(&self, registry: &mut Registry) -> Result<()> {
            registry.transient::<Disc>()?;
            registry.register_descriptor(
                TypeDescriptor::from_fn::<u32>(vec![], |_| Ok(18)),
                Scope::Singleton,
            )
        }
    }

    #[test]
    fn install_registers_everything() {
        let mut registry = Registry::new();
        registry.install(&AudioModule).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&TypeKey::of::<Disc>()));
        assert!(registry.contains(&TypeKey::of::<u32>()));
    }

    #[test]
    fn install_propagates_registration_errors() {
        let mut registry = Registry::new().with_duplicate_policy(DuplicatePolicy::Reject);
        registry.install(&AudioModule).unwrap();

        assert!(matches!(
            registry.install(&AudioModule),
            Err(GicError::AmbiguousRegistration(_))
        ));
    }

    #[test]
    fn failed_install_leaves_registry_unchanged() {
        struct GaugesModule;

        impl Module for GaugesModule {
            fn register(&self, registry: &mut Registry) -> Result<()> {
                registry.register_descriptor(
                    TypeDescriptor::from_fn::<u64>(vec![], |_| Ok(0)),
                    Scope::Transient,
                )?;
                registry.register_descriptor(
                    TypeDescriptor::from_fn::<u8>(vec![], |_| Ok(0)),
                    Scope::Transient,
                )
            }
        }

        let mut registry = Registry::new().with_duplicate_policy(DuplicatePolicy::Reject);
        registry
            .register_descriptor(TypeDescriptor::from_fn::<u8>(vec![], |_| Ok(1)), Scope::Singleton)
            .unwrap();

        assert!(matches!(
            registry.install(&GaugesModule),
            Err(GicError::AmbiguousRegistration(_))
        ));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&TypeKey::of::<u64>()));
        assert_eq!(
            registry.lookup(&TypeKey::of::<u8>()).unwrap().scope(),
            Scope::Singleton
        );
    }

    #[test]
    fn module_has_name() {
        assert!(AudioModule.name().contains("AudioModule"));
    }
}
