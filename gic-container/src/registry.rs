//! The registry of constructible types.
//!
//! Registrations are kept in insertion order and never removed. The
//! registry only stores data; construction belongs to the
//! [`Resolver`](crate::resolver::Resolver).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::descriptor::{Injectable, TypeDescriptor};
use crate::error::{AmbiguousRegistrationError, GicError, Result};
use crate::graph::{GraphValidator, ValidationReport};
use crate::key::TypeKey;
use crate::provider::Module;
use crate::scope::Scope;

/// What to do when a type is registered a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep every entry; lookups return the first one registered.
    #[default]
    FirstWins,
    /// Fail the second registration with
    /// [`GicError::AmbiguousRegistration`].
    Reject,
}

/// A registered type together with its scope.
#[derive(Clone, Debug)]
pub struct RegistrationEntry {
    descriptor: TypeDescriptor,
    scope: Scope,
}

impl RegistrationEntry {
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.descriptor.key()
    }

    #[inline]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    #[inline]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }
}

/// Insertion-ordered set of registrations.
///
/// # Examples
/// ```
/// use gic_container::prelude::*;
///
/// struct Heater;
/// impl Injectable for Heater {
///     fn parameters() -> Vec<TypeKey> { vec![] }
///     fn construct(_: &mut Arguments) -> Result<Self> { Ok(Heater) }
/// }
///
/// let mut registry = Registry::new();
/// registry.singleton::<Heater>()?;
///
/// let entry = registry.lookup(&TypeKey::of::<Heater>()).unwrap();
/// assert_eq!(entry.scope(), Scope::Singleton);
/// # Ok::<(), GicError>(())
/// ```
#[derive(Default)]
pub struct Registry {
    entries: Vec<RegistrationEntry>,
    duplicates: DuplicatePolicy,
}

impl Registry {
    /// Creates an empty registry with [`DuplicatePolicy::FirstWins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how duplicate registrations are handled.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Registers `T` with the given scope.
    pub fn register<T: Injectable>(&mut self, scope: Scope) -> Result<()> {
        self.register_descriptor(TypeDescriptor::of::<T>(), scope)
    }

    pub fn transient<T: Injectable>(&mut self) -> Result<()> {
        self.register::<T>(Scope::Transient)
    }

    pub fn singleton<T: Injectable>(&mut self) -> Result<()> {
        self.register::<T>(Scope::Singleton)
    }

    /// Registers an explicit descriptor.
    ///
    /// # Errors
    /// Returns [`GicError::AmbiguousRegistration`] if the type is already
    /// registered and the policy is [`DuplicatePolicy::Reject`]. The
    /// registry is left unchanged in that case.
    pub fn register_descriptor(&mut self, descriptor: TypeDescriptor, scope: Scope) -> Result<()> {
        let key = descriptor.key();

        if let Some(existing) = self.lookup(&key) {
            match self.duplicates {
                DuplicatePolicy::Reject => {
                    return Err(GicError::AmbiguousRegistration(AmbiguousRegistrationError {
                        key,
                        existing: existing.scope(),
                        attempted: scope,
                    }));
                }
                DuplicatePolicy::FirstWins => {
                    warn!(
                        key = %key,
                        kept = %existing.scope(),
                        ignored = %scope,
                        "Duplicate registration; lookups keep the first entry"
                    );
                }
            }
        }

        debug!(key = %key, scope = %scope, parameters = descriptor.parameters().len(), "Registered type");
        self.entries.push(RegistrationEntry { descriptor, scope });
        Ok(())
    }

    /// Lets a [`Module`] register its types.
    ///
    /// All or nothing: if any registration fails, the ones the module
    /// already made are rolled back.
    pub fn install(&mut self, module: &dyn Module) -> Result<()> {
        let before = self.entries.len();
        if let Err(err) = module.register(self) {
            self.entries.truncate(before);
            warn!(module = module.name(), error = %err, "Module installation rolled back");
            return Err(err);
        }
        info!(
            module = module.name(),
            added = self.entries.len() - before,
            "Installed module"
        );
        Ok(())
    }

    /// First entry registered for `key`, if any.
    pub fn lookup(&self, key: &TypeKey) -> Option<&RegistrationEntry> {
        self.entries.iter().find(|entry| entry.key() == *key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.lookup(key).is_some()
    }

    /// All entries, in registration order, duplicates included.
    pub fn entries(&self) -> &[RegistrationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fully qualified names of every registered type.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.key().type_name()).collect()
    }

    /// Checks the declared dependency graph without constructing anything.
    ///
    /// # Errors
    /// Returns [`GicError::CyclicDependency`] if registered types depend on
    /// each other in a cycle.
    pub fn validate(&self) -> Result<ValidationReport> {
        GraphValidator::new(self).validate()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.entries.len())
            .field("duplicates", &self.duplicates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Arguments;

    struct Heater;
    struct PowerSource;

    impl Injectable for Heater {
        fn parameters() -> Vec<TypeKey> {
            vec![]
        }
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Heater)
        }
    }

    impl Injectable for PowerSource {
        fn parameters() -> Vec<TypeKey> {
            vec![]
        }
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(PowerSource)
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut reg = Registry::new();
        reg.transient::<Heater>().unwrap();

        let entry = reg.lookup(&TypeKey::of::<Heater>()).unwrap();
        assert_eq!(entry.scope(), Scope::Transient);
        assert!(reg.lookup(&TypeKey::of::<PowerSource>()).is_none());
    }

    #[test]
    fn duplicates_keep_both_and_first_wins() {
        let mut reg = Registry::new();
        reg.transient::<Heater>().unwrap();
        reg.singleton::<Heater>().unwrap();

        assert_eq!(reg.len(), 2);
        assert_eq!(
            reg.lookup(&TypeKey::of::<Heater>()).unwrap().scope(),
            Scope::Transient
        );
    }

    #[test]
    fn reject_policy_refuses_duplicate() {
        let mut reg = Registry::new().with_duplicate_policy(DuplicatePolicy::Reject);
        reg.singleton::<Heater>().unwrap();

        match reg.transient::<Heater>().unwrap_err() {
            GicError::AmbiguousRegistration(e) => {
                assert_eq!(e.key, TypeKey::of::<Heater>());
                assert_eq!(e.existing, Scope::Singleton);
                assert_eq!(e.attempted, Scope::Transient);
            }
            other => panic!("Expected AmbiguousRegistration, got: {other:?}"),
        }
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut reg = Registry::new();
        reg.singleton::<PowerSource>().unwrap();
        reg.transient::<Heater>().unwrap();

        let keys: Vec<TypeKey> = reg.entries().iter().map(RegistrationEntry::key).collect();
        assert_eq!(keys, vec![TypeKey::of::<PowerSource>(), TypeKey::of::<Heater>()]);
        assert_eq!(reg.type_names().len(), 2);
    }

    #[test]
    fn policy_config_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&DuplicatePolicy::FirstWins).unwrap(),
            "\"first_wins\""
        );
        let policy: DuplicatePolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn policy_default_is_first_wins() {
        assert_eq!(Registry::new().duplicate_policy(), DuplicatePolicy::FirstWins);
    }
}
