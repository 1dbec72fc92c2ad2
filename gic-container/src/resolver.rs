//! # The Resolver
//!
//! Builds a requested root type together with its whole dependency graph.
//!
//! ```text
//! Registry ──Resolver::new()──> Resolver ──resolve::<T>()──> Arc<T>
//!                                  │
//!                            SingletonCache
//! ```
//!
//! For each constructor parameter, in declared order:
//! - registered as Singleton: reuse the cached instance, or build and cache it
//! - registered as Transient: build a fresh one
//! - not registered: consume the next extra argument
//!
//! Each call carries its own [`ExtraArguments`] and in-progress path, so
//! nothing from one call leaks into the next. Singletons built during a
//! call are committed to the cache only if the whole call succeeds.
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use gic_container::prelude::*;
//!
//! struct PowerSource;
//! struct Heater {
//!     power: Arc<PowerSource>,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_descriptor(
//!     TypeDescriptor::from_fn::<PowerSource>(vec![], |_| Ok(PowerSource)),
//!     Scope::Singleton,
//! )?;
//! registry.register_descriptor(
//!     TypeDescriptor::from_fn::<Heater>(vec![TypeKey::of::<PowerSource>()], |args| {
//!         Ok(Heater { power: args.take_shared()? })
//!     }),
//!     Scope::Transient,
//! )?;
//!
//! let resolver = Resolver::new(registry);
//! let a = resolver.resolve_type(&TypeKey::of::<Heater>())?.downcast::<Heater>().unwrap();
//! let b = resolver.resolve_type(&TypeKey::of::<Heater>())?.downcast::<Heater>().unwrap();
//!
//! assert!(!Arc::ptr_eq(&a, &b));
//! assert!(Arc::ptr_eq(&a.power, &b.power));
//! # Ok::<(), GicError>(())
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use gic_support::rendering::suggest_similar;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::arguments::ExtraArguments;
use crate::cache::SingletonCache;
use crate::descriptor::{Injectable, TypeDescriptor};
use crate::error::{
    ConstructorShapeError, CyclicDependencyError, GicError, Result, ShapeMismatch,
    UnregisteredDependencyError,
};
use crate::graph::{PlanBuilder, ResolutionPlan};
use crate::key::{Instance, TypeKey};
use crate::registry::{RegistrationEntry, Registry};
use crate::scope::Scope;

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Fail a call that leaves extra arguments unconsumed instead of
    /// logging a warning.
    pub reject_unused_extras: bool,
}

/// Builds object graphs from a [`Registry`].
///
/// Owns the registry, so registrations cannot change once resolving has
/// started. Top-level calls are serialized; a resolver can be shared
/// between threads. A constructor that calls back into the resolver
/// running it gets [`GicError::ReentrantResolution`].
pub struct Resolver {
    registry: Arc<Registry>,
    singletons: SingletonCache,
    options: ResolverOptions,
    resolving: Mutex<()>,
    /// Thread currently inside `run`, if any.
    owner: Mutex<Option<ThreadId>>,
}

impl Resolver {
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self::with_options(registry, ResolverOptions::default())
    }

    pub fn with_options(registry: impl Into<Arc<Registry>>, options: ResolverOptions) -> Self {
        Self {
            registry: registry.into(),
            singletons: SingletonCache::new(),
            options,
            resolving: Mutex::new(()),
            owner: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn singletons(&self) -> &SingletonCache {
        &self.singletons
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Builds `T` with no extra arguments.
    ///
    /// ```rust,ignore
    /// let vehicle: Arc<Vehicle> = resolver.resolve()?;
    /// ```
    pub fn resolve<T: Injectable>(&self) -> Result<Arc<T>> {
        self.resolve_with(ExtraArguments::new())
    }

    /// Builds `T`, filling unregistered parameters from `extras`.
    ///
    /// If `T` itself is registered its scope applies, so a singleton root
    /// is cached like any other singleton. Otherwise `T` is built fresh
    /// from its [`Injectable`] impl.
    #[instrument(level = "debug", skip(self, extras), fields(root = type_name::<T>(), extras = extras.len()))]
    pub fn resolve_with<T: Injectable>(&self, extras: ExtraArguments) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        let instance = self.run(key, extras, |resolver, ctx| {
            match resolver.registry.lookup(&key) {
                Some(entry) => resolver.resolve_entry(entry, ctx),
                None => resolver.resolve_descriptor(&TypeDescriptor::of::<T>(), ctx),
            }
        })?;

        instance.downcast::<T>().map_err(|found| GicError::ConstructionFailed {
            key,
            source: format!(
                "Type mismatch: expected {}, constructor produced {}",
                type_name::<T>(),
                found.key()
            )
            .into(),
        })
    }

    /// Builds a registered type identified only by its key.
    pub fn resolve_type(&self, key: &TypeKey) -> Result<Instance> {
        self.resolve_type_with(key, ExtraArguments::new())
    }

    /// Like [`resolve_type`](Self::resolve_type), with extra arguments.
    ///
    /// # Errors
    /// Unregistered keys fail with [`ShapeMismatch::NoConstructor`]: without
    /// a registration there is no constructor to call.
    #[instrument(level = "debug", skip(self, extras), fields(root = %key, extras = extras.len()))]
    pub fn resolve_type_with(&self, key: &TypeKey, extras: ExtraArguments) -> Result<Instance> {
        let key = *key;
        let entry = self.registry.lookup(&key).ok_or_else(|| {
            GicError::ConstructorShape(ConstructorShapeError {
                target: key,
                mismatch: ShapeMismatch::NoConstructor,
            })
        })?;

        self.run(key, extras, |resolver, ctx| resolver.resolve_entry(entry, ctx))
    }

    /// Lists what resolving `T` would construct, bottom-up, without
    /// constructing anything.
    pub fn plan<T: Injectable>(&self) -> Result<ResolutionPlan> {
        let is_cached = |key: &TypeKey| self.singletons.contains(key);
        PlanBuilder::new(&self.registry, &is_cached).plan_root(&TypeDescriptor::of::<T>())
    }

    /// Runs one top-level call: fresh context in, staged singletons
    /// committed only on success.
    fn run(
        &self,
        root: TypeKey,
        extras: ExtraArguments,
        resolve_root: impl FnOnce(&Self, &mut ResolutionContext) -> Result<Instance>,
    ) -> Result<Instance> {
        let _call = self.enter_call(root)?;
        let mut ctx = ResolutionContext::new(extras);

        let instance = resolve_root(self, &mut ctx)?;

        let remaining = ctx.extras.len();
        if remaining > 0 {
            if self.options.reject_unused_extras {
                return Err(GicError::UnusedExtraArguments { root, remaining });
            }
            warn!(root = %root, remaining, "Extra arguments left unconsumed");
        }

        self.singletons.commit(ctx.staged);
        Ok(instance)
    }

    /// Serializes top-level calls and refuses nested ones from the same
    /// thread, which would otherwise wait on their own lock.
    fn enter_call(&self, root: TypeKey) -> Result<CallGuard<'_>> {
        let current = thread::current().id();
        if *self.owner.lock() == Some(current) {
            warn!(root = %root, "Resolver re-entered from a constructor");
            return Err(GicError::ReentrantResolution { root });
        }

        let serialized = self.resolving.lock();
        *self.owner.lock() = Some(current);
        Ok(CallGuard {
            owner: &self.owner,
            _serialized: serialized,
        })
    }

    fn resolve_entry(&self, entry: &RegistrationEntry, ctx: &mut ResolutionContext) -> Result<Instance> {
        match entry.scope() {
            Scope::Transient => self.resolve_descriptor(entry.descriptor(), ctx),
            Scope::Singleton => {
                let key = entry.key();
                if let Some(existing) = self.singletons.get(&key).or_else(|| ctx.staged(&key)) {
                    trace!(key = %key, "Reusing singleton");
                    return Ok(existing);
                }

                let instance = self.resolve_descriptor(entry.descriptor(), ctx)?;
                ctx.stage(key, instance.clone());
                Ok(instance)
            }
        }
    }

    fn resolve_descriptor(&self, descriptor: &TypeDescriptor, ctx: &mut ResolutionContext) -> Result<Instance> {
        let key = descriptor.key();
        ctx.enter(key)?;

        let mut values = Vec::with_capacity(descriptor.parameters().len());
        for (position, parameter) in descriptor.parameters().iter().enumerate() {
            let value = match self.registry.lookup(parameter) {
                Some(entry) => self.resolve_entry(entry, ctx)?,
                None => self.take_extra(key, position, *parameter, ctx)?,
            };
            values.push(value);
        }

        let instance = descriptor.construct(values)?;
        ctx.leave();
        debug!(key = %key, "Constructed");
        Ok(instance)
    }

    fn take_extra(
        &self,
        target: TypeKey,
        position: usize,
        parameter: TypeKey,
        ctx: &mut ResolutionContext,
    ) -> Result<Instance> {
        let Some(extra) = ctx.extras.take_next() else {
            return Err(GicError::UnregisteredDependency(UnregisteredDependencyError {
                requested: parameter,
                required_by: target,
                suggestions: suggest_similar(parameter.type_name(), &self.registry.type_names(), 3),
            }));
        };

        if extra.key() != parameter {
            return Err(GicError::ConstructorShape(ConstructorShapeError {
                target,
                mismatch: ShapeMismatch::TypeMismatch {
                    position,
                    expected: parameter.type_name(),
                    found: extra.key().type_name(),
                },
            }));
        }

        trace!(target = %target, position, parameter = %parameter, "Consumed extra argument");
        Ok(extra)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("registered", &self.registry.len())
            .field("singletons", &self.singletons.len())
            .field("options", &self.options)
            .finish()
    }
}

/// Held for the duration of one top-level call. Clears the owner even when
/// a constructor panics.
struct CallGuard<'r> {
    owner: &'r Mutex<Option<ThreadId>>,
    _serialized: MutexGuard<'r, ()>,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        *self.owner.lock() = None;
    }
}

/// State for one top-level resolve call.
struct ResolutionContext {
    extras: ExtraArguments,
    /// Types currently being built, outermost first.
    path: Vec<TypeKey>,
    staged: HashMap<TypeKey, Instance>,
}

impl ResolutionContext {
    fn new(extras: ExtraArguments) -> Self {
        Self {
            extras,
            path: Vec::new(),
            staged: HashMap::new(),
        }
    }

    fn enter(&mut self, key: TypeKey) -> Result<()> {
        if let Some(start) = self.path.iter().position(|k| *k == key) {
            let mut chain = self.path[start..].to_vec();
            chain.push(key);
            warn!(cycle = ?chain, "Cyclic dependency detected");
            return Err(GicError::CyclicDependency(CyclicDependencyError { chain }));
        }
        self.path.push(key);
        Ok(())
    }

    fn leave(&mut self) {
        self.path.pop();
    }

    fn staged(&self, key: &TypeKey) -> Option<Instance> {
        self.staged.get(key).cloned()
    }

    fn stage(&mut self, key: TypeKey, instance: Instance) {
        self.staged.insert(key, instance);
    }
}
