//! Singleton storage for one resolver.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use tracing::debug;

use crate::key::{Instance, TypeKey};

/// Maps each singleton type to its one constructed instance.
///
/// Starts empty and only grows: entries are never evicted or replaced.
/// Singletons built during a resolve call are committed together once the
/// call succeeds, so a failed call leaves the cache as it was.
#[derive(Default)]
pub struct SingletonCache {
    instances: RwLock<HashMap<TypeKey, Instance>>,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached instance for `key`, if one was committed.
    pub fn get(&self, key: &TypeKey) -> Option<Instance> {
        self.instances.read().get(key).cloned()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.instances.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// Adds freshly built singletons. An existing entry always wins.
    pub(crate) fn commit(&self, staged: impl IntoIterator<Item = (TypeKey, Instance)>) {
        let mut instances = self.instances.write();
        for (key, instance) in staged {
            instances.entry(key).or_insert_with(|| {
                debug!(key = %key, "Cached singleton");
                instance
            });
        }
    }
}

impl fmt::Debug for SingletonCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonCache")
            .field("cached", &self.len())
            .finish()
    }
}
