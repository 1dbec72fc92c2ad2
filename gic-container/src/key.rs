//! Type identity and type-erased instances.
//!
//! [`TypeKey`] identifies a constructible type inside the registry.
//! [`Instance`] is a shared, type-erased value tagged with its key.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use gic_support::rendering::short_type_name;

/// Identifies a type in the registry.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for
/// messages.
///
/// # Examples
/// ```
/// use gic_container::key::TypeKey;
///
/// let key = TypeKey::of::<String>();
/// assert_eq!(key.type_name(), "alloc::string::String");
/// assert_eq!(key.short_name(), "String");
/// assert_eq!(key, TypeKey::of::<String>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Creates a key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without module paths, for log lines and plans.
    pub fn short_name(&self) -> String {
        short_type_name(self.type_name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A constructed value, shared and type-erased.
///
/// Cloning an `Instance` clones the pointer, never the value, so two
/// clones are the same object as far as [`Instance::ptr_eq`] is concerned.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    key: TypeKey,
}

impl Instance {
    /// Wraps an owned value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// Wraps an already shared value without copying it.
    pub fn shared<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value,
            key: TypeKey::of::<T>(),
        }
    }

    /// Key of the concrete type stored inside.
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.key.type_id() == TypeId::of::<T>()
    }

    /// Recovers the typed pointer, or hands the instance back on mismatch.
    pub fn downcast<T: Send + Sync + 'static>(self) -> Result<Arc<T>, Instance> {
        let key = self.key;
        self.value
            .downcast::<T>()
            .map_err(|value| Instance { value, key })
    }

    /// Returns `true` if both instances point at the same object.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.key.type_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Heater(u8);

    #[test]
    fn key_of_type() {
        let key = TypeKey::of::<Heater>();
        assert!(key.type_name().ends_with("Heater"));
        assert_eq!(key.short_name(), "Heater");
    }

    #[test]
    fn keys_differ_by_type() {
        assert_ne!(TypeKey::of::<String>(), TypeKey::of::<u32>());
    }

    #[test]
    fn key_in_hashmap() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(TypeKey::of::<String>(), "string");
        assert_eq!(map.get(&TypeKey::of::<String>()), Some(&"string"));
        assert_eq!(map.get(&TypeKey::of::<bool>()), None);
    }

    #[test]
    fn instance_downcast_roundtrip() {
        let instance = Instance::new(7u32);
        assert!(instance.is::<u32>());
        assert_eq!(instance.key(), TypeKey::of::<u32>());
        assert_eq!(*instance.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn instance_downcast_mismatch_returns_instance() {
        let instance = Instance::new(String::from("Sony"));
        let back = instance.downcast::<u32>().unwrap_err();
        assert!(back.is::<String>());
    }

    #[test]
    fn clones_share_identity() {
        let a = Instance::new(Heater(1));
        let b = a.clone();
        let c = Instance::new(Heater(1));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn shared_keeps_pointer() {
        let heater = Arc::new(Heater(2));
        let instance = Instance::shared(heater.clone());
        assert!(Arc::ptr_eq(&instance.downcast::<Heater>().unwrap(), &heater));
    }
}
