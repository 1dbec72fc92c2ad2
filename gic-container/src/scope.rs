//! Lifecycle scopes.
//!
//! - [`Scope::Singleton`]: one instance per [`Resolver`](crate::resolver::Resolver)
//! - [`Scope::Transient`]: new instance every time
//!
//! Scopes are ordered by lifetime, `Singleton > Transient`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Defines how long a resolved dependency lives.
///
/// # Examples
/// ```
/// use gic_container::scope::Scope;
///
/// assert!(Scope::Singleton > Scope::Transient);
/// assert!(Scope::Singleton.is_cached());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// New instance on every resolve. Never cached.
    Transient,

    /// One instance shared for the lifetime of the resolver.
    ///
    /// Created the first time something needs it, then reused by every
    /// later resolution.
    Singleton,
}

impl Scope {
    /// Returns `true` if instances of this scope are cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }

    #[inline]
    fn lifetime_rank(&self) -> u8 {
        match self {
            Scope::Singleton => 1,
            Scope::Transient => 0,
        }
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.lifetime_rank().cmp(&other.lifetime_rank())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => f.write_str("Singleton"),
            Scope::Transient => f.write_str("Transient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Scope::Singleton > Scope::Transient);
        assert_eq!(Scope::Transient.cmp(&Scope::Transient), std::cmp::Ordering::Equal);
    }

    #[test]
    fn only_singleton_is_cached() {
        assert!(Scope::Singleton.is_cached());
        assert!(!Scope::Transient.is_cached());
    }

    #[test]
    fn config_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::Singleton).unwrap(), "\"singleton\"");
        let scope: Scope = serde_json::from_str("\"transient\"").unwrap();
        assert_eq!(scope, Scope::Transient);
        assert!(serde_json::from_str::<Scope>("\"Singleton\"").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Scope::Singleton.to_string(), "Singleton");
        assert_eq!(Scope::Transient.to_string(), "Transient");
    }
}
