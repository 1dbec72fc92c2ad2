//! Error types for registration and resolution.
//!
//! Every failure aborts the current resolve call. Messages name the types
//! involved and, where it helps, end with a hint.

use std::fmt;

use gic_support::rendering::render_path;

use crate::key::TypeKey;
use crate::scope::Scope;

/// Main error type for all gic operations.
#[derive(Debug, thiserror::Error)]
pub enum GicError {
    /// A parameter type is not registered and no extra argument was left
    /// to fill it.
    #[error("{}", .0)]
    UnregisteredDependency(UnregisteredDependencyError),

    /// The constructor and the assembled argument list disagree.
    #[error("{}", .0)]
    ConstructorShape(ConstructorShapeError),

    /// The same type was registered twice under [`DuplicatePolicy::Reject`].
    ///
    /// [`DuplicatePolicy::Reject`]: crate::registry::DuplicatePolicy::Reject
    #[error("{}", .0)]
    AmbiguousRegistration(AmbiguousRegistrationError),

    /// A type depends on itself, directly or through others.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),

    /// Extra arguments were left over after a successful resolve.
    #[error(
        "{remaining} extra argument(s) were not consumed while resolving {root}\n  Hint: pass one extra argument per unregistered constructor parameter"
    )]
    UnusedExtraArguments { root: TypeKey, remaining: usize },

    /// A constructor called back into the resolver that is running it.
    #[error(
        "Resolver re-entered while resolving {root}\n  Hint: declare the dependency as a constructor parameter instead of resolving it inside the constructor"
    )]
    ReentrantResolution { root: TypeKey },

    /// A constructor returned its own error.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: TypeKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl GicError {
    /// Wraps an error raised inside a constructor for type `T`.
    pub fn construction<T: ?Sized + 'static>(
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        GicError::ConstructionFailed {
            key: TypeKey::of::<T>(),
            source: source.into(),
        }
    }
}

/// A parameter could not be satisfied.
#[derive(Debug)]
pub struct UnregisteredDependencyError {
    /// The parameter type that was needed
    pub requested: TypeKey,
    /// The type whose constructor declared the parameter
    pub required_by: TypeKey,
    /// Registered types with similar names
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnregisteredDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unregistered dependency: {} (required by {})",
            self.requested, self.required_by
        )?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register {} or pass it as an extra argument",
            self.requested.short_name()
        )
    }
}

/// What exactly went wrong between a constructor and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeMismatch {
    /// The type has no constructor the resolver can reach.
    NoConstructor,
    /// The constructor asked for more arguments than were assembled.
    MissingArgument { position: usize },
    /// The argument at `position` has a different runtime type.
    TypeMismatch {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
    /// The constructor returned without reading every argument.
    UnconsumedArguments { assembled: usize, consumed: usize },
}

#[derive(Debug)]
pub struct ConstructorShapeError {
    pub target: TypeKey,
    pub mismatch: ShapeMismatch,
}

impl fmt::Display for ConstructorShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mismatch {
            ShapeMismatch::NoConstructor => write!(
                f,
                "No constructor for {}\n  Hint: register it, or resolve it by type so its Injectable impl is used",
                self.target
            ),
            ShapeMismatch::MissingArgument { position } => write!(
                f,
                "Constructor of {} reads argument #{position}, but only {position} were assembled",
                self.target
            ),
            ShapeMismatch::TypeMismatch {
                position,
                expected,
                found,
            } => write!(
                f,
                "Constructor of {} expected {expected} at argument #{position}, found {found}",
                self.target
            ),
            ShapeMismatch::UnconsumedArguments {
                assembled,
                consumed,
            } => write!(
                f,
                "Constructor of {} consumed {consumed} of {assembled} arguments\n  Hint: its declared parameters do not match what it reads",
                self.target
            ),
        }
    }
}

/// Duplicate registration rejected by policy.
#[derive(Debug)]
pub struct AmbiguousRegistrationError {
    pub key: TypeKey,
    pub existing: Scope,
    pub attempted: Scope,
}

impl fmt::Display for AmbiguousRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ambiguous registration: {} is already registered as {} (attempted {})",
            self.key, self.existing, self.attempted
        )?;
        write!(
            f,
            "\n  Hint: use DuplicatePolicy::FirstWins to keep the first registration"
        )
    }
}

/// Cycle found during resolution or validation.
#[derive(Debug)]
pub struct CyclicDependencyError {
    /// Starts and ends with the same type, e.g. `[A, B, A]`.
    pub chain: Vec<TypeKey>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.chain.iter().map(TypeKey::short_name).collect();
        write!(f, "Cyclic dependency detected:\n  {}", render_path(&names))
    }
}

/// Convenient Result type for gic operations.
pub type Result<T> = std::result::Result<T, GicError>;
