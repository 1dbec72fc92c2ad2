//! Core resolution engine for gic.

pub mod arguments;
pub mod cache;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod key;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod scope;

pub use arguments::{Arguments, ExtraArguments};
pub use cache::SingletonCache;
pub use descriptor::{ConstructorFn, Injectable, TypeDescriptor};
pub use error::{GicError, Result};
pub use graph::{ResolutionPlan, ValidationReport};
pub use key::{Instance, TypeKey};
pub use provider::Module;
pub use registry::{DuplicatePolicy, RegistrationEntry, Registry};
pub use resolver::{Resolver, ResolverOptions};
pub use scope::Scope;

pub mod prelude {
    pub use crate::arguments::{Arguments, ExtraArguments};
    pub use crate::descriptor::{Injectable, TypeDescriptor};
    pub use crate::error::{GicError, Result};
    pub use crate::key::{Instance, TypeKey};
    pub use crate::provider::Module;
    pub use crate::registry::{DuplicatePolicy, Registry};
    pub use crate::resolver::{Resolver, ResolverOptions};
    pub use crate::scope::Scope;
}
