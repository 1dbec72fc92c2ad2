//! Constructor metadata.
//!
//! Rust has no runtime reflection, so every constructible type declares its
//! parameter list and constructor up front, either through [`Injectable`]
//! (usually derived) or as a closure via [`TypeDescriptor::from_fn`].

use std::fmt;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::Result;
use crate::key::{Instance, TypeKey};

/// A type the resolver can build on its own.
///
/// `parameters` lists the constructor's parameter types in order;
/// `construct` reads them back from [`Arguments`] in the same order.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use gic_container::prelude::*;
///
/// struct Disc;
/// struct Stereo {
///     disc: Arc<Disc>,
///     model: String,
/// }
///
/// impl Injectable for Disc {
///     fn parameters() -> Vec<TypeKey> { vec![] }
///     fn construct(_: &mut Arguments) -> Result<Self> { Ok(Disc) }
/// }
///
/// impl Injectable for Stereo {
///     fn parameters() -> Vec<TypeKey> {
///         vec![TypeKey::of::<Disc>(), TypeKey::of::<String>()]
///     }
///     fn construct(args: &mut Arguments) -> Result<Self> {
///         Ok(Stereo { disc: args.take_shared()?, model: args.take_owned()? })
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.transient::<Disc>()?;
///
/// let resolver = Resolver::new(registry);
/// let stereo = resolver.resolve_with::<Stereo>(
///     ExtraArguments::new().with(String::from("Sony")),
/// )?;
/// assert_eq!(stereo.model, "Sony");
/// # Ok::<(), gic_container::GicError>(())
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Constructor parameter types, in declaration order.
    fn parameters() -> Vec<TypeKey>;

    /// Builds the value from its assembled arguments.
    fn construct(args: &mut Arguments) -> Result<Self>;
}

/// Type-erased constructor.
pub type ConstructorFn = Arc<dyn Fn(&mut Arguments) -> Result<Instance> + Send + Sync>;

/// Identity, parameter list and constructor of one type.
#[derive(Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    parameters: Vec<TypeKey>,
    constructor: ConstructorFn,
}

impl TypeDescriptor {
    /// Describes an [`Injectable`] type.
    pub fn of<T: Injectable>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            parameters: T::parameters(),
            constructor: Arc::new(|args: &mut Arguments| T::construct(args).map(Instance::new)),
        }
    }

    /// Describes a type through an explicit factory.
    ///
    /// ```
    /// use gic_container::prelude::*;
    ///
    /// struct Heater { watts: u32 }
    ///
    /// let descriptor = TypeDescriptor::from_fn::<Heater>(
    ///     vec![TypeKey::of::<u32>()],
    ///     |args| Ok(Heater { watts: args.take_owned()? }),
    /// );
    /// assert_eq!(descriptor.parameters(), &[TypeKey::of::<u32>()]);
    /// ```
    pub fn from_fn<T: Send + Sync + 'static>(
        parameters: Vec<TypeKey>,
        constructor: impl Fn(&mut Arguments) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            parameters,
            constructor: Arc::new(move |args: &mut Arguments| constructor(args).map(Instance::new)),
        }
    }

    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }

    /// Runs the constructor over `values`, which must line up with
    /// [`parameters`](Self::parameters).
    pub(crate) fn construct(&self, values: Vec<Instance>) -> Result<Instance> {
        let mut args = Arguments::new(self.key, values);
        let instance = (self.constructor)(&mut args)?;
        args.finish()?;
        Ok(instance)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
