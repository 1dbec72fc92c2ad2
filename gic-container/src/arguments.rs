//! Constructor arguments and caller-supplied extras.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConstructorShapeError, GicError, Result, ShapeMismatch};
use crate::key::{Instance, TypeKey};

/// The argument list handed to a constructor.
///
/// Arguments arrive in the order the type declared its parameters and are
/// read front to back. Reading past the end, reading the wrong type, or
/// leaving arguments unread are all
/// [`ConstructorShape`](GicError::ConstructorShape) errors.
pub struct Arguments {
    target: TypeKey,
    values: VecDeque<Instance>,
    consumed: usize,
}

impl Arguments {
    pub(crate) fn new(target: TypeKey, values: Vec<Instance>) -> Self {
        Self {
            target,
            values: values.into(),
            consumed: 0,
        }
    }

    /// The type being constructed.
    pub fn target(&self) -> TypeKey {
        self.target
    }

    /// Number of arguments not read yet.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Takes the next argument as a shared pointer.
    ///
    /// Singletons come out pointer-identical across every consumer.
    pub fn take_shared<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let position = self.consumed;
        let instance = self
            .values
            .pop_front()
            .ok_or_else(|| self.shape_error(ShapeMismatch::MissingArgument { position }))?;
        self.consumed += 1;

        instance.downcast::<T>().map_err(|found| {
            self.shape_error(ShapeMismatch::TypeMismatch {
                position,
                expected: std::any::type_name::<T>(),
                found: found.key().type_name(),
            })
        })
    }

    /// Takes the next argument by value.
    ///
    /// Moves the value out when nothing else holds it, clones otherwise.
    pub fn take_owned<T: Clone + Send + Sync + 'static>(&mut self) -> Result<T> {
        let shared = self.take_shared::<T>()?;
        Ok(Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone()))
    }

    pub(crate) fn finish(self) -> Result<()> {
        if self.values.is_empty() {
            return Ok(());
        }
        Err(self.shape_error(ShapeMismatch::UnconsumedArguments {
            assembled: self.consumed + self.values.len(),
            consumed: self.consumed,
        }))
    }

    fn shape_error(&self, mismatch: ShapeMismatch) -> GicError {
        GicError::ConstructorShape(ConstructorShapeError {
            target: self.target,
            mismatch,
        })
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("target", &self.target)
            .field("consumed", &self.consumed)
            .field("remaining", &self.values.len())
            .finish()
    }
}

/// Values supplied by the caller for parameters that are not registered.
///
/// Extras belong to a single resolve call. They are consumed one per
/// unregistered parameter, in the order the resolver meets those
/// parameters (depth first, declaration order).
///
/// # Examples
/// ```
/// use gic_container::arguments::ExtraArguments;
///
/// let extras = ExtraArguments::new()
///     .with(String::from("Sony"))
///     .with(18u32);
/// assert_eq!(extras.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ExtraArguments {
    values: VecDeque<Instance>,
}

impl ExtraArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an owned value.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(Instance::new(value));
        self
    }

    /// Appends a value that is already shared.
    pub fn with_shared<T: Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.push(Instance::shared(value));
        self
    }

    pub fn push(&mut self, instance: Instance) {
        self.values.push_back(instance);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn take_next(&mut self) -> Option<Instance> {
        self.values.pop_front()
    }
}

impl FromIterator<Instance> for ExtraArguments {
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for ExtraArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|v| v.key()))
            .finish()
    }
}
