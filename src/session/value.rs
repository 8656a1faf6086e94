//! Type-erased session values.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// A value stored in a session.
///
/// Values keep the name of the Rust type they were created from so that a
/// failed typed lookup can report what was actually stored. Cloning is cheap;
/// clones share the underlying allocation.
#[derive(Clone)]
pub struct SessionValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl SessionValue {
    /// Wrap a value.
    pub fn new<V>(value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<V>(),
        }
    }

    /// Name of the concrete type this value was created from.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the value as `T`.
    ///
    /// Matches when the stored type is exactly `T`, or when it is a single
    /// `Arc<T>` or `Box<T>` around it. Deeper nesting never matches.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let any: &(dyn Any + Send + Sync) = &*self.inner;
        any.downcast_ref::<T>()
            .or_else(|| any.downcast_ref::<Arc<T>>().map(|v| &**v))
            .or_else(|| any.downcast_ref::<Box<T>>().map(|v| &**v))
    }

    /// Check whether the value can be read as `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Clone the value out as `T`.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for SessionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}
