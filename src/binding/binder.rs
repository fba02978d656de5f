//! Binder strategy trait.

use std::any::{Any, TypeId};

use crate::metadata::{MethodDescriptor, TypeInfo};

use super::error::BindError;
use super::handle::Instance;

/// A capability-scoped strategy that turns method tags into configuration
/// calls against a context object.
///
/// Binders are registered by type on a [`Processor`](super::Processor); at
/// most one binder of each type is active. `bind` receives the context
/// erased and downcasts it to the type it claimed in `applies_to`.
pub trait Binder: Send + Sync + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether this binder handles contexts of the given type.
    fn applies_to(&self, context: TypeId) -> bool;

    /// Check `method` without touching the context. Runs for every method
    /// before the first `bind` of a dispatch pass. Only errors raised here
    /// leave the context untouched.
    fn validate(&self, _declaring: &TypeInfo, _method: &MethodDescriptor) -> Result<(), BindError> {
        Ok(())
    }

    /// Configure the context for `method`. An error aborts the pass but
    /// earlier `bind` calls are not undone.
    ///
    /// Runs while the [`Processor`](super::Processor) lock is held: calling
    /// `register` or `process` on the same processor from here deadlocks.
    fn bind(
        &self,
        context: &mut dyn Any,
        instance: &Instance,
        declaring: &TypeInfo,
        method: &MethodDescriptor,
    ) -> Result<(), BindError>;
}
