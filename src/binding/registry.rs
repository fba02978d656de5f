//! Binder pipeline and dispatcher.
//!
//! # Responsibilities
//! - Keep the ordered list of active binders
//! - Insert custom binders ahead of the route binder
//! - Run every applicable binder over every public method of an instance
//!
//! # Design Decisions
//! - One lock serializes `register` and `process`; this is setup code only
//! - The route binder is installed at construction and is always last
//! - `process` validates every method before binding any of them, so an
//!   error from `Binder::validate` leaves the context untouched. Errors
//!   from `Binder::bind` abort the pass without rolling back earlier calls
//! - The lock is held across every `bind` call and is not reentrant

use std::any::{type_name, Any, TypeId};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::metadata::TypeDescriptor;

use super::binder::Binder;
use super::error::{BindError, BoxError};
use super::handle::Instance;
use super::route_binder::RouteBinder;

struct Entry {
    type_id: TypeId,
    binder: Arc<dyn Binder>,
}

impl Entry {
    fn of<B: Binder>(binder: B) -> Self {
        Self {
            type_id: TypeId::of::<B>(),
            binder: Arc::new(binder),
        }
    }
}

/// Ordered binder pipeline.
pub struct Processor {
    binders: Mutex<Vec<Entry>>,
}

impl Processor {
    pub fn new() -> Self {
        Self {
            binders: Mutex::new(vec![Entry::of(RouteBinder)]),
        }
    }

    /// Register a binder by type. Returns `false` if one is already active.
    pub fn register<B>(&self) -> Result<bool, BindError>
    where
        B: Binder + Default,
    {
        self.try_register::<B, _, Infallible>(|| Ok(B::default()))
    }

    /// Register a binder built by `make`. `make` only runs if no binder of
    /// type `B` is active yet; its error is returned as a configuration error.
    pub fn try_register<B, F, E>(&self, make: F) -> Result<bool, BindError>
    where
        B: Binder,
        F: FnOnce() -> Result<B, E>,
        E: Into<BoxError>,
    {
        let mut binders = self.binders.lock();
        if binders.iter().any(|entry| entry.type_id == TypeId::of::<B>()) {
            tracing::debug!(binder = type_name::<B>(), "Binder already registered");
            return Ok(false);
        }

        let binder = make().map_err(|source| BindError::BinderConstruction {
            binder: type_name::<B>(),
            source: source.into(),
        })?;

        let position = binders.len().saturating_sub(1);
        binders.insert(position, Entry::of(binder));
        tracing::info!(
            binder = type_name::<B>(),
            position,
            total = binders.len(),
            "Binder registered"
        );
        Ok(true)
    }

    /// Run the pipeline for one (context, instance) pair.
    pub fn process<C, T>(
        &self,
        context: &mut C,
        instance: Arc<T>,
        descriptor: &TypeDescriptor<T>,
    ) -> Result<(), BindError>
    where
        C: Any,
        T: Send + Sync + 'static,
    {
        let binders = self.binders.lock();
        let declaring = descriptor.info();
        let context_type = TypeId::of::<C>();
        let active: Vec<&Arc<dyn Binder>> = binders
            .iter()
            .map(|entry| &entry.binder)
            .filter(|binder| binder.applies_to(context_type))
            .collect();

        if active.is_empty() {
            tracing::debug!(
                context = type_name::<C>(),
                "No binder applies to context"
            );
            return Ok(());
        }

        for method in declaring.public_methods() {
            for binder in &active {
                binder.validate(declaring, method)?;
            }
        }

        let instance = Instance::new(instance);
        let mut methods = 0usize;
        for method in declaring.public_methods() {
            for binder in &active {
                binder.bind(&mut *context, &instance, declaring, method)?;
            }
            methods += 1;
        }

        tracing::debug!(
            type_name = declaring.name(),
            context = type_name::<C>(),
            methods,
            binders = active.len(),
            "Instance processed"
        );
        Ok(())
    }

    pub fn binder_names(&self) -> Vec<&'static str> {
        self.binders
            .lock()
            .iter()
            .map(|entry| entry.binder.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.binders.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.lock().is_empty()
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("binders", &self.binder_names())
            .finish()
    }
}
