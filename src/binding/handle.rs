//! Invocation handles.
//!
//! An `InvocationHandle` binds one declared method to one instance. It is
//! synthesized after the method's signature has been validated and is then
//! called directly on every request without another check.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::metadata::descriptor::{RawMethod, Receiver};
use crate::metadata::MethodDescriptor;

use super::error::InvokeError;

/// An application object handed to the dispatcher.
#[derive(Clone)]
pub struct Instance {
    receiver: Arc<Receiver>,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T>(value: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            receiver: value,
            type_name: type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.receiver.downcast_ref::<T>()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A pre-validated, reusable callable for one (instance, method) pair.
#[derive(Clone)]
pub struct InvocationHandle {
    receiver: Arc<Receiver>,
    raw: RawMethod,
    method: &'static str,
    declaring_type: &'static str,
}

impl InvocationHandle {
    pub(crate) fn new(instance: &Instance, method: &MethodDescriptor) -> Self {
        Self {
            receiver: Arc::clone(&instance.receiver),
            raw: Arc::clone(method.raw()),
            method: method.name(),
            declaring_type: method.declaring_type(),
        }
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.method)
    }

    pub fn invoke(&self, args: &mut [&mut dyn Any]) -> Result<(), InvokeError> {
        (self.raw)(self.receiver.as_ref(), args)
    }

    /// Call a single-argument method.
    pub fn call<A: Any>(&self, arg: &mut A) -> Result<(), InvokeError> {
        self.invoke(&mut [arg as &mut dyn Any])
    }

    pub fn call0(&self) -> Result<(), InvokeError> {
        self.invoke(&mut [])
    }
}

impl fmt::Debug for InvocationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationHandle")
            .field("method", &self.qualified_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeDescriptor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tally {
        calls: AtomicUsize,
    }

    impl Tally {
        fn add(&self, amount: &mut usize) {
            self.calls.fetch_add(*amount, Ordering::SeqCst);
        }

        fn ping(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_handle_is_bound_to_instance() {
        let desc = TypeDescriptor::<Tally>::builder("Tally")
            .method("add", Tally::add, |m| m)
            .method0("ping", Tally::ping, |m| m)
            .build();
        let tally = Arc::new(Tally::default());
        let instance = Instance::new(Arc::clone(&tally));
        assert_eq!(instance.type_name(), type_name::<Tally>());
        assert!(instance.downcast_ref::<Tally>().is_some());

        let add = InvocationHandle::new(&instance, desc.method("add").unwrap());
        let ping = InvocationHandle::new(&instance, desc.method("ping").unwrap());
        assert_eq!(add.qualified_name(), "Tally::add");

        for _ in 0..3 {
            add.call(&mut 2usize).unwrap();
        }
        ping.call0().unwrap();
        assert_eq!(tally.calls.load(Ordering::SeqCst), 7);

        let cloned = add.clone();
        cloned.call(&mut 3usize).unwrap();
        assert_eq!(tally.calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_handle_reports_argument_mismatch() {
        let desc = TypeDescriptor::<Tally>::builder("Tally")
            .method("add", Tally::add, |m| m)
            .build();
        let instance = Instance::new(Arc::new(Tally::default()));
        let add = InvocationHandle::new(&instance, desc.method("add").unwrap());

        let err = add.call(&mut String::from("x")).unwrap_err();
        assert!(matches!(err, InvokeError::ArgumentType { method: "add", .. }));
    }
}
