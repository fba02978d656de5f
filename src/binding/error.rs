//! Binding and invocation error definitions.

use std::any::Any;

use thiserror::Error;

use crate::metadata::TagKind;

/// Error type returned by application handler methods.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration-time errors. These abort the whole `process` or
/// `register` call and are never retried.
#[derive(Debug, Error)]
pub enum BindError {
    /// A tagged method declares parameters the tag's binder cannot supply.
    #[error(
        "method signature not compatible: `{type_name}::{method}` is tagged {tag} \
         but declares ({actual}), expected ({expected})"
    )]
    IncompatibleSignature {
        type_name: &'static str,
        method: &'static str,
        tag: TagKind,
        expected: String,
        actual: String,
    },

    /// A custom binder could not be constructed.
    #[error("failed to construct binder `{binder}`: {source}")]
    BinderConstruction {
        binder: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Errors raised while invoking a bound method.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("`{method}` expects {expected} argument(s), got {actual}")]
    Arity {
        method: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("argument {index} of `{method}` is not a `{expected}`")]
    ArgumentType {
        method: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("receiver is not a `{expected}`")]
    Receiver { expected: &'static str },

    #[error("handler panicked: {0}")]
    Panicked(String),

    /// The blocking pool dropped the task before it completed.
    #[error("blocking task did not complete: {0}")]
    Join(String),

    /// Error returned by the application method itself.
    #[error("{0}")]
    Handler(#[source] BoxError),
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
