//! Binder pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Processor::process(context, instance, descriptor)
//!     → registry.rs (binders whose applies_to matches the context type)
//!     → validation pass: Binder::validate for every public method
//!       (errors here leave the context untouched)
//!     → binding pass: Binder::bind for every public method, registry order
//!         → signature.rs (tag present? parameters compatible?)
//!         → handle.rs (InvocationHandle bound to the instance)
//!         → route_binder.rs (route configuration calls on the Router)
//! ```
//!
//! # Design Decisions
//! - Custom binders run before the route binder
//! - Configuration errors are fatal and returned to the caller
//! - Handles are synthesized once per bound method and reused per request

pub mod binder;
pub mod error;
pub mod handle;
pub mod registry;
pub mod route_binder;
pub mod signature;

pub use binder::Binder;
pub use error::{BindError, BoxError, InvokeError};
pub use handle::{Instance, InvocationHandle};
pub use registry::Processor;
pub use route_binder::RouteBinder;
pub use signature::{compatible_tag, is_compatible, method_handle, signature_matches};
