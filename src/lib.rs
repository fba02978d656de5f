//! Route binder library.
//!
//! Turns tagged methods of application types into HTTP routes: a type
//! declares its methods and tags once through a [`metadata::TypeDescriptor`],
//! the [`binding::Processor`] runs its binders over an instance, and the
//! default [`binding::RouteBinder`] configures one [`routing::Route`] per
//! handler method. [`http::HttpServer`] serves the resulting router.

// Core subsystems
pub mod binding;
pub mod metadata;
pub mod routing;

// Serving
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub mod demo;

pub use binding::{Binder, BindError, Instance, InvocationHandle, InvokeError, Processor, RouteBinder};
pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use metadata::{HttpVerb, Tag, TagKind, TypeDescriptor};
pub use routing::{Route, Router, RoutingContext};
