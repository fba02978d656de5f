//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Binding (at startup):
//!     RouteBinder
//!     → router.rs (Router::route creates a Route)
//!     → route.rs (path, verbs, order, handlers applied)
//!
//! Per request:
//!     http::server dispatch
//!     → context.rs (RoutingContext built from the request)
//!     → Route::execute (inline or blocking pool)
//!     → failure handler if the handler failed
//! ```
//!
//! # Design Decisions
//! - Routes are configured once and frozen when mounted
//! - First match wins in (order, creation) sequence

pub mod context;
pub mod route;
pub mod router;

pub use context::{Failure, RoutingContext};
pub use route::{RequestHandler, Route};
pub use router::Router;
