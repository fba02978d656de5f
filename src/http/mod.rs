//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all dispatch)
//!     → pattern.rs (route path matching, parameter capture)
//!     → routing::Route::execute (handler, failure handler)
//!     → RoutingContext::into_response
//!     → Send to client
//! ```

pub mod pattern;
pub mod server;

pub use pattern::PathPattern;
pub use server::{mount, HttpServer, MountError};
