//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Compile bound routes into a dispatch table
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests to routes and failure routes
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, LimitsConfig};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::{Route, Router, RoutingContext};

use super::pattern::PathPattern;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("route {route}: invalid path pattern '{pattern}': {reason}")]
    InvalidPath {
        route: String,
        pattern: String,
        reason: String,
    },
}

/// A route ready for dispatch. `pattern` is `None` for routes that match
/// every path.
struct Mounted {
    route: Arc<Route>,
    pattern: Option<PathPattern>,
}

impl Mounted {
    fn matches_path(&self, path: &str) -> Option<std::collections::HashMap<String, String>> {
        match &self.pattern {
            Some(pattern) => pattern.matches(path),
            None => Some(Default::default()),
        }
    }
}

/// Frozen dispatch table shared by all requests.
struct RouteTable {
    /// Routes with a request handler, in (order, creation) sequence.
    handlers: Vec<Mounted>,
    /// Routes with a failure handler: path-bound first, then path-less.
    failures: Vec<Mounted>,
    max_body_bytes: usize,
}

/// Build the Axum router serving the enabled routes of `router`.
pub fn mount(router: &Router, limits: &LimitsConfig) -> Result<axum::Router, MountError> {
    let mut handlers = Vec::new();
    let mut path_failures = Vec::new();
    let mut global_failures = Vec::new();

    for route in router.sorted() {
        if !route.is_enabled() {
            tracing::debug!(route = %route.label(), "Skipping disabled route");
            continue;
        }

        let pattern = route
            .path()
            .map(|raw| {
                PathPattern::parse(raw).map_err(|reason| MountError::InvalidPath {
                    route: route.label(),
                    pattern: raw.to_string(),
                    reason,
                })
            })
            .transpose()?;
        let shared = Arc::new(route.clone());

        if route.has_handler() {
            handlers.push(Mounted {
                route: Arc::clone(&shared),
                pattern: pattern.clone(),
            });
        }
        if route.has_failure_handler() {
            let mounted = Mounted {
                route: shared,
                pattern,
            };
            if mounted.pattern.is_some() {
                path_failures.push(mounted);
            } else {
                global_failures.push(mounted);
            }
        }
    }

    tracing::info!(
        handlers = handlers.len(),
        failure_handlers = path_failures.len() + global_failures.len(),
        "Routes mounted"
    );

    path_failures.extend(global_failures);
    let table = Arc::new(RouteTable {
        handlers,
        failures: path_failures,
        max_body_bytes: limits.max_body_bytes,
    });

    Ok(axum::Router::new()
        .route("/", any(dispatch))
        .route("/{*path}", any(dispatch))
        .with_state(table))
}

/// Catch-all handler: select a route, run it, and render the context.
async fn dispatch(State(table): State<Arc<RouteTable>>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, table.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = table.max_body_bytes, "Request body rejected");
            metrics::record_request(&method, 413, "none", start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    let mut ctx = RoutingContext::from_parts(parts, bytes);
    let path = ctx.path().to_string();
    tracing::debug!(
        request_id = %ctx.request_id(),
        method = %method,
        path = %path,
        "Dispatching request"
    );

    let mut path_matched = false;
    let mut method_matched = false;
    let mut selected = None;
    for mounted in &table.handlers {
        let Some(params) = mounted.matches_path(&path) else {
            continue;
        };
        path_matched = true;
        if !mounted.route.matches_method(ctx.method()) {
            continue;
        }
        method_matched = true;
        if !mounted.route.accepts(ctx.content_type()) {
            continue;
        }
        selected = Some((mounted, params));
        break;
    }

    let (label, produces) = match selected {
        Some((mounted, params)) => {
            ctx.set_path_params(params);
            ctx = Arc::clone(&mounted.route).execute(ctx).await;
            (mounted.route.label(), mounted.route.produces().map(str::to_owned))
        }
        None => {
            let status = if !path_matched {
                StatusCode::NOT_FOUND
            } else if !method_matched {
                StatusCode::METHOD_NOT_ALLOWED
            } else {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            };
            tracing::debug!(path = %path, status = %status, "No route accepted request");
            ctx.fail_with_status(status);
            ("none".to_string(), None)
        }
    };

    if ctx.has_unhandled_failure() {
        for mounted in &table.failures {
            let Some(params) = mounted.matches_path(&path) else {
                continue;
            };
            if !mounted.route.matches_method(ctx.method()) {
                continue;
            }
            ctx.set_path_params(params);
            if mounted.route.handle_failure(&mut ctx) {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    failure_route = %mounted.route.label(),
                    "Failure handled"
                );
                break;
            }
        }
    }

    let response = ctx.into_response(produces.as_deref());
    metrics::record_request(&method, response.status().as_u16(), &label, start);
    response
}

/// HTTP server for the bound routes.
pub struct HttpServer {
    router: axum::Router,
    config: AppConfig,
}

impl HttpServer {
    pub fn new(config: AppConfig, routes: &Router) -> Result<Self, MountError> {
        let app = mount(routes, &config.limits)?;
        let router = Self::build_router(&config, app);
        Ok(Self { router, config })
    }

    /// Wrap the mounted routes with the middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, app: axum::Router) -> axum::Router {
        app.layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown_rx` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process testing.
    pub fn into_router(self) -> axum::Router {
        self.router
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
