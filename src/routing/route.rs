//! A single configured route.
//!
//! # Responsibilities
//! - Hold the configuration applied by binders (path, verbs, order, types)
//! - Run the request handler inline or on the blocking pool
//! - Forward handler failures to the failure handler
//!
//! # Design Decisions
//! - Default order is the creation sequence; an explicit order overrides it
//! - Verbs accumulate; an empty verb set accepts every method
//! - Panics inside handlers are caught and reported as failures

use std::collections::BTreeSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::http::Method;

use crate::binding::error::{panic_message, InvokeError};
use crate::metadata::HttpVerb;
use crate::observability::metrics;

use super::context::RoutingContext;

/// Request or failure handler registered on a route.
pub type RequestHandler = Arc<dyn Fn(&mut RoutingContext) + Send + Sync>;

#[derive(Clone)]
pub struct Route {
    id: usize,
    name: Option<String>,
    path: Option<String>,
    methods: BTreeSet<HttpVerb>,
    order: i32,
    consumes: Vec<String>,
    produces: Option<String>,
    handler: Option<RequestHandler>,
    blocking: bool,
    failure_handler: Option<RequestHandler>,
    enabled: bool,
}

impl Route {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            name: None,
            path: None,
            methods: BTreeSet::new(),
            order: i32::try_from(id).unwrap_or(i32::MAX),
            consumes: Vec::new(),
            produces: None,
            handler: None,
            blocking: false,
            failure_handler: None,
            enabled: true,
        }
    }

    // --- Configuration ---

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Install the request handler. Blocking handlers run on the blocking pool.
    pub fn set_handler(&mut self, blocking: bool, handler: RequestHandler) -> &mut Self {
        self.handler = Some(handler);
        self.blocking = blocking;
        self
    }

    pub fn set_failure_handler(&mut self, handler: RequestHandler) -> &mut Self {
        self.failure_handler = Some(handler);
        self
    }

    pub fn disable(&mut self) -> &mut Self {
        self.enabled = false;
        self
    }

    pub fn enable(&mut self) -> &mut Self {
        self.enabled = true;
        self
    }

    pub fn set_path(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.path = Some(pattern.into());
        self
    }

    pub fn add_method(&mut self, verb: HttpVerb) -> &mut Self {
        self.methods.insert(verb);
        self
    }

    pub fn set_order(&mut self, order: i32) -> &mut Self {
        self.order = order;
        self
    }

    pub fn add_consumed_type(&mut self, mime_type: impl Into<String>) -> &mut Self {
        self.consumes.push(mime_type.into());
        self
    }

    /// Declared response content types, comma separated.
    pub fn set_produced_types(&mut self, mime_types: impl Into<String>) -> &mut Self {
        self.produces = Some(mime_types.into());
        self
    }

    // --- Inspection ---

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for logs and metrics.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("route-{}", self.id),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn methods(&self) -> &BTreeSet<HttpVerb> {
        &self.methods
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn consumes(&self) -> &[String] {
        &self.consumes
    }

    pub fn produces(&self) -> Option<&str> {
        self.produces.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn has_failure_handler(&self) -> bool {
        self.failure_handler.is_some()
    }

    pub fn matches_method(&self, method: &Method) -> bool {
        if self.methods.is_empty() {
            return true;
        }
        HttpVerb::from_method(method).is_some_and(|verb| self.methods.contains(&verb))
    }

    /// Whether a request body of `content_type` is accepted.
    pub fn accepts(&self, content_type: Option<&str>) -> bool {
        if self.consumes.is_empty() {
            return true;
        }
        let Some(content_type) = content_type else {
            return false;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let (kind, _) = essence.split_once('/').unwrap_or((essence.as_str(), ""));

        self.consumes.iter().any(|accepted| {
            let accepted = accepted.trim().to_ascii_lowercase();
            accepted == essence
                || accepted == "*/*"
                || accepted
                    .strip_suffix("/*")
                    .is_some_and(|prefix| prefix == kind)
        })
    }

    // --- Execution ---

    /// Run the request handler on the current thread, then report any failure.
    pub fn handle(&self, ctx: &mut RoutingContext) {
        if let Some(handler) = &self.handler {
            invoke(handler, ctx);
        }
        if ctx.has_unhandled_failure() {
            self.report_failure(ctx);
        }
    }

    /// Route's failure-reporting path: record the failure and hand the
    /// context to the failure handler, if any.
    pub fn report_failure(&self, ctx: &mut RoutingContext) {
        let Some(failure) = ctx.failure() else {
            return;
        };
        if failure.is_handled() {
            return;
        }

        let label = self.label();
        tracing::warn!(
            route = %label,
            request_id = %ctx.request_id(),
            status = %failure.status(),
            error = %failure.message(),
            "Request handler failed"
        );
        metrics::record_handler_failure(&label);

        self.handle_failure(ctx);
    }

    /// Run the failure handler on a failed context. Returns `false` if this
    /// route has no failure handler.
    pub fn handle_failure(&self, ctx: &mut RoutingContext) -> bool {
        let Some(failure_handler) = &self.failure_handler else {
            return false;
        };
        ctx.mark_failure_handled();
        invoke(failure_handler, ctx);
        true
    }

    /// Run the route for one request, on the blocking pool if the handler
    /// was declared blocking.
    pub async fn execute(self: Arc<Self>, mut ctx: RoutingContext) -> RoutingContext {
        if !self.blocking {
            self.handle(&mut ctx);
            return ctx;
        }

        let method = ctx.method().clone();
        let uri = ctx.uri().clone();
        let request_id = ctx.request_id().to_string();
        let route = Arc::clone(&self);

        match tokio::task::spawn_blocking(move || {
            route.handle(&mut ctx);
            ctx
        })
        .await
        {
            Ok(ctx) => ctx,
            Err(err) => {
                let mut ctx = RoutingContext::new(method, uri).with_request_id(request_id);
                ctx.fail(InvokeError::Join(err.to_string()));
                self.report_failure(&mut ctx);
                ctx
            }
        }
    }
}

fn invoke(handler: &RequestHandler, ctx: &mut RoutingContext) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&mut *ctx)));
    if let Err(payload) = outcome {
        ctx.fail(InvokeError::Panicked(panic_message(payload.as_ref())));
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("order", &self.order)
            .field("consumes", &self.consumes)
            .field("produces", &self.produces)
            .field("handler", &self.handler.is_some())
            .field("blocking", &self.blocking)
            .field("failure_handler", &self.failure_handler.is_some())
            .field("enabled", &self.enabled)
            .finish()
    }
}
