//! Demo API served by the `route-binder` binary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use crate::binding::{BindError, BoxError, Processor};
use crate::metadata::{Tag, TypeDescriptor};
use crate::routing::{Router, RoutingContext};

pub struct GreetingApi {
    greeting: String,
    hits: AtomicU64,
}

impl GreetingApi {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            hits: AtomicU64::new(0),
        }
    }

    fn hello(&self, ctx: &mut RoutingContext) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        ctx.end(format!("{}, world", self.greeting));
    }

    fn greet(&self, ctx: &mut RoutingContext) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        let name = ctx.path_param("name").unwrap_or("stranger").to_string();
        ctx.end(format!("{}, {}", self.greeting, name));
    }

    fn echo(&self, ctx: &mut RoutingContext) -> Result<(), serde_json::Error> {
        let value: serde_json::Value = match serde_json::from_slice(ctx.body()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting malformed echo body");
                ctx.fail_with_status(StatusCode::BAD_REQUEST);
                return Ok(());
            }
        };
        ctx.json(&json!({ "echo": value }))
    }

    fn stats(&self, ctx: &mut RoutingContext) -> Result<(), serde_json::Error> {
        ctx.json(&json!({ "hits": self.hits.load(Ordering::Relaxed) }))
    }

    fn boom(&self, _ctx: &mut RoutingContext) -> Result<(), BoxError> {
        Err("boom requested".into())
    }

    fn legacy(&self, ctx: &mut RoutingContext) {
        ctx.end("legacy");
    }

    fn on_failure(&self, ctx: &mut RoutingContext) -> Result<(), serde_json::Error> {
        let (status, message) = match ctx.failure() {
            Some(failure) => (failure.status(), failure.message()),
            None => return Ok(()),
        };
        ctx.set_status(status);
        let body = json!({
            "error": message,
            "status": status.as_u16(),
            "request_id": ctx.request_id(),
        });
        ctx.json(&body)
    }
}

pub fn descriptor() -> TypeDescriptor<GreetingApi> {
    TypeDescriptor::builder("GreetingApi")
        .method("hello", GreetingApi::hello, |m| {
            m.tag(Tag::handler())
                .tag(Tag::path("/hello"))
                .tag(Tag::get())
                .tag(Tag::produces(["text/plain"]))
        })
        .method("greet", GreetingApi::greet, |m| {
            m.tag(Tag::handler())
                .tag(Tag::path("/hello/:name"))
                .tag(Tag::get())
                .tag(Tag::produces(["text/plain"]))
        })
        .method("echo", GreetingApi::echo, |m| {
            m.tag(Tag::blocking_handler())
                .tag(Tag::path("/echo"))
                .tag(Tag::post())
                .tag(Tag::consumes(["application/json"]))
                .tag(Tag::produces(["application/json"]))
        })
        .method("stats", GreetingApi::stats, |m| {
            m.tag(Tag::handler()).tag(Tag::path("/stats")).tag(Tag::get())
        })
        .method("boom", GreetingApi::boom, |m| {
            m.tag(Tag::handler()).tag(Tag::path("/boom")).tag(Tag::get())
        })
        .method("legacy", GreetingApi::legacy, |m| {
            m.tag(Tag::handler())
                .tag(Tag::path("/legacy"))
                .tag(Tag::get())
                .tag(Tag::Disable)
        })
        .method("on_failure", GreetingApi::on_failure, |m| {
            m.tag(Tag::FailureHandler).tag(Tag::order(i32::MAX))
        })
        .build()
}

/// Bind the demo API into a fresh router.
pub fn build_router(processor: &Processor, greeting: &str) -> Result<Router, BindError> {
    let mut router = Router::new();
    processor.process(&mut router, Arc::new(GreetingApi::new(greeting)), &descriptor())?;
    Ok(router)
}
