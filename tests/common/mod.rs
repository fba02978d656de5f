//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use tower::ServiceExt;

use route_binder::binding::{BindError, BoxError, Processor};
use route_binder::metadata::{Tag, TypeDescriptor};
use route_binder::routing::{Router, RoutingContext};

/// Controller whose methods cover the binding scenarios.
#[derive(Default)]
pub struct Controller;

impl Controller {
    pub fn m1(&self, ctx: &mut RoutingContext) {
        ctx.end("a");
    }

    pub fn m2(&self, ctx: &mut RoutingContext) {
        let body = format!("b:{}", ctx.method());
        ctx.end(body);
    }

    pub fn thread(&self, ctx: &mut RoutingContext) {
        ctx.end(format!("{:?}", std::thread::current().id()));
    }

    pub fn fails(&self, _ctx: &mut RoutingContext) -> Result<(), BoxError> {
        Err("fails on purpose".into())
    }

    pub fn panics(&self, _ctx: &mut RoutingContext) {
        panic!("handler panicked");
    }

    pub fn recover(&self, ctx: &mut RoutingContext) {
        let message = ctx
            .failure()
            .map(|failure| failure.message())
            .unwrap_or_default();
        ctx.set_status(StatusCode::SERVICE_UNAVAILABLE);
        ctx.end(format!("recovered: {message}"));
    }

    pub fn takes_string(&self, _value: &mut String) {}

    pub fn helper(&self) {}
}

/// `m1` on `/a` (GET) and `m2` on `/b` (GET, POST).
pub fn pair_descriptor() -> TypeDescriptor<Controller> {
    TypeDescriptor::builder("Controller")
        .method("m1", Controller::m1, |m| {
            m.tag(Tag::handler()).tag(Tag::path("/a")).tag(Tag::get())
        })
        .method("m2", Controller::m2, |m| {
            m.tag(Tag::handler())
                .tag(Tag::path("/b"))
                .tag(Tag::get())
                .tag(Tag::post())
        })
        .build()
}

pub fn bind<T: Send + Sync + 'static>(
    processor: &Processor,
    instance: T,
    descriptor: &TypeDescriptor<T>,
) -> Result<Router, BindError> {
    let mut router = Router::new();
    processor.process(&mut router, Arc::new(instance), descriptor)?;
    Ok(router)
}

pub fn ctx(method: Method, uri: &'static str) -> RoutingContext {
    RoutingContext::new(method, Uri::from_static(uri))
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn request_with_body(method: Method, uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Drive one request through an in-process router.
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}
