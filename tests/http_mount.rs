//! Serving bound routes over HTTP.

mod common;

use std::sync::Arc;

use axum::http::{header, Method, StatusCode};

use common::{bind, request, request_with_body, send, Controller};
use route_binder::binding::Processor;
use route_binder::config::{AppConfig, LimitsConfig};
use route_binder::demo;
use route_binder::http::{mount, HttpServer};
use route_binder::lifecycle::Shutdown;
use route_binder::metadata::{Tag, TypeDescriptor};
use route_binder::routing::{Router, RoutingContext};

fn demo_app() -> axum::Router {
    let router = demo::build_router(&Processor::new(), "Hello").unwrap();
    HttpServer::new(AppConfig::default(), &router)
        .unwrap()
        .into_router()
}

fn pair_app() -> axum::Router {
    let router = bind(&Processor::new(), Controller, &common::pair_descriptor()).unwrap();
    mount(&router, &LimitsConfig::default()).unwrap()
}

#[tokio::test]
async fn test_verbs_select_routes() {
    let (status, _, body) = send(pair_app(), request(Method::GET, "/a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "a");

    let (status, _, body) = send(pair_app(), request(Method::POST, "/b")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "b:POST");

    let (status, _, _) = send(pair_app(), request(Method::POST, "/a")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _, _) = send(pair_app(), request(Method::GET, "/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_path_parameters_reach_handler() {
    let (status, headers, body) = send(demo_app(), request(Method::GET, "/hello/Ada")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello, Ada");
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
}

#[tokio::test]
async fn test_blocking_json_echo() {
    let (status, headers, body) = send(
        demo_app(),
        request_with_body(Method::POST, "/echo", "application/json", r#"{"x":1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value, serde_json::json!({ "echo": { "x": 1 } }));
}

#[tokio::test]
async fn test_unsupported_media_type() {
    let (status, _, body) = send(
        demo_app(),
        request_with_body(Method::POST, "/echo", "text/plain", "hi"),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], 415);
}

#[tokio::test]
async fn test_disabled_route_not_served() {
    let (status, _, body) = send(demo_app(), request(Method::GET, "/legacy")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "Not Found");
}

#[tokio::test]
async fn test_handler_error_goes_to_failure_route() {
    let (status, headers, body) = send(demo_app(), request(Method::GET, "/boom")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "boom requested");
    assert!(value["request_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_request_id_propagated() {
    let mut req = request(Method::GET, "/hello");
    req.headers_mut()
        .insert("x-request-id", "req-42".parse().unwrap());
    let (status, headers, _) = send(demo_app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("x-request-id").unwrap(), "req-42");
}

#[tokio::test]
async fn test_order_decides_between_overlapping_routes() {
    let mut router = Router::new();
    router
        .route()
        .set_path("/items/:id")
        .set_order(10)
        .set_handler(false, Arc::new(|ctx: &mut RoutingContext| ctx.end("generic")));
    router
        .route()
        .set_path("/items/special")
        .set_order(-1)
        .set_handler(false, Arc::new(|ctx: &mut RoutingContext| ctx.end("special")));
    let app = mount(&router, &LimitsConfig::default()).unwrap();

    let (_, _, body) = send(app.clone(), request(Method::GET, "/items/special")).await;
    assert_eq!(body, "special");
    let (_, _, body) = send(app, request(Method::GET, "/items/7")).await;
    assert_eq!(body, "generic");
}

#[tokio::test]
async fn test_failure_routes_prefer_same_path() {
    let failing = |ctx: &mut RoutingContext| ctx.fail("nope");
    let mut router = Router::new();
    router.route().set_path("/x").set_handler(false, Arc::new(failing));
    router.route().set_path("/y").set_handler(false, Arc::new(failing));
    router
        .route()
        .set_failure_handler(Arc::new(|ctx: &mut RoutingContext| ctx.end("global")));
    router
        .route()
        .set_path("/x")
        .set_failure_handler(Arc::new(|ctx: &mut RoutingContext| ctx.end("scoped")));
    let app = mount(&router, &LimitsConfig::default()).unwrap();

    let (status, _, body) = send(app.clone(), request(Method::GET, "/x")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "scoped");

    let (_, _, body) = send(app, request(Method::GET, "/y")).await;
    assert_eq!(body, "global");
}

#[tokio::test]
async fn test_panicking_handler_keeps_serving() {
    let desc = TypeDescriptor::builder("Controller")
        .method("panics", Controller::panics, |m| {
            m.tag(Tag::handler()).tag(Tag::path("/panic"))
        })
        .method("m1", Controller::m1, |m| m.tag(Tag::handler()).tag(Tag::path("/a")))
        .build();
    let router = bind(&Processor::new(), Controller, &desc).unwrap();
    let app = mount(&router, &LimitsConfig::default()).unwrap();

    let (status, _, _) = send(app.clone(), request(Method::GET, "/panic")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _, _) = send(app.clone(), request(Method::GET, "/panic")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _, body) = send(app, request(Method::GET, "/a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "a");
}

#[tokio::test]
async fn test_blocking_panic_keeps_serving() {
    let desc = TypeDescriptor::builder("Controller")
        .method("panics", Controller::panics, |m| {
            m.tag(Tag::blocking_handler()).tag(Tag::path("/panic"))
        })
        .build();
    let router = bind(&Processor::new(), Controller, &desc).unwrap();
    let app = mount(&router, &LimitsConfig::default()).unwrap();

    for _ in 0..3 {
        let (status, _, _) = send(app.clone(), request(Method::GET, "/panic")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[tokio::test]
async fn test_body_over_limit_rejected() {
    let router = bind(&Processor::new(), Controller, &common::pair_descriptor()).unwrap();
    let app = mount(&router, &LimitsConfig { max_body_bytes: 4 }).unwrap();

    let (status, _, _) = send(
        app,
        request_with_body(Method::POST, "/b", "text/plain", "far too long"),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_live_server_with_graceful_shutdown() {
    let router = demo::build_router(&Processor::new(), "Hi").unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(AppConfig::default(), &router).unwrap();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let response = client
        .get(format!("http://{addr}/hello/Bob"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "Hi, Bob");

    let stats: serde_json::Value = client
        .get(format!("http://{addr}/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["hits"], 1);

    drop(client);
    shutdown.trigger();
    task.await.unwrap().unwrap();
}
