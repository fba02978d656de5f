//! Per-request routing context.
//!
//! # Responsibilities
//! - Expose the request (method, uri, headers, body, path parameters)
//! - Collect the response written by handlers
//! - Record failures reported during handling
//!
//! # Design Decisions
//! - The body is buffered before handlers run; handlers are synchronous
//! - A failure is handled once a failure handler has run; unhandled failures
//!   render as a bare status response
//! - Request ID taken from `x-request-id` when present, UUID v4 otherwise

use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::binding::BoxError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A failure reported on a context.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    error: Option<BoxError>,
    handled: bool,
}

impl Failure {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.error.as_deref()
    }

    pub fn message(&self) -> String {
        match &self.error {
            Some(err) => err.to_string(),
            None => self
                .status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        }
    }

    /// Whether a failure handler has taken over the response.
    pub fn is_handled(&self) -> bool {
        self.handled
    }
}

/// State of one request as seen by handlers.
#[derive(Debug)]
pub struct RoutingContext {
    request_id: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: HashMap<String, String>,
    status: Option<StatusCode>,
    response_headers: HeaderMap,
    response_body: Vec<u8>,
    failure: Option<Failure>,
}

impl RoutingContext {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            path_params: HashMap::new(),
            status: None,
            response_headers: HeaderMap::new(),
            response_body: Vec::new(),
            failure: None,
        }
    }

    /// Build from a buffered HTTP request.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        let mut ctx = Self::new(parts.method, parts.uri);
        if let Some(id) = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
        {
            ctx.request_id = id.to_string();
        }
        ctx.headers = parts.headers;
        ctx.body = body;
        ctx
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    // --- Request ---

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn set_path_params(&mut self, params: HashMap<String, String>) {
        self.path_params = params;
    }

    // --- Response ---

    /// Response status; defaults to 200, or the failure status once failed.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or_else(|| {
            self.failure
                .as_ref()
                .map(Failure::status)
                .unwrap_or(StatusCode::OK)
        })
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn put_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Append to the response body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.response_body.extend_from_slice(chunk.as_ref());
    }

    /// Replace the response body.
    pub fn end(&mut self, body: impl AsRef<[u8]>) {
        self.response_body.clear();
        self.response_body.extend_from_slice(body.as_ref());
    }

    /// Serialize `value` as the JSON response body.
    pub fn json<S: Serialize>(&mut self, value: &S) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.response_body = body;
        self.put_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(())
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response_body
    }

    // --- Failure ---

    /// Report a failure with status 500. Replaces any earlier failure.
    pub fn fail<E: Into<BoxError>>(&mut self, error: E) {
        self.record_failure(StatusCode::INTERNAL_SERVER_ERROR, Some(error.into()));
    }

    pub fn fail_with_status(&mut self, status: StatusCode) {
        self.record_failure(status, None);
    }

    fn record_failure(&mut self, status: StatusCode, error: Option<BoxError>) {
        self.failure = Some(Failure {
            status,
            error,
            handled: false,
        });
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Whether a failure is waiting for a failure handler.
    pub fn has_unhandled_failure(&self) -> bool {
        self.failure.as_ref().is_some_and(|f| !f.handled)
    }

    pub(crate) fn mark_failure_handled(&mut self) {
        if let Some(failure) = self.failure.as_mut() {
            failure.handled = true;
        }
    }

    /// Render the response. `produces` supplies a default content type when
    /// it names a single type and the handler set none.
    pub fn into_response(self, produces: Option<&str>) -> Response {
        let RoutingContext {
            request_id,
            status,
            response_headers,
            response_body,
            failure,
            ..
        } = self;

        let mut response = match failure {
            Some(failure) if !failure.handled => {
                let reason = failure.status.canonical_reason().unwrap_or("Error");
                (failure.status, reason).into_response()
            }
            failure => {
                let status = status
                    .or_else(|| failure.map(|f| f.status))
                    .unwrap_or(StatusCode::OK);
                let mut response = Response::new(Body::from(response_body));
                *response.status_mut() = status;
                response.headers_mut().extend(response_headers);

                if !response.headers().contains_key(header::CONTENT_TYPE) {
                    let single = produces.filter(|p| !p.contains(','));
                    if let Some(value) = single.and_then(|p| HeaderValue::from_str(p).ok()) {
                        response.headers_mut().insert(header::CONTENT_TYPE, value);
                    }
                }
                response
            }
        };

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let ctx = RoutingContext::new(Method::POST, Uri::from_static("/items?x=1"))
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_body("hello")
            .with_request_id("req-1");

        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.path(), "/items");
        assert_eq!(ctx.content_type(), Some("text/plain"));
        assert_eq!(ctx.body().as_ref(), b"hello");
        assert_eq!(ctx.request_id(), "req-1");
    }

    #[test]
    fn test_response_rendering() {
        let mut ctx = RoutingContext::new(Method::GET, Uri::from_static("/"));
        ctx.set_status(StatusCode::CREATED);
        ctx.write("a");
        ctx.write("b");
        let response = ctx.into_response(Some("text/plain"));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[test]
    fn test_multiple_produced_types_not_defaulted() {
        let ctx = RoutingContext::new(Method::GET, Uri::from_static("/"));
        let response = ctx.into_response(Some("application/json, text/html"));
        assert!(!response.headers().contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn test_json_body() {
        let mut ctx = RoutingContext::new(Method::GET, Uri::from_static("/"));
        ctx.json(&serde_json::json!({ "ok": true })).unwrap();
        assert_eq!(ctx.response_body(), br#"{"ok":true}"#);
        assert_eq!(
            ctx.response_headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_unhandled_failure_renders_status() {
        let mut ctx = RoutingContext::new(Method::GET, Uri::from_static("/"));
        ctx.write("partial");
        ctx.fail("database down");
        assert!(ctx.failed());
        assert!(ctx.has_unhandled_failure());
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ctx.failure().unwrap().message(), "database down");

        let response = ctx.into_response(None);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_handled_failure_uses_written_response() {
        let mut ctx = RoutingContext::new(Method::GET, Uri::from_static("/"));
        ctx.fail_with_status(StatusCode::NOT_FOUND);
        ctx.mark_failure_handled();
        ctx.end("custom not found");
        assert!(!ctx.has_unhandled_failure());

        let response = ctx.into_response(None);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
