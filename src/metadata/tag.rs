//! Tag definitions.
//!
//! A tag is a piece of structured metadata attached to a method. The kind of a
//! tag identifies it; the payload carries its parameters.

use std::fmt;

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// HTTP verbs that can be declared on a handler method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Connect,
    Options,
    Head,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
}

impl HttpVerb {
    /// Every verb, in the order the route binder checks them.
    pub const ALL: [HttpVerb; 9] = [
        HttpVerb::Connect,
        HttpVerb::Options,
        HttpVerb::Head,
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Patch,
        HttpVerb::Delete,
        HttpVerb::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Connect => "CONNECT",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Head => "HEAD",
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Trace => "TRACE",
        }
    }

    /// Map a request method onto a verb. Extension methods have no verb.
    pub fn from_method(method: &Method) -> Option<Self> {
        HttpVerb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == method.as_str())
    }

    pub fn to_method(self) -> Method {
        match self {
            HttpVerb::Connect => Method::CONNECT,
            HttpVerb::Options => Method::OPTIONS,
            HttpVerb::Head => Method::HEAD,
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Patch => Method::PATCH,
            HttpVerb::Delete => Method::DELETE,
            HttpVerb::Trace => Method::TRACE,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a tag, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Handler,
    FailureHandler,
    Disable,
    Path,
    Order,
    Verb(HttpVerb),
    Consumes,
    Produces,
    /// Kind of a tag read by an application-provided binder.
    Custom(&'static str),
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Handler => f.write_str("Handler"),
            TagKind::FailureHandler => f.write_str("FailureHandler"),
            TagKind::Disable => f.write_str("Disable"),
            TagKind::Path => f.write_str("Path"),
            TagKind::Order => f.write_str("Order"),
            TagKind::Verb(verb) => write!(f, "{}", verb),
            TagKind::Consumes => f.write_str("Consumes"),
            TagKind::Produces => f.write_str("Produces"),
            TagKind::Custom(kind) => write!(f, "Custom({})", kind),
        }
    }
}

/// Structured metadata attached to a method.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// Marks a request handler. Blocking handlers run on the blocking pool.
    Handler { blocking: bool },
    /// Marks a failure handler.
    FailureHandler,
    /// Registers the route disabled.
    Disable,
    /// Path pattern the route matches.
    Path(String),
    /// Matching priority; lower runs first.
    Order(i32),
    /// One accepted HTTP verb. Several verb tags accumulate.
    Verb(HttpVerb),
    /// Accepted request content types.
    Consumes(Vec<String>),
    /// Declared response content types.
    Produces(Vec<String>),
    Custom {
        kind: &'static str,
        value: serde_json::Value,
    },
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Handler { .. } => TagKind::Handler,
            Tag::FailureHandler => TagKind::FailureHandler,
            Tag::Disable => TagKind::Disable,
            Tag::Path(_) => TagKind::Path,
            Tag::Order(_) => TagKind::Order,
            Tag::Verb(verb) => TagKind::Verb(*verb),
            Tag::Consumes(_) => TagKind::Consumes,
            Tag::Produces(_) => TagKind::Produces,
            Tag::Custom { kind, .. } => TagKind::Custom(kind),
        }
    }

    pub fn handler() -> Self {
        Tag::Handler { blocking: false }
    }

    pub fn blocking_handler() -> Self {
        Tag::Handler { blocking: true }
    }

    pub fn path(pattern: impl Into<String>) -> Self {
        Tag::Path(pattern.into())
    }

    pub fn order(priority: i32) -> Self {
        Tag::Order(priority)
    }

    pub fn verb(verb: HttpVerb) -> Self {
        Tag::Verb(verb)
    }

    pub fn get() -> Self {
        Tag::Verb(HttpVerb::Get)
    }

    pub fn post() -> Self {
        Tag::Verb(HttpVerb::Post)
    }

    pub fn put() -> Self {
        Tag::Verb(HttpVerb::Put)
    }

    pub fn delete() -> Self {
        Tag::Verb(HttpVerb::Delete)
    }

    pub fn consumes<I, S>(mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Tag::Consumes(mime_types.into_iter().map(Into::into).collect())
    }

    pub fn produces<I, S>(mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Tag::Produces(mime_types.into_iter().map(Into::into).collect())
    }

    pub fn custom(kind: &'static str, value: serde_json::Value) -> Self {
        Tag::Custom { kind, value }
    }
}
