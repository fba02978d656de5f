//! Default binder: routing tags to route configuration.
//!
//! # Responsibilities
//! - Select methods tagged `Handler` or `FailureHandler`
//! - Create one route per selected method
//! - Apply the remaining routing tags in a fixed order
//!
//! # Design Decisions
//! - Every tag is checked against a single `&mut RoutingContext` parameter
//! - One handle per bound method, shared by the handler and failure slots
//! - Handler errors are reported on the context, never returned to the caller

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::metadata::{HttpVerb, MethodDescriptor, ParamType, Tag, TagKind, TypeInfo};
use crate::observability::metrics;
use crate::routing::{RequestHandler, Router, RoutingContext};

use super::binder::Binder;
use super::error::BindError;
use super::handle::{Instance, InvocationHandle};
use super::signature::{compatible_tag, is_compatible, method_handle};

/// Translates routing tags into calls on a [`Router`]. Always the last binder.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteBinder;

impl RouteBinder {
    fn expected() -> [ParamType; 1] {
        [ParamType::of::<RoutingContext>()]
    }

    /// A method is bound only if it carries a compatible activation tag.
    fn is_eligible(method: &MethodDescriptor) -> Result<bool, BindError> {
        let expected = Self::expected();
        Ok(is_compatible(method, TagKind::Handler, &expected)?
            || is_compatible(method, TagKind::FailureHandler, &expected)?)
    }
}

impl Binder for RouteBinder {
    fn applies_to(&self, context: TypeId) -> bool {
        context == TypeId::of::<Router>()
    }

    fn validate(&self, _declaring: &TypeInfo, method: &MethodDescriptor) -> Result<(), BindError> {
        Self::is_eligible(method).map(|_| ())
    }

    fn bind(
        &self,
        context: &mut dyn Any,
        instance: &Instance,
        declaring: &TypeInfo,
        method: &MethodDescriptor,
    ) -> Result<(), BindError> {
        let Some(router) = context.downcast_mut::<Router>() else {
            return Ok(());
        };

        if !Self::is_eligible(method)? {
            tracing::trace!(method = %method.qualified_name(), "No activation tag, skipping");
            return Ok(());
        }

        let expected = Self::expected();
        let Some(handle) = method_handle(instance, method, &expected) else {
            return Ok(());
        };

        let route = router.route();
        route.set_name(format!("{}::{}", declaring.name(), method.name()));

        if let Some(Tag::Handler { blocking }) =
            compatible_tag(method, TagKind::Handler, &expected)?
        {
            route.set_handler(*blocking, wrap(handle.clone()));
        }
        if is_compatible(method, TagKind::FailureHandler, &expected)? {
            route.set_failure_handler(wrap(handle.clone()));
        }

        if is_compatible(method, TagKind::Disable, &expected)? {
            route.disable();
        }

        if let Some(Tag::Path(pattern)) = compatible_tag(method, TagKind::Path, &expected)? {
            route.set_path(pattern.clone());
        }

        for verb in HttpVerb::ALL {
            if is_compatible(method, TagKind::Verb(verb), &expected)? {
                route.add_method(verb);
            }
        }

        if let Some(Tag::Order(order)) = compatible_tag(method, TagKind::Order, &expected)? {
            route.set_order(*order);
        }

        if let Some(Tag::Consumes(mime_types)) =
            compatible_tag(method, TagKind::Consumes, &expected)?
        {
            for mime_type in mime_types {
                route.add_consumed_type(mime_type.clone());
            }
        }
        if let Some(Tag::Produces(mime_types)) =
            compatible_tag(method, TagKind::Produces, &expected)?
        {
            route.set_produced_types(mime_types.join(", "));
        }

        tracing::debug!(
            route = %route.label(),
            path = route.path().unwrap_or("*"),
            order = route.order(),
            blocking = route.is_blocking(),
            enabled = route.is_enabled(),
            "Route bound"
        );
        metrics::record_route_bound(self.name());

        Ok(())
    }
}

/// Adapt a handle to a request handler. Errors returned by the method are
/// reported on the context.
fn wrap(handle: InvocationHandle) -> RequestHandler {
    Arc::new(move |ctx: &mut RoutingContext| {
        if let Err(err) = handle.call(&mut *ctx) {
            ctx.fail(err);
        }
    })
}
