//! Route collection.
//!
//! # Responsibilities
//! - Create routes in sequence for binders to configure
//! - Expose routes in dispatch order
//!
//! # Design Decisions
//! - Routes are mutable only while binding; the HTTP layer takes a snapshot
//! - Dispatch order is (order, creation sequence)

use super::route::Route;

#[derive(Debug, Default, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh route and return it for configuration.
    pub fn route(&mut self) -> &mut Route {
        let id = self.routes.len();
        self.routes.push(Route::new(id));
        &mut self.routes[id]
    }

    /// Routes in creation order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes in dispatch order.
    pub fn sorted(&self) -> Vec<&Route> {
        let mut routes: Vec<&Route> = self.routes.iter().collect();
        routes.sort_by_key(|route| (route.order(), route.id()));
        routes
    }

    pub fn find(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
