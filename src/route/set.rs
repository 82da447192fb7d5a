use super::core::{Route, RouteMatch};
use crate::request::RequestInterface;
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Ordered collection of routes tried one after another.
///
/// The first route that claims the request wins. Routes are configured
/// before they are added; the set itself never mutates them.
#[derive(Default)]
pub struct RouteSet {
    routes: Vec<Box<dyn Route>>,
}

impl RouteSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<R: Route + 'static>(&mut self, route: R) -> &mut Self {
        self.routes.push(Box::new(route));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Try each route in insertion order.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(RouteMatch))` - from the first route that claims the request
    /// * `Ok(None)` - if no route applies (results in 404)
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first configuration error a route reports.
    pub fn match_request(&self, request: &dyn RequestInterface) -> Result<Option<RouteMatch>> {
        debug!(
            method = %request.method(),
            path = %request.path(),
            candidates = self.routes.len(),
            "Route match attempt"
        );
        let match_start = Instant::now();

        for (index, route) in self.routes.iter().enumerate() {
            if let Some(found) = route.match_request(request)? {
                let match_duration = match_start.elapsed();
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        method = %request.method(),
                        path = %request.path(),
                        handler_name = %found.handler_name,
                        route_index = index,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        method = %request.method(),
                        path = %request.path(),
                        handler_name = %found.handler_name,
                        route_index = index,
                        path_params = ?found.path_params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                return Ok(Some(found));
            }
        }

        warn!(
            method = %request.method(),
            path = %request.path(),
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        Ok(None)
    }
}

impl std::fmt::Debug for RouteSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSet")
            .field("routes", &self.routes.len())
            .finish()
    }
}
