//! # paramroute
//!
//! **paramroute** supplies the shared machinery behind composable HTTP route
//! matching: a per-parameter constraint language and a deterministic policy
//! for sourcing handler arguments from path, query string and body.
//!
//! ## Overview
//!
//! Concrete routes (literal paths, templated paths, resource routes) decide
//! for themselves how to tokenize a request path. What they share, and what
//! this crate provides, is how to answer two questions for each handler
//! parameter:
//!
//! 1. **Is this candidate value acceptable?** The [`constraint`] registry
//!    holds a callback or regex per parameter name, optionally pinned to a
//!    parameter position and tagged with metadata.
//! 2. **Where does a multi-value parameter get its data?** The [`mapping`]
//!    registry holds a facet set per parameter name and merges path
//!    arguments, query and body with a fixed precedence.
//!
//! ## Architecture
//!
//! - **[`route`]** - the [`Route`](route::Route) matching contract,
//!   [`RouteSupport`](route::RouteSupport) (both registries by composition)
//!   and [`RouteSet`](route::RouteSet) for trying routes in order
//! - **[`constraint`]** - [`Condition`](constraint::Condition),
//!   [`Constraint`](constraint::Constraint) and the registry
//! - **[`mapping`]** - [`MapFlags`](mapping::MapFlags) and the parameter mapper
//! - **[`param`]** - handler parameter descriptors supplied by introspection
//! - **[`request`]** - the request facets a route reads
//! - **[`config`]** - YAML/JSON configuration of both tables
//! - **[`otel`]** - structured logging setup
//!
//! ### Request Matching Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Dispatcher
//!     participant Set as RouteSet
//!     participant Route as Concrete Route
//!     participant Support as RouteSupport
//!
//!     Dispatcher->>Set: match_request(request)
//!     loop each route in order
//!         Set->>Route: match_request(request)
//!         Route->>Route: tokenize path, collect path args
//!         Route->>Support: bind_params(signature, args, request)
//!         Support->>Support: test_constraint / map_param per parameter
//!         Support-->>Route: Some(BoundParams) or None
//!         Route-->>Set: Some(RouteMatch) or None
//!     end
//!     Set-->>Dispatcher: first match or None (404)
//! ```
//!
//! ## Concurrency
//!
//! Configure routes fully at startup. After that every matching operation
//! takes `&self`, so routes can be shared across threads for read-only
//! matching; mutation during matching is not supported.

pub mod config;
pub mod constraint;
pub mod key;
pub mod mapping;
pub mod otel;
pub mod param;
pub mod request;
pub mod route;

pub use config::RoutingConfig;
pub use constraint::{Condition, Constraint, ConstraintMeta, ConstraintRegistry};
pub use mapping::{Facet, MapFlags, ParameterMapper};
pub use param::{HandlerSignature, ParamDescriptor};
pub use request::{ParamMap, ParamVec, ParsedRequest, RequestInterface};
pub use route::{BoundParams, Route, RouteMatch, RouteSet, RouteSupport};
