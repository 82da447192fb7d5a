//! # Mapping Module
//!
//! Decides which request facets feed a multi-value handler parameter.
//!
//! A [`ParameterMapper`] binds a case-insensitive parameter name to a
//! [`MapFlags`] set drawn from path arguments, query string and body. When a
//! handler declares a multi-value parameter with a mapped name, the route
//! hands it the union of those facets instead of a single value.
//!
//! ## Precedence
//!
//! Facets are merged most-trusted first and earlier facets are never
//! overwritten:
//!
//! 1. path arguments matched by the route
//! 2. query-string parameters
//! 3. body parameters
//!
//! ```rust
//! use paramroute::mapping::ParameterMapper;
//! use paramroute::request::{ParamVec, ParsedRequest};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mapper = ParameterMapper::with_defaults();
//! let request = ParsedRequest::from_parts("/posts/5?sort=asc", Some(json!({"id": "9", "name": "x"})));
//! let mut args = ParamVec::new();
//! args.push((Arc::from("id"), "5".to_string()));
//!
//! let data = mapper.map_param("data", &request, &args).unwrap();
//! assert_eq!(data["id"], "5");
//! assert_eq!(data["sort"], "asc");
//! assert_eq!(data["name"], "x");
//! ```

mod core;
mod flags;

pub use self::core::{
    ParameterMapper, DEFAULT_BODY_PARAM, DEFAULT_DATA_PARAM, DEFAULT_QUERY_PARAM,
};
pub use flags::{Facet, MapFlags};
