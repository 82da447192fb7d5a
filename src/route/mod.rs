//! # Route Module
//!
//! The matching contract shared by every route variant, plus the support
//! object that carries the constraint and mapping tables.
//!
//! ## Overview
//!
//! A concrete route (literal path, templated path, resource-style, ...)
//! implements [`Route::match_request`]. While matching it:
//!
//! - vets each candidate path argument with
//!   [`RouteSupport::test_constraint`], treating `false` as "this route does
//!   not apply";
//! - builds composite arguments for multi-value parameters with
//!   [`RouteSupport::map_param`].
//!
//! [`RouteSupport::bind_params`] does both for a whole handler signature.
//! A [`RouteSet`] tries routes in order and returns the first match.
//!
//! ## Example
//!
//! ```rust
//! use paramroute::constraint::ConstraintMeta;
//! use paramroute::param::HandlerSignature;
//! use paramroute::request::{ParamVec, ParsedRequest};
//! use paramroute::route::RouteSupport;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let support = RouteSupport::new();
//! let signature = HandlerSignature::new("show_post").param("id").multi("data");
//! let request = ParsedRequest::from_parts("/posts/5?sort=asc", None);
//!
//! let mut args = ParamVec::new();
//! args.push((Arc::from("id"), "5".to_string()));
//! let bound = support
//!     .bind_params(&signature, &args, &request, &ConstraintMeta::new())?
//!     .expect("numeric id is accepted");
//! assert_eq!(bound.get("id").and_then(|v| v.as_str()), Some("5"));
//! assert_eq!(bound.get("data").and_then(|v| v.get("sort")).and_then(|v| v.as_str()), Some("asc"));
//!
//! let mut bad = ParamVec::new();
//! bad.push((Arc::from("id"), "abc".to_string()));
//! assert!(support.bind_params(&signature, &bad, &request, &ConstraintMeta::new())?.is_none());
//! # Ok(())
//! # }
//! ```

mod core;
mod set;

pub use self::core::{BoundParams, Route, RouteMatch, RouteSupport};
pub use set::RouteSet;
