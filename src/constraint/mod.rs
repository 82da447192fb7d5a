//! # Constraint Module
//!
//! Per-parameter validation rules consulted while a route decides whether it
//! matches a request.
//!
//! ## Overview
//!
//! A [`ConstraintRegistry`] maps a case-insensitive parameter name to a
//! [`Constraint`]. A constraint is a callback predicate, a regex pattern, or
//! both (the callback wins), optionally pinned to a parameter position and
//! optionally carrying metadata that callers can require to match.
//!
//! Evaluation is permissive by default:
//!
//! - no rule for the name, or a rule pinned to a different position: pass
//! - metadata disagreement: fail
//! - otherwise the callback or pattern decides; a rule with neither passes
//!
//! ## Example
//!
//! ```rust
//! use paramroute::constraint::{Condition, ConstraintMeta, ConstraintRegistry};
//! use paramroute::param::ParamDescriptor;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = ConstraintRegistry::with_defaults();
//! registry
//!     .set_constraint("Slug", r"/^[a-z-]+$/")
//!     .set_constraint("year", Condition::callback(|v| v.len() == 4));
//!
//! let meta = ConstraintMeta::new();
//! let id = ParamDescriptor::scalar("id", 0);
//! assert!(registry.test_constraint(&id, "42", &meta)?);
//! assert!(!registry.test_constraint(&id, "abc", &meta)?);
//!
//! let slug = ParamDescriptor::scalar("slug", 1);
//! assert!(registry.test_constraint(&slug, "hello-world", &meta)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Patterns are compiled on first evaluation. A pattern that does not compile
//! is a configuration bug and surfaces as an `Err` from
//! [`ConstraintRegistry::test_constraint`]; it is never folded into a `false`
//! verdict.

mod core;
mod pattern;
#[cfg(test)]
mod tests;

pub use self::core::{
    Condition, Constraint, ConstraintMeta, ConstraintRegistry, Predicate, DEFAULT_ID_PARAM,
    DEFAULT_PAGE_PARAM,
};
pub use pattern::Pattern;
