use super::pattern::Pattern;
use crate::key::normalize_key;
use crate::param::ParamDescriptor;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Predicate over a candidate argument value.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Caller-supplied metadata that a constraint must agree with (e.g. an HTTP
/// method tag), compared key by key.
pub type ConstraintMeta = serde_json::Map<String, Value>;

/// Registry key under which the built-in numeric identifier constraint lives.
pub const DEFAULT_ID_PARAM: &str = "id";
/// Registry key under which the built-in page-token constraint lives.
pub const DEFAULT_PAGE_PARAM: &str = "page";

/// One validation rule for a named parameter.
///
/// A constraint may carry both a callback and a pattern; the callback wins.
/// `position` restricts the rule to a parameter at exactly that index in the
/// handler signature. Any further metadata is only ever compared against the
/// `meta` map passed to [`ConstraintRegistry::test_constraint`].
#[derive(Clone, Default)]
pub struct Constraint {
    callback: Option<Predicate>,
    regex: Option<Pattern>,
    position: Option<usize>,
    meta: ConstraintMeta,
}

impl Constraint {
    /// An empty constraint: present, but accepts every value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.callback = Some(predicate);
        self
    }

    #[must_use]
    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(Pattern::new(pattern));
        self
    }

    /// Only apply to a parameter declared at `position`.
    #[must_use]
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn callback(&self) -> Option<&Predicate> {
        self.callback.as_ref()
    }

    /// The pattern exactly as configured.
    #[must_use]
    pub fn regex(&self) -> Option<&str> {
        self.regex.as_ref().map(Pattern::as_str)
    }

    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    #[must_use]
    pub fn meta(&self) -> &ConstraintMeta {
        &self.meta
    }

    /// Look up a comparable field by name: `position`, `regex`, or any
    /// metadata key. The callback is not comparable.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "position" => self.position.map(Value::from),
            "regex" => self.regex().map(Value::from),
            _ => self.meta.get(key).cloned(),
        }
    }

    /// Every key of `meta` that this constraint also defines must be equal.
    #[must_use]
    pub fn agrees_with(&self, meta: &ConstraintMeta) -> bool {
        meta.iter().all(|(key, expected)| match self.field(key) {
            Some(actual) => actual == *expected,
            None => true,
        })
    }

    /// Evaluate the rule against a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is consulted and does not compile.
    pub fn evaluate(&self, value: &str) -> Result<bool> {
        if let Some(callback) = &self.callback {
            return Ok(callback(value));
        }
        match &self.regex {
            Some(pattern) if !pattern.is_empty() => pattern.is_match(value),
            _ => Ok(true),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .field("regex", &self.regex())
            .field("position", &self.position)
            .field("meta", &self.meta)
            .finish()
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        let same_callback = match (&self.callback, &other.callback) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_callback
            && self.regex == other.regex
            && self.position == other.position
            && self.meta == other.meta
    }
}

/// The shapes a constraint can be configured with.
///
/// Strings become patterns, [`Condition::callback`] wraps a predicate, and a
/// fully built [`Constraint`] is stored as-is.
#[derive(Clone)]
pub enum Condition {
    Callback(Predicate),
    Pattern(String),
    Structured(Constraint),
}

impl Condition {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Condition::Callback(Arc::new(f))
    }
}

impl From<&str> for Condition {
    fn from(pattern: &str) -> Self {
        Condition::Pattern(pattern.to_string())
    }
}

impl From<String> for Condition {
    fn from(pattern: String) -> Self {
        Condition::Pattern(pattern)
    }
}

impl From<Constraint> for Condition {
    fn from(constraint: Constraint) -> Self {
        Condition::Structured(constraint)
    }
}

impl From<Predicate> for Condition {
    fn from(predicate: Predicate) -> Self {
        Condition::Callback(predicate)
    }
}

impl From<Condition> for Constraint {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Callback(predicate) => Constraint::new().with_predicate(predicate),
            Condition::Pattern(pattern) => Constraint::new().with_regex(pattern),
            Condition::Structured(constraint) => constraint,
        }
    }
}

/// Per-parameter validation rules keyed by lower-cased parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintRegistry {
    constraints: HashMap<String, Constraint>,
}

impl ConstraintRegistry {
    /// An empty registry: every parameter is unconstrained.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the built-in rules:
    ///
    /// - `id` must be all ASCII digits and only applies at position 0
    /// - `page` must be `p` followed by ASCII digits, at any position
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.constraints.insert(
            DEFAULT_ID_PARAM.to_string(),
            Constraint::new().with_regex("^[0-9]+$").at_position(0),
        );
        registry.constraints.insert(
            DEFAULT_PAGE_PARAM.to_string(),
            Constraint::new().with_regex("^p[0-9]+$"),
        );
        registry
    }

    /// Replace every rule at once.
    pub fn set_constraints(&mut self, all: HashMap<String, Constraint>) -> &mut Self {
        self.constraints = all
            .into_iter()
            .map(|(name, constraint)| (normalize_key(&name).into_owned(), constraint))
            .collect();
        debug!(count = self.constraints.len(), "Constraint table replaced");
        self
    }

    /// Insert or replace the rule for `name`.
    pub fn set_constraint(&mut self, name: &str, condition: impl Into<Condition>) -> &mut Self {
        let constraint = Constraint::from(condition.into());
        let key = normalize_key(name).into_owned();
        debug!(param = %key, constraint = ?constraint, "Constraint registered");
        self.constraints.insert(key, constraint);
        self
    }

    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.get(&*normalize_key(name))
    }

    #[must_use]
    pub fn constraints(&self) -> &HashMap<String, Constraint> {
        &self.constraints
    }

    /// The rule that applies to this descriptor, honouring a required position.
    fn applicable(&self, param: &ParamDescriptor) -> Option<&Constraint> {
        self.constraint(&param.name)
            .filter(|c| c.position.is_none_or(|pos| pos == param.position))
    }

    #[must_use]
    pub fn has_constraint(&self, param: &ParamDescriptor) -> bool {
        self.applicable(param).is_some()
    }

    /// Decide whether `value` is acceptable for `param`.
    ///
    /// No applicable rule means the value passes. A rule that disagrees with
    /// any key in `meta` rejects the value before the callback or pattern is
    /// consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule's pattern does not compile.
    pub fn test_constraint(
        &self,
        param: &ParamDescriptor,
        value: &str,
        meta: &ConstraintMeta,
    ) -> Result<bool> {
        let Some(constraint) = self.applicable(param) else {
            trace!(param = %param.name, position = param.position, "No applicable constraint");
            return Ok(true);
        };

        if !constraint.agrees_with(meta) {
            debug!(param = %param.name, meta = ?meta, "Constraint metadata mismatch");
            return Ok(false);
        }

        let verdict = constraint.evaluate(value)?;
        if verdict {
            trace!(param = %param.name, value = %value, "Constraint satisfied");
        } else {
            debug!(
                param = %param.name,
                position = param.position,
                value = %value,
                regex = ?constraint.regex(),
                "Constraint rejected value"
            );
        }
        Ok(verdict)
    }
}
