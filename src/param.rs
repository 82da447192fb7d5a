//! Handler parameter descriptors.
//!
//! A descriptor is the read-only view of one handler parameter that the
//! registries need: its name, its ordinal position in the handler signature,
//! and whether it is declared as a multi-value (array/map) parameter. They are
//! produced by whatever introspects handlers (a code generator, a macro, a
//! hand-written table) and only consumed here.

use crate::key::normalize_key;
use serde::{Deserialize, Serialize};

/// One parameter of a handler signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Declared parameter name, in its original case
    pub name: String,
    /// Zero-based position in the handler signature
    pub position: usize,
    /// Whether the parameter accepts a composite (multi-value) argument
    #[serde(default)]
    pub multi_value: bool,
}

impl ParamDescriptor {
    /// Describe a scalar parameter.
    #[must_use]
    pub fn scalar(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            multi_value: false,
        }
    }

    /// Describe a multi-value parameter.
    #[must_use]
    pub fn multi(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            multi_value: true,
        }
    }
}

/// Ordered parameter descriptors for one handler.
///
/// ```
/// use paramroute::param::HandlerSignature;
///
/// let sig = HandlerSignature::new("show_post").param("id").multi("data");
/// assert_eq!(sig.params()[1].position, 1);
/// assert!(sig.params()[1].multi_value);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSignature {
    /// Handler identity reported back in a route match
    pub handler_name: String,
    params: Vec<ParamDescriptor>,
}

impl HandlerSignature {
    #[must_use]
    pub fn new(handler_name: impl Into<String>) -> Self {
        Self {
            handler_name: handler_name.into(),
            params: Vec::new(),
        }
    }

    /// Append a scalar parameter at the next position.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        let position = self.params.len();
        self.params.push(ParamDescriptor::scalar(name, position));
        self
    }

    /// Append a multi-value parameter at the next position.
    #[must_use]
    pub fn multi(mut self, name: impl Into<String>) -> Self {
        let position = self.params.len();
        self.params.push(ParamDescriptor::multi(name, position));
        self
    }

    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Find a parameter by case-insensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ParamDescriptor> {
        let key = normalize_key(name);
        self.params.iter().find(|p| normalize_key(&p.name) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_constructors() {
        let id = ParamDescriptor::scalar("id", 0);
        assert_eq!(id.name, "id");
        assert_eq!(id.position, 0);
        assert!(!id.multi_value);

        let data = ParamDescriptor::multi("data", 2);
        assert_eq!(data.position, 2);
        assert!(data.multi_value);
    }

    #[test]
    fn test_signature_assigns_positions_in_order() {
        let sig = HandlerSignature::new("edit_post")
            .param("id")
            .param("title")
            .multi("data");
        assert_eq!(sig.handler_name, "edit_post");
        assert_eq!(
            sig.params(),
            &[
                ParamDescriptor::scalar("id", 0),
                ParamDescriptor::scalar("title", 1),
                ParamDescriptor::multi("data", 2),
            ]
        );
    }

    #[test]
    fn test_find_ignores_case() {
        let sig = HandlerSignature::new("show").param("postId");
        assert_eq!(sig.find("POSTID").map(|p| p.position), Some(0));
        assert!(sig.find("slug").is_none());
    }

    #[test]
    fn test_multi_value_defaults_to_false_when_deserialized() {
        let param: ParamDescriptor =
            serde_json::from_str(r#"{"name":"q","position":1}"#).expect("descriptor");
        assert_eq!(param, ParamDescriptor::scalar("q", 1));
    }
}
