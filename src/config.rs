//! # Routing Configuration
//!
//! Declarative constraint and mapping tables, loaded from YAML (or JSON) at
//! startup and applied to a [`RouteSupport`](crate::route::RouteSupport)
//! before any request is matched.
//!
//! ## Format
//!
//! ```yaml
//! constraints:
//!   id: { regex: '^\d+$', position: 0 }
//!   slug: '^[a-z-]+$'                          # bare pattern shorthand
//!   action: { regex: '^edit$', method: POST }  # extra keys become metadata
//! mappings:
//!   data: [args, query, body]
//!   filters: [query]
//! replace_defaults: false
//! ```
//!
//! Callbacks cannot be expressed in configuration; register them in code with
//! [`Condition::callback`](crate::constraint::Condition::callback).

use crate::constraint::Constraint;
use crate::mapping::MapFlags;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

/// One configured constraint: a bare pattern or a structured entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintSpec {
    Pattern(String),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regex: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        #[serde(flatten)]
        meta: serde_json::Map<String, Value>,
    },
}

impl From<&ConstraintSpec> for Constraint {
    fn from(spec: &ConstraintSpec) -> Self {
        match spec {
            ConstraintSpec::Pattern(pattern) => Constraint::new().with_regex(pattern.clone()),
            ConstraintSpec::Structured {
                regex,
                position,
                meta,
            } => {
                let mut constraint = Constraint::new();
                if let Some(regex) = regex {
                    constraint = constraint.with_regex(regex.clone());
                }
                if let Some(position) = position {
                    constraint = constraint.at_position(*position);
                }
                for (key, value) in meta {
                    constraint = constraint.with_meta(key.clone(), value.clone());
                }
                constraint
            }
        }
    }
}

/// Constraint and mapping tables for a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub constraints: BTreeMap<String, ConstraintSpec>,
    #[serde(default)]
    pub mappings: BTreeMap<String, MapFlags>,
    /// Replace the built-in tables instead of layering on top of them
    #[serde(default)]
    pub replace_defaults: bool,
}

impl RoutingConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or does not have
    /// the expected shape.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("invalid routing configuration")
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as
    /// YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read routing configuration {}", path.display()))?;
        let config: RoutingConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid routing configuration {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid routing configuration {}", path.display()))?
        };
        info!(
            path = %path.display(),
            constraints = config.constraints.len(),
            mappings = config.mappings.len(),
            replace_defaults = config.replace_defaults,
            "Routing configuration loaded"
        );
        Ok(config)
    }

    /// Constraints as a registry table.
    #[must_use]
    pub fn constraint_table(&self) -> HashMap<String, Constraint> {
        self.constraints
            .iter()
            .map(|(name, spec)| (name.clone(), Constraint::from(spec)))
            .collect()
    }

    /// Mappings as a mapper table.
    #[must_use]
    pub fn mapping_table(&self) -> HashMap<String, MapFlags> {
        self.mappings
            .iter()
            .map(|(name, flags)| (name.clone(), *flags))
            .collect()
    }
}
