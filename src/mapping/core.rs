use super::flags::{Facet, MapFlags};
use crate::key::normalize_key;
use crate::param::ParamDescriptor;
use crate::request::{ParamMap, ParamVec, RequestInterface};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Registry key for the built-in query-only mapping.
pub const DEFAULT_QUERY_PARAM: &str = "query";
/// Registry key for the built-in body-only mapping.
pub const DEFAULT_BODY_PARAM: &str = "body";
/// Registry key for the built-in all-facets mapping.
pub const DEFAULT_DATA_PARAM: &str = "data";

/// Per-parameter facet sets keyed by lower-cased parameter name.
///
/// A name without an entry, or with an empty set, is unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMapper {
    mappings: HashMap<String, MapFlags>,
}

impl ParameterMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapper seeded with `query` → QUERY, `body` → BODY and
    /// `data` → ARGS | QUERY | BODY.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut mapper = Self::new();
        mapper
            .mappings
            .insert(DEFAULT_QUERY_PARAM.to_string(), MapFlags::QUERY);
        mapper
            .mappings
            .insert(DEFAULT_BODY_PARAM.to_string(), MapFlags::BODY);
        mapper
            .mappings
            .insert(DEFAULT_DATA_PARAM.to_string(), MapFlags::DATA);
        mapper
    }

    /// Replace every mapping at once.
    pub fn set_mappings(&mut self, all: HashMap<String, MapFlags>) -> &mut Self {
        self.mappings = all
            .into_iter()
            .map(|(name, flags)| (normalize_key(&name).into_owned(), flags))
            .collect();
        debug!(count = self.mappings.len(), "Mapping table replaced");
        self
    }

    #[must_use]
    pub fn mappings(&self) -> &HashMap<String, MapFlags> {
        &self.mappings
    }

    pub fn set_mapping(&mut self, name: &str, flags: MapFlags) -> &mut Self {
        let key = normalize_key(name).into_owned();
        debug!(param = %key, flags = ?flags, "Mapping registered");
        self.mappings.insert(key, flags);
        self
    }

    /// Facet set for `name`; [`MapFlags::NONE`] when unmapped.
    #[must_use]
    pub fn mapping(&self, name: &str) -> MapFlags {
        self.mappings
            .get(&*normalize_key(name))
            .copied()
            .unwrap_or(MapFlags::NONE)
    }

    /// Whether `param` receives a composite value.
    ///
    /// Scalar parameters are never mapped, whatever the table says.
    #[must_use]
    pub fn is_mapped(&self, param: &ParamDescriptor) -> bool {
        param.multi_value && !self.mapping(&param.name).is_empty()
    }

    /// Assemble the composite value for `name`.
    ///
    /// Facets are merged in precedence order: path arguments, then query,
    /// then body. A key already present is never overwritten by a later
    /// facet, so a matched path segment beats a query parameter of the same
    /// name, which in turn beats the body. Among the path arguments the last
    /// occurrence of a repeated name wins.
    ///
    /// Returns `None` when `name` is unmapped, telling the caller to resolve
    /// the parameter as a single value instead. An empty map is a valid
    /// result.
    pub fn map_param<R>(&self, name: &str, request: &R, path_args: &ParamVec) -> Option<ParamMap>
    where
        R: RequestInterface + ?Sized,
    {
        let flags = self.mapping(name);
        if flags.is_empty() {
            trace!(param = %name, "Parameter is not mapped");
            return None;
        }

        let mut merged = ParamMap::new();
        for facet in flags.facets() {
            match facet {
                Facet::Args => {
                    for (key, value) in path_args {
                        merged.insert(key.to_string(), Value::String(value.clone()));
                    }
                }
                Facet::Query => merge_missing(&mut merged, request.query()),
                Facet::Body => merge_missing(&mut merged, request.body()),
            }
        }

        trace!(param = %name, flags = ?flags, keys = merged.len(), "Mapped parameter assembled");
        Some(merged)
    }
}

fn merge_missing(target: &mut ParamMap, source: &ParamMap) {
    for (key, value) in source {
        target
            .entry(key.as_str())
            .or_insert_with(|| value.clone());
    }
}
