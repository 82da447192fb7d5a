use crate::config::RoutingConfig;
use crate::constraint::{Condition, Constraint, ConstraintMeta, ConstraintRegistry};
use crate::key::normalize_key;
use crate::mapping::{MapFlags, ParameterMapper};
use crate::param::{HandlerSignature, ParamDescriptor};
use crate::request::{ParamMap, ParamVec, RequestInterface};
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Handler arguments resolved by a route, in signature order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams {
    params: Vec<(String, Value)>,
}

impl BoundParams {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        let key = normalize_key(name);
        self.params
            .iter()
            .find(|(k, _)| normalize_key(k) == key)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Argument values in signature order.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.params.into_iter().map(|(_, v)| v).collect()
    }
}

/// Result of a route accepting a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    /// Name of the handler that should process this request
    pub handler_name: String,
    /// Path arguments matched by the route, in match order
    pub path_params: ParamVec,
    /// Handler arguments resolved from path, query and body
    pub arguments: BoundParams,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths, returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Matching contract every concrete route variant implements.
///
/// A route inspects the request and either claims it, returning the handler
/// and its resolved arguments, or declines with `Ok(None)`. Declining is the
/// normal outcome when several routes are tried in turn; `Err` is reserved
/// for configuration bugs such as an invalid constraint pattern.
///
/// Implementations hold a [`RouteSupport`] and use it to vet path arguments
/// and to assemble multi-value parameters.
pub trait Route: Send + Sync {
    /// Shared constraint and mapping tables
    fn support(&self) -> &RouteSupport;

    /// Mutable access for configuration before serving traffic
    fn support_mut(&mut self) -> &mut RouteSupport;

    /// Decide whether this route handles `request`.
    ///
    /// # Errors
    ///
    /// Returns an error only for misconfiguration surfaced while matching.
    fn match_request(&self, request: &dyn RequestInterface) -> Result<Option<RouteMatch>>;
}

/// Constraint registry and parameter mapper shared by every route variant.
///
/// Routes own one of these by composition. Construction seeds the built-in
/// `id`/`page` constraints and `query`/`body`/`data` mappings; both tables
/// change only through explicit configuration calls, never while matching.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSupport {
    constraints: ConstraintRegistry,
    mapper: ParameterMapper,
}

impl Default for RouteSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSupport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            constraints: ConstraintRegistry::with_defaults(),
            mapper: ParameterMapper::with_defaults(),
        }
    }

    /// Build from a configuration document on top of the defaults.
    #[must_use]
    pub fn from_config(config: &RoutingConfig) -> Self {
        let mut support = Self::new();
        support.apply_config(config);
        support
    }

    #[must_use]
    pub fn constraint_registry(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    #[must_use]
    pub fn parameter_mapper(&self) -> &ParameterMapper {
        &self.mapper
    }

    pub fn set_constraints(&mut self, all: HashMap<String, Constraint>) -> &mut Self {
        self.constraints.set_constraints(all);
        self
    }

    pub fn set_constraint(&mut self, name: &str, condition: impl Into<Condition>) -> &mut Self {
        self.constraints.set_constraint(name, condition);
        self
    }

    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.constraint(name)
    }

    #[must_use]
    pub fn constraints(&self) -> &HashMap<String, Constraint> {
        self.constraints.constraints()
    }

    #[must_use]
    pub fn has_constraint(&self, param: &ParamDescriptor) -> bool {
        self.constraints.has_constraint(param)
    }

    /// See [`ConstraintRegistry::test_constraint`].
    ///
    /// # Errors
    ///
    /// Returns an error if the applicable pattern does not compile.
    pub fn test_constraint(
        &self,
        param: &ParamDescriptor,
        value: &str,
        meta: &ConstraintMeta,
    ) -> Result<bool> {
        self.constraints.test_constraint(param, value, meta)
    }

    pub fn set_mappings(&mut self, all: HashMap<String, MapFlags>) -> &mut Self {
        self.mapper.set_mappings(all);
        self
    }

    #[must_use]
    pub fn mappings(&self) -> &HashMap<String, MapFlags> {
        self.mapper.mappings()
    }

    pub fn set_mapping(&mut self, name: &str, flags: MapFlags) -> &mut Self {
        self.mapper.set_mapping(name, flags);
        self
    }

    #[must_use]
    pub fn mapping(&self, name: &str) -> MapFlags {
        self.mapper.mapping(name)
    }

    #[must_use]
    pub fn is_mapped(&self, param: &ParamDescriptor) -> bool {
        self.mapper.is_mapped(param)
    }

    /// See [`ParameterMapper::map_param`].
    pub fn map_param<R>(&self, name: &str, request: &R, path_args: &ParamVec) -> Option<ParamMap>
    where
        R: RequestInterface + ?Sized,
    {
        self.mapper.map_param(name, request, path_args)
    }

    /// Apply a configuration document.
    ///
    /// Entries are upserted over the current tables, or replace them
    /// outright when `replace_defaults` is set.
    pub fn apply_config(&mut self, config: &RoutingConfig) -> &mut Self {
        if config.replace_defaults {
            self.set_constraints(config.constraint_table());
            self.set_mappings(config.mapping_table());
        } else {
            for (name, constraint) in config.constraint_table() {
                self.set_constraint(&name, constraint);
            }
            for (name, flags) in config.mapping_table() {
                self.set_mapping(&name, flags);
            }
        }
        debug!(
            constraints = self.constraints().len(),
            mappings = self.mappings().len(),
            replace_defaults = config.replace_defaults,
            "Routing configuration applied"
        );
        self
    }

    /// Resolve every handler parameter for a candidate match.
    ///
    /// For each parameter in signature order:
    ///
    /// 1. a mapped multi-value parameter receives the merged facets as a
    ///    JSON object;
    /// 2. otherwise a path argument of the same name (last occurrence) is
    ///    vetted with [`Self::test_constraint`]; a rejection means the route
    ///    does not match and `Ok(None)` is returned;
    /// 3. otherwise the parameter is bound to `null` and left for the
    ///    dispatcher to default.
    ///
    /// # Errors
    ///
    /// Returns an error if a constraint pattern does not compile.
    pub fn bind_params<R>(
        &self,
        signature: &HandlerSignature,
        path_args: &ParamVec,
        request: &R,
        meta: &ConstraintMeta,
    ) -> Result<Option<BoundParams>>
    where
        R: RequestInterface + ?Sized,
    {
        let mut params = Vec::with_capacity(signature.params().len());

        for param in signature.params() {
            if self.is_mapped(param) {
                let merged = self
                    .map_param(&param.name, request, path_args)
                    .unwrap_or_default();
                params.push((param.name.clone(), Value::Object(merged)));
                continue;
            }

            let key = normalize_key(&param.name);
            let arg = path_args
                .iter()
                .rfind(|(k, _)| normalize_key(k) == key)
                .map(|(_, v)| v.as_str());

            match arg {
                Some(value) => {
                    if !self.test_constraint(param, value, meta)? {
                        debug!(
                            handler_name = %signature.handler_name,
                            param = %param.name,
                            position = param.position,
                            value = %value,
                            "Path argument rejected, route does not match"
                        );
                        return Ok(None);
                    }
                    params.push((param.name.clone(), Value::String(value.to_string())));
                }
                None => params.push((param.name.clone(), Value::Null)),
            }
        }

        Ok(Some(BoundParams { params }))
    }
}
