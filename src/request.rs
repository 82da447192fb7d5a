use anyhow::{Context, Result};
use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// Request facet contents keyed by parameter name.
pub type ParamMap = serde_json::Map<String, Value>;

/// Maximum number of matched path arguments before heap allocation.
/// Most routes bind ≤4 path segments (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Path arguments matched by a concrete route, in match order.
///
/// Names are `Arc<str>` because they come from the route definition and are
/// shared across requests; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Minimal view of an inbound request needed for route matching and
/// parameter sourcing.
///
/// Routes never look at headers or the raw body; they only need the method,
/// the path, the decoded query string and the decoded body parameters.
pub trait RequestInterface {
    /// HTTP method
    fn method(&self) -> &Method;
    /// Request path without the query string
    fn path(&self) -> &str;
    /// Decoded query-string parameters
    fn query(&self) -> &ParamMap;
    /// Decoded body parameters (empty when the body carries no parameters)
    fn body(&self) -> &ParamMap;
}

/// Owned request facets, decoded once and handed to every candidate route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method (GET unless stated otherwise)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Parsed query string parameters
    pub query: ParamMap,
    /// Parsed body parameters (JSON object or urlencoded form)
    pub body: ParamMap,
}

impl RequestInterface for ParsedRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self) -> &ParamMap {
        &self.query
    }

    fn body(&self) -> &ParamMap {
        &self.body
    }
}

impl ParsedRequest {
    /// Build a request from already-decoded facets.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, query: ParamMap, body: ParamMap) -> Self {
        Self {
            method,
            path: path.into(),
            query,
            body,
        }
    }

    /// Replace the method, e.g. for a form POST built with [`Self::from_parts`].
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Build a request from a path (with optional query string) and an
    /// optional JSON body.
    ///
    /// Only a JSON object contributes body parameters; any other JSON value
    /// leaves the body facet empty.
    ///
    /// ```
    /// use paramroute::request::{ParsedRequest, RequestInterface};
    /// use serde_json::json;
    ///
    /// let req = ParsedRequest::from_parts("/posts?sort=asc", Some(json!({"name": "x"})));
    /// assert_eq!(req.query()["sort"], "asc");
    /// assert_eq!(req.body()["name"], "x");
    /// ```
    #[must_use]
    pub fn from_parts(path: &str, body: Option<Value>) -> Self {
        let (path, query_str) = path.split_once('?').unwrap_or((path, ""));
        Self {
            method: Method::GET,
            path: path.to_string(),
            query: parse_query_params(query_str),
            body: body.map(body_object).unwrap_or_default(),
        }
    }

    /// Decode the query string and body of an `http::Request`.
    ///
    /// JSON bodies (`application/json`, `*+json`) and urlencoded form bodies
    /// are decoded; other content types leave the body facet empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the body claims to be JSON but does not parse.
    pub fn from_http<B: AsRef<[u8]>>(req: &http::Request<B>) -> Result<Self> {
        let query = parse_query_params(req.uri().query().unwrap_or(""));
        let content_type = req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .unwrap_or_default();
        let raw: &[u8] = req.body().as_ref();

        let body = if raw.is_empty() {
            ParamMap::new()
        } else if content_type == "application/json" || content_type.ends_with("+json") {
            let value: Value =
                serde_json::from_slice(raw).context("request body is not valid JSON")?;
            body_object(value)
        } else if content_type == "application/x-www-form-urlencoded" {
            parse_form(raw)
        } else {
            debug!(content_type = %content_type, "Body content type carries no parameters");
            ParamMap::new()
        };

        Ok(Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query,
            body,
        })
    }
}

/// Parse a raw query string (without the leading `?`) into parameters.
///
/// Names and values are percent-decoded. Repeated names keep the last value.
#[must_use]
pub fn parse_query_params(query: &str) -> ParamMap {
    parse_form(query.as_bytes())
}

fn parse_form(raw: &[u8]) -> ParamMap {
    url::form_urlencoded::parse(raw)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

fn body_object(value: Value) -> ParamMap {
    match value {
        Value::Object(map) => map,
        other => {
            debug!(body_kind = json_kind(&other), "Non-object body carries no parameters");
            ParamMap::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_are_decoded() {
        let params = parse_query_params("q=hello%20world&limit=10");
        assert_eq!(params["q"], "hello world");
        assert_eq!(params["limit"], "10");
    }

    #[test]
    fn test_repeated_query_param_last_wins() {
        let params = parse_query_params("limit=10&limit=20");
        assert_eq!(params["limit"], "20");
    }

    #[test]
    fn test_from_parts_splits_path() {
        let req = ParsedRequest::from_parts("/posts/5?sort=asc", None);
        assert_eq!(req.path(), "/posts/5");
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.query()["sort"], "asc");
    }

    #[test]
    fn test_from_parts_without_query() {
        let req = ParsedRequest::from_parts("/posts", None);
        assert_eq!(req.path(), "/posts");
        assert!(req.query().is_empty());
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_non_object_body_is_empty() {
        let req = ParsedRequest::from_parts("/", Some(json!([1, 2, 3])));
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_from_http_json_body() {
        let req = http::Request::builder()
            .uri("/posts/5?sort=asc")
            .header("content-type", "application/json; charset=utf-8")
            .body(br#"{"id":"9","name":"x"}"#.to_vec())
            .expect("request");
        let parsed = ParsedRequest::from_http(&req).expect("parse");
        assert_eq!(parsed.query()["sort"], "asc");
        assert_eq!(parsed.body()["id"], "9");
        assert_eq!(parsed.body()["name"], "x");
    }

    #[test]
    fn test_from_http_form_body() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/posts")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(b"title=Hello+there&draft=1".to_vec())
            .expect("request");
        let parsed = ParsedRequest::from_http(&req).expect("parse");
        assert_eq!(parsed.method(), &Method::POST);
        assert_eq!(parsed.path(), "/posts");
        assert_eq!(parsed.body()["title"], "Hello there");
        assert_eq!(parsed.body()["draft"], "1");
    }

    #[test]
    fn test_from_http_invalid_json_is_error() {
        let req = http::Request::builder()
            .uri("/posts")
            .header("content-type", "application/json")
            .body(b"{not json".to_vec())
            .expect("request");
        assert!(ParsedRequest::from_http(&req).is_err());
    }

    #[test]
    fn test_from_http_other_content_type_ignored() {
        let req = http::Request::builder()
            .uri("/upload")
            .header("content-type", "application/octet-stream")
            .body(vec![0u8, 1, 2])
            .expect("request");
        let parsed = ParsedRequest::from_http(&req).expect("parse");
        assert!(parsed.body().is_empty());
    }
}
