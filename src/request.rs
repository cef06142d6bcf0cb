use std::fmt;

use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

use crate::{Result, UsageError};

/// Body field whose leading `@` gets escaped.
const STATUS_KEY: &str = "status";

/// Which of the two mutually exclusive parameter sets a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Query,
    Body,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Query => f.write_str("query"),
            ParameterKind::Body => f.write_str("body"),
        }
    }
}

/// Parameters carried by a request: none, a query string, or a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    None,
    Query(Vec<(String, String)>),
    Body(Map<String, Value>),
}

impl Parameters {
    pub fn kind(&self) -> Option<ParameterKind> {
        match self {
            Parameters::None => None,
            Parameters::Query(_) => Some(ParameterKind::Query),
            Parameters::Body(_) => Some(ParameterKind::Body),
        }
    }
}

/// One outgoing request: target, method and parameters.
///
/// Every setter returns a new value and leaves `self` untouched, so a failed
/// call never disturbs a spec that was already valid. A spec carries no
/// signature; signing produces a separate [`SignedRequest`](crate::SignedRequest),
/// which means a changed spec can only be dispatched after being signed again.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    url: Url,
    parameters: Parameters,
}

impl RequestSpec {
    /// Start a request.
    ///
    /// `method` is matched case-insensitively against GET, POST, PUT and
    /// DELETE. Query pairs already present on `url` become the spec's query
    /// parameters.
    ///
    /// # Errors
    ///
    /// Fails with [`UsageError::UnsupportedMethod`] or [`UsageError::InvalidUrl`].
    pub fn new(method: &str, url: &str) -> Result<Self> {
        let method = parse_method(method)?;
        let mut url =
            Url::parse(url).map_err(|e| UsageError::InvalidUrl(url.to_string(), e.to_string()))?;

        let parameters = match url.query() {
            None | Some("") => Parameters::None,
            Some(q) => {
                Parameters::Query(form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            }
        };
        url.set_query(None);
        url.set_fragment(None);

        Ok(RequestSpec {
            method,
            url,
            parameters,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The endpoint, never carrying a query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Set the query parameters, replacing earlier ones.
    ///
    /// Anything `serde_urlencoded` accepts works: a slice of pairs, a map or a
    /// flat struct.
    ///
    /// # Errors
    ///
    /// Fails if body parameters are already set or `query` cannot be
    /// serialized.
    pub fn query<T: Serialize + ?Sized>(&self, query: &T) -> Result<Self> {
        self.ensure_free(ParameterKind::Query)?;
        let encoded = serde_urlencoded::to_string(query)
            .map_err(|e| UsageError::InvalidQuery(e.to_string()))?;
        let pairs = form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        Ok(self.with_parameters(Parameters::Query(pairs)))
    }

    /// Set the query parameters from a raw string such as `?screen_name=alice&count=2`.
    ///
    /// A leading `?` is ignored and so are empty fields.
    pub fn query_string(&self, query: &str) -> Result<Self> {
        self.ensure_free(ParameterKind::Query)?;
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Ok(self.with_parameters(Parameters::Query(pairs)))
    }

    /// Set the body parameters, replacing earlier ones.
    ///
    /// `body` must serialize into a JSON object. Before storing, a `status`
    /// value starting with `@` is prefixed with a NUL character and boolean
    /// values become the strings `"true"` and `"false"`. Other values are kept
    /// as they are.
    ///
    /// # Errors
    ///
    /// Fails if query parameters are already set or `body` is not an object.
    pub fn body<T: Serialize + ?Sized>(&self, body: &T) -> Result<Self> {
        self.ensure_free(ParameterKind::Body)?;
        let fields = match serde_json::to_value(body) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => return Err(UsageError::InvalidBody(format!("got {}", other)).into()),
            Err(e) => return Err(UsageError::InvalidBody(e.to_string()).into()),
        };
        Ok(self.with_parameters(Parameters::Body(normalize_body(fields))))
    }

    /// Drop whichever parameter set is present.
    pub fn clear_parameters(&self) -> Self {
        self.with_parameters(Parameters::None)
    }

    fn ensure_free(&self, attempted: ParameterKind) -> Result<()> {
        match self.parameters.kind() {
            Some(existing) if existing != attempted => {
                Err(UsageError::ConflictingParameters {
                    existing,
                    attempted,
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    fn with_parameters(&self, parameters: Parameters) -> Self {
        RequestSpec {
            method: self.method.clone(),
            url: self.url.clone(),
            parameters,
        }
    }
}

pub(crate) fn parse_method(method: &str) -> Result<Method> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        _ => Err(UsageError::UnsupportedMethod(method.to_string()).into()),
    }
}

fn normalize_body(mut fields: Map<String, Value>) -> Map<String, Value> {
    // the remote API reads a leading '@' as a mention-style token
    if let Some(Value::String(status)) = fields.get_mut(STATUS_KEY) {
        if status.starts_with('@') {
            status.insert(0, '\0');
        }
    }
    for value in fields.values_mut() {
        if let Value::Bool(flag) = *value {
            *value = Value::String(flag.to_string());
        }
    }
    fields
}
