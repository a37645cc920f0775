//! Logical-function endpoint registry.
//!
//! The registry maps a stable string identifier (the *logical function
//! name* used by callers) to a concrete endpoint: a path template plus an
//! HTTP method. The table is runtime-mutable so routing can be reloaded
//! from configuration without restarting the process; every dispatch goes
//! through [`EndpointRegistry::resolve`], keeping the dynamic routing
//! auditable in one place.

use crate::error::{GatewayError, GatewayResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// HttpMethod
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP method of a registered endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Only GET responses are eligible for response caching; write methods
    /// are never cached regardless of the global cache switch.
    pub fn is_cacheable(self) -> bool {
        matches!(self, HttpMethod::Get)
    }

    /// Whether leftover call arguments travel in the request body (write
    /// methods) or as query parameters (GET).
    pub fn has_body(self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

impl FromStr for HttpMethod {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(GatewayError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EndpointMapping
// ─────────────────────────────────────────────────────────────────────────────

/// A registered mapping from logical function name to endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointMapping {
    /// Unique key in the registry.
    pub function_name: String,
    /// Endpoint path, possibly containing `{placeholder}` segments that
    /// are substituted from call arguments at dispatch time.
    pub path_template: String,
    /// HTTP method used for the outbound call.
    pub method: HttpMethod,
}

impl EndpointMapping {
    /// Create a new mapping.
    pub fn new(
        function_name: impl Into<String>,
        path_template: impl Into<String>,
        method: HttpMethod,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            path_template: path_template.into(),
            method,
        }
    }

    /// Substitute `{placeholder}` segments in the path template from `args`.
    ///
    /// Consumed arguments are removed from the returned leftover map; the
    /// caller sends leftovers as the request body (write methods) or query
    /// parameters (GET). An unresolved placeholder fails with
    /// [`GatewayError::MissingPathParameter`].
    pub fn render(&self, args: &Map<String, Value>) -> GatewayResult<RenderedPath> {
        let mut path = String::with_capacity(self.path_template.len());
        let mut leftover = args.clone();
        let mut chars = self.path_template.chars();

        while let Some(c) = chars.next() {
            if c != '{' {
                path.push(c);
                continue;
            }
            let mut name = String::new();
            let mut closed = false;
            for p in chars.by_ref() {
                if p == '}' {
                    closed = true;
                    break;
                }
                name.push(p);
            }
            if !closed {
                // Unterminated brace: keep the raw text rather than guessing.
                path.push('{');
                path.push_str(&name);
                break;
            }
            match leftover.remove(&name) {
                Some(value) => path.push_str(&render_value(&value)),
                None => {
                    return Err(GatewayError::MissingPathParameter {
                        function: self.function_name.clone(),
                        parameter: name,
                    });
                }
            }
        }

        Ok(RenderedPath { path, leftover })
    }
}

/// Result of path-template rendering: the concrete path plus the arguments
/// left over after placeholder substitution.
#[derive(Debug, Clone)]
pub struct RenderedPath {
    pub path: String,
    pub leftover: Map<String, Value>,
}

/// Argument rendering for path placeholders and query parameters. Strings
/// go bare (no JSON quoting); anything else serializes compactly.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EndpointRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Runtime-mutable mapping table from logical function name to endpoint.
///
/// Registration is last-write-wins: re-registering an existing name
/// silently overwrites the prior mapping, which is what lets routing be
/// hot-reloaded from configuration. Reads and writes are safe under
/// concurrent use; a reader never observes a partially-written entry.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    entries: DashMap<String, EndpointMapping>,
}

impl EndpointRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite a mapping. Always succeeds.
    pub fn register(&self, mapping: EndpointMapping) {
        debug!(
            function = %mapping.function_name,
            path = %mapping.path_template,
            method = %mapping.method,
            "endpoint mapping registered"
        );
        self.entries.insert(mapping.function_name.clone(), mapping);
    }

    /// Look up the most recently registered mapping for `function`.
    pub fn resolve(&self, function: &str) -> GatewayResult<EndpointMapping> {
        self.entries
            .get(function)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GatewayError::UnknownFunction(function.to_string()))
    }

    /// Number of registered mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
