//! Endpoint-mapping manifest.
//!
//! The host supplies a list of `{ function, path, method? }` entries at
//! startup (from a file, the store or an admin endpoint) and applies them
//! to a gateway client. The batch is forgiving: malformed entries are
//! skipped with a logged warning, never a fatal error, so one bad row in
//! the store cannot take routing down.

use crate::error::{ConfigError, ConfigResult};
use apigate::{GatewayClient, HttpMethod};
use serde::Deserialize;
use tracing::{info, warn};

/// One dynamic mapping entry as supplied by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingEntry {
    /// Logical function name callers will use.
    pub function: String,
    /// Endpoint path template, may contain `{placeholder}` segments.
    pub path: String,
    /// HTTP method; defaults to POST when absent.
    #[serde(default)]
    pub method: Option<String>,
}

/// Parse a JSON manifest: an array of [`MappingEntry`] objects.
pub fn parse_manifest(json: &str) -> ConfigResult<Vec<MappingEntry>> {
    serde_json::from_str(json).map_err(|e| ConfigError::Manifest(e.to_string()))
}

/// Apply `entries` to `client`, skipping malformed ones.
///
/// Returns the number of mappings actually registered.
pub fn apply_mappings(client: &GatewayClient, entries: &[MappingEntry]) -> usize {
    let mut applied = 0;

    for entry in entries {
        if entry.function.trim().is_empty() || entry.path.trim().is_empty() {
            warn!(
                function = %entry.function,
                path = %entry.path,
                "skipping mapping entry with empty function or path"
            );
            continue;
        }
        let method = match &entry.method {
            None => HttpMethod::Post,
            Some(raw) => match raw.parse::<HttpMethod>() {
                Ok(method) => method,
                Err(_) => {
                    warn!(
                        function = %entry.function,
                        method = %raw,
                        "skipping mapping entry with unsupported method"
                    );
                    continue;
                }
            },
        };
        client.register_function(&entry.function, &entry.path, method);
        applied += 1;
    }

    info!(applied, total = entries.len(), "endpoint mappings applied");
    applied
}

// =============================================================================
// Tests
// =============================================================================
