//! Normalizing captured request headers.
//!
//! Captured traffic tends to carry headers that must not be replayed verbatim. Header
//! names are compared case-insensitively and normalized to lowercase, request headers
//! override user defaults of the same name, and headers the HTTP client computes for
//! every request are dropped.

use http::header::{HeaderName, HeaderValue};
use std::collections::BTreeMap;

use crate::FlowError;

/// Headers set by the client itself, never replayed from a capture.
pub const SKIPPED_HEADERS: [&str; 4] =
    ["connection", "content-length", "host", "transfer-encoding"];

/// Confirm every header name and value can be sent.
pub fn validate_headers(headers: &BTreeMap<String, String>) -> Result<(), FlowError> {
    for (name, value) in headers {
        normalize_header(name, value)?;
    }
    Ok(())
}

fn normalize_header(name: &str, value: &str) -> Result<(String, String), FlowError> {
    let header_name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
        FlowError::InvalidHeader {
            name: name.to_string(),
            detail: format!("invalid header name: {}", e),
        }
    })?;
    HeaderValue::from_str(value).map_err(|e| FlowError::InvalidHeader {
        name: name.to_string(),
        detail: format!("invalid header value: {}", e),
    })?;
    // HeaderName is always lowercase.
    Ok((header_name.as_str().to_string(), value.to_string()))
}

/// Merge user-level `defaults` with per-request `overrides`, returning the headers to
/// send sorted by name.
pub fn merge_headers(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> Result<Vec<(String, String)>, FlowError> {
    let mut merged = BTreeMap::new();
    for (name, value) in defaults.iter().chain(overrides.iter()) {
        let (name, value) = normalize_header(name, value)?;
        if SKIPPED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        merged.insert(name, value);
    }
    Ok(merged.into_iter().collect())
}
