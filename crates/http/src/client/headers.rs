//! Request header merging

use super::ClientError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;

/// Build the outgoing headers for one request.
///
/// Sources are applied in order: defaults, then the bearer token, then the
/// caller's overrides. A later source replaces an earlier one for the same
/// (case-insensitive) header name.
pub fn merge_headers(
    defaults: &BTreeMap<String, String>,
    bearer_token: Option<&str>,
    overrides: &BTreeMap<String, String>,
) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::with_capacity(defaults.len() + overrides.len() + 1);

    for (name, value) in defaults {
        headers.insert(header_name(name)?, header_value(name, value)?);
    }

    if let Some(token) = bearer_token {
        headers.insert(AUTHORIZATION, bearer(token)?);
    }

    for (name, value) in overrides {
        headers.insert(header_name(name)?, header_value(name, value)?);
    }

    Ok(headers)
}

fn bearer(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        ClientError::InvalidHeader("bearer token is not a valid header value".into())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn header_name(name: &str) -> Result<HeaderName, ClientError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ClientError::InvalidHeader(format!("invalid header name '{name}'")))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value)
        .map_err(|_| ClientError::InvalidHeader(format!("invalid value for header '{name}'")))
}
