//! Per-call request options and decoded response bodies

use super::ClientError;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Body sent with a request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON
    Json(Value),
    /// Sent as-is
    Text(String),
}

/// Caller overrides merged with the configured defaults for one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Set a header, replacing any earlier value for the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Use a JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Serialize `body` to JSON
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if `body` cannot be represented as JSON
    pub fn json_from<T: Serialize>(self, body: &T) -> Result<Self, ClientError> {
        Ok(self.json(serde_json::to_value(body)?))
    }

    /// Use a raw text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub(crate) fn apply_body(
        body: Option<RequestBody>,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        Ok(match body {
            // Content-Type comes from the merged headers, not from reqwest's json()
            Some(RequestBody::Json(value)) => request.body(serde_json::to_vec(&value)?),
            Some(RequestBody::Text(text)) => request.body(text),
            None => request,
        })
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Response declared a JSON content type
    Json(Value),
    /// Any other content type, returned verbatim
    Text(String),
}

impl ResponseBody {
    /// Decode according to the `content-type` header
    pub(crate) fn from_parts(content_type: Option<&str>, body: &str) -> Result<Self, ClientError> {
        if content_type.is_some_and(|ct| ct.contains("application/json")) {
            Ok(Self::Json(serde_json::from_str(body)?))
        } else {
            Ok(Self::Text(body.to_string()))
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Deserialize into `T`; a text body is parsed as JSON first
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if the body does not match `T`
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}
