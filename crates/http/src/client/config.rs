//! Client configuration

use super::endpoints::{self, EndpointTable};
use super::ClientError;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://web-production-51f67.up.railway.app";
pub const DEFAULT_SECONDARY_BASE_URL: &str = "http://ai.cash-revolution.com:8001";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Prefix for environment overrides, e.g. `CASHREV__REQUEST__TIMEOUT_MS`
pub const ENV_PREFIX: &str = "CASHREV";

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin of the primary backend
    pub base_url: String,

    /// Optional secondary backend, written as `[secondary] enabled = false` when absent
    #[serde(with = "secondary_toggle")]
    pub secondary: Option<SecondaryConfig>,

    /// Endpoint name -> path
    pub endpoints: EndpointTable,

    /// Per-request defaults
    pub request: RequestDefaults,

    /// Where to send the user when the session expires
    pub session: SessionConfig,

    /// User agent sent on native targets
    pub user_agent: String,
}

/// Secondary backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryConfig {
    /// Origin of the secondary backend
    pub base_url: String,

    /// Attach the bearer token and apply the 401 policy to secondary requests
    #[serde(default)]
    pub authenticated: bool,
}

/// Defaults applied to every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    /// Timeout for the whole exchange in milliseconds
    pub timeout_ms: u64,

    /// Headers sent unless the caller overrides them.
    ///
    /// Loaded headers extend the built-in ones; an empty value drops a header.
    #[serde(deserialize_with = "extend_default_headers")]
    pub headers: BTreeMap<String, String>,
}

/// Landing page settings used by the redirect handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Paths that already are the landing page
    pub landing_paths: Vec<String>,

    /// Target navigated to when the session expires
    pub landing_target: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secondary: Some(SecondaryConfig {
                base_url: DEFAULT_SECONDARY_BASE_URL.to_string(),
                authenticated: false,
            }),
            endpoints: EndpointTable::default(),
            request: RequestDefaults::default(),
            session: SessionConfig::default(),
            user_agent: concat!("cashrev-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: default_headers(),
        }
    }
}

fn default_headers() -> BTreeMap<String, String> {
    [
        ("Content-Type", "application/json"),
        ("Accept", "application/json"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// Header names are case-insensitive and the `config` crate lowercases keys,
// so a loaded header replaces a default that differs only in case.
fn extend_default_headers<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let loaded = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut headers = default_headers();
    for (name, value) in loaded {
        headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        if !value.is_empty() {
            headers.insert(name, value);
        }
    }
    Ok(headers)
}

mod secondary_toggle {
    use super::{DEFAULT_SECONDARY_BASE_URL, SecondaryConfig};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(default)]
    struct Toggle {
        enabled: bool,
        base_url: String,
        authenticated: bool,
    }

    impl Default for Toggle {
        fn default() -> Self {
            Self {
                enabled: true,
                base_url: DEFAULT_SECONDARY_BASE_URL.to_string(),
                authenticated: false,
            }
        }
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(
        secondary: &Option<SecondaryConfig>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let toggle = match secondary {
            Some(secondary) => Toggle {
                enabled: true,
                base_url: secondary.base_url.clone(),
                authenticated: secondary.authenticated,
            },
            None => Toggle {
                enabled: false,
                ..Toggle::default()
            },
        };
        toggle.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecondaryConfig>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let toggle = Toggle::deserialize(deserializer)?;
        Ok((toggle.enabled && !toggle.base_url.is_empty()).then(|| SecondaryConfig {
            base_url: toggle.base_url,
            authenticated: toggle.authenticated,
        }))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            landing_paths: vec!["/".to_string(), "/index.html".to_string()],
            landing_target: "index.html".to_string(),
        }
    }
}

impl RequestDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ClientConfig {
    /// Config for a single backend with the built-in endpoint table
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secondary: None,
            ..Self::default()
        }
    }

    /// Load configuration from file, then apply `CASHREV__*` environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(env_source())
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Self::finish(settings)
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        let settings = config::Config::builder()
            .add_source(env_source())
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Self::finish(settings)
    }

    fn finish(settings: config::Config) -> Result<Self, ClientError> {
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Trim trailing slashes from the configured origins
    pub fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        if let Some(secondary) = self.secondary.as_mut() {
            secondary.base_url = secondary.base_url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Check that the configuration can be used to build a client
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] describing the first problem found
    pub fn validate(&self) -> Result<(), ClientError> {
        validate_origin("base_url", &self.base_url)?;
        if let Some(secondary) = &self.secondary {
            validate_origin("secondary.base_url", &secondary.base_url)?;
        }

        if self.request.timeout_ms == 0 {
            return Err(ClientError::Configuration(
                "request.timeout_ms must be greater than zero".into(),
            ));
        }

        for (name, path) in self.endpoints.iter() {
            if !path.starts_with('/') {
                return Err(ClientError::Configuration(format!(
                    "endpoint '{name}' path must start with '/', got '{path}'"
                )));
            }
        }

        for (name, value) in &self.request.headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ClientError::Configuration(format!("invalid default header name '{name}'"))
            })?;
            HeaderValue::from_str(value).map_err(|_| {
                ClientError::Configuration(format!("invalid value for default header '{name}'"))
            })?;
        }

        Ok(())
    }

    /// Full URL for a logical endpoint name on the primary backend
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownEndpoint`] if the name is not in the table
    pub fn resolve_url(&self, endpoint: &str) -> Result<String, ClientError> {
        self.endpoints
            .get(endpoint)
            .map(|path| endpoints::join(&self.base_url, path))
            .ok_or_else(|| ClientError::UnknownEndpoint(endpoint.to_string()))
    }

    /// Full URL for a path on the secondary backend
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if no secondary backend is configured
    pub fn secondary_url(&self, path: &str) -> Result<String, ClientError> {
        let secondary = self.secondary.as_ref().ok_or_else(|| {
            ClientError::Configuration("secondary backend is not configured".into())
        })?;
        Ok(endpoints::join(&secondary.base_url, path))
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn validate_origin(field: &str, value: &str) -> Result<(), ClientError> {
    let url = url::Url::parse(value)
        .map_err(|e| ClientError::Configuration(format!("{field} '{value}' is not a URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ClientError::Configuration(format!(
            "{field} must use http or https, got '{other}'"
        ))),
    }
}
