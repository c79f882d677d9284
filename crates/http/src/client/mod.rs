//! Cash-Revolution API client
//!
//! [`ApiClient`] resolves logical endpoint names against the configured
//! backend, merges default and per-call headers, attaches the stored bearer
//! token, bounds every exchange with the configured timeout and decodes the
//! response as JSON or text. A 401 from an authenticated route clears the
//! stored credential and notifies the registered [`SessionExpiredHandler`].

pub mod auth;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod headers;
pub mod mt5;
pub mod options;
pub mod session;
pub mod signals;
mod timeout;

pub use config::{ClientConfig, RequestDefaults, SecondaryConfig, SessionConfig};
#[cfg(not(target_arch = "wasm32"))]
pub use credentials::FileCredentialStore;
pub use credentials::{CredentialStore, MemoryCredentialStore, StoredCredential};
pub use endpoints::{Endpoint, EndpointTable};
pub use error::{Backend, ClientError};
pub use options::{RequestBody, RequestOptions, ResponseBody};
pub use reqwest::Method;
pub use session::{Navigator, RedirectToLanding, SessionExpired, SessionExpiredHandler};

use reqwest::{Client, ClientBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Cash-Revolution API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ClientConfig>,
    credentials: Arc<dyn CredentialStore>,
    on_session_expired: Option<Arc<dyn SessionExpiredHandler>>,
}

/// Where a single call goes and which policies apply to it
struct Route<'a> {
    label: &'a str,
    url: String,
    backend: Backend,
    authenticated: bool,
}

impl ApiClient {
    /// Create a client with in-memory credentials and no session handler
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::builder().config(config).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The credential store used for bearer tokens
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// Full URL of a logical endpoint on the primary backend
    pub fn resolve_url(&self, endpoint: &str) -> Result<String, ClientError> {
        self.config.resolve_url(endpoint)
    }

    /// Send a request to a named endpoint on the primary backend.
    ///
    /// The stored bearer token is attached when present. A 401 response
    /// clears the stored credential, notifies the session handler and fails
    /// with [`ClientError::AuthenticationExpired`] without reading the body.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        let route = Route {
            label: endpoint,
            url: self.resolve_url(endpoint)?,
            backend: Backend::Primary,
            authenticated: true,
        };
        self.dispatch(route, options).await
    }

    /// [`request`](Self::request) and deserialize the body into `T`
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(endpoint, options).await?.decode()
    }

    /// Send a request to a path on the secondary backend.
    ///
    /// Token injection and the 401 policy only apply when the secondary
    /// backend is configured as `authenticated`.
    pub async fn request_secondary(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        let authenticated = self
            .config
            .secondary
            .as_ref()
            .is_some_and(|secondary| secondary.authenticated);
        let route = Route {
            label: path,
            url: self.config.secondary_url(path)?,
            backend: Backend::Secondary,
            authenticated,
        };
        self.dispatch(route, options).await
    }

    async fn dispatch(
        &self,
        route: Route<'_>,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        let token = if route.authenticated {
            self.bearer_token()
        } else {
            None
        };

        let headers = headers::merge_headers(
            &self.config.request.headers,
            token.as_deref(),
            &options.headers,
        )?;
        let request = self
            .client
            .request(options.method.clone(), &route.url)
            .headers(headers);
        let request = RequestOptions::apply_body(options.body, request)?;

        debug!(
            endpoint = route.label,
            backend = %route.backend,
            method = %options.method,
            url = %route.url,
            authenticated = token.is_some(),
            "Sending API request"
        );

        let after = self.config.request.timeout();
        match timeout::with_timeout(after, self.exchange(&route, request)).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(err)) => {
                error!(
                    endpoint = route.label,
                    backend = %route.backend,
                    error = %err,
                    "API request failed"
                );
                Err(err)
            }
            Err(timeout::Elapsed) => {
                warn!(
                    endpoint = route.label,
                    backend = %route.backend,
                    timeout_ms = self.config.request.timeout_ms,
                    "API request timed out"
                );
                Err(ClientError::Timeout {
                    backend: route.backend,
                    after,
                })
            }
        }
    }

    async fn exchange(
        &self,
        route: &Route<'_>,
        request: reqwest::RequestBuilder,
    ) -> Result<ResponseBody, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && route.authenticated {
            self.expire_session(route);
            return Err(ClientError::AuthenticationExpired {
                endpoint: route.label.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ClientError::from_status(route.backend, status));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;

        ResponseBody::from_parts(content_type.as_deref(), &body)
    }

    fn bearer_token(&self) -> Option<String> {
        match self.credentials.get() {
            Ok(credential) => credential.map(|c| c.access_token),
            Err(err) => {
                warn!(
                    error = %err,
                    "Failed to read stored credentials, sending request without token"
                );
                None
            }
        }
    }

    fn expire_session(&self, route: &Route<'_>) {
        if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "Failed to clear stored credentials");
        }
        warn!(
            endpoint = route.label,
            backend = %route.backend,
            "Session expired, stored credentials cleared"
        );

        if let Some(handler) = &self.on_session_expired {
            handler.on_session_expired(&SessionExpired {
                endpoint: route.label.to_string(),
                backend: route.backend,
            });
        }
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    credentials: Option<Arc<dyn CredentialStore>>,
    on_session_expired: Option<Arc<dyn SessionExpiredHandler>>,
}

impl ApiClientBuilder {
    /// Use a complete configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the primary base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        match self.config.as_mut() {
            Some(config) => config.base_url = url,
            None => self.config = Some(ClientConfig::with_base_url(url)),
        }
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let config = self.config.get_or_insert_with(ClientConfig::default);
        config.request.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Credential store consulted for the bearer token
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Handler notified when a request reports an expired session
    pub fn on_session_expired(mut self, handler: impl SessionExpiredHandler + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(handler));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let config = self
            .config
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?
            .normalized();
        config.validate()?;

        let client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        let client_builder = client_builder.user_agent(config.user_agent.clone());

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            config: Arc::new(config),
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
            on_session_expired: self.on_session_expired,
        })
    }
}
