//! Client construction for the browser

use crate::navigation::BrowserNavigator;
use crate::storage::LocalStorageCredentialStore;
use cashrev_http::client::{ApiClient, ClientConfig, ClientError, RedirectToLanding};
use std::sync::Arc;

/// Client reading the token from `localStorage` and sending the user back
/// to the landing page when the session expires
pub fn browser_client(config: ClientConfig) -> Result<ApiClient, ClientError> {
    let redirect = RedirectToLanding::new(BrowserNavigator, config.session.clone());

    ApiClient::builder()
        .config(config)
        .credentials(Arc::new(LocalStorageCredentialStore::new()))
        .on_session_expired(redirect)
        .build()
}

/// [`browser_client`] with the built-in configuration
pub fn default_browser_client() -> Result<ApiClient, ClientError> {
    browser_client(ClientConfig::default())
}
