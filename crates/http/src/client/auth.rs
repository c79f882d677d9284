//! Account and authentication API methods

use super::{ApiClient, ClientError, Endpoint, RequestOptions, StoredCredential};
use crate::types::{
    LoginRequest, RegisterRequest, RegisterResponse, TokenResponse, TrialSignupRequest,
    UserResponse,
};
use serde_json::Value;
use tracing::info;

impl ApiClient {
    /// Register a new account
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let options = RequestOptions::post().json_from(request)?;
        self.request_json(Endpoint::Register.name(), options).await
    }

    /// Exchange credentials for a token. The token is returned, not stored.
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ClientError> {
        let options = RequestOptions::post().json_from(request)?;
        self.request_json(Endpoint::Login.name(), options).await
    }

    /// Log in and persist the returned token in the credential store
    pub async fn login_and_store(
        &self,
        request: &LoginRequest,
    ) -> Result<TokenResponse, ClientError> {
        let token = self.login(request).await?;
        self.credentials().store(StoredCredential::new(
            token.access_token.clone(),
            token.token_type.clone(),
        ))?;
        info!(email = %request.email, "Logged in, credentials stored");
        Ok(token)
    }

    /// Forget the stored credential
    pub fn logout(&self) -> Result<(), ClientError> {
        self.credentials().clear()
    }

    /// Whether a credential is currently stored
    pub fn is_logged_in(&self) -> Result<bool, ClientError> {
        Ok(self.credentials().get()?.is_some())
    }

    /// Current user
    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        self.request_json(Endpoint::Me.name(), RequestOptions::get()).await
    }

    /// Start a free trial
    pub async fn trial_signup(&self, request: &TrialSignupRequest) -> Result<Value, ClientError> {
        let options = RequestOptions::post().json_from(request)?;
        self.request_json(Endpoint::TrialSignup.name(), options).await
    }
}
