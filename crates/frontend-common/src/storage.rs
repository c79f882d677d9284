//! `localStorage` backed credential store

use cashrev_http::client::credentials::{ACCESS_TOKEN_KEY, TOKEN_TYPE_KEY};
use cashrev_http::client::{ClientError, CredentialStore, StoredCredential};
use gloo::storage::{LocalStorage, Storage};

/// Keeps the token under the `access_token` / `token_type` keys as plain
/// strings, the same layout the login page writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageCredentialStore;

impl LocalStorageCredentialStore {
    pub fn new() -> Self {
        Self
    }
}

fn storage_error(action: &str, key: &str) -> ClientError {
    ClientError::Credentials(format!("localStorage {action} '{key}' failed"))
}

impl CredentialStore for LocalStorageCredentialStore {
    fn get(&self) -> Result<Option<StoredCredential>, ClientError> {
        let storage = LocalStorage::raw();
        let token = storage
            .get_item(ACCESS_TOKEN_KEY)
            .map_err(|_| storage_error("read", ACCESS_TOKEN_KEY))?;

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let token_type = storage
            .get_item(TOKEN_TYPE_KEY)
            .map_err(|_| storage_error("read", TOKEN_TYPE_KEY))?
            .unwrap_or_else(|| "bearer".to_string());

        Ok(Some(StoredCredential::new(token, token_type)))
    }

    fn store(&self, credential: StoredCredential) -> Result<(), ClientError> {
        let storage = LocalStorage::raw();
        storage
            .set_item(ACCESS_TOKEN_KEY, &credential.access_token)
            .map_err(|_| storage_error("write", ACCESS_TOKEN_KEY))?;
        storage
            .set_item(TOKEN_TYPE_KEY, &credential.token_type)
            .map_err(|_| storage_error("write", TOKEN_TYPE_KEY))
    }

    fn clear(&self) -> Result<(), ClientError> {
        let storage = LocalStorage::raw();
        storage
            .remove_item(ACCESS_TOKEN_KEY)
            .map_err(|_| storage_error("remove", ACCESS_TOKEN_KEY))?;
        storage
            .remove_item(TOKEN_TYPE_KEY)
            .map_err(|_| storage_error("remove", TOKEN_TYPE_KEY))
    }
}
