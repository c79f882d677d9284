//! Bearer credential storage
//!
//! The client never touches a concrete storage backend; it reads and clears
//! credentials through [`CredentialStore`]. The browser `localStorage`
//! implementation lives in the frontend crate.

use super::ClientError;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Storage key of the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the token type reported at login
pub const TOKEN_TYPE_KEY: &str = "token_type";

/// A persisted login credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl StoredCredential {
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
        }
    }

    /// Credential with the default `bearer` token type
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self::new(access_token, default_token_type())
    }
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Read/write access to the stored credential
pub trait CredentialStore: Send + Sync {
    /// Current credential, if any
    fn get(&self) -> Result<Option<StoredCredential>, ClientError>;

    /// Persist a credential, replacing the previous one
    fn store(&self, credential: StoredCredential) -> Result<(), ClientError>;

    /// Remove both the token and the token type
    fn clear(&self) -> Result<(), ClientError>;
}

/// In-process credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<StoredCredential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a credential
    pub fn with_credential(credential: StoredCredential) -> Self {
        Self {
            inner: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<StoredCredential>, ClientError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| ClientError::Credentials("credential lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn store(&self, credential: StoredCredential) -> Result<(), ClientError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| ClientError::Credentials("credential lock poisoned".into()))?;
        *guard = Some(credential);
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| ClientError::Credentials("credential lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileCredentialStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::{ACCESS_TOKEN_KEY, TOKEN_TYPE_KEY};
    use super::{ClientError, CredentialStore, StoredCredential};
    use serde_json::{Map, Value};
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    /// Credential store backed by a small JSON file of string keys
    #[derive(Debug, Clone)]
    pub struct FileCredentialStore {
        path: PathBuf,
    }

    impl FileCredentialStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_map(&self) -> Result<Map<String, Value>, ClientError> {
            match std::fs::read_to_string(&self.path) {
                Ok(content) if content.trim().is_empty() => Ok(Map::new()),
                Ok(content) => Ok(serde_json::from_str(&content)?),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
                Err(e) => Err(ClientError::Credentials(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                ))),
            }
        }

        fn write_map(&self, map: &Map<String, Value>) -> Result<(), ClientError> {
            let io_err = |e: std::io::Error| {
                ClientError::Credentials(format!("failed to write {}: {e}", self.path.display()))
            };

            if map.is_empty() {
                return match std::fs::remove_file(&self.path) {
                    Err(e) if e.kind() != ErrorKind::NotFound => Err(io_err(e)),
                    _ => Ok(()),
                };
            }

            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
            let content = serde_json::to_string_pretty(map)?;
            std::fs::write(&self.path, content).map_err(io_err)
        }
    }

    impl CredentialStore for FileCredentialStore {
        fn get(&self) -> Result<Option<StoredCredential>, ClientError> {
            let map = self.read_map()?;
            let Some(token) = map.get(ACCESS_TOKEN_KEY).and_then(Value::as_str) else {
                return Ok(None);
            };
            let token_type = map
                .get(TOKEN_TYPE_KEY)
                .and_then(Value::as_str)
                .unwrap_or("bearer");
            Ok(Some(StoredCredential::new(token, token_type)))
        }

        fn store(&self, credential: StoredCredential) -> Result<(), ClientError> {
            let mut map = self.read_map()?;
            map.insert(
                ACCESS_TOKEN_KEY.to_string(),
                Value::String(credential.access_token),
            );
            map.insert(TOKEN_TYPE_KEY.to_string(), Value::String(credential.token_type));
            self.write_map(&map)
        }

        fn clear(&self) -> Result<(), ClientError> {
            let mut map = self.read_map()?;
            map.remove(ACCESS_TOKEN_KEY);
            map.remove(TOKEN_TYPE_KEY);
            self.write_map(&map)
        }
    }
}
