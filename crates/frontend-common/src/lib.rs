//! Browser bindings for the Cash-Revolution API client
#![cfg(target_arch = "wasm32")]

pub mod client;
pub mod logging;
pub mod navigation;
pub mod storage;

pub use client::{browser_client, default_browser_client};
pub use logging::init_logging;
pub use navigation::BrowserNavigator;
pub use storage::LocalStorageCredentialStore;
