//! HTTP client for the Cash-Revolution trading-signals backend
//!
//! Resolves logical endpoint names to URLs and performs requests with a
//! timeout, default headers, bearer-token authentication and JSON/text
//! response decoding. See [`client::ApiClient`].

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, ClientConfig, ClientError};
