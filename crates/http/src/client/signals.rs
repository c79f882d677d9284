//! Trading signal API methods

use super::{ApiClient, ClientError, Endpoint, RequestOptions};
use crate::types::SignalsResponse;

impl ApiClient {
    /// Highest-reliability signals across all users
    pub async fn top_signals(&self) -> Result<SignalsResponse, ClientError> {
        self.request_json(Endpoint::TopSignals.name(), RequestOptions::get()).await
    }

    /// Signals of the logged-in user
    pub async fn user_signals(&self) -> Result<SignalsResponse, ClientError> {
        self.request_json(Endpoint::UserSignals.name(), RequestOptions::get()).await
    }
}
