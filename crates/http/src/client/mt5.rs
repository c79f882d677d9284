//! MetaTrader 5 bridge API methods

use super::{ApiClient, ClientError, Endpoint, RequestOptions};
use crate::types::{Mt5ConnectRequest, Mt5StatusResponse};
use serde_json::Value;

impl ApiClient {
    /// Link an MT5 account to the logged-in user
    pub async fn mt5_connect(&self, request: &Mt5ConnectRequest) -> Result<Value, ClientError> {
        let options = RequestOptions::post().json_from(request)?;
        self.request_json(Endpoint::Mt5Connect.name(), options).await
    }

    /// Bridge connection state, account info and open positions
    pub async fn mt5_status(&self) -> Result<Mt5StatusResponse, ClientError> {
        self.request_json(Endpoint::Mt5Status.name(), RequestOptions::get()).await
    }
}
