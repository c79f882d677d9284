//! Request and response bodies of the Cash-Revolution backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Account registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Account registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserResponse>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token issued by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Current user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Trial signup request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSignupRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// A trading signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default)]
    pub id: Option<i64>,
    pub symbol: String,
    #[serde(default)]
    pub signal_type: Option<String>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub reliability: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// List of signals; accepts both `{"signals": [...]}` and a bare array
#[derive(Debug, Clone, Serialize)]
pub struct SignalsResponse {
    pub signals: Vec<Signal>,
}

impl<'de> Deserialize<'de> for SignalsResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Wrapped { signals: Vec<Signal> },
            Bare(Vec<Signal>),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Wrapped { signals } | Shape::Bare(signals) => Self { signals },
        })
    }
}

/// MetaTrader 5 account connection request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mt5ConnectRequest {
    pub login: i64,
    pub password: String,
    pub server: String,
    pub broker: String,
    /// `REAL` or `DEMO`
    pub account_type: String,
}

/// MetaTrader 5 account information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mt5AccountInfo {
    pub login: i64,
    pub name: String,
    pub server: String,
    pub currency: String,
    pub balance: f64,
    pub equity: f64,
    pub profit: f64,
    pub margin: f64,
    pub free_margin: f64,
    pub margin_level: f64,
    pub trade_allowed: bool,
    pub trade_expert: bool,
}

/// Open MetaTrader 5 position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mt5Position {
    pub ticket: i64,
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub volume: f64,
    pub price_open: f64,
    pub price_current: f64,
    pub profit: f64,
    pub swap: f64,
    #[serde(default)]
    pub comment: String,
    pub time: String,
}

/// MetaTrader 5 bridge status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mt5StatusResponse {
    pub status: String,
    #[serde(default)]
    pub bridge_connected: bool,
    #[serde(default)]
    pub account_info: Option<Mt5AccountInfo>,
    #[serde(default)]
    pub positions: Option<Vec<Mt5Position>>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signals_accept_wrapped_and_bare_lists() {
        let signal = json!({"symbol": "EURUSD", "signal_type": "BUY", "reliability": 85.5});

        let wrapped: SignalsResponse =
            serde_json::from_value(json!({"signals": [signal.clone()]})).unwrap();
        let bare: SignalsResponse = serde_json::from_value(json!([signal])).unwrap();

        for response in [wrapped, bare] {
            assert_eq!(response.signals.len(), 1);
            assert_eq!(response.signals[0].symbol, "EURUSD");
            assert_eq!(response.signals[0].reliability, Some(85.5));
        }
    }

    #[test]
    fn unknown_fields_are_kept() {
        let user: UserResponse =
            serde_json::from_value(json!({"id": 1, "email": "a@b.c", "plan": "trial"})).unwrap();
        assert_eq!(user.extra.get("plan"), Some(&json!("trial")));
    }

    #[test]
    fn register_request_omits_missing_username() {
        let body = serde_json::to_value(RegisterRequest {
            email: "a@b.c".into(),
            password: "pw".into(),
            username: None,
        })
        .unwrap();
        assert_eq!(body, json!({"email": "a@b.c", "password": "pw"}));
    }
}
