//! Logical endpoint names and the name -> path table

use super::ClientError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Endpoints known to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Register,
    Login,
    Me,
    TopSignals,
    UserSignals,
    Mt5Connect,
    Mt5Status,
    TrialSignup,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::Register,
        Endpoint::Login,
        Endpoint::Me,
        Endpoint::TopSignals,
        Endpoint::UserSignals,
        Endpoint::Mt5Connect,
        Endpoint::Mt5Status,
        Endpoint::TrialSignup,
    ];

    /// Name used as key in the endpoint table
    pub const fn name(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Me => "me",
            Self::TopSignals => "topSignals",
            Self::UserSignals => "userSignals",
            Self::Mt5Connect => "mt5Connect",
            Self::Mt5Status => "mt5Status",
            Self::TrialSignup => "trialSignup",
        }
    }

    /// Path the backend serves this endpoint on
    pub const fn default_path(self) -> &'static str {
        match self {
            Self::Register => "/register",
            Self::Login => "/token",
            Self::Me => "/me",
            Self::TopSignals => "/signals/top",
            Self::UserSignals => "/signals",
            Self::Mt5Connect => "/mt5/connect",
            Self::Mt5Status => "/mt5/status",
            Self::TrialSignup => "/api/trial-signup",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl FromStr for Endpoint {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.name() == s)
            .ok_or_else(|| ClientError::UnknownEndpoint(s.to_string()))
    }
}

/// Mapping from endpoint name to URL path
///
/// Deserializing a table extends the built-in one, so a config file only
/// needs to list the entries it changes or adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EndpointTable(BTreeMap<String, String>);

impl EndpointTable {
    /// Path for an endpoint name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Add or replace an endpoint, returning the previous path
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), path.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self(
            Endpoint::ALL
                .into_iter()
                .map(|e| (e.name().to_string(), e.default_path().to_string()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for EndpointTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut table = Self::default();
        for (name, path) in overrides {
            // Environment sources lowercase their keys
            let name = Endpoint::ALL
                .into_iter()
                .find(|e| e.name().eq_ignore_ascii_case(&name))
                .map_or(name, |e| e.name().to_string());
            table.0.insert(name, path);
        }
        Ok(table)
    }
}

/// Join an origin and a path
pub(crate) fn join(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}
