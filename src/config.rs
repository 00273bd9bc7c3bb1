//! Step configuration decoding
//!
//! The host hands the executor an untyped step record. This module is the
//! only place that record is turned into typed data; everything downstream
//! works with [`StepConfig`].

use crate::error::StepError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Multi-valued message headers, passed through to the broker untouched
pub type Headers = BTreeMap<String, Vec<String>>;

/// Typed configuration for one publish run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepConfig {
    /// Broker endpoint, e.g. `nats://localhost:4222` or `mqtt://localhost:1883`
    #[serde(default, alias = "address", deserialize_with = "null_as_default")]
    pub addr: String,
    /// Client mode; only `publisher` is supported
    #[serde(
        default,
        alias = "clientType",
        alias = "clienttype",
        deserialize_with = "null_as_default"
    )]
    pub client_type: String,
    /// Messages to send, in order
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

/// A single message to publish
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: String,
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub headers: Headers,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subject={:?} payload={:?} headers={:?}",
            self.subject, self.payload, self.headers
        )
    }
}

/// Supported client modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    Publisher,
}

impl FromStr for ClientMode {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publisher" => Ok(ClientMode::Publisher),
            other => Err(StepError::unsupported_client_type(other)),
        }
    }
}

/// Configuration decoding errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read step file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[source] serde_json::Error),
    #[error("Failed to decode step: {0}")]
    Decode(#[source] serde_json::Error),
}

impl StepConfig {
    /// Decode an opaque step record into a typed configuration
    pub fn from_value(step: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value(step).map_err(ConfigError::Decode)
    }

    /// Load a step record from a `.json` or TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let step = if is_json {
            serde_json::from_str(&content).map_err(ConfigError::JsonParse)?
        } else {
            let document: toml::Value = toml::from_str(&content)?;
            serde_json::to_value(document).map_err(ConfigError::Decode)?
        };

        Self::from_value(step)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Header values may be written as a single string or a list of strings
#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

fn deserialize_headers<'de, D>(deserializer: D) -> Result<Headers, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, HeaderValues>> = Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, values)| match values {
            HeaderValues::One(value) => (name, vec![value]),
            HeaderValues::Many(values) => (name, values),
        })
        .collect())
}
