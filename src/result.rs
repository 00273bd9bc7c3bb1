//! Step output returned to the host

use serde::{Deserialize, Serialize};

/// Outcome of one completed run
///
/// `subjects`, `messages` and `messages_json` mirror the shape of a consumer
/// step's output. The publish path never fills them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepOutput {
    /// Wall-clock duration of the run
    #[serde(rename = "timeseconds")]
    pub time_seconds: f64,
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Raw payloads of received messages
    #[serde(default)]
    pub messages: Vec<Vec<u8>>,
    /// Received payloads decoded as JSON
    #[serde(default, rename = "messagesjson")]
    pub messages_json: Vec<serde_json::Value>,
    /// Description of the first publish failure, empty on success
    #[serde(default)]
    pub err: String,
}

impl StepOutput {
    pub fn is_success(&self) -> bool {
        self.err.is_empty()
    }
}
