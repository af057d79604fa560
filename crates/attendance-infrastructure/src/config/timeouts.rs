use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts for the agent's outbound calls.
///
/// Store operations carry no timeout: a hanging store leaves the request
/// without a reply rather than racing a half-finished insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Remote ledger HTTP request timeout
    #[serde(with = "duration_secs")]
    pub http_request: Duration,

    /// Grace period for in-flight requests when stdin closes
    #[serde(with = "duration_secs")]
    pub shutdown_grace: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            http_request: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
