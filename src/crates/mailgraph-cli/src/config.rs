//! Configuration for the planner and tool-gateway clients.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Configuration for the chat-completions planner backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API, e.g. "https://api.openai.com/v1".
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl PlannerConfig {
    /// Create a new planner configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the external tool gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the gateway, e.g. "https://api.arcade.dev/v1".
    pub base_url: String,

    /// User identity forwarded with every tool execution and
    /// authorization request.
    pub user_id: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Create a new gateway configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            user_id: user_id.into(),
            timeout: default_timeout(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_config_builder() {
        let config = PlannerConfig::new("key", "https://api.openai.com/v1", "gpt-4o-mini")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_gateway_config_builder() {
        let config = GatewayConfig::new("key", "https://api.arcade.dev/v1", "user@x.com");

        assert_eq!(config.user_id, "user@x.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
