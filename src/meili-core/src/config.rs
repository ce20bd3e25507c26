use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Connection settings for a single client instance.
///
/// A config is read once when the client is built and never mutated
/// afterwards, so it can be shared by every in-flight request.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Server address, e.g. `http://localhost:7700` or `search.example.com/api`
    #[serde(default = "default_host")]
    pub host: String,

    /// Bearer credential sent as `Authorization: Bearer <key>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Agent strings prepended to the library's own client identification
    #[serde(default)]
    pub client_agents: Vec<String>,

    /// Extra headers attached to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Network timeout applied to each individual HTTP call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Defaults used by `wait_for_task` / `wait_for_tasks` when a call
    /// supplies no options of its own
    #[serde(default)]
    pub poll: PollOptions,
}

fn default_host() -> String {
    "http://localhost:7700".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_key: None,
            client_agents: Vec::new(),
            headers: BTreeMap::new(),
            request_timeout_ms: None,
            poll: PollOptions::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("client_agents", &self.client_agents)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("poll", &self.poll)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config pointing at `host` with everything else defaulted
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.to_string(),
            source,
        })?;
        let config: ClientConfig =
            serde_json::from_str(&contents).map_err(|source| CoreError::ConfigParse {
                path: path.to_string(),
                source,
            })?;
        tracing::debug!(host = %config.host, "loaded client config from {}", path);
        Ok(config)
    }

    /// Build a config from `MEILI_HOST` and `MEILI_API_KEY`
    pub fn from_env() -> Self {
        let host = std::env::var("MEILI_HOST").unwrap_or_else(|_| default_host());
        let api_key = std::env::var("MEILI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        Self {
            host,
            api_key,
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Append a client agent string
    pub fn client_agent(mut self, agent: impl Into<String>) -> Self {
        self.client_agents.push(agent.into());
        self
    }

    /// Attach a custom header to every request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the per-call network timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(saturating_millis(timeout));
        self
    }

    /// Set the default poll options
    pub fn poll(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    pub fn request_timeout_duration(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Interval and budget for a single wait-for-task call.
///
/// `interval_ms == 0` polls back to back (still yielding to the runtime
/// between fetches); `timeout_ms == 0` fetches once and fails if the task
/// is not already terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollOptions {
    #[serde(rename = "intervalMs", default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(
        rename = "timeOutMs",
        alias = "timeoutMs",
        default = "default_timeout_ms"
    )]
    pub timeout_ms: u64,
}

/// Whole milliseconds, clamped to `u64::MAX`
pub fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn default_interval_ms() -> u64 {
    50
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PollOptions {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval_ms: saturating_millis(interval),
            timeout_ms: saturating_millis(timeout),
        }
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "http://localhost:7700");
        assert!(config.api_key.is_none());
        assert_eq!(config.poll, PollOptions::default());
        assert_eq!(config.poll.interval(), Duration::from_millis(50));
        assert_eq!(config.poll.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new("search.example.com/api")
            .api_key("masterKey")
            .client_agent("MyApp/1.0")
            .header("X-Trace", "on")
            .request_timeout(Duration::from_secs(3))
            .poll(PollOptions::default().with_interval_ms(10));

        assert_eq!(config.host, "search.example.com/api");
        assert_eq!(config.api_key.as_deref(), Some("masterKey"));
        assert_eq!(config.client_agents, vec!["MyApp/1.0".to_string()]);
        assert_eq!(config.headers.get("X-Trace").map(String::as_str), Some("on"));
        assert_eq!(config.request_timeout_duration(), Some(Duration::from_secs(3)));
        assert_eq!(config.poll.interval_ms, 10);
        assert_eq!(config.poll.timeout_ms, 5_000);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("http://h").api_key("super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_huge_durations_saturate() {
        let poll = PollOptions::new(Duration::from_millis(10), Duration::MAX);
        assert_eq!(poll.interval_ms, 10);
        assert_eq!(poll.timeout_ms, u64::MAX);

        let config = ClientConfig::default().request_timeout(Duration::MAX);
        assert_eq!(config.request_timeout_ms, Some(u64::MAX));
        assert_eq!(saturating_millis(Duration::from_secs(3)), 3_000);
    }

    #[test]
    fn test_poll_options_wire_names() {
        let options: PollOptions =
            serde_json::from_str(r#"{"intervalMs": 0, "timeOutMs": 100}"#).unwrap();
        assert_eq!(options.interval_ms, 0);
        assert_eq!(options.timeout_ms, 100);

        let partial: PollOptions = serde_json::from_str(r#"{"timeoutMs": 7}"#).unwrap();
        assert_eq!(partial.interval_ms, 50);
        assert_eq!(partial.timeout_ms, 7);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("meili-config-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"host": "http://127.0.0.1:7700", "apiKey": "k", "clientAgents": ["A/1"], "poll": {"intervalMs": 5}}"#,
        )
        .unwrap();

        let config = ClientConfig::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.host, "http://127.0.0.1:7700");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.client_agents, vec!["A/1".to_string()]);
        assert_eq!(config.poll.interval_ms, 5);
        assert_eq!(config.poll.timeout_ms, 5_000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientConfig::load("/nonexistent/meili.json").unwrap_err();
        assert!(matches!(err, CoreError::ConfigIo { .. }));
    }
}
