//! SimpleDB backend configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StorageResult};

use super::client::Backoff;

/// Default lower bound for request backoff.
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_millis(16);

/// Default upper bound for request backoff.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(65336);

/// Configuration for the SimpleDB backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct SimpleDbConfig {
    /// AWS access key id.
    #[serde(default)]
    pub key_id: String,

    /// AWS secret access key.
    #[serde(default)]
    pub secret: String,

    /// Initial delay before retrying a throttled request. Zero means the default.
    #[serde(with = "humantime_serde", default = "default_min_wait")]
    pub min_wait: Duration,

    /// Longest delay the client waits before giving up on a request. Zero means
    /// the default.
    #[serde(with = "humantime_serde", default = "default_max_wait")]
    pub max_wait: Duration,

    /// Wait for every per-item delete of a filtered remove and report the
    /// first failure, instead of returning once the deletes are dispatched.
    #[serde(default)]
    pub await_bulk_deletes: bool,
}

fn default_min_wait() -> Duration {
    DEFAULT_MIN_WAIT
}

fn default_max_wait() -> Duration {
    DEFAULT_MAX_WAIT
}

impl Default for SimpleDbConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            secret: String::new(),
            min_wait: default_min_wait(),
            max_wait: default_max_wait(),
            await_bulk_deletes: false,
        }
    }
}

impl fmt::Debug for SimpleDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleDbConfig")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .field("min_wait", &self.min_wait)
            .field("max_wait", &self.max_wait)
            .field("await_bulk_deletes", &self.await_bulk_deletes)
            .finish()
    }
}

impl SimpleDbConfig {
    /// Creates a configuration with the given credentials and default waits.
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the minimum backoff wait.
    pub fn with_min_wait(mut self, min_wait: Duration) -> Self {
        self.min_wait = min_wait;
        self
    }

    /// Sets the maximum backoff wait.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Sets whether filtered removes wait for their item deletes.
    pub fn with_await_bulk_deletes(mut self, await_bulk_deletes: bool) -> Self {
        self.await_bulk_deletes = await_bulk_deletes;
        self
    }

    /// Returns the minimum wait, with zero replaced by [`DEFAULT_MIN_WAIT`].
    pub fn effective_min_wait(&self) -> Duration {
        if self.min_wait.is_zero() {
            DEFAULT_MIN_WAIT
        } else {
            self.min_wait
        }
    }

    /// Returns the maximum wait, with zero replaced by [`DEFAULT_MAX_WAIT`].
    pub fn effective_max_wait(&self) -> Duration {
        if self.max_wait.is_zero() {
            DEFAULT_MAX_WAIT
        } else {
            self.max_wait
        }
    }

    /// Returns the backoff bounds handed to the client.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.effective_min_wait(), self.effective_max_wait())
    }

    /// Validates configuration invariants.
    pub fn validate(&self) -> StorageResult<()> {
        if self.key_id.trim().is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: "key_id".to_string(),
            }
            .into());
        }

        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: "secret".to_string(),
            }
            .into());
        }

        let (min_wait, max_wait) = (self.effective_min_wait(), self.effective_max_wait());
        if min_wait > max_wait {
            return Err(ConfigError::InvalidSetting {
                setting: "min_wait".to_string(),
                message: format!(
                    "{} exceeds max_wait {}",
                    humantime::format_duration(min_wait),
                    humantime::format_duration(max_wait)
                ),
            }
            .into());
        }

        Ok(())
    }

    /// Loads configuration from `SIMPLEDB_*` environment variables.
    ///
    /// Reads `SIMPLEDB_KEY_ID`, `SIMPLEDB_SECRET`, `SIMPLEDB_MIN_WAIT`,
    /// `SIMPLEDB_MAX_WAIT` (humantime durations such as `16ms`) and
    /// `SIMPLEDB_AWAIT_BULK_DELETES`. The result is validated.
    pub fn from_env() -> StorageResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> StorageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key_id) = lookup("SIMPLEDB_KEY_ID") {
            config.key_id = key_id;
        }
        if let Some(secret) = lookup("SIMPLEDB_SECRET") {
            config.secret = secret;
        }
        if let Some(raw) = lookup("SIMPLEDB_MIN_WAIT") {
            config.min_wait = parse_wait("SIMPLEDB_MIN_WAIT", &raw)?;
        }
        if let Some(raw) = lookup("SIMPLEDB_MAX_WAIT") {
            config.max_wait = parse_wait("SIMPLEDB_MAX_WAIT", &raw)?;
        }
        if let Some(raw) = lookup("SIMPLEDB_AWAIT_BULK_DELETES") {
            config.await_bulk_deletes = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(ConfigError::InvalidSetting {
                        setting: "SIMPLEDB_AWAIT_BULK_DELETES".to_string(),
                        message: format!("expected a boolean, got '{other}'"),
                    }
                    .into());
                }
            };
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_wait(setting: &str, raw: &str) -> StorageResult<Duration> {
    let raw = raw.trim();
    // Bare numbers are milliseconds.
    if let Ok(ms) = raw.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(raw).map_err(|e| {
        ConfigError::InvalidSetting {
            setting: setting.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Serde module for Duration with humantime format.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
