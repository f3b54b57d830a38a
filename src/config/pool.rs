//! Worker pool configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use super::parse::{env_or, parse_duration};
use super::ConfigError;

/// Default duty-cycle interval when POOL_INTERVAL is unset.
const DEFAULT_INTERVAL: &str = "30s";

/// Pool configuration loaded from environment.
///
/// All values are pre-validated at construction time.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Pool name used for thread names and log fields.
    pub name: String,
    /// Resolved worker count (never zero).
    worker_count: NonZeroUsize,
    /// Duty-cycle interval between phase toggles.
    pub interval: Duration,
}

impl PoolConfig {
    /// Load configuration from environment variables.
    ///
    /// * `POOL_WORKERS` - worker thread count (0 = use CPU count)
    /// * `POOL_INTERVAL` - duty-cycle interval ("200ms", "30s", "2m")
    /// * `POOL_NAME` - name for thread names and logging
    pub fn from_env() -> Result<Self, ConfigError> {
        let worker_count = Self::parse_worker_count()?;
        let interval = Self::parse_interval()?;

        Ok(Self {
            name: env_or("POOL_NAME", "tidepool"),
            worker_count,
            interval,
        })
    }

    /// Build a configuration from explicit values.
    pub fn new(worker_count: NonZeroUsize, interval: Duration) -> Self {
        Self {
            name: "tidepool".to_string(),
            worker_count,
            interval,
        }
    }

    /// Set the pool name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get worker count (pre-validated, never zero).
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count.get()
    }

    fn parse_worker_count() -> Result<NonZeroUsize, ConfigError> {
        let raw = env_or("POOL_WORKERS", "0");
        let workers: usize = raw.parse().map_err(|e| ConfigError::Parse {
            key: "POOL_WORKERS".into(),
            value: raw,
            error: format!("{e}"),
        })?;

        // Resolve 0 to CPU count
        let count = if workers == 0 {
            num_cpus::get()
        } else {
            workers
        };

        NonZeroUsize::new(count).ok_or_else(|| ConfigError::Invalid {
            key: "POOL_WORKERS".into(),
            message: "worker count cannot be zero".into(),
        })
    }

    fn parse_interval() -> Result<Duration, ConfigError> {
        let raw = env_or("POOL_INTERVAL", DEFAULT_INTERVAL);
        match parse_duration(&raw) {
            Ok(Some(interval)) if !interval.is_zero() => Ok(interval),
            Ok(_) => Err(ConfigError::Invalid {
                key: "POOL_INTERVAL".into(),
                message: "interval cannot be zero or disabled".into(),
            }),
            Err(error) => Err(ConfigError::Parse {
                key: "POOL_INTERVAL".into(),
                value: raw,
                error,
            }),
        }
    }
}
