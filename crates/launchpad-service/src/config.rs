use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Calls to the identity directory and the seat repository
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Cache validations
        self.cache.me.validate("cache.me")?;
        self.cache.active_users.validate("cache.active_users")?;
        self.cache.active_seats.validate("cache.active_seats")?;
        Ok(())
    }

    /// Timeout applied to upstream calls, `None` when disabled.
    pub fn upstream_timeout(&self) -> Option<Duration> {
        match self.upstream.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Per-call timeout in milliseconds; 0 disables it
    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_upstream_timeout_ms() -> u64 {
    10_000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

/// Settings of one cache store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Expected number of distinct keys
    pub num_counters: u64,
    /// Upper bound on the summed cost of admitted entries
    pub max_cost: u64,
    /// Entry time-to-live in seconds
    pub ttl_secs: u64,
}

impl StoreSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn validate(&self, section: &str) -> Result<(), String> {
        if self.num_counters == 0 {
            return Err(format!("{section}.num_counters must be > 0"));
        }
        if self.max_cost == 0 {
            return Err(format!("{section}.max_cost must be > 0"));
        }
        if self.ttl_secs == 0 {
            return Err(format!("{section}.ttl_secs must be > 0"));
        }
        Ok(())
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Per access-token profile cache
    #[serde(default = "default_me_settings")]
    pub me: StoreSettings,

    /// All-active-users singleton cache
    #[serde(default = "default_active_users_settings")]
    pub active_users: StoreSettings,

    /// Active-seats singleton cache
    #[serde(default = "default_active_seats_settings")]
    pub active_seats: StoreSettings,
}

fn default_me_settings() -> StoreSettings {
    // Profiles are at most one per member; cost 8 each
    StoreSettings {
        num_counters: 500,
        max_cost: 1 << 15,
        ttl_secs: 300,
    }
}

fn default_active_users_settings() -> StoreSettings {
    StoreSettings {
        num_counters: 10,
        max_cost: 64,
        ttl_secs: 3600, // 1 hour
    }
}

fn default_active_seats_settings() -> StoreSettings {
    StoreSettings {
        num_counters: 10,
        max_cost: 64,
        ttl_secs: 60,
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            me: default_me_settings(),
            active_users: default_active_users_settings(),
            active_seats: default_active_seats_settings(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        // Built-in defaults first so that partial sections still deserialize
        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| format!("config defaults error: {e}"))?;
        let mut builder = Config::builder().add_source(defaults);
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from("launchpad.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., LAUNCHPAD__CACHE__ME__TTL_SECS=60
        builder = builder.add_source(
            Environment::with_prefix("LAUNCHPAD")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
