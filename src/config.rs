//! Runtime configuration
//!
//! Settings come from three layers with rising precedence: built-in
//! defaults, environment variables (optionally from a `.env` file), and
//! command-line flags.

use crate::cli::Cli;
use crate::defaults;
use crate::error::{AppError, Result};
use crate::logging::{LogLevel, Logger};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable overriding the catalog base URL
pub const ENV_BASE_URL: &str = "SPEEDPROBE_BASE_URL";
/// Environment variable overriding the round count
pub const ENV_COUNT: &str = "SPEEDPROBE_COUNT";
/// Environment variable overriding latency attempts per probe
pub const ENV_LATENCY_ATTEMPTS: &str = "SPEEDPROBE_LATENCY_ATTEMPTS";
/// Environment variable overriding the per-probe timeout, in seconds
pub const ENV_TIMEOUT: &str = "SPEEDPROBE_TIMEOUT";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the probe catalog service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of measurement rounds per run
    #[serde(default = "default_count")]
    pub count: u32,

    /// Latency attempts per probe and round
    #[serde(default = "default_latency_attempts")]
    pub latency_attempts: u32,

    /// Per-probe timeout in seconds; `None` defers to catalog-supplied values
    #[serde(default)]
    pub probe_timeout_secs: Option<f64>,

    /// Emit machine-readable JSON instead of the human-readable line
    #[serde(default)]
    pub json_output: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            count: default_count(),
            latency_attempts: default_latency_attempts(),
            probe_timeout_secs: None,
            json_output: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Build the effective configuration from environment and CLI flags
    pub fn load(cli: &Cli) -> Result<Self> {
        // A .env file is optional; absence is not an error
        dotenv::dotenv().ok();

        let mut config = Self::from_env()?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Read environment overrides on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Ok(count) = env::var(ENV_COUNT) {
            config.count = count.parse().map_err(|_| {
                AppError::config(format!("{} must be a positive integer", ENV_COUNT))
            })?;
        }
        if let Ok(attempts) = env::var(ENV_LATENCY_ATTEMPTS) {
            config.latency_attempts = attempts.parse().map_err(|_| {
                AppError::config(format!("{} must be a positive integer", ENV_LATENCY_ATTEMPTS))
            })?;
        }
        if let Ok(timeout) = env::var(ENV_TIMEOUT) {
            config.probe_timeout_secs = Some(timeout.parse().map_err(|_| {
                AppError::config(format!("{} must be a number of seconds", ENV_TIMEOUT))
            })?);
        }

        Ok(config)
    }

    /// Apply command-line flags; explicit flags win over the environment
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(count) = cli.count {
            self.count = count;
        }
        if let Some(attempts) = cli.latency_attempts {
            self.latency_attempts = attempts;
        }
        if let Some(timeout) = cli.timeout {
            self.probe_timeout_secs = Some(timeout);
        }
        if let Some(ref base_url) = cli.base_url {
            self.base_url = base_url.clone();
        }
        if cli.json {
            self.json_output = true;
        }
        if cli.no_color {
            self.enable_color = false;
        }
        if cli.verbose {
            self.verbose = true;
        }
        if cli.debug {
            self.debug = true;
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| AppError::config(format!("invalid base URL {:?}: {}", self.base_url, e)))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::config(format!(
                    "unsupported base URL scheme: {}",
                    scheme
                )))
            }
        }

        if self.count == 0 {
            return Err(AppError::config("round count must be at least 1"));
        }
        if self.latency_attempts == 0 {
            return Err(AppError::config("latency attempts must be at least 1"));
        }
        if let Some(secs) = self.probe_timeout_secs {
            if !(secs > 0.0) || Duration::try_from_secs_f64(secs).is_err() {
                return Err(AppError::config(
                    "probe timeout must be a positive number of seconds",
                ));
            }
        }

        Ok(())
    }

    /// Global per-probe timeout override, if one is configured
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Logger matching the configured verbosity
    pub fn logger(&self) -> Logger {
        let level = if self.debug {
            LogLevel::Debug
        } else if self.verbose {
            LogLevel::Info
        } else {
            LogLevel::Off
        };
        // When the result goes out as JSON, log lines do too, so stderr
        // stays machine-readable alongside stdout
        Logger::new(level).with_json(self.json_output)
    }
}

fn default_base_url() -> String {
    defaults::DEFAULT_BASE_URL.to_string()
}

fn default_count() -> u32 {
    defaults::DEFAULT_ROUND_COUNT
}

fn default_latency_attempts() -> u32 {
    defaults::DEFAULT_LATENCY_ATTEMPTS
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}
