//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::errors::{Result, TranslationError};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 7.0;

/// Section holding options shared by every engine
pub const DEFAULT_SECTION: &str = "default";

/// Environment prefix, e.g. `TRANSLATOR__GOOGLE__PROXY`
const ENV_PREFIX: &str = "TRANSLATOR";

/// Options for a single translation engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Request timeout in seconds, `0` disables it
    pub timeout: Option<f64>,
    /// Proxy URL used for both http and https
    pub proxy: Option<String>,
    /// Endpoint host override
    pub host: Option<String>,
    /// User-Agent override
    pub user_agent: Option<String>,
    /// Application id for services that sign requests
    pub app_id: Option<String>,
    /// Secret key for services that sign requests
    pub app_key: Option<String>,
}

impl TranslatorConfig {
    /// Build from a raw option map
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        for (key, value) in options {
            match key.as_str() {
                "timeout" => {
                    let secs = value.trim().parse::<f64>().map_err(|_| {
                        TranslationError::config(format!("timeout must be numeric, got {:?}", value))
                    })?;
                    config.timeout = Some(secs);
                }
                "proxy" => config.proxy = non_empty(value),
                "host" => config.host = non_empty(value),
                "user_agent" | "agent" => config.user_agent = non_empty(value),
                "app_id" | "apikey" => config.app_id = non_empty(value),
                "app_key" | "secret" => config.app_key = non_empty(value),
                other => warn!("Ignoring unknown option: {}", other),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Effective timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        let secs = self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if secs > 0.0 {
            Duration::try_from_secs_f64(secs).ok()
        } else {
            None
        }
    }

    /// Overlay `other` on top of `self`; fields set in `other` win
    pub fn merge(&self, other: &TranslatorConfig) -> TranslatorConfig {
        TranslatorConfig {
            timeout: other.timeout.or(self.timeout),
            proxy: other.proxy.clone().or_else(|| self.proxy.clone()),
            host: other.host.clone().or_else(|| self.host.clone()),
            user_agent: other.user_agent.clone().or_else(|| self.user_agent.clone()),
            app_id: other.app_id.clone().or_else(|| self.app_id.clone()),
            app_key: other.app_key.clone().or_else(|| self.app_key.clone()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout {
            if Duration::try_from_secs_f64(timeout).is_err() {
                return Err(TranslationError::config(format!(
                    "timeout must be a non-negative number of seconds, got {}",
                    timeout
                )));
            }
        }

        if let Some(proxy) = &self.proxy {
            if !proxy.contains("://") {
                return Err(TranslationError::config(format!(
                    "proxy must be a URL, got {:?}",
                    proxy
                )));
            }
        }

        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Whole configuration file: a `default` section plus one section per engine
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    sections: HashMap<String, TranslatorConfig>,
}

impl AppConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("translator")
                .join("config.ini")
        })
    }

    /// Load from the given file (or the default location) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Self::from_settings(settings)
    }

    /// Load from a file only, ignoring the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(true))
            .build()?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> Result<Self> {
        let sections: HashMap<String, TranslatorConfig> = settings.try_deserialize()?;
        for (name, section) in &sections {
            section
                .validate()
                .map_err(|e| TranslationError::config(format!("[{}] {}", name, e)))?;
        }
        debug!("Loaded {} configuration sections", sections.len());
        Ok(Self { sections })
    }

    /// Effective options for an engine: its section overlaid on `default`
    pub fn for_engine(&self, engine: &str) -> TranslatorConfig {
        let base = self
            .sections
            .get(DEFAULT_SECTION)
            .cloned()
            .unwrap_or_default();

        match self.sections.get(engine) {
            Some(section) => base.merge(section),
            None => base,
        }
    }
}
