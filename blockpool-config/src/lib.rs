//! # Blockpool Configuration System
//!
//! Layered configuration for the pool allocator and its telemetry.
//!
//! ## Features
//! - **Layered Sources**: defaults, YAML files, then environment variables
//! - **Validation**: runtime validation of every loaded value
//! - **Environment Awareness**: optional per-environment override file

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod pool;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use pool::PoolConfig;
pub use telemetry::MetricsConfig;
pub use telemetry::TelemetryConfig;

/// Base configuration file, relative to the working directory.
pub const BASE_CONFIG_PATH: &str = "config/blockpool.yaml";

/// Prefix for environment overrides, e.g. `BLOCKPOOL_POOL__CAPACITY`.
pub const ENV_PREFIX: &str = "BLOCKPOOL_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct BlockpoolConfig {
    /// Pool allocator parameters.
    #[serde(default)]
    #[validate(nested)]
    pub pool: PoolConfig,

    /// Logging and metrics configuration.
    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl BlockpoolConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/blockpool.yaml`, skipped when missing
    /// 3. `config/<BLOCKPOOL_ENV>.yaml`, environment-specific overrides
    /// 4. `BLOCKPOOL_*` environment variables (`__` separates nested keys)
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(BlockpoolConfig::default()));

        if Path::new(BASE_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(BASE_CONFIG_PATH));
        }

        if let Ok(env) = std::env::var("BLOCKPOOL_ENV") {
            let env_file = format!("config/{}.yaml", env);
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file plus environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(BlockpoolConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "blockpool-config-{}-{}.yaml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn default_config_validates() {
        let config = BlockpoolConfig::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config.pool.capacity, 65536);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.metrics.enabled);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = write_config("partial", "pool:\n  capacity: 1024\n");
        let config = BlockpoolConfig::load_from_path(&path).unwrap();
        assert_eq!(config.pool.capacity, 1024);
        assert_eq!(config.telemetry, TelemetryConfig::default());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let path = write_config("zero", "pool:\n  capacity: 0\n");
        let err = BlockpoolConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("pool.capacity"), "{}", err);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let path = write_config("level", "telemetry:\n  log_level: loud\n");
        let err = BlockpoolConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("invalid_log_level"), "{}", err);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_reported() {
        let err = BlockpoolConfig::load_from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn environment_override() {
        std::env::set_var("BLOCKPOOL_POOL__ZERO_ON_FREE", "true");
        let config = BlockpoolConfig::load().unwrap();
        std::env::remove_var("BLOCKPOOL_POOL__ZERO_ON_FREE");
        assert!(config.pool.zero_on_free);
    }
}
