//! Spatial configuration.
//!
//! [`SpatialConfig`] is built once at process start and handed to the
//! generators and the schema manager. Settings come from the `[postgis]`
//! section of `config/config.toml` layered with `LIFEGUARD_POSTGIS__*`
//! environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "config/config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpatialConfig {
    /// Schema searched by catalog queries for unqualified table names.
    /// `None` searches `current_schemas(false)`.
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_geometry_srid")]
    pub default_geometry_srid: i32,
    #[serde(default = "default_geography_srid")]
    pub default_geography_srid: i32,
    /// Access method used for spatial indexes
    #[serde(default = "default_spatial_index_method")]
    pub spatial_index_method: String,
    /// Only read by the migration CLI
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_geometry_srid() -> i32 {
    0
}

fn default_geography_srid() -> i32 {
    4326
}

fn default_spatial_index_method() -> String {
    "GIST".to_string()
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            schema: None,
            default_geometry_srid: default_geometry_srid(),
            default_geography_srid: default_geography_srid(),
            spatial_index_method: default_spatial_index_method(),
            database_url: None,
        }
    }
}

impl SpatialConfig {
    /// Load the configuration from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load the configuration from an explicit TOML file (optional) plus env vars.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("LIFEGUARD_POSTGIS").separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // A file that exists but cannot be parsed is reported, then ignored
                if path.exists() {
                    log::warn!(
                        "Failed to load {}, falling back to env. Error: {}",
                        path.display(),
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix("LIFEGUARD_POSTGIS").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        // Missing section means all defaults
        let config = match settings.get::<SpatialConfig>("postgis") {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => SpatialConfig::default(),
            Err(e) => {
                return Err(ConfigError::Message(format!(
                    "PostGIS configuration could not be loaded from file or environment: {}",
                    e
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce invalid DDL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, srid) in [
            ("default_geometry_srid", self.default_geometry_srid),
            ("default_geography_srid", self.default_geography_srid),
        ] {
            if !crate::spatial::is_valid_srid(srid) {
                return Err(ConfigError::Message(format!(
                    "{name} must be between -1 and {}, got {srid}",
                    crate::spatial::SRID_MAXIMUM
                )));
            }
        }
        if self.spatial_index_method.trim().is_empty()
            || !self
                .spatial_index_method
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Message(format!(
                "spatial_index_method must be a bare access method name, got {:?}",
                self.spatial_index_method
            )));
        }
        Ok(())
    }
}
