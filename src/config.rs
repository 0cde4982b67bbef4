//! Application configuration module
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `SCHEMADOC_*` environment variables (a `.env` file is read
//! first if present). `SCHEMADOC_SERVER__PORT=8080` sets `server.port`.

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "schemadoc.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(127, 0, 0, 1),
            port: 3000,
        }
    }
}

/// Where the curated annotations and schema captures live
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub annotations_path: PathBuf,
    pub snapshots_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            annotations_path: PathBuf::from("data/annotations.json"),
            snapshots_dir: PathBuf::from("data/snapshots"),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Complete application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::from_sources(file)
    }

    fn from_sources(file: config::File<config::FileSourceFile, config::FileFormat>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host.to_string())?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "data.annotations_path",
                defaults.data.annotations_path.to_string_lossy().to_string(),
            )?
            .set_default(
                "data.snapshots_dir",
                defaults.data.snapshots_dir.to_string_lossy().to_string(),
            )?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SCHEMADOC")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port must not be 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_default_data_config() {
        let config = DataConfig::default();
        assert_eq!(config.annotations_path, PathBuf::from("data/annotations.json"));
        assert_eq!(config.snapshots_dir, PathBuf::from("data/snapshots"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("schemadoc-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[server]\nport = 8088\n\n[data]\nsnapshots_dir = \"/srv/captures\"\n\n[cors]\nallowed_origins = [\"http://docs.local\"]\n",
        )
        .unwrap();

        let settings = Settings::from_sources(config::File::from(path.as_path()).required(true)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.server.port, 8088);
        assert_eq!(settings.server.host, Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(settings.data.snapshots_dir, PathBuf::from("/srv/captures"));
        assert_eq!(settings.data.annotations_path, PathBuf::from("data/annotations.json"));
        assert_eq!(settings.cors.allowed_origins, vec!["http://docs.local".to_string()]);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let missing = Path::new("/nonexistent/schemadoc.toml");
        assert!(Settings::from_sources(config::File::from(missing).required(true)).is_err());
    }
}
