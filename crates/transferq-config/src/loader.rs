//! Locating, loading and saving configuration files

use crate::builder::format_of;
use crate::{Config, ConfigBuilder, ConfigError, ConfigResult};
use config::FileFormat;
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TRANSFERQ";

const FILE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "toml"];

/// Entry points used by the binary
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the first config file found in a well-known location
    /// and the environment
    pub fn load_default() -> ConfigResult<Config> {
        let mut builder = ConfigBuilder::new();
        if let Some(path) = Self::find_config_file() {
            builder = builder.file(path);
        }
        builder.env(ENV_PREFIX).build()
    }

    /// Load defaults, `path` and the environment; `path` must exist
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let path = path.as_ref();
        if let Err(source) = std::fs::metadata(path) {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
        ConfigBuilder::new().file(path).env(ENV_PREFIX).build()
    }

    /// Write `config` to `path` in the format its extension implies
    pub fn save_to_file(config: &Config, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = match format_of(path) {
            FileFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| ConfigError::encode("TOML", e))?
            }
            FileFormat::Json => {
                serde_json::to_string_pretty(config).map_err(|e| ConfigError::encode("JSON", e))?
            }
            _ => serde_yaml::to_string(config).map_err(|e| ConfigError::encode("YAML", e))?,
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// First existing config file: the working directory wins over the
    /// user configuration directory
    pub fn find_config_file() -> Option<PathBuf> {
        let user_dir = user_config_dir().map(|dir| dir.join("transferq"));

        FILE_EXTENSIONS
            .iter()
            .map(|ext| PathBuf::from(format!("transferq.{ext}")))
            .chain(user_dir.into_iter().flat_map(|dir| {
                FILE_EXTENSIONS
                    .iter()
                    .map(move |ext| dir.join(format!("config.{ext}")))
            }))
            .find(|path| path.is_file())
    }
}

fn user_config_dir() -> Option<PathBuf> {
    let env_dir = |name: &str| std::env::var_os(name).map(PathBuf::from);

    if cfg!(target_os = "windows") {
        env_dir("APPDATA")
    } else if cfg!(target_os = "macos") {
        env_dir("HOME").map(|home| home.join("Library").join("Application Support"))
    } else {
        env_dir("XDG_CONFIG_HOME").or_else(|| env_dir("HOME").map(|home| home.join(".config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_every_format() {
        let temp_dir = TempDir::new().unwrap();
        let mut original = Config::default();
        original.store.path = Some(temp_dir.path().join("tasks.json"));
        original.logging.level = "info".to_string();

        for name in ["transferq.yaml", "transferq.toml", "transferq.json"] {
            let path = temp_dir.path().join(name);
            ConfigLoader::save_to_file(&original, &path).unwrap();

            let loaded = ConfigLoader::load_from_file(&path).unwrap();
            assert_eq!(loaded.store.path, original.store.path, "{name}");
            assert_eq!(loaded.logging.level, "info", "{name}");
        }
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = ConfigLoader::load_from_file("/no/such/transferq.yaml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let result = ConfigLoader::save_to_file(&Config::default(), "/no/such/dir/transferq.yaml");
        assert!(matches!(result, Err(ConfigError::Write { .. })));
    }
}
