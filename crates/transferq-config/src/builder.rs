//! Layered configuration loading
//!
//! Layers are merged in order: built-in defaults, then each file that
//! exists, then environment variables. Later layers win.

use crate::{Config, ConfigError, ConfigResult};
use config::{Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Separator between nested keys in environment variable names,
/// e.g. `TRANSFERQ_SCHEDULER__WAKE_INTERVAL`
pub const ENV_SEPARATOR: &str = "__";

/// Builds a [`Config`] from defaults, files and the environment
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
}

impl ConfigBuilder {
    /// Start from the built-in defaults only
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a YAML, TOML or JSON file on top; missing files are skipped
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    /// Layer `<PREFIX>_`-prefixed environment variables on top
    pub fn env(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Merge every layer and validate the result
    pub fn build(self) -> ConfigResult<Config> {
        let defaults = serde_yaml::to_string(&Config::default())
            .map_err(|e| ConfigError::encode("YAML", e))?;
        let mut layers =
            config::Config::builder().add_source(File::from_str(&defaults, FileFormat::Yaml));

        for path in self.files.into_iter().filter(|path| path.exists()) {
            let format = format_of(&path);
            layers = layers.add_source(File::from(path).format(format));
        }

        if let Some(prefix) = self.env_prefix {
            layers = layers.add_source(
                Environment::with_prefix(&prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        let config: Config = layers.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

/// File format implied by a path's extension; YAML when unknown
pub(crate) fn format_of(path: &Path) -> FileFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => FileFormat::Toml,
        Some("json") => FileFormat::Json,
        _ => FileFormat::Yaml,
    }
}
