use std::path::{Path, PathBuf};

use super::{Config, ConfigError, parse_config, parse_config_json};

/// Trait for loading and merging configuration files.
pub trait ConfigLoader {
    fn load(&self, cwd: &Path) -> Result<Config, ConfigError>;
}

/// Default implementation that reads from the filesystem.
pub struct DefaultConfigLoader {
    global_config_path: Option<PathBuf>,
}

impl Default for DefaultConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultConfigLoader {
    pub fn new() -> Self {
        let global_config_path = std::env::var("HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .map(|h| {
                PathBuf::from(h)
                    .join(".config")
                    .join("shotlint")
                    .join("shotlint.yml")
            });
        Self { global_config_path }
    }

    /// Create a loader with an explicit global config path (for testing).
    pub fn with_global_path(path: PathBuf) -> Self {
        Self {
            global_config_path: Some(path),
        }
    }

    /// Determine which local config file to use.
    /// `shotlint.yml` is preferred; `shotlint.yaml` is a fallback.
    fn local_config_path(cwd: &Path) -> Option<PathBuf> {
        let yml = cwd.join("shotlint.yml");
        if yml.exists() {
            return Some(yml);
        }
        let yaml = cwd.join("shotlint.yaml");
        if yaml.exists() {
            return Some(yaml);
        }
        None
    }
}

/// Read and parse a single config file. Files ending in `.json` are read as
/// JSON, everything else as YAML.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "reading config");
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        parse_config_json(&text)
    } else {
        parse_config(&text)
    }
}

/// Load an explicitly named config file, bypassing discovery.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config_file(path)?;
    config.validate()?;
    Ok(config)
}

impl ConfigLoader for DefaultConfigLoader {
    fn load(&self, cwd: &Path) -> Result<Config, ConfigError> {
        let global = self
            .global_config_path
            .as_ref()
            .filter(|p| p.exists())
            .map(|p| read_config_file(p))
            .transpose()?;

        let local = Self::local_config_path(cwd)
            .map(|p| read_config_file(&p))
            .transpose()?;

        let config = global.unwrap_or_default().merge(local.unwrap_or_default());

        config.validate()?;
        Ok(config)
    }
}
