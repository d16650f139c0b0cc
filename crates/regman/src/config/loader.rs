/*
 *  Copyright 2025 Registry Regulations Team
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::validation::Validate;
use super::{ConfigError, PortalConfig};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "REGMAN_CONFIG";

// Matches ${VAR}, ${VAR:-default}, ${VAR:?error}
static ENV_VAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is a valid regex")
});

pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths
    pub fn new() -> Self {
        let mut search_paths = vec![PathBuf::from("./regman.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("regman").join("config.toml"));
        }

        search_paths.push(PathBuf::from("/etc/regman/config.toml"));

        Self { search_paths }
    }

    /// Create a config loader with custom search paths
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Load and validate configuration from the given file, `REGMAN_CONFIG`,
    /// or the first search path that exists.
    pub fn load_config(&self, config_file: Option<&Path>) -> Result<PortalConfig, ConfigError> {
        let config_path = self.locate(config_file).ok_or(ConfigError::ConfigNotFound)?;
        self.load_config_from_file(&config_path)
    }

    /// The file [`load_config`](Self::load_config) would read: the given
    /// file, `REGMAN_CONFIG`, or the first search path that exists.
    pub fn locate(&self, config_file: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_file {
            Some(path.to_path_buf())
        } else if let Ok(env_config) = env::var(CONFIG_ENV_VAR) {
            Some(PathBuf::from(env_config))
        } else {
            self.find_config_file()
        }
    }

    /// Like [`load_config`](Self::load_config), but falls back to defaults
    /// when no configuration file can be found.
    pub fn load_or_default(&self, config_file: Option<&Path>) -> Result<PortalConfig, ConfigError> {
        match self.load_config(config_file) {
            Err(ConfigError::ConfigNotFound) => {
                debug!("No configuration file found, using defaults");
                Ok(PortalConfig::default())
            }
            other => other,
        }
    }

    /// Load configuration from a specific file
    pub fn load_config_from_file(&self, path: &Path) -> Result<PortalConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") | None => self.parse(&content)?,
            Some(ext) => {
                return Err(ConfigError::UnsupportedFormat {
                    extension: ext.to_string(),
                })
            }
        };

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML content after environment substitution.
    pub fn parse(&self, content: &str) -> Result<PortalConfig, ConfigError> {
        let substituted = self.substitute_env_vars(content)?;
        let config: PortalConfig = toml::from_str(&substituted)?;
        config.validate()?;
        Ok(config)
    }

    /// Find the first existing configuration file in search paths
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .find(|path| path.is_file())
            .cloned()
    }

    fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_PATTERN.captures_iter(content) {
            let replacement = self.process_var_expression(&cap[1])?;
            result = result.replace(&cap[0], &replacement);
        }

        Ok(result)
    }

    fn process_var_expression(&self, expr: &str) -> Result<String, ConfigError> {
        if let Some((var_name, default_value)) = expr.split_once(":-") {
            Ok(env::var(var_name).unwrap_or_else(|_| default_value.to_string()))
        } else if let Some((var_name, error_msg)) = expr.split_once(":?") {
            env::var(var_name).map_err(|_| {
                ConfigError::EnvSubstitutionError(format!(
                    "Required environment variable '{}' is not set: {}",
                    var_name, error_msg
                ))
            })
        } else {
            env::var(expr).map_err(|_| {
                ConfigError::EnvSubstitutionError(format!(
                    "Required environment variable '{}' is not set",
                    expr
                ))
            })
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
