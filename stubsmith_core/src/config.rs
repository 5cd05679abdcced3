use crate::error::{Result, StubsmithError};
use crate::stubgen::config::StubgenConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{debug, error, info, trace, warn};

pub const CONFIG_FILE_NAME: &str = "stubsmith.toml";

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")
        .expect("Invalid regex for environment variable substitution")
});

/// Where the object tree to generate stubs for comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntrospectionSource {
    /// A JSON introspection dump
    #[default]
    Dump,
    /// A live module imported through the embedded interpreter
    Python,
}

/// General configuration (the `[general]` section)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub source: IntrospectionSource,

    /// Path of the dump read when `source = "dump"`
    #[serde(default)]
    pub dump_path: Option<String>,

    /// Module imported when `source = "python"`; defaults to the root module
    #[serde(default)]
    pub python_module: Option<String>,

    /// Function of the root module called with the variant name before
    /// walking (e.g. "set_variant")
    #[serde(default)]
    pub activate_with: Option<String>,
}

/// Output configuration (the `[output]` section)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// File extension of generated stubs, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_output_path() -> String {
    "./stubs".to_string()
}

fn default_extension() -> String {
    "pyi".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            extension: default_extension(),
        }
    }
}

/// Root configuration loaded from `stubsmith.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StubsmithConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    pub stubgen: StubgenConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl StubsmithConfig {
    /// Load configuration by searching for `stubsmith.toml` in the current
    /// directory and its ancestors.
    pub fn new() -> Result<StubsmithConfig> {
        info!("Loading stubsmith configuration");
        dotenv::dotenv().ok();
        debug!("Environment variables loaded from .env if present");

        let config_path = Self::find_config_file_from(&env::current_dir()?)?;
        info!("Found configuration file at: {:?}", config_path);

        Self::from_path(&config_path)
    }

    /// Load configuration from an explicit file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<StubsmithConfig> {
        let path = path.as_ref();
        if !path.is_file() {
            error!("Configuration file {:?} does not exist", path);
            return Err(StubsmithError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read configuration file: {}", e);
            StubsmithError::from(e)
        })?;
        debug!("Configuration file size: {} bytes", contents.len());

        Self::from_toml_str(&contents)
    }

    /// Parse configuration text and resolve environment references.
    pub fn from_toml_str(contents: &str) -> Result<StubsmithConfig> {
        let mut config: StubsmithConfig = toml::from_str(contents).map_err(|e| {
            error!("Failed to parse TOML configuration: {}", e);
            StubsmithError::config(e.to_string())
        })?;

        debug!("Substituting environment variables in configuration");
        config.general.dump_path = Self::substitute_optional(config.general.dump_path)?;
        config.general.python_module = Self::substitute_optional(config.general.python_module)?;
        config.stubgen.variant = Self::substitute_optional(config.stubgen.variant)?;
        config.output.output_path = Self::substitute_env_vars(&config.output.output_path)?;

        debug!(
            root_module = %config.stubgen.root_module,
            source = ?config.general.source,
            variant = ?config.stubgen.variant,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Searches for `stubsmith.toml` starting from `start` and traversing up
    /// to the root.
    pub fn find_config_file_from(start: &Path) -> Result<PathBuf> {
        debug!("Starting config file search from: {:?}", start);

        for path in start.ancestors() {
            let config_path = path.join(CONFIG_FILE_NAME);
            trace!("Checking for config at: {:?}", config_path);
            if config_path.exists() {
                return Ok(config_path);
            }
        }

        error!("Configuration file '{}' not found in any parent directory.", CONFIG_FILE_NAME);
        Err(StubsmithError::config(format!(
            "{} not found in current or any parent directory.",
            CONFIG_FILE_NAME
        )))
    }

    /// Python module to import for live introspection.
    pub fn python_module(&self) -> &str {
        self.general
            .python_module
            .as_deref()
            .unwrap_or(&self.stubgen.root_module)
    }

    fn substitute_optional(value: Option<String>) -> Result<Option<String>> {
        value.map(|v| Self::substitute_env_vars(&v)).transpose()
    }

    /// Substitute environment variables in config strings.
    /// Supports `${VAR_NAME}` and `${VAR_NAME:-default}`.
    pub fn substitute_env_vars(value: &str) -> Result<String> {
        trace!("Substituting environment variables in: {}", value);
        let mut result = value.to_string();

        for cap in ENV_VAR_RE.captures_iter(value) {
            let var_name = &cap[1];
            let default_value = cap.get(2).map(|m| m.as_str());

            let replacement = match env::var(var_name) {
                Ok(val) => {
                    debug!("Resolved environment variable: {}", var_name);
                    val
                }
                Err(_) => match default_value {
                    Some(default) => {
                        warn!(
                            "Environment variable {} not set, using default: {}",
                            var_name, default
                        );
                        default.to_string()
                    }
                    None => {
                        error!(
                            "Environment variable {} not set and no default provided",
                            var_name
                        );
                        return Err(StubsmithError::EnvVarNotSet(var_name.to_string()));
                    }
                },
            };

            result = result.replace(&cap[0], &replacement);
        }

        Ok(result)
    }
}
