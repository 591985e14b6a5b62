//! Configuration management for genxml tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (genxml.toml)
//! - Environment variables (GENXML__*)
//!
//! ## Example config file (genxml.toml):
//! ```toml
//! [writer]
//! indent = 2
//! declaration = true
//!
//! [validation]
//! fail_on_errors = true
//! lint_duplicates = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::tree::WriteOptions;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenxmlConfig {
    /// Output formatting
    #[serde(default)]
    pub writer: WriterConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Output formatting when saving documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Spaces per nesting level
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Write the `<?xml ...?>` declaration
    #[serde(default = "default_true")]
    pub declaration: bool,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Exit non-zero when any parse error was collected
    #[serde(default = "default_true")]
    pub fail_on_errors: bool,

    /// Report duplicate names
    #[serde(default = "default_true")]
    pub lint_duplicates: bool,
}

fn default_indent() -> usize {
    WriteOptions::default().indent
}

fn default_true() -> bool {
    true
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            declaration: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fail_on_errors: true,
            lint_duplicates: true,
        }
    }
}

impl From<&WriterConfig> for WriteOptions {
    fn from(config: &WriterConfig) -> Self {
        Self {
            indent: config.indent,
            declaration: config.declaration,
        }
    }
}

impl GenxmlConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["genxml.toml", ".genxml.toml", "config/genxml.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "genxml", "genxml") {
            let xdg_config = config_dir.config_dir().join("genxml.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // GENXML__WRITER__INDENT=2
        builder = builder.add_source(
            Environment::with_prefix("GENXML")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
    }

    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions::from(&self.writer)
    }
}
