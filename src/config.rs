//! Configuration management for the converter
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-to-openapi.toml)
//! - Environment variables (SCHEMA_TO_OPENAPI__*)
//!
//! ## Example config file (schema-to-openapi.toml):
//! ```toml
//! [convert]
//! tuple_items = "first"
//! enum_split = "partition"
//! cyclic_prefix = "cyclic_"
//! conditional_prefix = "if-"
//! keep_extensions = false
//! extra_keywords = []
//!
//! [output]
//! format = "pretty"
//! document = false
//! openapi = "3.0.3"
//! title = "Converted schemas"
//! version = "1.0.0"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Rewrite policies
    #[serde(default)]
    pub convert: ConvertConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// How a tuple-form `items` array is collapsed into one schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TupleItemsPolicy {
    /// Keep the first entry, drop the rest
    #[default]
    First,
    /// Merge the keys of all entries, earlier entries winning
    Merge,
}

/// How `enum` values are distributed over the branches of a type array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnumSplitPolicy {
    /// Each branch keeps only the values of its own type
    #[default]
    Partition,
    /// Each branch keeps every value
    Duplicate,
}

/// Rewrite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    #[serde(default)]
    pub tuple_items: TupleItemsPolicy,

    #[serde(default)]
    pub enum_split: EnumSplitPolicy,

    /// Name prefix of extracted cyclic components
    #[serde(default = "default_cyclic_prefix")]
    pub cyclic_prefix: String,

    /// Name prefix of hoisted `if` conditions
    #[serde(default = "default_conditional_prefix")]
    pub conditional_prefix: String,

    /// Keep `x-*` vendor extensions
    #[serde(default)]
    pub keep_extensions: bool,

    /// Keywords kept in addition to the OpenAPI whitelist
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Wrap the components in a minimal OpenAPI document
    #[serde(default)]
    pub document: bool,

    /// `openapi` version string of the wrapping document
    #[serde(default = "default_openapi_version")]
    pub openapi: String,

    /// `info.title` of the wrapping document
    #[serde(default = "default_title")]
    pub title: String,

    /// `info.version` of the wrapping document
    #[serde(default = "default_api_version")]
    pub version: String,
}

// Default value functions
fn default_cyclic_prefix() -> String {
    crate::extract::DEFAULT_CYCLIC_PREFIX.to_string()
}

fn default_conditional_prefix() -> String {
    crate::rules::conditional::DEFAULT_CONDITIONAL_PREFIX.to_string()
}

fn default_openapi_version() -> String {
    "3.0.3".to_string()
}

fn default_title() -> String {
    "Converted schemas".to_string()
}

fn default_api_version() -> String {
    "1.0.0".to_string()
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            tuple_items: TupleItemsPolicy::First,
            enum_split: EnumSplitPolicy::Partition,
            cyclic_prefix: default_cyclic_prefix(),
            conditional_prefix: default_conditional_prefix(),
            keep_extensions: false,
            extra_keywords: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            document: false,
            openapi: default_openapi_version(),
            title: default_title(),
            version: default_api_version(),
        }
    }
}

impl SchemaConfig {
    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-to-openapi.toml",
            ".schema-to-openapi.toml",
            "config/schema-to-openapi.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) =
            directories::ProjectDirs::from("dev", "schema-to-openapi", "schema-to-openapi")
        {
            let xdg_config = config_dir.config_dir().join("config.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_TO_OPENAPI__CONVERT__TUPLE_ITEMS=merge
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_TO_OPENAPI")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        std::fs::write(path, self.to_toml()?)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
