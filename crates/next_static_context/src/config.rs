use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "static-context.config.json";

/// Name of the export the client transform eliminates.
pub const EXPORT_NAME_GET_STATIC_CONTEXT: &str = "getStaticContext";

const DEFAULT_CONFIG: &str = r#"
{
    "mode": "client",
    "export_name": "getStaticContext",
    "minify": false
}
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load {path:?}: {message}")]
    Load { path: String, message: String },
    #[error("export_name must not be empty")]
    EmptyExportName,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Browser bundle: drop the static context export and everything only it used.
    Client,
    /// Server bundle: wrap `getStaticProps` so it receives the static context.
    Server,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Client => write!(f, "client"),
            Mode::Server => write!(f, "server"),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    pub mode: Mode,
    pub export_name: String,
    #[serde(default)]
    pub max_passes: Option<usize>,
    pub minify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Client,
            export_name: EXPORT_NAME_GET_STATIC_CONTEXT.to_string(),
            max_passes: None,
            minify: false,
        }
    }
}

impl Config {
    /// Layers `static-context.config.json` (if present under `root`) and then
    /// `cli_config`, an inline JSON object, over the built-in defaults.
    pub fn new(root: &Path, cli_config: Option<&str>) -> Result<Self> {
        let abs_config_file = root.join(CONFIG_FILE);
        let abs_config_file = abs_config_file.to_string_lossy().to_string();
        let load_error = |e: config::ConfigError| {
            anyhow!(ConfigError::Load {
                path: abs_config_file.clone(),
                message: e.to_string(),
            })
        };
        let mut builder = config::Config::builder()
            // default config
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Json,
            ))
            // user config
            .add_source(
                config::File::new(&abs_config_file, config::FileFormat::Json).required(false),
            );
        // cli config
        if let Some(cli_config) = cli_config {
            builder =
                builder.add_source(config::File::from_str(cli_config, config::FileFormat::Json));
        }
        let config = builder
            .build()
            .and_then(|c| c.try_deserialize::<Config>())
            .map_err(load_error)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.export_name.is_empty() {
            return Err(anyhow!(ConfigError::EmptyExportName));
        }
        Ok(())
    }
}
