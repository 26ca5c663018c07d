// src/config.rs
// =============================================================================
// Site configuration: where content, assets and output live, plus the knobs
// of the export engine.
//
// Sources, lowest priority first:
// 1. Built-in defaults (SiteConfig::default)
// 2. A TOML file: --config <file>, or ./static-export.toml if it exists
// 3. Command-line flags (applied by main.rs on top of the loaded config)
//
// Every field is optional in the file, so a config can be as small as:
//
//   output_dir = "public"
//   on_fetch_error = "skip"
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "static-export.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What the driver does when a page cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run at the first failed page
    #[default]
    Abort,
    /// Log the failure, skip that page and keep draining the worklist
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Folder of `YYYY-MM-DD-slug.md` posts rendered by the blog server
    pub content_dir: PathBuf,
    /// Static files copied verbatim into the export (and served live)
    pub assets_dir: PathBuf,
    /// Export destination; wiped at the start of every run
    pub output_dir: PathBuf,
    /// Address the `serve` command listens on
    pub bind: String,
    /// Upper bound on discovered URLs before a run is declared non-converging
    pub max_urls: usize,
    pub on_fetch_error: FailurePolicy,
    pub request_timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("_posts"),
            assets_dir: PathBuf::from("wwwroot"),
            output_dir: PathBuf::from("docs"),
            bind: "127.0.0.1:5000".to_string(),
            max_urls: 10_000,
            on_fetch_error: FailurePolicy::Abort,
            request_timeout_secs: 30,
        }
    }
}

impl SiteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_urls == 0 {
            return Err(ConfigError::Invalid("max_urls must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// Loads the configuration
//
// Parameters:
//   explicit: path given with --config (must exist when given)
//
// Returns: the parsed config, or defaults when no file is found
pub fn load(explicit: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(SiteConfig::default());
            }
            fallback
        }
    };

    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = parse(&data).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    config.validate()?;

    tracing::info!("loaded config from {}", path.display());
    Ok(config)
}

fn parse(data: &str) -> Result<SiteConfig, toml::de::Error> {
    toml::from_str(data)
}
