//! Configuration file management for nocmatch
//!
//! This module handles reading and writing configuration values to ~/.nocmatch/config.toml.
//! Values can be overridden by environment variables and command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::env::{apis as env_apis, system as env_system};
use crate::error::NocMatchError;

/// Configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub builder: BuilderSettings,
    #[serde(default)]
    pub smoke: SmokeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

/// Defaults for `nocmatch build`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BuilderSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Defaults for `nocmatch smoke`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SmokeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Keys accepted by `get`, `set` and `unset`, in listing order
pub const CONFIG_KEYS: &[&str] = &[
    "api.openai-api-key",
    "builder.venv",
    "builder.program",
    "builder.args",
    "builder.workdir",
    "builder.timeout-secs",
    "smoke.base-url",
    "smoke.title",
    "smoke.query",
    "smoke.k",
    "smoke.timeout-secs",
];

impl Config {
    /// Get the config file path (NOCMATCH_CONFIG or ~/.nocmatch/config.toml)
    pub fn get_config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(env_system::CONFIG) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let home_dir = dirs::home_dir().context("Could not find home directory")?;
        Ok(home_dir.join(".nocmatch").join("config.toml"))
    }

    /// Load configuration from the default location
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        // The file may hold an API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(config_path, permissions).with_context(|| {
                format!(
                    "Failed to set permissions on config file: {}",
                    config_path.display()
                )
            })?;
        }

        Ok(())
    }

    /// Get a config value by key
    pub fn get(&self, key: &str) -> Option<String> {
        match normalize_key(key).as_str() {
            "api.openai_api_key" | "openai_api_key" => self.api.openai_api_key.clone(),
            "builder.venv" => self.builder.venv.clone(),
            "builder.program" => self.builder.program.clone(),
            "builder.args" => self.builder.args.as_deref().map(render_args),
            "builder.workdir" => self.builder.workdir.clone(),
            "builder.timeout_secs" => self.builder.timeout_secs.map(|v| v.to_string()),
            "smoke.base_url" => self.smoke.base_url.clone(),
            "smoke.title" => self.smoke.title.clone(),
            "smoke.query" => self.smoke.query.clone(),
            "smoke.k" => self.smoke.k.map(|v| v.to_string()),
            "smoke.timeout_secs" => self.smoke.timeout_secs.map(|v| v.to_string()),
            _ => None,
        }
    }

    /// Set a config value by key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match normalize_key(key).as_str() {
            "api.openai_api_key" | "openai_api_key" => self.api.openai_api_key = Some(value),
            "builder.venv" => self.builder.venv = Some(value),
            "builder.program" => self.builder.program = Some(value),
            "builder.args" => self.builder.args = Some(parse_args(key, &value)?),
            "builder.workdir" => self.builder.workdir = Some(value),
            "builder.timeout_secs" => self.builder.timeout_secs = Some(parse_number(key, &value)?),
            "smoke.base_url" => self.smoke.base_url = Some(value),
            "smoke.title" => self.smoke.title = Some(value),
            "smoke.query" => self.smoke.query = Some(value),
            "smoke.k" => self.smoke.k = Some(parse_number(key, &value)?),
            "smoke.timeout_secs" => self.smoke.timeout_secs = Some(parse_number(key, &value)?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Unset (remove) a config value by key
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match normalize_key(key).as_str() {
            "api.openai_api_key" | "openai_api_key" => self.api.openai_api_key = None,
            "builder.venv" => self.builder.venv = None,
            "builder.program" => self.builder.program = None,
            "builder.args" => self.builder.args = None,
            "builder.workdir" => self.builder.workdir = None,
            "builder.timeout_secs" => self.builder.timeout_secs = None,
            "smoke.base_url" => self.smoke.base_url = None,
            "smoke.title" => self.smoke.title = None,
            "smoke.query" => self.smoke.query = None,
            "smoke.k" => self.smoke.k = None,
            "smoke.timeout_secs" => self.smoke.timeout_secs = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Get all config values as key-value pairs
    pub fn list(&self) -> Vec<(String, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| {
                self.get(key).map(|value| {
                    let shown = if *key == "api.openai-api-key" {
                        mask_api_key(&value)
                    } else {
                        value
                    };
                    (key.to_string(), shown)
                })
            })
            .collect()
    }
}

/// Resolve the credential forwarded to the builder.
///
/// A set environment variable wins and is forwarded verbatim (even when empty),
/// then the config file, then the empty string.
pub fn resolve_openai_api_key(env_value: Option<String>, config: &Config) -> String {
    env_value
        .or_else(|| config.api.openai_api_key.clone())
        .unwrap_or_default()
}

/// Read `OPENAI_API_KEY` from the process environment and resolve it
pub fn get_openai_api_key(config: &Config) -> String {
    resolve_openai_api_key(std::env::var(env_apis::OPENAI_API_KEY).ok(), config)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

fn unknown_key(key: &str) -> anyhow::Error {
    NocMatchError::invalid_config(format!(
        "Unknown config key: {key} (known keys: {})",
        CONFIG_KEYS.join(", ")
    ))
    .into()
}

/// Args given as a TOML array keep their spacing; anything else splits on whitespace
fn parse_args(key: &str, value: &str) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct ArgsValue {
        args: Vec<String>,
    }

    if !value.trim_start().starts_with('[') {
        return Ok(value.split_whitespace().map(str::to_string).collect());
    }

    toml::from_str::<ArgsValue>(&format!("args = {value}"))
        .map(|parsed| parsed.args)
        .map_err(|e| {
            NocMatchError::invalid_config(format!("{key} expects an array of strings: {e}")).into()
        })
}

/// Inverse of [`parse_args`]
fn render_args(args: &[String]) -> String {
    let plain = args
        .iter()
        .all(|arg| !arg.is_empty() && !arg.starts_with('[') && !arg.contains(char::is_whitespace));
    if plain {
        return args.join(" ");
    }

    toml::Value::Array(args.iter().cloned().map(toml::Value::String).collect()).to_string()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        NocMatchError::invalid_config(format!("{key} expects a non-negative integer, got '{value}'"))
            .into()
    })
}

/// Mask API key for display (show first 4 and last 4 characters)
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
