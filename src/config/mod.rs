// SPDX-License-Identifier: MPL-2.0
//! This module handles the localization settings, loaded from and saved to a
//! `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[general]` - Explicit language override
//! - `[locales]` - Supported locales, display names, locale cookie and
//!   catalog location
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `BUNKER_I18N_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use bunker_i18n::config::{self, Config};
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! // Modify a setting
//! config.general.language = Some("zh-CN".to_string());
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::Result;
use crate::i18n::locale::SupportedLocales;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "settings.toml";

/// Application name used for directory naming.
const APP_NAME: &str = "Bunker";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "BUNKER_I18N_CONFIG_DIR";

// =============================================================================
// Section Structs
// =============================================================================

/// General settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Language that overrides every detected signal (e.g., "zh-CN").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Locale negotiation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalesConfig {
    /// Supported locale tags; the first is the default locale.
    #[serde(default = "default_supported")]
    pub supported: Vec<String>,

    /// Display name per locale tag.
    #[serde(default = "default_names")]
    pub names: BTreeMap<String, String>,

    /// Cookie holding the user's explicit locale choice.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Directory of `<locale>.toml` catalogs replacing the built-in ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<PathBuf>,

    /// Consult the operating system locale after every request signal.
    #[serde(default)]
    pub use_system_locale: bool,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            supported: default_supported(),
            names: default_names(),
            cookie_name: default_cookie_name(),
            catalog_dir: None,
            use_system_locale: false,
        }
    }
}

// =============================================================================
// Main Config Struct
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub locales: LocalesConfig,
}

impl Config {
    /// Validated supported-locale list.
    pub fn supported_locales(&self) -> Result<SupportedLocales> {
        SupportedLocales::new(self.locales.supported.iter().cloned())
    }
}

fn default_supported() -> Vec<String> {
    DEFAULT_SUPPORTED_LOCALES
        .iter()
        .map(|tag| tag.to_string())
        .collect()
}

fn default_names() -> BTreeMap<String, String> {
    DEFAULT_LOCALE_NAMES
        .iter()
        .map(|(tag, name)| (tag.to_string(), name.to_string()))
        .collect()
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

// =============================================================================
// Logging
// =============================================================================

/// Log filter built from a `RUST_LOG` value.
///
/// `DEFAULT_LOG_DIRECTIVE` applies only when the value is absent, blank or
/// unparseable; otherwise the value is used as given.
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

// =============================================================================
// Load / Save
// =============================================================================

fn get_config_dir_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(dir) = base_dir {
        return Some(dir);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    get_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from the default location.
///
/// Never fails: a missing file yields the defaults, an unreadable or invalid
/// file yields the defaults together with a warning message.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "using default configuration");
                    return (
                        Config::default(),
                        Some(format!("failed to load {}: {}", path.display(), err)),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
