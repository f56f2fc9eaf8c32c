//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.wayfinder/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::route::Route;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WayfinderConfig {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigationConfig {
    pub default_path: Option<String>,
    pub active_class: Option<String>,
    pub animation_ms: Option<u64>,
    pub search_input: Option<String>,
    pub list_bar: Option<String>,
    pub app_name: Option<String>,
    pub notify_unload: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListConfig {
    pub default_column: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DemoConfig {
    pub latency_ms: Option<u64>,
    pub data_file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PATH: &str = "/orders";
pub const DEFAULT_ACTIVE_CLASS: &str = "active";
pub const DEFAULT_ANIMATION_MS: u64 = 250;
pub const DEFAULT_SEARCH_INPUT: &str = "searchInput";
pub const DEFAULT_LIST_BAR: &str = "‹ page {} of {} ›";
pub const DEFAULT_APP_NAME: &str = "Wayfinder";
pub const DEFAULT_SORT_COLUMN: &str = "id";
pub const DEFAULT_LATENCY_MS: u64 = 120;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Everything the navigator is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Used when the first-load URL is `/` or invalid.
    pub default_route: Route,
    /// Class toggled on the sidebar element of the active main module.
    /// `None` disables marker toggling.
    pub active_class: Option<String>,
    /// Duration of each of the dismiss and welcome animations.
    pub animation_ms: u64,
    /// Search input element id. `None` disables search integration.
    pub search_input: Option<String>,
    /// Pagination template with `{}` placeholders for page and total.
    pub list_bar: Option<String>,
    pub app_name: String,
    pub default_column: String,
    /// Emit `Notice::Unload` before the page unloads.
    pub notify_unload: bool,
}

impl NavigatorConfig {
    /// Minimal config: no marker, no search, no pagination bar.
    pub fn new(default_route: Route) -> Self {
        Self {
            default_route,
            active_class: None,
            animation_ms: DEFAULT_ANIMATION_MS,
            search_input: None,
            list_bar: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            default_column: DEFAULT_SORT_COLUMN.to_string(),
            notify_unload: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub navigator: NavigatorConfig,
    pub latency_ms: u64,
    pub data_file: Option<PathBuf>,
}

/// Values given on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub default_path: Option<String>,
    pub animation_ms: Option<u64>,
    pub latency_ms: Option<u64>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.wayfinder`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wayfinder"))
}

/// Returns the path to `~/.wayfinder/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    home_dir().map(|d| d.join("config.toml"))
}

/// Load config from `path`, or `~/.wayfinder/config.toml` when `None`.
///
/// A missing default file is generated commented-out and yields
/// `WayfinderConfig::default()`. A malformed file yields `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<WayfinderConfig, ConfigError> {
    let path = match path.map(Path::to_path_buf).or_else(config_path) {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(WayfinderConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(WayfinderConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: WayfinderConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Wayfinder Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [navigation]
# default_path = "/orders"            # Or set WAYFINDER_DEFAULT_PATH
# active_class = "active"             # Sidebar marker; remove to disable
# animation_ms = 250                  # Or set WAYFINDER_ANIMATION_MS
# search_input = "searchInput"
# list_bar = "‹ page {} of {} ›"
# app_name = "Wayfinder"
# notify_unload = true

# [list]
# default_column = "id"

# [demo]
# latency_ms = 120                    # Simulated backend latency
# data_file = "records.json"          # Relative to ~/.wayfinder/
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &WayfinderConfig, cli: &CliOverrides) -> ResolvedConfig {
    let nav = &config.navigation;

    // Default path: CLI → env → config → default
    let default_path = cli
        .default_path
        .clone()
        .or_else(|| std::env::var("WAYFINDER_DEFAULT_PATH").ok())
        .or_else(|| nav.default_path.clone())
        .unwrap_or_else(|| DEFAULT_PATH.to_string());
    let mut default_route = Route::parse(&default_path).without_empty();
    if default_route.is_empty() {
        warn!("Empty default path '{default_path}', falling back to {DEFAULT_PATH}");
        default_route = Route::parse(DEFAULT_PATH);
    }

    // Animation: CLI → env → config → default
    let animation_ms = cli
        .animation_ms
        .or_else(|| env_u64("WAYFINDER_ANIMATION_MS"))
        .or(nav.animation_ms)
        .unwrap_or(DEFAULT_ANIMATION_MS);

    let latency_ms = cli
        .latency_ms
        .or_else(|| env_u64("WAYFINDER_LATENCY_MS"))
        .or(config.demo.latency_ms)
        .unwrap_or(DEFAULT_LATENCY_MS);

    let data_file = config
        .demo
        .data_file
        .as_ref()
        .and_then(|file| home_dir().map(|d| d.join(file)));

    ResolvedConfig {
        navigator: NavigatorConfig {
            default_route,
            active_class: Some(
                nav.active_class
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ACTIVE_CLASS.to_string()),
            )
            .filter(|c| !c.is_empty()),
            animation_ms,
            search_input: Some(
                nav.search_input
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SEARCH_INPUT.to_string()),
            )
            .filter(|s| !s.is_empty()),
            list_bar: Some(
                nav.list_bar
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LIST_BAR.to_string()),
            )
            .filter(|s| !s.is_empty()),
            app_name: nav
                .app_name
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            default_column: config
                .list
                .default_column
                .clone()
                .unwrap_or_else(|| DEFAULT_SORT_COLUMN.to_string()),
            notify_unload: nav.notify_unload.unwrap_or(true),
        },
        latency_ms,
        data_file,
    }
}

fn env_u64(key: &str) -> Option<u64> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring {key}={value}: {e}");
            None
        }
    }
}
