use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::Thresholds;
use crate::services::matrix_loader::{CHILD_ANCHOR, GLOBAL_ANCHOR, TOTAL_MARKER};
use crate::services::search_url::{SearchDefaults, DEFAULT_SEARCH_BASE_URL};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

/// Where the affinity tables and character index live
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_global_matrix_path")]
    pub global_matrix_path: PathBuf,
    #[serde(default = "default_child_matrix_dir")]
    pub child_matrix_dir: PathBuf,
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
    #[serde(default = "default_global_anchor")]
    pub global_anchor: String,
    #[serde(default = "default_child_anchor")]
    pub child_anchor: String,
    #[serde(default = "default_total_marker")]
    pub total_marker: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            global_matrix_path: default_global_matrix_path(),
            child_matrix_dir: default_child_matrix_dir(),
            registry_path: default_registry_path(),
            global_anchor: default_global_anchor(),
            child_anchor: default_child_anchor(),
            total_marker: default_total_marker(),
        }
    }
}

fn default_global_matrix_path() -> PathBuf { PathBuf::from("data/2gen.csv") }
fn default_child_matrix_dir() -> PathBuf { PathBuf::from("data/3gen") }
fn default_registry_path() -> PathBuf { PathBuf::from("data/uma_index.csv") }
fn default_global_anchor() -> String { GLOBAL_ANCHOR.to_string() }
fn default_child_anchor() -> String { CHILD_ANCHOR.to_string() }
fn default_total_marker() -> String { TOTAL_MARKER.to_string() }

/// Default thresholds used when a request leaves them out
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    #[serde(default = "default_x_pct")]
    pub x_pct: f64,
    #[serde(default = "default_y_pct")]
    pub y_pct: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            x_pct: default_x_pct(),
            y_pct: default_y_pct(),
        }
    }
}

impl FilterSettings {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.x_pct, self.y_pct)
    }
}

fn default_x_pct() -> f64 { 10.0 }
fn default_y_pct() -> f64 { 20.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub g1_win_count: u32,
    #[serde(default = "default_search_count")]
    pub search_count: u32,
    #[serde(default)]
    pub white_total: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            g1_win_count: 0,
            search_count: default_search_count(),
            white_total: 0,
        }
    }
}

impl SearchSettings {
    pub fn defaults(&self) -> SearchDefaults {
        SearchDefaults {
            g1_win_count: self.g1_win_count,
            search_count: self.search_count,
            white_total: self.white_total,
        }
    }
}

fn default_search_base_url() -> String { DEFAULT_SEARCH_BASE_URL.to_string() }
fn default_search_count() -> u32 { 100 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub child_ttl_secs: Option<u64>,
    pub child_capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with BREED__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., BREED__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("BREED")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
