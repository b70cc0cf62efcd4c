use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::SessionDefaults;
use crate::models::{Coordinate, DistanceUnit, MapView};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSettings {
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self { path: default_dataset_path() }
    }
}

fn default_dataset_path() -> String { "data/florists.json".to_string() }

/// Which geocoder backs location search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderProvider {
    #[default]
    Nominatim,
    Gazetteer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    #[serde(default)]
    pub provider: GeocoderProvider,
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,
    /// Place name to `[lat, lng]`, used by the gazetteer provider
    #[serde(default)]
    pub places: HashMap<String, [f64; 2]>,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            provider: GeocoderProvider::default(),
            endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoder_timeout(),
            places: HashMap::new(),
        }
    }
}

impl GeocoderSettings {
    pub fn gazetteer_entries(&self) -> impl Iterator<Item = (&str, Coordinate)> + '_ {
        self.places
            .iter()
            .map(|(name, [lat, lng])| (name.as_str(), Coordinate::new(*lat, *lng)))
    }
}

fn default_geocoder_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { format!("florist-finder/{}", env!("CARGO_PKG_VERSION")) }
fn default_geocoder_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_center_lat")]
    pub default_lat: f64,
    #[serde(default = "default_center_lng")]
    pub default_lng: f64,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default = "default_search_zoom")]
    pub search_zoom: u8,
    #[serde(default)]
    pub distance_unit: DistanceUnit,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_lat: default_center_lat(),
            default_lng: default_center_lng(),
            default_zoom: default_zoom(),
            search_zoom: default_search_zoom(),
            distance_unit: DistanceUnit::default(),
        }
    }
}

impl SearchSettings {
    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            map: MapView {
                center: Coordinate::new(self.default_lat, self.default_lng),
                zoom: self.default_zoom,
            },
            search_zoom: self.search_zoom,
            unit: self.distance_unit,
        }
    }
}

fn default_center_lat() -> f64 { 51.505 }
fn default_center_lng() -> f64 { -0.09 }
fn default_zoom() -> u8 { 13 }
fn default_search_zoom() -> u8 { 14 }

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl SessionSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

fn default_max_sessions() -> u64 { 10_000 }
fn default_idle_timeout() -> u64 { 1800 }

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
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with FLORIST__)
    /// 5. DATASET_PATH / GEOCODER_ENDPOINT
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., FLORIST__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("FLORIST")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Short, unprefixed variables commonly set by deployment tooling
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(path) = env::var("DATASET_PATH") {
        builder = builder.set_override("dataset.path", path)?;
    }
    if let Ok(endpoint) = env::var("GEOCODER_ENDPOINT") {
        builder = builder.set_override("geocoder.endpoint", endpoint)?;
    }

    builder.build()
}
