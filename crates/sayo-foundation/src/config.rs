//! Layered settings loading: a TOML file overridden by `SAYO_*` environment
//! variables. The concrete settings structs live with the crates that own
//! them; the app crate composes them and deserializes through here.

use crate::error::AppError;
use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;

pub const DEFAULT_SETTINGS_FILE: &str = "sayo.toml";

/// Loads settings from `path` (or `sayo.toml` next to the binary, which may
/// be absent) and applies `SAYO_*` environment overrides. Nested keys use a
/// double underscore, e.g. `SAYO_ENDPOINT__SILENCE_THRESHOLD=0.05`.
pub fn load_settings<T: DeserializeOwned>(path: Option<&str>) -> Result<T, AppError> {
    let file_source = match path {
        Some(p) => File::new(p, FileFormat::Toml).required(true),
        None => File::new(DEFAULT_SETTINGS_FILE, FileFormat::Toml).required(false),
    };

    let settings = Config::builder()
        .add_source(file_source)
        .add_source(Environment::with_prefix("SAYO").separator("__"))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    tracing::debug!(
        source = path.unwrap_or(DEFAULT_SETTINGS_FILE),
        "settings assembled from file and environment"
    );

    settings
        .try_deserialize()
        .map_err(|e| AppError::Config(e.to_string()))
}
