//! Persistent configuration
//!
//! A single `config.json` in the app data directory holds:
//! - Company root paths and their cached directory trees
//! - Application settings (script locations, company profiles)

mod settings;
mod store;

pub use settings::{CompanyProfile, Settings, DEFAULT_CONVERSION_TIMEOUT_SECS};
pub use store::{AppConfig, ConfigStore, CONFIG_FILE_NAME};
