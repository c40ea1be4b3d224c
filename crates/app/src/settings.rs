//! Handles settings for the application. Configuration is written in
//! `settings.toml`; every key has a default, so the file is optional.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CafeSettings {
    pub data_dir: String,
    pub initial_budget: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminSettings {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub cafe: CafeSettings,
    pub admin: AdminSettings,
    pub log: LogSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("cafe.data_dir", "./data")?
            .set_default("cafe.initial_budget", "10000.00")?
            .set_default("admin.username", "admin")?
            .set_default("admin.password", "admin123")?
            .set_default("log.level", "info")?
            .add_source(File::with_name("settings").required(false))
            .build()?;

        settings.try_deserialize()
    }
}
