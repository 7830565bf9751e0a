// SafetySec authentication core
// Session lifecycle, user profiles and the observable auth state for the monitor/protected app

pub mod auth;
pub mod config;

pub use config::{AppConfig, ConfigError};
