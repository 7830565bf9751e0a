// Runtime configuration
// Loaded from environment variables, with an optional .env file

use std::env;
use thiserror::Error;

use crate::auth::UserRole;

const DEFAULT_USERS_COLLECTION: &str = "users";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Credentials the demo binary registers and signs in with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

impl Default for DemoAccount {
    fn default() -> Self {
        Self {
            email: "ann@example.com".to_string(),
            password: "Passw0rd!".to_string(),
            name: "Ann".to_string(),
            role: "monitor".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Document collection holding user profiles
    pub users_collection: String,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_filter: String,
    pub demo: DemoAccount,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            users_collection: DEFAULT_USERS_COLLECTION.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            demo: DemoAccount::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let get = |key: &str, default: String| lookup(key).unwrap_or(default);

        let config = AppConfig {
            users_collection: get("SAFETYSEC_USERS_COLLECTION", defaults.users_collection)
                .trim()
                .to_string(),
            log_filter: get("SAFETYSEC_LOG", defaults.log_filter),
            demo: DemoAccount {
                email: get("DEMO_EMAIL", defaults.demo.email),
                password: get("DEMO_PASSWORD", defaults.demo.password),
                name: get("DEMO_NAME", defaults.demo.name),
                role: get("DEMO_ROLE", defaults.demo.role),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let collection = self.users_collection.as_str();
        if collection.is_empty() {
            return Err(ConfigError::Invalid {
                key: "SAFETYSEC_USERS_COLLECTION",
                reason: "must not be empty".to_string(),
            });
        }
        if collection.contains('/') {
            return Err(ConfigError::Invalid {
                key: "SAFETYSEC_USERS_COLLECTION",
                reason: format!("'{}' must be a single collection id, not a path", collection),
            });
        }
        if let Err(e) = UserRole::parse(&self.demo.role) {
            return Err(ConfigError::Invalid {
                key: "DEMO_ROLE",
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.users_collection, "users");
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SAFETYSEC_USERS_COLLECTION", "profiles"),
            ("SAFETYSEC_LOG", "debug"),
            ("DEMO_ROLE", "both"),
        ]))
        .unwrap();

        assert_eq!(config.users_collection, "profiles");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.demo.role, "both");
        assert_eq!(config.demo.email, "ann@example.com");
    }

    #[test]
    fn test_rejects_empty_collection() {
        let err = AppConfig::from_lookup(lookup_from(&[("SAFETYSEC_USERS_COLLECTION", " ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SAFETYSEC_USERS_COLLECTION", .. }));
    }

    #[test]
    fn test_rejects_collection_path() {
        let err = AppConfig::from_lookup(lookup_from(&[("SAFETYSEC_USERS_COLLECTION", "orgs/1/users")]))
            .unwrap_err();
        assert!(err.to_string().contains("single collection id"));
    }

    #[test]
    fn test_rejects_unknown_demo_role() {
        let err = AppConfig::from_lookup(lookup_from(&[("DEMO_ROLE", "guardian")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DEMO_ROLE", .. }));
    }
}
