/// Extension settings
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_KEY: &str = "inactiveTabs";
pub const DEFAULT_FAVICON: &str = "default-favicon.png";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HibernateConfig {
    /// Key under which the whole inactive tab list is stored
    pub storage_key: String,
    /// One of error, warn, info, debug, trace
    pub log_level: String,
    /// Image shown when a record has no favicon or it fails to load
    pub default_favicon: String,
}

impl Default for HibernateConfig {
    fn default() -> Self {
        HibernateConfig {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "info".to_string(),
            default_favicon: DEFAULT_FAVICON.to_string(),
        }
    }
}

impl HibernateConfig {
    /// Parse a JSON config object; anything unusable yields the defaults
    pub fn from_json(value: serde_json::Value) -> HibernateConfig {
        if value.is_null() {
            return HibernateConfig::default();
        }

        match serde_json::from_value::<HibernateConfig>(value) {
            Ok(mut config) => {
                if config.storage_key.trim().is_empty() {
                    log::warn!("Empty storage key in config, using {}", DEFAULT_STORAGE_KEY);
                    config.storage_key = DEFAULT_STORAGE_KEY.to_string();
                }
                config
            }
            Err(e) => {
                log::warn!("Invalid config, using defaults: {}", e);
                HibernateConfig::default()
            }
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = HibernateConfig::default();

        assert_eq!(config.storage_key, "inactiveTabs");
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
        assert_eq!(config.default_favicon, "default-favicon.png");
    }

    #[test]
    fn test_partial_config() {
        let config = HibernateConfig::from_json(json!({ "logLevel": "debug" }));

        assert_eq!(config.storage_key, "inactiveTabs");
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_null_and_invalid_config() {
        assert_eq!(HibernateConfig::from_json(serde_json::Value::Null), HibernateConfig::default());
        assert_eq!(HibernateConfig::from_json(json!({ "storageKey": 12 })), HibernateConfig::default());
    }

    #[test]
    fn test_blank_storage_key() {
        let config = HibernateConfig::from_json(json!({ "storageKey": "  " }));
        assert_eq!(config.storage_key, "inactiveTabs");
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let config = HibernateConfig::from_json(json!({ "logLevel": "chatty" }));
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }
}
