/// Data structures for hibernated tabs
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted metadata for one hibernated tab
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabRecord {
    /// Stable identifier; records saved before ids existed get one on load
    #[serde(default = "new_record_id")]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "favIconUrl", default)]
    pub fav_icon_url: String,
    /// Creation instant, milliseconds since the Unix epoch
    #[serde(deserialize_with = "millis")]
    pub timestamp: u64,
}

fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Timestamps written by JS (`Date.now()`) may come back as floats
fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    struct MillisVisitor;

    impl Visitor<'_> for MillisVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative millisecond timestamp")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom("negative timestamp"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            if v.is_finite() && v >= 0.0 {
                Ok(v.trunc() as u64)
            } else {
                Err(E::custom("invalid timestamp"))
            }
        }
    }

    deserializer.deserialize_any(MillisVisitor)
}

impl TabRecord {
    pub fn new(url: String, title: String, fav_icon_url: String, timestamp: u64) -> TabRecord {
        TabRecord {
            id: new_record_id(),
            url,
            title,
            fav_icon_url,
            timestamp,
        }
    }

    /// Title to show in a list, falling back to the URL
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// Host part of the URL, if it parses
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }
}

/// A live browser tab as reported by the tabs API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabSnapshot {
    pub id: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "favIconUrl", default)]
    pub fav_icon_url: Option<String>,
}

/// A hyperlink picked from a page context menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkTarget {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "favIconUrl", default)]
    pub fav_icon_url: Option<String>,
}

/// How a request points at a record in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRef {
    Id(String),
    /// Raw list position; kept for older popups. Signed so that negative
    /// values coming off the wire are rejected as out of range.
    Index(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = TabRecord::new(
            "https://google.com".to_string(),
            "Google".to_string(),
            String::new(),
            1698508200000,
        );

        assert_eq!(record.url, "https://google.com");
        assert_eq!(record.title, "Google");
        assert_eq!(record.fav_icon_url, "");
        assert_eq!(record.timestamp, 1698508200000);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = TabRecord::new("https://a.com".into(), "A".into(), String::new(), 1);
        let b = TabRecord::new("https://a.com".into(), "A".into(), String::new(), 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_wire_field_names() {
        let record = TabRecord {
            id: "rec-1".to_string(),
            url: "https://github.com".to_string(),
            title: "GitHub".to_string(),
            fav_icon_url: "https://github.com/favicon.ico".to_string(),
            timestamp: 42,
        };

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["favIconUrl"], "https://github.com/favicon.ico");
        assert_eq!(json["timestamp"], 42);
        assert!(json.get("fav_icon_url").is_none());
    }

    #[test]
    fn test_legacy_record_gets_id() {
        let json = r#"{"url":"https://example.com","title":"Example","favIconUrl":"","timestamp":5}"#;
        let record: TabRecord = serde_json::from_str(json).unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.url, "https://example.com");
        assert_eq!(record.timestamp, 5);
    }

    #[test]
    fn test_float_timestamp() {
        let json = r#"{"id":"a","url":"https://a.com","title":"","favIconUrl":"","timestamp":1698508200000.0}"#;
        let record: TabRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp, 1698508200000);

        let negative = r#"{"id":"a","url":"https://a.com","timestamp":-5}"#;
        assert!(serde_json::from_str::<TabRecord>(negative).is_err());
    }

    #[test]
    fn test_display_title_falls_back_to_url() {
        let untitled = TabRecord::new("https://example.com/x".into(), "  ".into(), String::new(), 0);
        let titled = TabRecord::new("https://example.com/x".into(), "X".into(), String::new(), 0);

        assert_eq!(untitled.display_title(), "https://example.com/x");
        assert_eq!(titled.display_title(), "X");
    }

    #[test]
    fn test_host() {
        let record = TabRecord::new("https://docs.rs/yew".into(), String::new(), String::new(), 0);
        assert_eq!(record.host(), Some("docs.rs".to_string()));

        let bad = TabRecord::new("not a url".into(), String::new(), String::new(), 0);
        assert_eq!(bad.host(), None);
    }

    #[test]
    fn test_snapshot_without_favicon() {
        let json = r#"{"id":7,"url":"https://a.com","title":"A"}"#;
        let tab: TabSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(tab.id, 7);
        assert_eq!(tab.fav_icon_url, None);
    }
}
