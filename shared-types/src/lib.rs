use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;

/// A named collection of configs. A group must exist before configs can be
/// stored into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    /// Ids of the configs stored in this group, in order of first insertion.
    #[serde(default)]
    pub configs: Vec<String>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            configs: Vec::new(),
        }
    }

    pub fn contains(&self, config_id: &str) -> bool {
        self.configs.iter().any(|c| c == config_id)
    }

    /// Append a config id unless it is already listed.
    /// Returns `true` if the list changed.
    pub fn add_config(&mut self, config_id: &str) -> bool {
        if self.contains(config_id) {
            return false;
        }
        self.configs.push(config_id.to_string());
        true
    }
}

/// A named, versioned property blob belonging to exactly one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub version: i64,
    pub group: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Config {
    pub fn new(group: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            last_modified: Utc::now(),
            version: 0,
            group: group.into(),
            properties: Properties::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// Opaque JSON payload of a config.
///
/// The raw text is kept as received and written back out unchanged; nothing
/// in the store parses into it. Missing properties serialize as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(Option<Box<RawValue>>);

impl Properties {
    /// Wrap a JSON document, validating only that it is well formed.
    pub fn from_json(json: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.into()).map(|raw| Self(Some(raw)))
    }

    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::value::to_raw_value(value).map(|raw| Self(Some(raw)))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().map_or("null", RawValue::get)
    }

    pub fn is_null(&self) -> bool {
        self.as_str() == "null"
    }
}

impl PartialEq for Properties {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Properties {}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_add_config_keeps_first_position() {
        let mut group = Group::new("g1");
        assert!(group.add_config("c1"));
        assert!(group.add_config("c2"));
        assert!(!group.add_config("c1"));
        assert!(group.add_config("c3"));

        assert_eq!(group.configs, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_group_without_configs_field() {
        let group: Group = serde_json::from_str(r#"{"id":"g1"}"#).unwrap();
        assert_eq!(group, Group::new("g1"));
    }

    #[test]
    fn test_config_json_field_names() {
        let config = Config::new("g1", "c1")
            .with_name("database")
            .with_version(3)
            .with_properties(Properties::from_json(r#"{"port":5432}"#).unwrap());

        let json: serde_json::Value = serde_json::to_value(&config).unwrap();
        assert_eq!(json["id"], "c1");
        assert_eq!(json["group"], "g1");
        assert_eq!(json["name"], "database");
        assert_eq!(json["version"], 3);
        assert!(json.get("lastModified").is_some());
        assert_eq!(json["properties"]["port"], 5432);
    }

    #[test]
    fn test_properties_kept_verbatim() {
        let raw = r#"{"z": 1,   "a": [true, null]}"#;
        let body = format!(
            r#"{{"id":"c1","group":"g1","lastModified":"2024-01-01T00:00:00Z","properties":{raw}}}"#
        );

        let config: Config = serde_json::from_str(&body).unwrap();
        assert_eq!(config.properties.as_str(), raw);

        let written = serde_json::to_string(&config).unwrap();
        assert!(written.contains(raw));
    }

    #[test]
    fn test_missing_properties_are_null() {
        let config: Config = serde_json::from_str(
            r#"{"id":"c1","group":"g1","lastModified":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(config.properties.is_null());
        assert_eq!(config.version, 0);
        assert_eq!(config.name, "");
        assert!(serde_json::to_string(&config)
            .unwrap()
            .contains(r#""properties":null"#));
    }

    #[test]
    fn test_properties_reject_invalid_json() {
        assert!(Properties::from_json("{not json").is_err());
    }
}
