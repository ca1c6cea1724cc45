use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location the transport retrieves the update info payload from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme of the endpoint (`https`, `file`, ...), if it has one.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.0
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .filter(|scheme| !scheme.is_empty())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level update info document as served by the update server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireManifest {
    pub channels: Vec<WireChannel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireChannel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub versions: Vec<WireVersion>,
    #[serde(default)]
    pub changelog: Vec<WireChangelogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireVersion {
    pub version: String,
    /// Label the host uses to select this build; falls back to `version`.
    #[serde(default)]
    pub name: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireChangelogEntry {
    pub version: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<WireChangelogItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireChangelogItem {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub commit: String,
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_scheme_is_extracted() {
        assert_eq!(
            Endpoint::new("https://example.com/channels.json").scheme(),
            Some("https")
        );
        assert_eq!(Endpoint::new("file:///tmp/info.json").scheme(), Some("file"));
        assert_eq!(Endpoint::new("/tmp/info.json").scheme(), None);
        assert_eq!(Endpoint::new("://nothing").scheme(), None);
    }

    #[test]
    fn endpoint_display_is_the_raw_url() {
        let endpoint = Endpoint::new("https://example.com/x");
        assert_eq!(endpoint.to_string(), "https://example.com/x");
        assert_eq!(endpoint.as_str(), "https://example.com/x");
    }

    #[test]
    fn manifest_requires_channels_key() {
        let error = serde_json::from_str::<WireManifest>(r#"{"error": "maintenance"}"#)
            .expect_err("document without channels should be rejected");
        assert!(error.to_string().contains("missing field `channels`"));

        let manifest: WireManifest =
            serde_json::from_str(r#"{"channels": []}"#).expect("empty channel list is valid");
        assert!(manifest.channels.is_empty());
    }

    #[test]
    fn wire_channel_defaults_optional_fields() {
        let channel: WireChannel =
            serde_json::from_str(r#"{"name": "dev"}"#).expect("minimal channel should parse");

        assert_eq!(channel.name, "dev");
        assert!(channel.description.is_empty());
        assert!(channel.versions.is_empty());
        assert!(channel.changelog.is_empty());
    }

    #[test]
    fn wire_version_parses_rfc3339_date() {
        let version: WireVersion = serde_json::from_str(
            r#"{"version": "1.1.0", "date": "2023-06-01T12:30:00Z"}"#,
        )
        .expect("version record should parse");

        assert_eq!(version.version, "1.1.0");
        assert_eq!(version.name, None);
        assert_eq!(version.date.to_rfc3339(), "2023-06-01T12:30:00+00:00");
    }

    #[test]
    fn wire_changelog_item_defaults_missing_strings() {
        let item: WireChangelogItem =
            serde_json::from_str(r#"{"body": "Fixed a crash"}"#).expect("item should parse");

        assert_eq!(item.body, "Fixed a crash");
        assert!(item.author.is_empty());
        assert!(item.commit.is_empty());
    }
}
