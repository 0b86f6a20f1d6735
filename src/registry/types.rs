//! Registry data model.
//!
//! Everything here is deserialized straight from the registry's JSON. The
//! only derived value is [`ExtensionId`], the case-folded `publisher.name` key
//! that joins registry records with installed plugins.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{RegistryError, RegistryResult};

/// Normalized `publisher.name` identifier.
///
/// Both parts are lowercased on construction, so equality, ordering and
/// hashing are case-insensitive with respect to the original inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId {
    publisher: String,
    name: String,
}

impl ExtensionId {
    /// Build an identifier from its two parts.
    pub fn new(publisher: &str, name: &str) -> Self {
        Self { publisher: publisher.to_lowercase(), name: name.to_lowercase() }
    }

    /// Identifier of a registry record.
    pub fn of(extension: &ExtensionSummary) -> Self {
        Self::new(&extension.publisher, &extension.name)
    }

    /// Normalized publisher.
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Normalized extension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `publisher/name`, the registry's path segment for this extension.
    pub fn to_path(&self) -> String {
        format!("{}/{}", self.publisher, self.name)
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.publisher, self.name)
    }
}

impl FromStr for ExtensionId {
    type Err = RegistryError;

    /// Split on the first dot; names may themselves contain dots.
    fn from_str(s: &str) -> RegistryResult<Self> {
        match s.trim().split_once('.') {
            Some((publisher, name)) if !publisher.is_empty() && !name.is_empty() => {
                Ok(Self::new(publisher, name))
            }
            _ => Err(RegistryError::InvalidId(s.to_string())),
        }
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = RegistryError;

    fn try_from(value: String) -> RegistryResult<Self> {
        value.parse()
    }
}

impl From<ExtensionId> for String {
    fn from(id: ExtensionId) -> Self {
        id.to_string()
    }
}

/// Downloadable assets of an extension version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionFiles {
    /// Package download URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    /// Icon URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Enough of an extension to render a list entry.
///
/// Records may name the publisher `publisher`, `namespace` or both; when
/// both are present `publisher` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SummaryRecord")]
pub struct ExtensionSummary {
    /// Publisher (the registry calls it a namespace)
    pub publisher: String,

    /// Extension name
    pub name: String,

    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Version of this record
    #[serde(default)]
    pub version: String,

    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Registry URL of this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Download and icon references
    #[serde(default)]
    pub files: ExtensionFiles,

    /// Publication timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Average review rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,

    /// Total downloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
}

impl ExtensionSummary {
    /// Normalized identifier of this extension.
    pub fn id(&self) -> ExtensionId {
        ExtensionId::of(self)
    }

    /// Display name, falling back to the bare name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().filter(|s| !s.is_empty()).unwrap_or(&self.name)
    }

    /// Icon reference, if the registry provided one.
    pub fn icon(&self) -> Option<&str> {
        self.files.icon.as_deref()
    }
}

/// Wire shape of [`ExtensionSummary`] before the publisher is settled.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRecord {
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    files: ExtensionFiles,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    average_rating: Option<f64>,
    #[serde(default)]
    download_count: Option<u64>,
}

impl TryFrom<SummaryRecord> for ExtensionSummary {
    type Error = String;

    fn try_from(record: SummaryRecord) -> Result<Self, Self::Error> {
        let publisher = record
            .publisher
            .or(record.namespace)
            .ok_or_else(|| "missing field `publisher`".to_string())?;

        Ok(Self {
            publisher,
            name: record.name,
            display_name: record.display_name,
            version: record.version,
            description: record.description,
            url: record.url,
            files: record.files,
            timestamp: record.timestamp,
            average_rating: record.average_rating,
            download_count: record.download_count,
        })
    }
}

/// Full registry record for one extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDetails {
    /// List-entry fields
    #[serde(flatten)]
    pub summary: ExtensionSummary,

    /// Where the readme markdown lives; may be on another host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_url: Option<String>,

    /// License identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Project homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Source repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Issue tracker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs: Option<String>,

    /// Marketplace categories
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Other published versions, version -> URL
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub all_versions: BTreeMap<String, String>,

    /// Number of reviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,

    /// Declared engine requirements, engine -> version range
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub engines: BTreeMap<String, String>,
}

impl ExtensionDetails {
    /// Normalized identifier of this extension.
    pub fn id(&self) -> ExtensionId {
        self.summary.id()
    }
}

/// Body of `GET <base>/api/-/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub extensions: Vec<ExtensionSummary>,
}

/// Parameters of the most recent search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParam {
    /// Free-text query; `None` and `""` both mean "default listing"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl SearchParam {
    /// A search for `query`.
    pub fn query(query: impl Into<String>) -> Self {
        Self { query: Some(query.into()) }
    }

    /// The query text, with empty strings treated as absent.
    pub fn text(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_case_folded() {
        let pairs = [("Acme", "Foo"), ("ACME", "FOO"), ("acme", "foo"), ("aCmE", "fOo")];
        let ids: Vec<_> = pairs.iter().map(|(p, n)| ExtensionId::new(p, n)).collect();

        for id in &ids {
            assert_eq!(id, &ids[0]);
            assert_eq!(id.to_string(), "acme.foo");
        }
    }

    #[test]
    fn test_id_parse() {
        let id: ExtensionId = "Redhat.Java".parse().unwrap();
        assert_eq!(id.publisher(), "redhat");
        assert_eq!(id.name(), "java");
        assert_eq!(id.to_path(), "redhat/java");

        // Only the first dot separates publisher from name
        let id: ExtensionId = "ms-python.python.debug".parse().unwrap();
        assert_eq!(id.publisher(), "ms-python");
        assert_eq!(id.name(), "python.debug");
        assert_eq!(id.to_path(), "ms-python/python.debug");
    }

    #[test]
    fn test_id_parse_rejects_malformed() {
        for bad in ["", "nodot", ".name", "publisher.", "  "] {
            assert!(
                matches!(bad.parse::<ExtensionId>(), Err(RegistryError::InvalidId(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_summary_deserializes_registry_shape() {
        let json = r#"{
            "url": "https://open-vsx.org/api/redhat/java",
            "files": { "download": "https://x/java.vsix", "icon": "https://x/icon.png" },
            "name": "java",
            "namespace": "redhat",
            "version": "0.60.0",
            "timestamp": "2020-05-06T10:00:00Z",
            "averageRating": 4.5,
            "downloadCount": 1200,
            "displayName": "Language Support for Java(TM) by Red Hat",
            "description": "Java Linting, Intellisense, formatting, refactoring"
        }"#;

        let summary: ExtensionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.publisher, "redhat");
        assert_eq!(summary.id().to_string(), "redhat.java");
        assert_eq!(summary.icon(), Some("https://x/icon.png"));
        assert_eq!(summary.label(), "Language Support for Java(TM) by Red Hat");
        assert_eq!(summary.download_count, Some(1200));
    }

    #[test]
    fn test_summary_accepts_publisher_and_namespace_together() {
        let json = r#"{"namespace": "redhat", "publisher": "RedHat", "name": "java"}"#;
        let summary: ExtensionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.publisher, "RedHat");
        assert_eq!(summary.id().to_string(), "redhat.java");

        let json = r#"{"extensions": [
            {"namespace": "a", "publisher": "a", "name": "one"},
            {"namespace": "b", "name": "two"}
        ]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = response.extensions.iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, ["a.one", "b.two"]);
    }

    #[test]
    fn test_summary_requires_a_publisher() {
        let err = serde_json::from_str::<ExtensionSummary>(r#"{"name": "java"}"#).unwrap_err();
        assert!(err.to_string().contains("publisher"), "{err}");
    }

    #[test]
    fn test_details_flatten_summary() {
        let json = r#"{
            "publisher": "Acme",
            "name": "Foo",
            "version": "1.0.0",
            "readmeUrl": "https://cdn.example.com/acme/foo/README.md",
            "license": "MIT",
            "categories": ["Linters"],
            "engines": { "vscode": "^1.40.0" }
        }"#;

        let details: ExtensionDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.id(), ExtensionId::new("acme", "foo"));
        assert_eq!(details.readme_url.as_deref(), Some("https://cdn.example.com/acme/foo/README.md"));
        assert_eq!(details.summary.label(), "Foo");
        assert_eq!(details.engines.get("vscode").map(String::as_str), Some("^1.40.0"));
    }

    #[test]
    fn test_search_param_text() {
        assert_eq!(SearchParam::default().text(), None);
        assert_eq!(SearchParam::query("").text(), None);
        assert_eq!(SearchParam::query("lang").text(), Some("lang"));
    }
}
