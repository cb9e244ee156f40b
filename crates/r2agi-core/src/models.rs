//! Core data models for the intake service.
//!
//! [`ArtifactRecord`] is exactly what gets written to the key-value
//! backend; the id lives in the key, not the value. [`Artifact`] is the
//! record with its key merged back in, which is what every read returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Submitter recorded when the caller does not name one.
pub const DEFAULT_SUBMITTER: &str = "public";

/// Message returned with every accepted submission.
pub const SUBMIT_MESSAGE: &str = "Artifact submitted for processing";

/// Processing state of an artifact.
///
/// The service only ever writes `Pending`; `Processed` is recognised so
/// that records marked by downstream tooling still deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    #[default]
    Pending,
    Processed,
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactStatus::Pending => f.write_str("pending"),
            ArtifactStatus::Processed => f.write_str("processed"),
        }
    }
}

/// Persisted artifact value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default = "default_submitter")]
    pub submitter: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(with = "iso8601_millis")]
    pub ingested_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ArtifactStatus,
}

fn default_submitter() -> String {
    DEFAULT_SUBMITTER.to_string()
}

/// An artifact as returned to readers: the stored record plus its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    #[serde(flatten)]
    pub record: ArtifactRecord,
}

impl Artifact {
    pub fn is_pending(&self) -> bool {
        self.record.status == ArtifactStatus::Pending
    }
}

/// Response body for an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub artifact_id: String,
    pub message: String,
}

/// Response body for a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub count: usize,
    pub artifacts: Vec<Artifact>,
}

impl ArtifactList {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self {
            count: artifacts.len(),
            artifacts,
        }
    }
}

/// Response body for the liveness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// `ingested_at` is written as `YYYY-MM-DDTHH:MM:SS.mmmZ`. Any RFC 3339
/// timestamp is accepted on read.
mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> ArtifactRecord {
        ArtifactRecord {
            kind: "note".to_string(),
            content: "hello world".to_string(),
            source_url: None,
            submitter: DEFAULT_SUBMITTER.to_string(),
            tags: vec!["a".to_string()],
            note: None,
            ingested_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            status: ArtifactStatus::Pending,
        }
    }

    #[test]
    fn test_record_serializes_without_id() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["ingested_at"], "2026-01-02T03:04:05.000Z");
        assert!(json["source_url"].is_null());
    }

    #[test]
    fn test_artifact_flattens_record() {
        let artifact = Artifact {
            id: "b94d27b9934d3e08".to_string(),
            record: sample_record(),
        };
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["id"], "b94d27b9934d3e08");
        assert_eq!(json["kind"], "note");
        assert_eq!(json["content"], "hello world");
    }

    #[test]
    fn test_legacy_record_fills_defaults() {
        let raw = r#"{"kind":"paper","content":"x","ingested_at":"2025-06-01T10:00:00.000Z"}"#;
        let record: ArtifactRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.submitter, "public");
        assert!(record.tags.is_empty());
        assert_eq!(record.status, ArtifactStatus::Pending);
    }

    #[test]
    fn test_processed_status_reads_back() {
        let raw = r#"{"kind":"k","content":"c","ingested_at":"2025-06-01T10:00:00Z","status":"processed"}"#;
        let record: ArtifactRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.status, ArtifactStatus::Processed);
        assert_eq!(record.status.to_string(), "processed");
    }
}
