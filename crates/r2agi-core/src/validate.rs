//! Submission schema and validation.
//!
//! A submission is deserialized into [`SubmitRequest`] (shape check), then
//! [`SubmitRequest::validate`] enforces the presence and size contract and
//! normalises the optional fields into a [`ValidSubmission`].

use serde::Deserialize;

use crate::error::{Result, ServiceError};
use crate::models::DEFAULT_SUBMITTER;

/// Message for a submission lacking `kind` or `content`.
pub const MISSING_FIELDS: &str = "Missing required fields: kind, content";

/// Size caps applied to submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_content_bytes: usize,
    pub max_tags: usize,
    pub max_tag_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_content_bytes: 1024 * 1024,
            max_tags: 32,
            max_tag_bytes: 128,
        }
    }
}

impl Limits {
    /// Upper bound for a raw request body that could still be valid.
    ///
    /// JSON escaping can inflate content, so this leaves headroom over
    /// `max_content_bytes` for escapes and the remaining fields.
    pub fn max_body_bytes(&self) -> usize {
        self.max_content_bytes
            .saturating_mul(2)
            .saturating_add(self.max_tags.saturating_mul(self.max_tag_bytes))
            .saturating_add(64 * 1024)
    }
}

/// Raw submission body. Every field is optional at this stage so that a
/// missing field is reported as a validation error, not a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub submitter: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A submission that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub kind: String,
    pub content: String,
    pub source_url: Option<String>,
    pub submitter: String,
    pub tags: Vec<String>,
    pub note: Option<String>,
}

impl SubmitRequest {
    /// Parses a JSON body. Anything other than an object of the expected
    /// field types is rejected as [`ServiceError::InvalidBody`].
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(ServiceError::InvalidBody)?;
        // Structs also deserialize from sequences; only objects are submissions.
        if !value.is_object() {
            return Err(ServiceError::InvalidBody(serde::de::Error::custom(
                "expected a JSON object",
            )));
        }
        serde_json::from_value(value).map_err(ServiceError::InvalidBody)
    }

    pub fn validate(self, limits: &Limits) -> Result<ValidSubmission> {
        let kind = non_empty(self.kind);
        let content = non_empty(self.content);
        let (kind, content) = match (kind, content) {
            (Some(k), Some(c)) => (k, c),
            _ => return Err(ServiceError::Validation(MISSING_FIELDS.to_string())),
        };

        if content.len() > limits.max_content_bytes {
            return Err(ServiceError::Validation(format!(
                "content exceeds {} bytes",
                limits.max_content_bytes
            )));
        }

        let tags = self.tags.unwrap_or_default();
        if tags.len() > limits.max_tags {
            return Err(ServiceError::Validation(format!(
                "tags exceeds {} entries",
                limits.max_tags
            )));
        }
        if tags.iter().any(|t| t.len() > limits.max_tag_bytes) {
            return Err(ServiceError::Validation(format!(
                "tag exceeds {} bytes",
                limits.max_tag_bytes
            )));
        }

        Ok(ValidSubmission {
            kind,
            content,
            source_url: non_empty(self.source_url),
            submitter: non_empty(self.submitter)
                .unwrap_or_else(|| DEFAULT_SUBMITTER.to_string()),
            tags,
            note: non_empty(self.note),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
