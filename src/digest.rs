//! Digest pipeline: turn pending artifacts into claim-extraction prompts.
//!
//! Fetches artifacts from a running intake server, renders each into the
//! claim-extraction prompt from [`r2agi_core::prompt`], and prints it with
//! the manual steps for running it through an LLM. `r2agi gates` does the
//! same for a claim already recorded in the site data, producing a
//! gate-design prompt.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use r2agi_core::models::{Artifact, ArtifactList};
use r2agi_core::prompt::{claim_prompt, gate_prompt, preview, PREVIEW_CHARS};

use crate::config::Config;
use crate::site::{find_by_id, load_collection, Collection};

/// Thin HTTP client for the intake API.
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the listing and keeps only pending artifacts.
    pub async fn fetch_pending(&self) -> Result<Vec<Artifact>> {
        let url = format!("{}/artifacts", self.base);
        let body: Value = self.get_json(&url).await?;
        if let Some(err) = body.get("error").and_then(Value::as_str) {
            bail!("{}", err);
        }
        let list: ArtifactList = serde_json::from_value(body)
            .with_context(|| format!("Unexpected response from {}", url))?;
        Ok(list
            .artifacts
            .into_iter()
            .filter(Artifact::is_pending)
            .collect())
    }

    /// Fetches one artifact. An `{"error": ...}` body becomes the error
    /// message.
    pub async fn fetch_artifact(&self, id: &str) -> Result<Artifact> {
        let url = format!("{}/artifact/{}", self.base, id);
        let body: Value = self.get_json(&url).await?;
        if let Some(err) = body.get("error").and_then(Value::as_str) {
            bail!("{}", err);
        }
        serde_json::from_value(body).with_context(|| format!("Unexpected response from {}", url))
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?;
        resp.json::<Value>()
            .await
            .with_context(|| format!("Response from {} is not JSON", url))
    }
}

/// An artifact paired with its rendered claim-extraction prompt.
#[derive(Debug, Clone)]
pub struct Digest {
    pub artifact: Artifact,
    pub prompt: String,
}

pub fn digest_artifact(artifact: Artifact) -> Digest {
    let prompt = claim_prompt(&artifact);
    Digest { artifact, prompt }
}

fn print_digest(digest: &Digest, full: bool) {
    let artifact = &digest.artifact;
    println!();
    println!("Processing artifact: {}", artifact.id);
    println!("  type:           {}", artifact.record.kind);
    println!(
        "  content length: {} chars",
        artifact.record.content.chars().count()
    );
    println!();
    println!("Generated prompt for claim extraction:");
    println!("{}", "─".repeat(60));
    if full {
        println!("{}", digest.prompt);
    } else {
        println!("{}", preview(&digest.prompt, PREVIEW_CHARS));
    }
    println!("{}", "─".repeat(60));
    println!();
    println!("To process with an LLM:");
    println!("  1. Copy the prompt above");
    println!("  2. Send it to the model");
    println!("  3. Save the output claims to data/claims/");
    println!("  4. Mark the artifact as processed");
}

/// CLI entry point for `r2agi digest`.
///
/// With an id, digests that artifact (exiting non-zero if the server
/// reports an error). Without, digests every pending artifact.
pub async fn run_digest(
    config: &Config,
    id: Option<&str>,
    api: Option<&str>,
    full: bool,
) -> Result<()> {
    let client = ApiClient::new(api.unwrap_or(&config.digest.api_base));

    if let Some(id) = id {
        let artifact = match client.fetch_artifact(id).await {
            Ok(a) => a,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        print_digest(&digest_artifact(artifact), full);
        return Ok(());
    }

    println!("Fetching pending artifacts...");
    let pending = client.fetch_pending().await?;
    if pending.is_empty() {
        println!("No pending artifacts to process");
        return Ok(());
    }

    println!("Found {} pending artifact(s)", pending.len());
    for artifact in pending {
        print_digest(&digest_artifact(artifact), full);
    }

    Ok(())
}

/// CLI entry point for `r2agi gates`: prints the gate-design prompt for a
/// claim recorded under `site.data_dir/claims`.
pub fn run_gates(config: &Config, claim_id: &str) -> Result<()> {
    let claims = load_collection(&config.site.data_dir, Collection::Claims)?;
    let claim = match find_by_id(&claims, claim_id) {
        Some(c) => c,
        None => bail!("no claim with id: {}", claim_id),
    };
    let text = match claim.get("text").and_then(serde_yaml::Value::as_str) {
        Some(t) => t,
        None => bail!("claim {} has no text", claim_id),
    };

    println!("{}", gate_prompt(text));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use r2agi_core::models::{ArtifactRecord, ArtifactStatus};

    #[test]
    fn test_digest_artifact_renders_prompt() {
        let artifact = Artifact {
            id: "0123456789abcdef".to_string(),
            record: ArtifactRecord {
                kind: "transcript".to_string(),
                content: "Agents need memory.".to_string(),
                source_url: None,
                submitter: "public".to_string(),
                tags: vec![],
                note: None,
                ingested_at: Utc::now(),
                status: ArtifactStatus::Pending,
            },
        };
        let digest = digest_artifact(artifact);
        assert!(digest.prompt.contains("Type: transcript"));
        assert!(digest.prompt.contains("artifact:0123456789abcdef"));
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let client = ApiClient::new("http://localhost:8787/");
        assert_eq!(client.base, "http://localhost:8787");
    }

    #[test]
    fn test_run_gates_unknown_claim() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.site.data_dir = tmp.path().to_path_buf();
        let err = run_gates(&cfg, "C-0001").unwrap_err();
        assert!(err.to_string().contains("no claim with id: C-0001"));
    }
}
