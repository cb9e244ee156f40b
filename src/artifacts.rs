//! Local artifact inspection.
//!
//! `r2agi list` and `r2agi get` read the configured backend directly,
//! without a running server. Both go through [`ArtifactService`] so the
//! output matches what the HTTP API would return.

use anyhow::Result;

use r2agi_core::error::ServiceError;

use crate::config::Config;
use crate::db;
use crate::server::build_service;

/// CLI entry point for `r2agi list`.
pub async fn run_list(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = db::open_backend(config).await?;
    let service = build_service(config, store)?;
    let list = service.list(limit).await?;

    println!(
        "{:<18} {:<14} {:<10} INGESTED_AT",
        "ID", "KIND", "STATUS"
    );
    for artifact in &list.artifacts {
        println!(
            "{:<18} {:<14} {:<10} {}",
            artifact.id,
            artifact.record.kind,
            artifact.record.status,
            artifact.record.ingested_at.format("%Y-%m-%dT%H:%M:%SZ")
        );
    }
    println!();
    println!("{} artifact(s)", list.count);

    Ok(())
}

/// CLI entry point for `r2agi get`.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let store = db::open_backend(config).await?;
    let service = build_service(config, store)?;

    let artifact = match service.get(id).await {
        Ok(a) => a,
        Err(ServiceError::NotFound) => {
            eprintln!("Error: artifact not found: {}", id);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    let record = &artifact.record;

    println!("--- Artifact ---");
    println!("id:          {}", artifact.id);
    println!("kind:        {}", record.kind);
    println!("status:      {}", record.status);
    println!("submitter:   {}", record.submitter);
    if let Some(ref url) = record.source_url {
        println!("source_url:  {}", url);
    }
    if !record.tags.is_empty() {
        println!("tags:        {}", record.tags.join(", "));
    }
    if let Some(ref note) = record.note {
        println!("note:        {}", note);
    }
    println!(
        "ingested_at: {}",
        record.ingested_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!();

    println!("--- Content ---");
    println!("{}", record.content);

    Ok(())
}
