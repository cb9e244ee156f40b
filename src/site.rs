//! YAML record loading for the static site.
//!
//! The site's data lives under `<data_dir>/<collection>/*.yaml`. Records are
//! returned as parsed YAML values with no schema applied; callers pick the
//! fields they need. Used by the `r2agi site` and `r2agi gates` commands.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_yaml::Value;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Config;

/// A single YAML document from a collection.
pub type Record = Value;

/// Record collections the site knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Collection {
    Roads,
    Claims,
    Gates,
    Challenges,
    Examples,
}

impl Collection {
    /// Directory name under the data root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Collection::Roads => "roads",
            Collection::Claims => "claims",
            Collection::Gates => "gates",
            Collection::Challenges => "challenges",
            Collection::Examples => "examples",
        }
    }
}

/// Loads every `.yaml`/`.yml` file directly inside `data_dir/subdir`, in
/// file-name order.
///
/// A missing directory yields no records. Documents that parse to null
/// (empty files) are dropped.
pub fn load_yaml_dir(data_dir: &Path, subdir: &str) -> Result<Vec<Record>> {
    let dir = data_dir.join(subdir);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let yaml_files = build_globset(&["*.yaml", "*.yml"])?;
    let mut records = Vec::new();

    let walker = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !yaml_files.is_match(&*name) {
            continue;
        }

        let path = entry.path();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let record: Record = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML: {}", path.display()))?;
        if !record.is_null() {
            records.push(record);
        }
    }

    Ok(records)
}

pub fn load_collection(data_dir: &Path, collection: Collection) -> Result<Vec<Record>> {
    load_yaml_dir(data_dir, collection.dir_name())
}

/// First record whose `id` field is the string `id`.
pub fn find_by_id<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    records
        .iter()
        .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
}

/// CLI entry point: prints a collection, or a single record, as JSON.
pub fn run_site(config: &Config, collection: Collection, id: Option<&str>) -> Result<()> {
    let records = load_collection(&config.site.data_dir, collection)?;

    let json = match id {
        Some(id) => {
            let record = match find_by_id(&records, id) {
                Some(r) => r,
                None => bail!("no {} record with id: {}", collection.dir_name(), id),
            };
            serde_json::to_string_pretty(record)?
        }
        None => serde_json::to_string_pretty(&records)?,
    };
    println!("{}", json);

    Ok(())
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
