//! # r2agi
//!
//! A content-addressed intake service for raw material ("artifacts"), plus
//! the offline tooling that turns artifacts into LLM prompts and loads the
//! YAML records behind the static site.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  HTTP   ┌──────────────┐   ┌─────────────────┐   ┌──────────┐
//! │  client  │───────▶│ server (axum)│──▶│ ArtifactService │──▶│ KvStore  │
//! └──────────┘         └──────┬───────┘   └─────────────────┘   │ SQLite / │
//!                             │                                  │ memory   │
//!      ┌──────────────────────┘                                  └──────────┘
//!      ▼
//! ┌──────────┐   claim / gate prompts    ┌──────────────────┐
//! │  digest  │◀─────────────────────────│ site (YAML data) │
//! └──────────┘                           └──────────────────┘
//! ```
//!
//! An artifact's id is the SHA-256 of its content (truncated to
//! `ids.hex_len` hex characters), so resubmitting identical content
//! overwrites the earlier record.
//!
//! ## Quick Start
//!
//! ```bash
//! r2agi init                     # create the SQLite store
//! r2agi serve                    # start the HTTP API
//! r2agi digest                   # render prompts for pending artifacts
//! r2agi site claims              # dump YAML claims as JSON
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | SQLite connection and backend selection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite key-value backend |
//! | [`server`] | HTTP API |
//! | [`cors`] | Cross-origin header policy |
//! | [`artifacts`] | Local list/get commands |
//! | [`digest`] | Prompt generation from pending artifacts |
//! | [`site`] | YAML record loader |
//! | [`logging`] | Tracing subscriber setup |

pub mod artifacts;
pub mod config;
pub mod cors;
pub mod db;
pub mod digest;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod site;
pub mod sqlite_store;
