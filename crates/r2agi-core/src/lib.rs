//! # r2agi Core
//!
//! Runtime-agnostic logic for the r2agi artifact intake service: the
//! artifact model, content addressing, submission validation, the
//! key-value store abstraction, the intake service itself, and the
//! prompt templates used by the digest tooling.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem dependencies.
//! Storage is reached only through the [`store::KvStore`] trait, which the
//! application injects at startup.

pub mod error;
pub mod id;
pub mod models;
pub mod prompt;
pub mod service;
pub mod store;
pub mod validate;
