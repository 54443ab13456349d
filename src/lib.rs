//! Dual-tree, content-addressed document versioning engine.
//!
//! Five cooperating components (`hash`, `repository::structural_set_store`,
//! `repository::content_tree`, `repository::path_tree`,
//! `repository::query_plane`) implement the core; `collaborators` names
//! the external systems (Gateway, AuthorityOracle, BlobStore, Embedder,
//! vector index) this crate never owns.

pub mod cli;
pub mod collaborators;
pub mod config;
pub mod errors;
pub mod hash;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod schema;

pub use errors::{CoreError, Result};
