//! services/api/src/lib.rs
//!
//! Library crate backing the `api` binary: adapters over the core ports,
//! the newspaper generation pipeline, and the Axum web layer.

pub mod adapters;
pub mod category;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod newspaper;
pub mod web;
