//! services/api/src/newspaper/mod.rs
//!
//! Newspaper generation: calendar math, source balancing, and the
//! fetch/score/select pipeline.

pub mod balance;
pub mod dates;
pub mod generator;

pub use generator::{GenerateError, GenerateRequest, NewspaperGenerator};
