//! services/api/src/category/mod.rs
//!
//! Category taxonomy support: the cached theme matcher and feed promotion.

pub mod cache;
pub mod promotion;

pub use cache::CategoryCache;
