//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::category::CategoryCache;
use crate::config::Config;
use crate::newspaper::NewspaperGenerator;
use crate::web::middleware::RateLimiter;
use myrsspress_core::ports::{
    ArticleCurationService, DatabaseService, EditorialService, FeedFetchService,
    FeedSuggestionService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn FeedFetchService>,
    pub suggest_adapter: Arc<dyn FeedSuggestionService>,
    pub curation_adapter: Arc<dyn ArticleCurationService>,
    pub editorial_adapter: Arc<dyn EditorialService>,
    pub category_cache: Arc<CategoryCache>,
    pub rate_limiter: Arc<RateLimiter>,
    pub generator: NewspaperGenerator,
}
