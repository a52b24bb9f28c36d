pub mod domain;
pub mod ports;

pub use domain::{
    Article, Category, CuratedFeed, FeedSuggestion, FeedUsage, FetchedFeed, Locale, Newspaper,
};
pub use ports::{
    ArticleCurationService, DatabaseService, EditorialService, FeedFetchService,
    FeedSuggestionService, PortError, PortResult,
};
