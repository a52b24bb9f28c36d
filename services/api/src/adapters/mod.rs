pub mod curation_llm;
pub mod db;
pub mod editorial_llm;
pub mod extract;
pub mod mock_llm;
pub mod rss;
pub mod suggest_llm;

pub use curation_llm::OpenAiCurationAdapter;
pub use db::DbAdapter;
pub use editorial_llm::OpenAiEditorialAdapter;
pub use mock_llm::MockAi;
pub use rss::RssFetcher;
pub use suggest_llm::OpenAiSuggestAdapter;
