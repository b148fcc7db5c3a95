pub mod keyword_service;
pub mod scoring_service;
pub mod selection_service;

pub use keyword_service::KeywordExtractor;
pub use scoring_service::ArticleScorer;
pub use selection_service::{AbortReason, RunOutcome, SelectionService};
