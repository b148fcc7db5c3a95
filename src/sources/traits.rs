use std::fmt;
use std::str::FromStr;

use crate::domain::{DateWindow, RawArticle};
use crate::errors::{TrendError, TrendResult};

/// Ordering the news API applies before truncating to the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Popularity,
    Relevancy,
    PublishedAt,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Popularity => "popularity",
            SortOrder::Relevancy => "relevancy",
            SortOrder::PublishedAt => "publishedAt",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = TrendError;

    fn from_str(s: &str) -> TrendResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popularity" => Ok(SortOrder::Popularity),
            "relevancy" => Ok(SortOrder::Relevancy),
            "publishedat" => Ok(SortOrder::PublishedAt),
            other => Err(TrendError::Config(format!("Unknown sort order: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub query: String,
    pub window: DateWindow,
    pub page_size: u32,
    pub sort_order: SortOrder,
}

/// Result of a single fetch attempt. An empty `Fetched` means the API had no
/// matching articles; `Failed` means the request itself did not succeed.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(Vec<RawArticle>),
    Failed(TrendError),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ArticleSource {
    /// Fetch one page of articles. Never retries.
    fn fetch(&self, query: &ArticleQuery) -> FetchOutcome;
}
