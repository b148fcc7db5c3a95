pub mod newsapi;
pub mod traits;

pub use newsapi::NewsApiSource;
pub use traits::{ArticleQuery, ArticleSource, FetchOutcome, SortOrder};
